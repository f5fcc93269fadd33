use crate::cli_style::{
    fit_width, print_empty_list, print_key_value, print_key_value_highlight,
    print_section_footer, print_section_header, print_toast, TableBuilder,
};
use jobboard::board::{BoardView, JobCard};
use jobboard::jobs::JobRecord;
use std::time::Duration;

const TITLE_WIDTH: usize = 36;
const EXCERPT_WIDTH: usize = 44;

/// Draws the board on stdout.
pub struct TerminalView;

impl BoardView for TerminalView {
    fn render(&self, cards: &[JobCard]) {
        if cards.is_empty() {
            print_empty_list("No jobs to show");
            return;
        }
        let mut table = TableBuilder::new(vec!["Id", "Title", "Excerpt", "Views", "Applies"]);
        for card in cards {
            table.add_row(vec![
                card.id.clone(),
                fit_width(&card.title, TITLE_WIDTH),
                fit_width(&card.excerpt, EXCERPT_WIDTH),
                card.views.to_string(),
                card.applies.to_string(),
            ]);
        }
        table.print();
    }

    fn show_detail(&self, job: &JobRecord) {
        let title = if job.title.is_empty() {
            "Job Details"
        } else {
            job.title.as_str()
        };
        print_section_header(title);
        if job.raw.is_empty() {
            let fallback = serde_json::to_string_pretty(job).unwrap_or_default();
            for line in fallback.lines() {
                println!("  {}", line);
            }
        } else {
            for line in job.raw.lines() {
                println!("  {}", line);
            }
        }
        println!();
        if !job.apply.is_empty() {
            print_key_value_highlight("Apply", &job.apply);
        }
        print_key_value("Id", &job.id);
        print_section_footer();
    }

    fn hide_detail(&self) {}

    fn show_toast(&self, text: &str, duration: Duration) {
        print_toast(text, duration.as_secs_f64());
    }
}
