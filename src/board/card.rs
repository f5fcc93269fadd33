use crate::jobs::JobRecord;

const EXCERPT_MAX_CHARS: usize = 50;

/// What a job looks like in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub views: u64,
    pub applies: u64,
}

impl JobCard {
    pub fn from_job(job: &JobRecord) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            excerpt: excerpt(&job.raw),
            views: job.views,
            applies: job.applies,
        }
    }
}

/// The second non-blank line of `raw`.
///
/// Single-line postings only get an excerpt when the line is too long to
/// read as a title; it is cut to 50 characters.
pub fn excerpt(raw: &str) -> String {
    let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
    let first = lines.next();
    if let Some(second) = lines.next() {
        return second.to_string();
    }

    match first {
        Some(first) if first.chars().count() > EXCERPT_MAX_CHARS => {
            let shortened: String = first.chars().take(EXCERPT_MAX_CHARS).collect();
            format!("{}...", shortened)
        }
        _ => String::new(),
    }
}
