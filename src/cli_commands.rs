use crate::cli_style::{print_key_value, print_section_footer, print_section_header, print_success};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use jobboard::board::{BoardView, JobBoard};
use jobboard::config::AppConfig;
use jobboard::cross_tab::CrossTabWatcher;
use jobboard::jobs::{derive_title, JobRecord};
use jobboard::local_cache::{KeyValueStorage, LocalCache, SqliteStorage};
use jobboard::metrics;
use jobboard::sync::{SyncController, SyncHooks};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Commands available both from the command line and inside the shell.
#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Shows all jobs.
    List,

    /// Shows the jobs matching a query (case-insensitive).
    Search { query: String },

    /// Opens a job's details, counting a view.
    Show { job_id: String },

    /// Counts an apply on the open job, or opens the given job first.
    Apply { job_id: Option<String> },

    /// Publishes a new job. The first line of the posting becomes its title.
    Add {
        raw: String,
        /// Where candidates apply.
        #[clap(long)]
        apply: Option<String>,
    },

    /// Changes the posting or the apply link of a job.
    Edit {
        job_id: String,
        #[clap(long)]
        raw: Option<String>,
        #[clap(long)]
        apply: Option<String>,
    },

    /// Removes a job.
    Delete { job_id: String },

    /// Publishes the announcement. An empty text clears it.
    Announce { text: String },

    /// Shows the current announcement.
    Announcement,

    /// Shows the sync state of this tab.
    Status,

    /// Prints the collected metrics.
    Stats,

    /// Shows the path of the storage database.
    Where,
}

/// One open tab: storage handle, cache, sync controller and board.
pub struct Session {
    pub config: AppConfig,
    pub storage: Arc<SqliteStorage>,
    pub sync: Arc<SyncController>,
    pub board: Arc<JobBoard>,
    watcher: Arc<CrossTabWatcher>,
}

impl Session {
    /// Must be called from within a tokio runtime.
    pub fn open(config: AppConfig, view: Arc<dyn BoardView>, hooks: SyncHooks) -> Result<Self> {
        let storage = Arc::new(
            SqliteStorage::open_profile(&config.profile_dir).with_context(|| {
                format!("Failed to open the profile at {:?}", config.profile_dir)
            })?,
        );
        info!(
            "Opened storage {:?} as writer {}",
            storage.path(),
            storage.writer_id()
        );
        let cache = LocalCache::new(storage.clone());
        let watcher = Arc::new(CrossTabWatcher::new(storage.clone()));

        let sync = SyncController::from_settings(cache.clone(), hooks, config.remote.as_ref());
        let board = Arc::new(
            JobBoard::new(cache, view).with_sync(sync.clone(), config.sync_counters()),
        );

        Ok(Self {
            config,
            storage,
            sync,
            board,
            watcher,
        })
    }

    /// Start reacting to changes made by other tabs.
    pub fn start_cross_tab(&self) -> Vec<JoinHandle<()>> {
        let events = self.watcher.subscribe();
        vec![
            self.watcher
                .clone()
                .spawn(self.config.cross_tab_poll_interval),
            self.board.clone().spawn_cross_tab(events),
        ]
    }

    pub async fn execute(&self, command: BoardCommand) -> Result<()> {
        match command {
            BoardCommand::List => {
                self.board.refresh();
            }
            BoardCommand::Search { query } => {
                let found = self.board.search(&query);
                info!("{} jobs match {:?}", found.len(), query);
            }
            BoardCommand::Show { job_id } => {
                let job = self.find_job(&job_id)?;
                self.board.open_job(&job).await;
            }
            BoardCommand::Apply { job_id } => {
                if let Some(job_id) = job_id {
                    if self.board.open_job_id().as_deref() != Some(job_id.as_str()) {
                        let job = self.find_job(&job_id)?;
                        self.board.open_job(&job).await;
                    }
                }
                match self.board.apply_clicked().await {
                    Some(job) => print_success(&format!(
                        "Applied to {} ({} applies)",
                        job.title, job.applies
                    )),
                    None => bail!("No job is open, use 'show <job_id>' first"),
                }
            }
            BoardCommand::Add { raw, apply } => {
                let job = JobRecord::new(raw, apply.unwrap_or_default());
                if !self.sync.push_job(&job).await {
                    bail!("Failed to publish the job");
                }
                print_success(&format!("Published {}", job.id));
            }
            BoardCommand::Edit { job_id, raw, apply } => {
                let mut job = self.find_job(&job_id)?;
                if let Some(raw) = raw {
                    job.title = derive_title(&raw);
                    job.raw = raw;
                }
                if let Some(apply) = apply {
                    job.apply = apply;
                }
                if !self.sync.update_job(&job).await {
                    bail!("Failed to update job {}", job_id);
                }
                print_success(&format!("Updated {}", job_id));
            }
            BoardCommand::Delete { job_id } => {
                if !self.sync.delete_job(&job_id).await {
                    bail!("Failed to delete job {}", job_id);
                }
                print_success(&format!("Deleted {}", job_id));
            }
            BoardCommand::Announce { text } => {
                if !self.sync.set_announcement(&text).await {
                    bail!("Failed to publish the announcement");
                }
                print_success("Announcement published");
            }
            BoardCommand::Announcement => {
                self.board.show_announcement();
            }
            BoardCommand::Status => {
                print_section_header("Status");
                print_key_value("Sync", self.sync.state().as_str());
                print_key_value(
                    "Remote",
                    self.config
                        .remote
                        .as_ref()
                        .map(|remote| remote.project_id.as_str())
                        .unwrap_or("(none)"),
                );
                print_key_value("Writer", self.storage.writer_id());
                print_key_value(
                    "Revision",
                    &self.storage.current_revision()?.to_string(),
                );
                print_key_value(
                    "Open job",
                    self.board.open_job_id().as_deref().unwrap_or("(none)"),
                );
                print_section_footer();
            }
            BoardCommand::Stats => {
                print!("{}", metrics::render_metrics()?);
            }
            BoardCommand::Where => {
                println!("{}", self.storage.path().display());
            }
        }
        Ok(())
    }

    fn find_job(&self, job_id: &str) -> Result<JobRecord> {
        match self.board.find_job(job_id) {
            Some(job) => Ok(job),
            None => bail!("Job {} not found", job_id),
        }
    }
}
