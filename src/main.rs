use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobboard::board::{BoardView, JobBoard};
use jobboard::config::{AppConfig, CliConfig, FileConfig};
use jobboard::metrics;
use jobboard::sync::{SyncHooks, SyncState};

mod cli_commands;
mod cli_shell;
mod cli_style;
mod terminal_view;

use cli_commands::{BoardCommand, Session};
use cli_style::get_styles;
use terminal_view::TerminalView;

fn parse_path(s: &str) -> Result<PathBuf> {
    let given = PathBuf::from(s);
    if given.is_absolute() {
        return Ok(given);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(given))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles(), name = "jobboard", version = env!("APP_VERSION"))]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding this profile's storage, shared by all its tabs.
    #[clap(long, value_parser = parse_path)]
    pub profile_dir: Option<PathBuf>,

    /// How often to check for changes made by other tabs.
    #[clap(long)]
    pub cross_tab_poll_ms: Option<u64>,

    /// Firestore project to sync with. Without it the board is local-only.
    #[clap(long)]
    pub remote_project_id: Option<String>,

    #[clap(long)]
    pub remote_api_key: Option<String>,

    /// Alternative Firestore endpoint, e.g. the emulator.
    #[clap(long)]
    pub remote_base_url: Option<String>,

    /// Also write view and apply counts to the remote.
    #[clap(long)]
    pub sync_counters: bool,

    /// Runs a single command; without one an interactive tab opens.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Board(BoardCommand),

    /// Keeps the board open and prints every change until interrupted.
    Watch,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            profile_dir: self.profile_dir.clone(),
            cross_tab_poll_ms: self.cross_tab_poll_ms,
            remote_project_id: self.remote_project_id.clone(),
            remote_api_key: self.remote_api_key.clone(),
            remote_base_url: self.remote_base_url.clone(),
            sync_counters: self.sync_counters,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    metrics::init_metrics();

    // Sync and cross-tab tasks keep running on worker threads while the
    // shell blocks on readline
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the tokio runtime")?;
    let _guard = runtime.enter();

    let view: Arc<dyn BoardView> = Arc::new(TerminalView);
    let interactive = !matches!(cli_args.command, Some(Command::Board(_)));
    let hooks = if interactive {
        JobBoard::view_hooks(view.clone())
    } else {
        SyncHooks::new()
    };
    let session = Session::open(config, view, hooks)?;

    if session.config.remote.is_some() {
        let state = runtime.block_on(session.sync.settled());
        if state == SyncState::Failed {
            warn!("Remote sync failed to start, changes stay on this machine");
        }
    }

    match cli_args.command {
        Some(Command::Board(command)) => runtime.block_on(session.execute(command)),
        Some(Command::Watch) => runtime.block_on(async {
            let _cross_tab = session.start_cross_tab();
            session.board.refresh();
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for CTRL-C")?;
            info!("Stopped watching");
            Ok(())
        }),
        None => cli_shell::run(&session, &runtime),
    }
}
