use crate::cli_commands::{BoardCommand, Session};
use crate::cli_style::{
    get_prompt, get_styles, print_command_echo, print_error, print_goodbye, print_help,
    print_warning, print_welcome, CommandHelp,
};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};
use tokio::runtime::Runtime;

#[derive(Parser)]
#[command(styles=get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    #[command(flatten)]
    Board(BoardCommand),

    /// Closes the open job.
    Close,

    /// Shows this help.
    Help,

    /// Close this tab.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn command_help() -> Vec<CommandHelp> {
    InnerCli::command()
        .get_subcommands()
        .map(|sc| CommandHelp {
            name: sc.get_name().to_string(),
            description: sc.get_about().map(|a| a.to_string()).unwrap_or_default(),
        })
        .collect()
}

fn execute_command(line: String, session: &Session, runtime: &Runtime) -> CommandExecutionResult {
    if line.trim().is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            print_command_echo(&line);
            match cli.command {
                InnerCommand::Board(command) => {
                    if let Err(err) = runtime.block_on(session.execute(command)) {
                        return CommandExecutionResult::Error(format!("{:#}", err));
                    }
                }
                InnerCommand::Close => session.board.close_detail(),
                InnerCommand::Help => print_help(&command_help()),
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct ShellHelper {
    commands_names: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        ShellHelper { commands_names }
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}

/// Run the interactive shell as one live tab until the user exits.
pub fn run(session: &Session, runtime: &Runtime) -> Result<()> {
    let _cross_tab = session.start_cross_tab();

    print_welcome(
        &session.storage.path().display().to_string(),
        session.sync.state().as_str(),
    );
    session.board.refresh();

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<ShellHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(ShellHelper::new()));

    let prompt = get_prompt();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, session, runtime) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => print_error(&err),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                print_warning("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                print_error(&format!("{:?}", e));
                break;
            }
        }
    }
    print_goodbye();
    Ok(())
}
