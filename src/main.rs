use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playlog::{cli, config, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize and store new recently played tracks
    Sync(RunArgs),

    /// Authorize only and write the token file
    Auth(RunArgs),

    /// Show the newest stored plays
    History(HistoryOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Credentials JSON file (client_id, client_secret, database_url)
    #[clap(long)]
    credentials: Option<PathBuf>,

    /// Directory with index.html and error.html for the callback pages
    #[clap(long)]
    templates: Option<PathBuf>,

    /// Where to write the token file
    #[clap(long)]
    token_file: Option<PathBuf>,

    /// Seconds to wait for the browser redirect (0 waits forever)
    #[clap(long, default_value_t = 300)]
    timeout: u64,

    /// Print the authorization URL instead of opening a browser
    #[clap(long)]
    no_browser: bool,

    /// Do not keep a copy of the fetched feed page (sync only)
    #[clap(long)]
    no_archive: bool,
}

impl From<RunArgs> for cli::RunOptions {
    fn from(args: RunArgs) -> Self {
        cli::RunOptions {
            credentials: args.credentials,
            templates: args.templates,
            token_file: args.token_file,
            timeout_secs: args.timeout,
            no_browser: args.no_browser,
            no_archive: args.no_archive,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct HistoryOptions {
    /// Credentials JSON file (client_id, client_secret, database_url)
    #[clap(long)]
    credentials: Option<PathBuf>,

    /// Number of rows to show
    #[clap(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Sync(args) => cli::sync(&cli::RunOptions::from(args)).await,
        Command::Auth(args) => cli::auth(&cli::RunOptions::from(args)).await,
        Command::History(opt) => cli::history(opt.credentials, opt.limit).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
