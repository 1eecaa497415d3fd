use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, daemon, history, run};
use media_trend_models::Category;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trendwatch")]
#[command(about = "Trendwatch - subscribe to what's trending before everyone asks for it")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch trending lists and subscribe new items once
    #[command(long_about = "Fetch every enabled category's trend and ranking sources, filter by rating, year and genre, skip anything already in history, and subscribe the rest on the host. Sends one summary notification when something was added.")]
    Run {
        /// Only run this category (movie, series or anime), even if it is disabled
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Run as daemon with internal scheduler
    #[command(long_about = "Run Trendwatch in the foreground on the configured cron schedule. Send SIGUSR1 to trigger a run immediately; the trigger is ignored while a run is in progress.")]
    Daemon {
        /// Cron schedule expression (e.g., '0 10 * * *' for daily at 10:00)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Run once immediately on startup
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_startup_run")]
        run_now: bool,

        /// Skip the startup run even if the config asks for one
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Inspect or edit the subscription history
    History {
        #[command(subcommand)]
        cmd: HistoryCommands,
    },
    /// Manage configuration and credentials
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored history or credentials
    #[command(long_about = "Remove the subscription history file, the stored credentials, or both.")]
    Clear {
        /// Clear history and credentials
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear the subscription history
        #[arg(long, action = ArgAction::SetTrue)]
        history: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recorded subscriptions, newest first
    List {
        /// Show at most this many entries
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Only show this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Forget one entry so it can be subscribed again
    Remove {
        /// History key, e.g. movie:603 or movie:douban:1292052
        key: String,
    },
    /// Forget every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a starter configuration file
    Init {
        /// Base URL of the host media server
        #[arg(long, value_name = "URL")]
        host_url: Option<String>,

        /// Overwrite an existing configuration
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Store a secret in the credentials file
    SetKey {
        /// Which secret to store
        #[arg(value_enum)]
        key: config::SecretKind,

        /// Secret value (prompted without echo when omitted)
        #[arg(long)]
        value: Option<String>,
    },
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::from_label(raw).ok_or_else(|| format!("unknown category '{}', expected movie, series or anime", raw))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Run { category } => {
            logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            run::run_once(category, &output).await
        }
        Commands::Daemon {
            schedule,
            run_now,
            no_startup_run,
        } => {
            let log_file = logging::daemon_log_file();
            logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
                .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            daemon::run_daemon(schedule, run_now, no_startup_run, &output).await
        }
        Commands::History { cmd } => {
            logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            history::run_history(cmd, &output)
        }
        Commands::Config { cmd } => {
            logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            config::run_config(cmd, &output)
        }
        Commands::Clear { all, history, credentials } => {
            logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            clear::run_clear(all, history, credentials, &output)
        }
    }
}
