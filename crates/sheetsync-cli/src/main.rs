use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Keep realtime-database tables in step with Google Sheets"
)]
struct Cli {
    /// Config file (defaults to ~/.config/sheetsync/config.toml)
    #[arg(long, global = true, env = "SHEETSYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every target, then repeat after each interval (default)
    Run,
    /// Run a single pass and exit
    Once {
        /// Print the pass summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the stored watermark of every target
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Authorize Google access and save the token to the secrets file
    Auth {
        /// Print the token instead of saving it
        #[arg(long)]
        print: bool,
    },
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = cli.config.as_deref();
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config),
        Commands::Once { json } => commands::once::run(config, json),
        Commands::Status { json } => commands::status::run(config, json),
        Commands::Auth { print } => commands::auth::run(config, print),
        Commands::Config { action } => commands::config::run(config, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
