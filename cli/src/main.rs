use std::path::PathBuf;

use clap::{Parser, Subcommand};
use countdown_cli::{commands, watch};
use countdown_core::temporal::parse_reference_instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Render countdown blocks from a markdown document")]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every block once
    Render {
        path: PathBuf,
        /// Render as of this instant (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS]`)
        #[arg(long)]
        at: Option<String>,
    },
    /// Validate every block
    Check {
        path: PathBuf,
        #[arg(long)]
        at: Option<String>,
    },
    /// Render every block live until Ctrl-C
    Watch { path: PathBuf },
    /// Manage the persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Path,
    Reset,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If COUNTDOWN_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("COUNTDOWN_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_at(value: Option<&str>) -> Result<Option<chrono::NaiveDateTime>, String> {
    value
        .map(|v| parse_reference_instant(v).ok_or_else(|| format!("Invalid --at instant: {}", v)))
        .transpose()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Render { path, at } => {
            let settings = commands::load_settings(config)?;
            commands::render(path, parse_at(at.as_deref())?, &settings)
        }
        Commands::Check { path, at } => commands::check(path, parse_at(at.as_deref())?),
        Commands::Watch { path } => {
            let settings = commands::load_settings(config)?;
            let config_path = commands::config_path(config).ok();
            watch::watch(path, config_path.as_deref(), settings).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::show_settings(&commands::load_settings(config)?),
            ConfigAction::Path => {
                println!("{}", commands::config_path(config)?.display());
                Ok(())
            }
            ConfigAction::Reset => commands::reset_settings(config),
        },
    }
}
