//! netwatchd — the netwatch connectivity watchdog.
//!
//! Probes internet reachability on a fixed interval and, after two
//! consecutive failures, records the outage and cycles the network
//! interface until connectivity returns. Runs until interrupted.
//!
//! # Usage
//!
//! ```text
//! netwatchd                         # monitor with built-in defaults
//! netwatchd run --config netwatch.toml
//! netwatchd status --format json
//! netwatchd config > netwatch.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use netwatch_core::WatchConfig;

mod daemon;
mod logging;
mod report;

#[derive(Parser)]
#[command(
    name = "netwatchd",
    about = "Connectivity watchdog — cycles the network interface on sustained loss",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor connectivity until interrupted (the default).
    Run {
        /// Path to a netwatch.toml overriding the defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the recorded disconnection summary and exit.
    Status {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run { config: None }) {
        Command::Run { config } => {
            let config = WatchConfig::load(config.as_deref())?;
            logging::init(&config.logging)?;
            daemon::run(config).await
        }
        Command::Status { config, format } => {
            logging::init_stderr("warn")?;
            let config = WatchConfig::load(config.as_deref())?;
            report::print_status(&config, format)
        }
        Command::Config { config } => {
            let config = WatchConfig::load(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
