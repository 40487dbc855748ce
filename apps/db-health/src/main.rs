//! db-health
//!
//! Connects to MongoDB once, using the `database-connection-string`
//! environment variable, and reports whether the `main` database is reachable.
//! The exit code is zero only when the last check succeeded.

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::ConnectionManager;
use eyre::Result;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

mod report;

use report::OutputFormat;

#[derive(Parser)]
#[command(name = "db-health")]
#[command(about = "Check connectivity to the MongoDB `main` database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the liveness command to the server
    Ping {
        /// Number of pings to send
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,

        /// Delay between pings in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        interval_ms: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show whether the connection was established at startup
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    install_color_eyre();

    let cli = Cli::parse();
    let environment = Environment::from_env();
    init_tracing(&environment);

    // One manager for the whole process; consumers borrow it
    let manager = ConnectionManager::initialize().await;

    let healthy = match cli.command {
        Commands::Ping {
            count,
            interval_ms,
            format,
        } => run_pings(&manager, count, Duration::from_millis(interval_ms), format).await?,
        Commands::Status { format } => {
            println!("{}", report::render_state(&manager, format)?);
            manager.is_ready()
        }
    };

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_pings(
    manager: &ConnectionManager,
    count: u32,
    interval: Duration,
    format: OutputFormat,
) -> Result<bool> {
    let mut healthy = false;

    for attempt in 1..=count {
        let report = manager.ping_detailed().await;
        healthy = report.status.is_healthy();
        println!("{}", report::render_ping(&report, format)?);

        if attempt < count {
            tokio::time::sleep(interval).await;
        }
    }

    info!(count, healthy, "Ping run finished");
    Ok(healthy)
}
