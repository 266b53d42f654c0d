//! LeadSignal CLI - command-line front door for the hiring-signal lead
//! discovery pipeline. There is no daemon or RPC server to talk to; every
//! verb here opens the store directly and drives the pipeline in-process.

mod commands;
mod config;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{ExportArgs, ResetArgs, RunArgs, UploadArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leadsignal")]
#[command(about = "Hiring-signal lead discovery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the discovery pipeline once.
    Run {
        /// Score and log candidate companies without writing to the store.
        #[arg(long)]
        dry_run: bool,

        /// Cap on aggregator searches for this run.
        #[arg(long)]
        max_searches: Option<usize>,

        /// Treat this date as "today", for backfills and reruns.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        skip_decision_makers: bool,

        #[arg(long)]
        skip_email_lookup: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print store statistics.
    Status,

    /// Export leads to a CSV file.
    Export {
        /// Destination path.
        path: String,

        /// Include companies that scored below the relevance threshold.
        #[arg(long)]
        all: bool,
    },

    /// Post the current lead set to the configured upload endpoint.
    Upload {
        /// Free-text location tag attached to the upload payload.
        #[arg(long, default_value = "default")]
        location: String,
    },

    /// Clear seen-company markers so the next run reprocesses everything.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadsignal=info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_logging(&config.log_format);

    let exit_code = match cli.command {
        Commands::Run { dry_run, max_searches, date, skip_decision_makers, skip_email_lookup, verbose } => {
            commands::run(&config, RunArgs { dry_run, max_searches, date, skip_decision_makers, skip_email_lookup, verbose }).await?
        }
        Commands::Status => commands::status(&config).await?,
        Commands::Export { path, all } => commands::export(&config, ExportArgs { path, all }).await?,
        Commands::Upload { location } => commands::upload(&config, UploadArgs { location }).await?,
        Commands::Reset { force } => commands::reset(&config, ResetArgs { force }).await?,
    };

    std::process::exit(exit_code);
}
