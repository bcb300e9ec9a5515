// ABOUTME: CLI entry point for event-reconciler
// ABOUTME: Parses commands and routes to the reconciliation pipeline

use clap::{Parser, Subcommand};
use event_reconciler::{commands, Config};

#[derive(Parser)]
#[command(name = "event-reconciler")]
#[command(about = "CRM-to-warehouse contract event reconciliation job", long_about = None)]
#[command(version)]
struct Cli {
    /// Set the log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full reconciliation pipeline and upload the mismatch file
    Run,
    /// Validate environment configuration without contacting any source
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // 1. RUST_LOG environment variable has highest precedence
    // 2. --log flag is used if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run => {
            let config = Config::from_env()?;
            commands::run(config).await?;
            Ok(())
        }
        Commands::Check => {
            let config = Config::from_env()?;
            commands::check(&config)
        }
    }
}
