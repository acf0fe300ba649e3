use anyhow::Result;
use clap::Parser;
use codegen_core::ServiceConfig;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod server;

use cli::commands::{self, Services};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    // Initialize tracing with appropriate verbosity
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = ServiceConfig::load(cli.config.as_deref())?;
    debug!("Resolved configuration: {:?}", config.storage);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let services = Services::from_config(&config)?;

        match cli.command {
            Commands::Serve(args) => {
                info!("Serve command: {:?}", args);
                commands::serve::execute(services, &config.server, args).await
            }
            Commands::Generate(args) => {
                info!("Generate command: language={}", args.language);
                commands::generate::execute(&services, args).await
            }
            Commands::History(args) => {
                info!("History command: {:?}", args);
                commands::history::execute(&services, args).await
            }
            Commands::Stats(args) => {
                info!("Stats command: {:?}", args);
                commands::stats::execute(&services, args).await
            }
        }
    })
}
