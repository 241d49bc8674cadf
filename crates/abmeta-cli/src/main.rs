mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("abmeta CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    configure_thread_pool(cli.threads)?;

    let command_result = match cli.command {
        Commands::Extract(args) => {
            info!("Dispatching to 'extract' command.");
            commands::extract::run(args)
        }
        Commands::Plugins => commands::plugins::run(),
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}

#[cfg(feature = "parallel")]
fn configure_thread_pool(threads: Option<usize>) -> Result<()> {
    if let Some(num_threads) = threads {
        info!("Setting Rayon global thread pool to {} threads.", num_threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                crate::error::CliError::Startup(format!("cannot size the worker pool: {}", e))
            })?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_thread_pool(threads: Option<usize>) -> Result<()> {
    if threads.is_some() {
        tracing::warn!("Built without the 'parallel' feature; --threads is ignored.");
    }
    Ok(())
}
