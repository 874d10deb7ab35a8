mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use babelrun::workflows::service::BabelService;
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("babelrun v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let app_config = config::build_config(&cli)?;
    let service = BabelService::new(app_config.service.clone());
    debug!("Using obabel executable {:?}", service.executable());

    let command_result = match cli.command {
        Commands::Formats => {
            info!("Dispatching to 'formats' command.");
            commands::query::run_formats(&service).await
        }
        Commands::Forcefields => {
            info!("Dispatching to 'forcefields' command.");
            commands::query::run_forcefields(&service).await
        }
        Commands::Read(args) => {
            info!("Dispatching to 'read' command.");
            commands::read::run(args, &service).await
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::convert::run(args, &app_config.convert, &service).await
        }
        Commands::Optimize(args) => {
            info!("Dispatching to 'optimize' command.");
            commands::optimize::run(args, &app_config.optimize, &service).await
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
