use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use docchat::cli::handle_ask_command;
use docchat::cli::handle_config_command;
use docchat::cli::handle_examples_command;
use docchat::cli::handle_serve_api;
use docchat::cli::Cli;
use docchat::cli::Commands;
use docchat::config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Examples need no configuration
    if matches!(cli.command, Commands::Examples) {
        handle_examples_command();
        return Ok(());
    }

    // Load configuration first
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };

    // Initialize logging
    if cli.verbose {
        docchat::logging::init_logging_with_level("debug")?;
    } else {
        docchat::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            handle_serve_api(&config, host, port, cors)
                .await
                .context("API server failed")?;
        }
        Commands::Ask(args) => {
            handle_ask_command(&config, &args)
                .await
                .context("chat turn failed")?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
        Commands::Examples => handle_examples_command(),
    }

    Ok(())
}
