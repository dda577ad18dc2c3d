// MedReport - Discharge Report Lifecycle Service
// Copyright (c) 2025 MedReport Contributors
// Licensed under the MIT License

use medreport::cli::commands::EXIT_FATAL;
use medreport::cli::{Cli, Commands};
use medreport::config::LoggingConfig;
use medreport::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console-only logging for the CLI
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig::default();
    let _guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "MedReport - Discharge Report Lifecycle Service"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Migrate(args) => args.execute(&cli.config).await,
        Commands::Report(command) => command.execute(&cli.config).await,
    }
}
