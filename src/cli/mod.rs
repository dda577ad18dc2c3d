//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for MedReport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// MedReport - discharge report lifecycle tool
#[derive(Parser, Debug)]
#[command(name = "medreport")]
#[command(version, about, long_about = None)]
#[command(author = "MedReport Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "medreport.toml", env = "MEDREPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDREPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Create the database schema if missing
    Migrate(commands::migrate::MigrateArgs),

    /// Create, edit and move reports through the workflow
    #[command(subcommand)]
    Report(commands::report::ReportCommand),
}
