//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::commands::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "medreport.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing MedReport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set MEDREPORT_PG_URL in the environment or a .env file");
                println!("  3. Validate configuration: medreport validate-config");
                println!("  4. Create the schema: medreport migrate");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Sample configuration with every option at its default
    pub fn sample_config() -> &'static str {
        r#"# MedReport Configuration File
# Discharge report lifecycle service

# Store backend: postgresql | memory (memory is not allowed in production)
database_target = "postgresql"

# development | staging | production
environment = "development"

[application]
# trace, debug, info, warn, error
log_level = "info"

[postgresql]
# Secrets come from the environment; ${VAR} placeholders are substituted on load
connection_string = "${MEDREPORT_PG_URL}"
max_connections = 10
connection_timeout_seconds = 30
statement_timeout_seconds = 60

[service]
# Upper bound for a single store call
store_timeout_ms = 5000
list_default_limit = 20
list_max_limit = 100
# Attempts at claiming the next version number under contention
max_append_attempts = 5

[service.retry]
# Retries when the store is unavailable; conflicts are never retried
max_retries = 3
initial_delay_ms = 100
max_delay_ms = 2000
backoff_multiplier = 2.0

[logging]
local_enabled = false
local_path = "/var/log/medreport"
# daily | hourly
local_rotation = "daily"
"#
    }
}
