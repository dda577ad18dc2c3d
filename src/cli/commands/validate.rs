//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the MedReport configuration file.

use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use crate::cli::commands::{EXIT_CONFIG, EXIT_OK};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading runs substitution, overrides and validation
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Database Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config.connection_string.expose_secret().redacted_url()
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!(
                        "  Statement Timeout: {}s",
                        pg_config.statement_timeout_seconds
                    );
                }
            }
            DatabaseTarget::Memory => {
                println!("  Database Target: memory (data is lost when the process exits)");
            }
        }

        let service = &config.service;
        println!("  Store Timeout: {}ms", service.store_timeout_ms);
        println!(
            "  List Limits: default {}, max {}",
            service.list_default_limit, service.list_max_limit
        );
        println!("  Append Attempts: {}", service.max_append_attempts);
        println!(
            "  Retries: {} (initial {}ms, max {}ms, x{})",
            service.retry.max_retries,
            service.retry.initial_delay_ms,
            service.retry.max_delay_ms,
            service.retry.backoff_multiplier
        );
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_memory_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_validate_missing_postgresql_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"postgresql\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
