//! Migrate command implementation
//!
//! Creates the report tables and indexes on the configured store. Safe to
//! run repeatedly.

use crate::cli::commands::{connect, exit_code_for, EXIT_OK};
use clap::Args;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Running schema migration");

        println!("🗄️  Migrating report schema");
        println!();

        let service = match connect(config_path).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        match service.ensure_schema().await {
            Ok(()) => {
                println!("✅ Schema is up to date ({})", service.backend_name());
                Ok(EXIT_OK)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Schema migration failed");
                println!("❌ Schema migration failed");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::EXIT_CONFIG;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_migrate_memory_store() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"").unwrap();

        let code = MigrateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_migrate_without_config() {
        let code = MigrateArgs {}
            .execute("/nonexistent/medreport.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
