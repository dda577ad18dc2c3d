//! Configuration management for MedReport.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! MedReport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MEDREPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use medreport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medreport.toml")?;
//!
//! println!("Store: {:?}", config.database_target);
//! println!("Store timeout: {}ms", config.service.store_timeout_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`PostgreSQLConfig`] - Connection pool and statement timeout
//! - [`ServiceConfig`] - Store timeout, listing limits, append attempts
//! - [`RetryConfig`] - Backoff for unavailable-store retries
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [postgresql]
//! connection_string = "${MEDREPORT_PG_URL}"
//!
//! [service.retry]
//! max_retries = 3
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, DatabaseTarget, Environment, LoggingConfig, MedReportConfig,
    PostgreSQLConfig, RetryConfig, ServiceConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
