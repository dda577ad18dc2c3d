//! Report store factory
//!
//! This module creates the report store selected by configuration.

use crate::adapters::database::traits::ReportStore;
use crate::adapters::memory::InMemoryReportStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, MedReportConfig};
use crate::domain::{MedReportError, Result};
use std::sync::Arc;

/// Create a report store based on the configuration
///
/// Examines `database_target` and builds the matching implementation. The
/// PostgreSQL pool connects lazily, so this does not touch the network.
///
/// # Errors
///
/// Returns a configuration error if the selected backend's section is missing
/// or its connection string cannot be parsed.
pub fn create_report_store(config: &MedReportConfig) -> Result<Arc<dyn ReportStore + Send + Sync>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                MedReportError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL report store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            let adapter = PostgreSQLAdapter::new(client, config.service.max_append_attempts);

            Ok(Arc::new(adapter) as Arc<dyn ReportStore + Send + Sync>)
        }
        DatabaseTarget::Memory => {
            tracing::info!("Creating in-memory report store");
            Ok(Arc::new(InMemoryReportStore::new()) as Arc<dyn ReportStore + Send + Sync>)
        }
    }
}
