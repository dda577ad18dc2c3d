//! Domain error types
//!
//! One error enum covers the report lifecycle rejections, the two retryable
//! concurrency/persistence failures, and the ambient configuration and I/O
//! failures. Adapters map their third-party errors into it; nothing outside
//! an adapter sees a driver error type.

use crate::domain::content::Violation;
use crate::domain::status::ReportStatus;
use thiserror::Error;

/// Main MedReport error type
#[derive(Debug, Error)]
pub enum MedReportError {
    /// Report or version absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed patient national id
    #[error("Invalid patient id: {0}")]
    InvalidPatientId(String),

    /// Mutation attempted on a report that is not a draft
    #[error("Edit not allowed: report is {status}, only draft reports can be modified")]
    EditNotAllowed { status: ReportStatus },

    /// Status change not permitted by the workflow table
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: ReportStatus, to: ReportStatus },

    /// Leaving draft without satisfying completeness
    #[error("Incomplete content: {}", format_violations(.0))]
    IncompleteContent(Vec<Violation>),

    /// Optimistic-lock mismatch; retry from a fresh read
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Underlying persistence failure or timeout
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl MedReportError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MedReportError::ConcurrencyConflict(_) | MedReportError::StoreUnavailable(_)
        )
    }

    /// Whether this is a persistence failure the service retries with backoff
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, MedReportError::StoreUnavailable(_))
    }

    /// Shorthand for a missing report
    pub fn report_not_found(id: impl std::fmt::Display) -> Self {
        MedReportError::NotFound(format!("report {id}"))
    }

    /// Shorthand for a missing ledger entry
    pub fn version_not_found(id: impl std::fmt::Display, version_number: u32) -> Self {
        MedReportError::NotFound(format!("version {version_number} of report {id}"))
    }
}

fn format_violations(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "content is not complete".to_string();
    }
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// Conversion from std::io::Error
impl From<std::io::Error> for MedReportError {
    fn from(err: std::io::Error) -> Self {
        MedReportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MedReportError {
    fn from(err: serde_json::Error) -> Self {
        MedReportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MedReportError {
    fn from(err: toml::de::Error) -> Self {
        MedReportError::Configuration(format!("TOML parse error: {err}"))
    }
}
