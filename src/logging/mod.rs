//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - human-readable console output on stderr
//! - optional JSON log files with daily or hourly rotation
//! - event macros shared by the service and the CLI
//!
//! Patient names and full national ids are never logged; use
//! [`crate::domain::NationalId::masked`].
//!
//! # Example
//!
//! ```no_run
//! use medreport::logging::init_logging;
//! use medreport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use medreport::log_error_with_context;
/// use medreport::domain::MedReportError;
///
/// let error = MedReportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry of a store call
///
/// # Example
///
/// ```no_run
/// use medreport::log_retry_attempt;
///
/// log_retry_attempt!("get_report", 2, 3, 200u64, "store call timed out");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Store unavailable, retrying with exponential backoff"
        );
    };
}

/// Log a report mutation
///
/// # Example
///
/// ```no_run
/// use medreport::log_report_event;
/// use medreport::domain::{ReportId, ReportStatus};
///
/// let id = ReportId::new();
/// log_report_event!(id, "Report status changed", from = %ReportStatus::Draft, to = %ReportStatus::InReview);
/// ```
#[macro_export]
macro_rules! log_report_event {
    ($report_id:expr, $message:literal $(, $($fields:tt)+)?) => {
        tracing::info!(
            report_id = %$report_id,
            $($($fields)+,)?
            $message
        );
    };
}
