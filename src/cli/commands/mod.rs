//! CLI command implementations
//!
//! Every command returns a process exit code:
//! 0 success, 1 rejected by the report workflow, 2 configuration error,
//! 4 store connection error, 5 fatal.

pub mod init;
pub mod migrate;
pub mod report;
pub mod validate;

use crate::config::{load_config, MedReportConfig};
use crate::core::service::ReportService;
use crate::domain::MedReportError;

pub const EXIT_OK: i32 = 0;
pub const EXIT_REJECTED: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed service call
pub fn exit_code_for(error: &MedReportError) -> i32 {
    match error {
        MedReportError::NotFound(_)
        | MedReportError::InvalidPatientId(_)
        | MedReportError::EditNotAllowed { .. }
        | MedReportError::InvalidTransition { .. }
        | MedReportError::IncompleteContent(_)
        | MedReportError::ConcurrencyConflict(_) => EXIT_REJECTED,
        MedReportError::StoreUnavailable(_) => EXIT_CONNECTION,
        MedReportError::Configuration(_) => EXIT_CONFIG,
        MedReportError::Serialization(_) | MedReportError::Io(_) => EXIT_FATAL,
    }
}

/// Load the configuration (validated on load), printing the failure if any
pub(crate) fn load_validated(config_path: &str) -> Result<MedReportConfig, i32> {
    load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Build the report service and make sure its store answers
pub(crate) async fn connect(config_path: &str) -> Result<ReportService, i32> {
    let config = load_validated(config_path)?;

    let service = match ReportService::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            println!("❌ Failed to create report store");
            println!("   Error: {e}");
            return Err(EXIT_CONNECTION);
        }
    };

    if let Err(e) = service.test_connection().await {
        println!("❌ Failed to connect to database");
        println!("   Error: {e}");
        return Err(EXIT_CONNECTION);
    }

    tracing::debug!(backend = service.backend_name(), "Report store connected");
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportStatus;
    use test_case::test_case;

    #[test_case(MedReportError::NotFound("report".into()), EXIT_REJECTED)]
    #[test_case(MedReportError::EditNotAllowed { status: ReportStatus::Signed }, EXIT_REJECTED)]
    #[test_case(MedReportError::ConcurrencyConflict("stale".into()), EXIT_REJECTED)]
    #[test_case(MedReportError::StoreUnavailable("down".into()), EXIT_CONNECTION)]
    #[test_case(MedReportError::Configuration("bad".into()), EXIT_CONFIG)]
    #[test_case(MedReportError::Io("disk".into()), EXIT_FATAL)]
    fn test_exit_code_for(error: MedReportError, expected: i32) {
        assert_eq!(exit_code_for(&error), expected);
    }

    #[test]
    fn test_load_validated_missing_file() {
        let code = load_validated("/nonexistent/medreport.toml").unwrap_err();
        assert_eq!(code, EXIT_CONFIG);
    }
}
