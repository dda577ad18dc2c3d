//! Core report lifecycle logic for MedReport.
//!
//! # Modules
//!
//! - [`workflow`] - Status transition table (pure functions)
//! - [`ledger`] - Append-only version ledger and its integrity audit
//! - [`service`] - The report service, the only component that mutates reports
//!
//! # Lifecycle
//!
//! 1. **Create**: a draft with empty content and version 1
//! 2. **Edit**: every save appends version n+1 (drafts only)
//! 3. **Submit**: draft -> in_review, gated on complete content
//! 4. **Finalize**: in_review -> approved -> signed
//!
//! # Example
//!
//! ```rust
//! use medreport::config::MedReportConfig;
//! use medreport::core::service::ReportService;
//! use medreport::domain::{HospitalId, NewReport, ReportStatus, ReportType, Specialty, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ReportService::from_config(&MedReportConfig::in_memory())?;
//!
//! let report = service
//!     .create(NewReport {
//!         hospital_id: HospitalId::new(),
//!         national_id: "1850312400123".to_string(),
//!         first_name: "Ana".to_string(),
//!         last_name: "Popescu".to_string(),
//!         specialty: Specialty::Cardiology,
//!         report_type: ReportType::DischargeSummary,
//!         author_id: UserId::new(),
//!     })
//!     .await?;
//!
//! assert_eq!(report.status, ReportStatus::Draft);
//! assert_eq!(service.list_versions(report.id).await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod service;
pub mod workflow;

pub use ledger::{LedgerAudit, VersionLedger};
pub use service::ReportService;
