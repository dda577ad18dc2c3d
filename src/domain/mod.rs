//! Domain models and types for MedReport.
//!
//! The domain layer holds everything that does not touch I/O:
//! - **Strongly-typed identifiers** ([`ReportId`], [`UserId`], [`NationalId`], ...)
//! - **The report aggregate** ([`Report`]) and its workflow [`ReportStatus`]
//! - **Ledger entries** ([`ReportVersion`], [`PendingVersion`])
//! - **Clinical content** ([`ReportContent`]) with per-section validation
//! - **Error types** ([`MedReportError`]) and the [`Result`] alias
//!
//! # Completeness
//!
//! ```rust
//! use medreport::domain::ReportContent;
//!
//! let content = ReportContent::default();
//! let outcome = content.validate();
//! assert!(!outcome.is_valid());
//! assert!(!content.is_complete());
//! ```

pub mod content;
pub mod errors;
pub mod ids;
pub mod report;
pub mod result;
pub mod status;
pub mod version;

// Re-export commonly used types for convenience
pub use content::{
    AnamnesisSection, DiagnosisCode, DiagnosisSection, ExaminationSection, LabResultsSection,
    PatientDataSection, RecommendationsSection, ReportContent, Section, SectionKind,
    TreatmentSection, ValidationOutcome, Violation,
};
pub use errors::MedReportError;
pub use ids::{HospitalId, NationalId, ReportId, UserId, VersionId};
pub use report::{NewReport, PatientIdentity, Report, ReportFilter, ReportType, Specialty};
pub use result::Result;
pub use status::ReportStatus;
pub use version::{PendingVersion, ReportVersion};
