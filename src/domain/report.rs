//! Report aggregate
//!
//! A report binds identity, hospital and patient references, classification,
//! the workflow status, and the materialized current content (always equal to
//! the content of its highest-numbered ledger entry).

use super::content::ReportContent;
use super::ids::{HospitalId, NationalId, ReportId, UserId};
use super::status::ReportStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Medical specialty of the authoring ward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    InternalMedicine,
    Cardiology,
    Neurology,
    Pediatrics,
    Surgery,
}

impl Specialty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::InternalMedicine => "internal_medicine",
            Specialty::Cardiology => "cardiology",
            Specialty::Neurology => "neurology",
            Specialty::Pediatrics => "pediatrics",
            Specialty::Surgery => "surgery",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "internal_medicine" => Ok(Specialty::InternalMedicine),
            "cardiology" => Ok(Specialty::Cardiology),
            "neurology" => Ok(Specialty::Neurology),
            "pediatrics" => Ok(Specialty::Pediatrics),
            "surgery" => Ok(Specialty::Surgery),
            other => Err(format!(
                "Invalid specialty '{other}'. Must be one of: internal_medicine, cardiology, neurology, pediatrics, surgery"
            )),
        }
    }
}

/// Kind of clinical document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    DischargeSummary,
    TransferSummary,
    OperativeNote,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::DischargeSummary => "discharge_summary",
            ReportType::TransferSummary => "transfer_summary",
            ReportType::OperativeNote => "operative_note",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "discharge_summary" => Ok(ReportType::DischargeSummary),
            "transfer_summary" => Ok(ReportType::TransferSummary),
            "operative_note" => Ok(ReportType::OperativeNote),
            other => Err(format!(
                "Invalid report type '{other}'. Must be one of: discharge_summary, transfer_summary, operative_note"
            )),
        }
    }
}

/// Patient identifiers carried on the report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub national_id: NationalId,
    pub first_name: String,
    pub last_name: String,
}

/// Discharge report aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub hospital_id: HospitalId,
    pub created_by: UserId,
    pub patient: PatientIdentity,
    pub specialty: Specialty,
    pub report_type: ReportType,
    pub status: ReportStatus,

    /// Materialized content of the highest-numbered version
    pub content: ReportContent,

    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,

    /// Set iff status is approved or signed
    pub finalized_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency token; bumped by every write to the report
    pub revision: u64,
}

impl Report {
    /// Builds a fresh draft with empty content at revision 1
    pub fn new_draft(request: NewReport, national_id: NationalId, now: DateTime<Utc>) -> Self {
        Self {
            id: ReportId::new(),
            hospital_id: request.hospital_id,
            created_by: request.author_id,
            patient: PatientIdentity {
                national_id,
                first_name: request.first_name,
                last_name: request.last_name,
            },
            specialty: request.specialty,
            report_type: request.report_type,
            status: ReportStatus::Draft,
            content: ReportContent::default(),
            created_at: now,
            last_modified: now,
            finalized_at: None,
            revision: 1,
        }
    }

    /// Applies a status change and its side effects on timestamps
    ///
    /// Legality is not checked here; see [`crate::core::workflow`].
    pub fn apply_status(&mut self, target: ReportStatus, now: DateTime<Utc>) {
        self.status = target;
        self.last_modified = now;
        if target.is_finalized() {
            if self.finalized_at.is_none() {
                self.finalized_at = Some(now);
            }
        } else {
            self.finalized_at = None;
        }
    }
}

/// Input to report creation
#[derive(Debug, Clone)]
pub struct NewReport {
    pub hospital_id: HospitalId,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Specialty,
    pub report_type: ReportType,
    pub author_id: UserId,
}

/// Listing filter for a clinician's reports
#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub created_by: UserId,
    pub status: Option<ReportStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl ReportFilter {
    pub fn for_author(created_by: UserId) -> Self {
        Self {
            created_by,
            status: None,
            limit: 0,
            offset: 0,
        }
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}
