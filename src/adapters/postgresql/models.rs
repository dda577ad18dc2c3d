//! PostgreSQL row models
//!
//! These map to the `reports` and `report_versions` tables. Enumerations are
//! stored as their snake_case names and content as JSONB.

use crate::domain::content::ReportContent;
use crate::domain::ids::{HospitalId, NationalId, ReportId, UserId, VersionId};
use crate::domain::report::{PatientIdentity, Report, ReportType, Specialty};
use crate::domain::status::ReportStatus;
use crate::domain::version::ReportVersion;
use crate::domain::{MedReportError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;

/// Row of the `reports` table joined with the latest version's content
#[derive(Debug, Clone)]
pub struct PostgreSQLReport {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub patient_national_id: String,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub specialty: String,
    pub report_type: String,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub revision: i64,

    /// Content of the highest-numbered version; absent only mid-creation
    pub content: Option<Value>,
}

impl PostgreSQLReport {
    /// Convert from the domain aggregate
    pub fn from_domain(report: &Report) -> Result<Self> {
        Ok(Self {
            id: *report.id.as_uuid(),
            hospital_id: *report.hospital_id.as_uuid(),
            patient_national_id: report.patient.national_id.as_str().to_string(),
            patient_first_name: report.patient.first_name.clone(),
            patient_last_name: report.patient.last_name.clone(),
            specialty: report.specialty.as_str().to_string(),
            report_type: report.report_type.as_str().to_string(),
            status: report.status.as_str().to_string(),
            created_by: *report.created_by.as_uuid(),
            created_at: report.created_at,
            last_modified: report.last_modified,
            finalized_at: report.finalized_at,
            revision: revision_to_sql(report.revision)?,
            content: Some(serde_json::to_value(&report.content)?),
        })
    }

    /// Read a row selected with the report columns plus `content`
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: get(row, "id")?,
            hospital_id: get(row, "hospital_id")?,
            patient_national_id: get(row, "patient_national_id")?,
            patient_first_name: get(row, "patient_first_name")?,
            patient_last_name: get(row, "patient_last_name")?,
            specialty: get(row, "specialty")?,
            report_type: get(row, "report_type")?,
            status: get(row, "status")?,
            created_by: get(row, "created_by")?,
            created_at: get(row, "created_at")?,
            last_modified: get(row, "last_modified")?,
            finalized_at: get(row, "finalized_at")?,
            revision: get(row, "revision")?,
            content: get(row, "content")?,
        })
    }

    /// Convert to the domain aggregate
    pub fn to_domain(self) -> Result<Report> {
        let national_id =
            NationalId::new(self.patient_national_id).map_err(MedReportError::InvalidPatientId)?;
        let content = match self.content {
            Some(value) => serde_json::from_value(value)?,
            None => ReportContent::default(),
        };

        Ok(Report {
            id: ReportId::from_uuid(self.id),
            hospital_id: HospitalId::from_uuid(self.hospital_id),
            created_by: UserId::from_uuid(self.created_by),
            patient: PatientIdentity {
                national_id,
                first_name: self.patient_first_name,
                last_name: self.patient_last_name,
            },
            specialty: self
                .specialty
                .parse::<Specialty>()
                .map_err(MedReportError::Serialization)?,
            report_type: self
                .report_type
                .parse::<ReportType>()
                .map_err(MedReportError::Serialization)?,
            status: self
                .status
                .parse::<ReportStatus>()
                .map_err(MedReportError::Serialization)?,
            content,
            created_at: self.created_at,
            last_modified: self.last_modified,
            finalized_at: self.finalized_at,
            revision: revision_from_sql(self.revision)?,
        })
    }
}

/// Row of the `report_versions` table
#[derive(Debug, Clone)]
pub struct PostgreSQLVersion {
    pub id: Uuid,
    pub report_id: Uuid,
    pub version_number: i32,
    pub content: Value,
    pub saved_at: DateTime<Utc>,
    pub saved_by: Uuid,
    pub comment: String,
    pub content_sha256: String,
}

impl PostgreSQLVersion {
    /// Convert from a domain ledger entry
    pub fn from_domain(version: &ReportVersion) -> Result<Self> {
        let version_number = i32::try_from(version.version_number).map_err(|_| {
            MedReportError::Serialization(format!(
                "version number {} out of range",
                version.version_number
            ))
        })?;

        Ok(Self {
            id: *version.id.as_uuid(),
            report_id: *version.report_id.as_uuid(),
            version_number,
            content: serde_json::to_value(&version.content)?,
            saved_at: version.saved_at,
            saved_by: *version.saved_by.as_uuid(),
            comment: version.comment.clone(),
            content_sha256: version.content_sha256.clone(),
        })
    }

    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: get(row, "id")?,
            report_id: get(row, "report_id")?,
            version_number: get(row, "version_number")?,
            content: get(row, "content")?,
            saved_at: get(row, "saved_at")?,
            saved_by: get(row, "saved_by")?,
            comment: get(row, "comment")?,
            content_sha256: get(row, "content_sha256")?,
        })
    }

    pub fn to_domain(self) -> Result<ReportVersion> {
        let version_number = u32::try_from(self.version_number).map_err(|_| {
            MedReportError::Serialization(format!(
                "stored version number {} is negative",
                self.version_number
            ))
        })?;

        Ok(ReportVersion {
            id: VersionId::from_uuid(self.id),
            report_id: ReportId::from_uuid(self.report_id),
            version_number,
            content: serde_json::from_value(self.content)?,
            saved_at: self.saved_at,
            saved_by: UserId::from_uuid(self.saved_by),
            comment: self.comment,
            content_sha256: self.content_sha256,
        })
    }
}

pub(crate) fn revision_to_sql(revision: u64) -> Result<i64> {
    i64::try_from(revision)
        .map_err(|_| MedReportError::Serialization(format!("revision {revision} out of range")))
}

fn revision_from_sql(revision: i64) -> Result<u64> {
    u64::try_from(revision).map_err(|_| {
        MedReportError::Serialization(format!("stored revision {revision} is negative"))
    })
}

fn get<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column).map_err(|e| {
        MedReportError::StoreUnavailable(format!("Failed to read column '{column}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::DiagnosisCode;
    use crate::domain::report::NewReport;
    use crate::domain::version::PendingVersion;

    fn sample_report() -> Report {
        let request = NewReport {
            hospital_id: HospitalId::new(),
            national_id: "1850312400123".into(),
            first_name: "Ana".into(),
            last_name: "Popescu".into(),
            specialty: Specialty::Neurology,
            report_type: ReportType::TransferSummary,
            author_id: UserId::new(),
        };
        let national_id = NationalId::new(request.national_id.clone()).unwrap();
        let mut report = Report::new_draft(request, national_id, Utc::now());
        report.content.diagnosis.primary_diagnosis = DiagnosisCode::new("J18.1", "Lobar pneumonia");
        report
    }

    #[test]
    fn test_report_row_conversion() {
        let report = sample_report();
        let row = PostgreSQLReport::from_domain(&report).unwrap();
        assert_eq!(row.status, "draft");
        assert_eq!(row.specialty, "neurology");
        assert_eq!(row.report_type, "transfer_summary");
        assert_eq!(row.revision, 1);

        let back = row.to_domain().unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_report_row_without_content_defaults() {
        let report = sample_report();
        let mut row = PostgreSQLReport::from_domain(&report).unwrap();
        row.content = None;
        let back = row.to_domain().unwrap();
        assert_eq!(back.content, ReportContent::default());
    }

    #[test]
    fn test_report_row_rejects_unknown_status() {
        let mut row = PostgreSQLReport::from_domain(&sample_report()).unwrap();
        row.status = "archived".into();
        assert!(matches!(
            row.to_domain().unwrap_err(),
            MedReportError::Serialization(_)
        ));
    }

    #[test]
    fn test_version_row_conversion_keeps_checksum_valid() {
        let report = sample_report();
        let version = PendingVersion::new(report.content.clone(), report.created_by, "Auto-save")
            .into_version(report.id, 4)
            .unwrap();

        let row = PostgreSQLVersion::from_domain(&version).unwrap();
        assert_eq!(row.version_number, 4);

        let back = row.to_domain().unwrap();
        assert_eq!(back, version);
        assert!(back.verify_checksum().unwrap());
    }

    #[test]
    fn test_negative_version_number_rejected() {
        let report = sample_report();
        let version = PendingVersion::new(ReportContent::default(), report.created_by, "x")
            .into_version(report.id, 1)
            .unwrap();
        let mut row = PostgreSQLVersion::from_domain(&version).unwrap();
        row.version_number = -1;
        assert!(row.to_domain().is_err());
    }
}
