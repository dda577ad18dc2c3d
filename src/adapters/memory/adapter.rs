//! In-memory report store
//!
//! Reports and their ledgers live in one map behind a `tokio::sync::RwLock`.
//! Every write takes the write lock for its whole read-check-write sequence,
//! which is what makes `append_version` and the conditional writes atomic.

use crate::adapters::database::traits::{AppendOutcome, ReportStore};
use crate::domain::ids::ReportId;
use crate::domain::report::{Report, ReportFilter};
use crate::domain::version::{PendingVersion, ReportVersion};
use crate::domain::{MedReportError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ReportRecord {
    report: Report,

    /// Ordered by version number, oldest first
    versions: Vec<ReportVersion>,
}

/// Report store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    records: RwLock<HashMap<ReportId, ReportRecord>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn check_revision(report: &Report, expected_revision: u64) -> Result<()> {
    if report.revision != expected_revision {
        return Err(MedReportError::ConcurrencyConflict(format!(
            "report {} is at revision {}, expected {}",
            report.id, report.revision, expected_revision
        )));
    }
    Ok(())
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_report(&self, report: &Report, initial: &ReportVersion) -> Result<()> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.get(&report.id) {
            // A retried insert whose first attempt already landed
            if existing.versions.first().map(|v| v.id) == Some(initial.id) {
                return Ok(());
            }
            return Err(MedReportError::ConcurrencyConflict(format!(
                "report {} already exists",
                report.id
            )));
        }

        records.insert(
            report.id,
            ReportRecord {
                report: report.clone(),
                versions: vec![initial.clone()],
            },
        );
        Ok(())
    }

    async fn get_report(&self, id: ReportId) -> Result<Report> {
        let records = self.records.read().await;
        records
            .get(&id)
            .map(|record| record.report.clone())
            .ok_or_else(|| MedReportError::report_not_found(id))
    }

    async fn update_status(&self, report: &Report, expected_revision: u64) -> Result<Report> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&report.id)
            .ok_or_else(|| MedReportError::report_not_found(report.id))?;
        check_revision(&record.report, expected_revision)?;

        let stored = &mut record.report;
        stored.status = report.status;
        stored.last_modified = report.last_modified;
        stored.finalized_at = report.finalized_at;
        stored.revision = expected_revision + 1;
        Ok(stored.clone())
    }

    async fn append_version(
        &self,
        report_id: ReportId,
        pending: PendingVersion,
        expected_revision: Option<u64>,
    ) -> Result<AppendOutcome> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&report_id)
            .ok_or_else(|| MedReportError::report_not_found(report_id))?;
        if let Some(expected) = expected_revision {
            check_revision(&record.report, expected)?;
        }

        let next = record
            .versions
            .last()
            .map(|v| v.version_number + 1)
            .unwrap_or(1);
        let version = pending.into_version(report_id, next)?;

        let report = &mut record.report;
        report.content = version.content.clone();
        report.last_modified = report.last_modified.max(version.saved_at);
        report.revision += 1;
        let report = report.clone();

        record.versions.push(version.clone());
        Ok(AppendOutcome { report, version })
    }

    async fn delete_report(&self, id: ReportId, expected_revision: u64) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get(&id)
            .ok_or_else(|| MedReportError::report_not_found(id))?;
        check_revision(&record.report, expected_revision)?;
        records.remove(&id);
        Ok(())
    }

    async fn list_versions(&self, report_id: ReportId) -> Result<Vec<ReportVersion>> {
        let records = self.records.read().await;
        Ok(records
            .get(&report_id)
            .map(|record| record.versions.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_version(
        &self,
        report_id: ReportId,
        version_number: u32,
    ) -> Result<ReportVersion> {
        let records = self.records.read().await;
        records
            .get(&report_id)
            .and_then(|record| {
                record
                    .versions
                    .iter()
                    .find(|v| v.version_number == version_number)
                    .cloned()
            })
            .ok_or_else(|| MedReportError::version_not_found(report_id, version_number))
    }

    async fn latest_version(&self, report_id: ReportId) -> Result<ReportVersion> {
        let records = self.records.read().await;
        records
            .get(&report_id)
            .and_then(|record| record.versions.last().cloned())
            .ok_or_else(|| {
                MedReportError::NotFound(format!("no versions for report {report_id}"))
            })
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let records = self.records.read().await;
        let mut reports: Vec<Report> = records
            .values()
            .map(|record| &record.report)
            .filter(|r| r.created_by == filter.created_by)
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();

        reports.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(reports
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::ReportContent;
    use crate::domain::ids::{HospitalId, NationalId, UserId};
    use crate::domain::report::{NewReport, ReportType, Specialty};
    use crate::domain::status::ReportStatus;
    use crate::domain::version::INITIAL_VERSION_COMMENT;
    use chrono::Utc;

    async fn seeded(store: &InMemoryReportStore, author: UserId) -> Report {
        let request = NewReport {
            hospital_id: HospitalId::new(),
            national_id: "1850312400123".into(),
            first_name: "Ana".into(),
            last_name: "Popescu".into(),
            specialty: Specialty::Cardiology,
            report_type: ReportType::DischargeSummary,
            author_id: author,
        };
        let national_id = NationalId::new(request.national_id.clone()).unwrap();
        let report = Report::new_draft(request, national_id, Utc::now());
        let initial = PendingVersion::new(ReportContent::default(), author, INITIAL_VERSION_COMMENT)
            .saved_at(report.created_at)
            .into_version(report.id, 1)
            .unwrap();
        store.insert_report(&report, &initial).await.unwrap();
        report
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryReportStore::new();
        let report = seeded(&store, UserId::new()).await;

        let loaded = store.get_report(report.id).await.unwrap();
        assert_eq!(loaded, report);
        assert_eq!(store.latest_version(report.id).await.unwrap().version_number, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_report() {
        let store = InMemoryReportStore::new();
        let err = store.get_report(ReportId::new()).await.unwrap_err();
        assert!(matches!(err, MedReportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_append_advances_report() {
        let store = InMemoryReportStore::new();
        let author = UserId::new();
        let report = seeded(&store, author).await;

        let mut content = ReportContent::default();
        content.anamnesis.chief_complaint = "Dyspnea".into();
        let outcome = store
            .append_version(
                report.id,
                PendingVersion::new(content.clone(), author, "Auto-save"),
                Some(report.revision),
            )
            .await
            .unwrap();

        assert_eq!(outcome.version.version_number, 2);
        assert_eq!(outcome.report.content, content);
        assert_eq!(outcome.report.revision, report.revision + 1);
        assert_eq!(outcome.report.last_modified, outcome.version.saved_at);

        let numbers: Vec<u32> = store
            .list_versions(report.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_repeated_insert_is_idempotent() {
        let store = InMemoryReportStore::new();
        let author = UserId::new();
        let report = seeded(&store, author).await;
        let initial = store.get_version(report.id, 1).await.unwrap();

        store.insert_report(&report, &initial).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.list_versions(report.id).await.unwrap().len(), 1);

        // Same id, different initial version
        let other = PendingVersion::new(ReportContent::default(), author, INITIAL_VERSION_COMMENT)
            .into_version(report.id, 1)
            .unwrap();
        let err = store.insert_report(&report, &other).await.unwrap_err();
        assert!(matches!(err, MedReportError::ConcurrencyConflict(_)));
    }

    #[tokio::test]
    async fn test_late_append_keeps_last_modified() {
        let store = InMemoryReportStore::new();
        let author = UserId::new();
        let report = seeded(&store, author).await;

        let outcome = store
            .append_version(
                report.id,
                PendingVersion::new(ReportContent::default(), author, "Imported")
                    .saved_at(report.last_modified - chrono::Duration::minutes(10)),
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.report.last_modified, report.last_modified);
        assert_eq!(outcome.report.revision, report.revision + 1);
    }

    #[tokio::test]
    async fn test_stale_revision_conflicts() {
        let store = InMemoryReportStore::new();
        let author = UserId::new();
        let report = seeded(&store, author).await;

        store
            .append_version(
                report.id,
                PendingVersion::new(ReportContent::default(), author, "Auto-save"),
                Some(report.revision),
            )
            .await
            .unwrap();

        let err = store
            .append_version(
                report.id,
                PendingVersion::new(ReportContent::default(), author, "Auto-save"),
                Some(report.revision),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MedReportError::ConcurrencyConflict(_)));

        let mut stale = report.clone();
        stale.apply_status(ReportStatus::Cancelled, Utc::now());
        let err = store.update_status(&stale, report.revision).await.unwrap_err();
        assert!(matches!(err, MedReportError::ConcurrencyConflict(_)));

        // the failed writes left the ledger alone
        assert_eq!(store.list_versions(report.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_versions() {
        let store = InMemoryReportStore::new();
        let report = seeded(&store, UserId::new()).await;

        store.delete_report(report.id, report.revision).await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.list_versions(report.id).await.unwrap().is_empty());
        assert!(matches!(
            store.get_version(report.id, 1).await.unwrap_err(),
            MedReportError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_reports_filters_and_pages() {
        let store = InMemoryReportStore::new();
        let author = UserId::new();
        let first = seeded(&store, author).await;
        let second = seeded(&store, author).await;
        seeded(&store, UserId::new()).await;

        // touch the first report so it sorts ahead
        store
            .append_version(
                first.id,
                PendingVersion::new(ReportContent::default(), author, "Auto-save")
                    .saved_at(Utc::now() + chrono::Duration::seconds(5)),
                None,
            )
            .await
            .unwrap();

        let all = store
            .list_reports(&ReportFilter::for_author(author).page(10, 0))
            .await
            .unwrap();
        assert_eq!(
            all.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let paged = store
            .list_reports(&ReportFilter::for_author(author).page(1, 1))
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].id, second.id);

        let signed = store
            .list_reports(
                &ReportFilter::for_author(author)
                    .with_status(ReportStatus::Signed)
                    .page(10, 0),
            )
            .await
            .unwrap();
        assert!(signed.is_empty());
    }
}
