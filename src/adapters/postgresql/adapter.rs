//! PostgreSQL adapter implementing the report store trait
//!
//! The materialized content of a report is not a column: it is read from the
//! highest-numbered `report_versions` row with a lateral join, so the two can
//! never disagree. Appends lock the report row for the whole transaction and
//! rely on `UNIQUE (report_id, version_number)` as the last line against
//! duplicate numbers.

use crate::adapters::database::traits::{AppendOutcome, ReportStore};
use crate::adapters::postgresql::client::{is_unique_violation, map_db_error, PostgreSQLClient};
use crate::adapters::postgresql::models::{revision_to_sql, PostgreSQLReport, PostgreSQLVersion};
use crate::domain::ids::ReportId;
use crate::domain::report::{Report, ReportFilter};
use crate::domain::version::{PendingVersion, ReportVersion};
use crate::domain::{MedReportError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const SELECT_REPORT: &str = r#"
    SELECT
        r.id, r.hospital_id, r.patient_national_id, r.patient_first_name,
        r.patient_last_name, r.specialty, r.report_type, r.status, r.created_by,
        r.created_at, r.last_modified, r.finalized_at, r.revision, v.content
    FROM reports r
    LEFT JOIN LATERAL (
        SELECT content
        FROM report_versions
        WHERE report_id = r.id
        ORDER BY version_number DESC
        LIMIT 1
    ) v ON true
"#;

const SELECT_VERSION: &str = r#"
    SELECT id, report_id, version_number, content, saved_at, saved_by, comment, content_sha256
    FROM report_versions
"#;

const INSERT_VERSION: &str = r#"
    INSERT INTO report_versions (
        id, report_id, version_number, content, saved_at, saved_by, comment, content_sha256
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// PostgreSQL implementation of [`ReportStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,

    /// Attempts at claiming a version number before giving up
    max_append_attempts: usize,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient, max_append_attempts: usize) -> Self {
        Self {
            client: Arc::new(client),
            max_append_attempts: max_append_attempts.max(1),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    /// Distinguish a vanished report from a stale revision after a conditional write hit no rows
    async fn conflict_or_missing(&self, id: ReportId, expected_revision: u64) -> MedReportError {
        let query = "SELECT revision FROM reports WHERE id = $1";
        match self.client.query_opt(query, &[id.as_uuid()]).await {
            Ok(Some(row)) => {
                let current: i64 = row.get(0);
                MedReportError::ConcurrencyConflict(format!(
                    "report {id} is at revision {current}, expected {expected_revision}"
                ))
            }
            Ok(None) => MedReportError::report_not_found(id),
            Err(e) => e,
        }
    }

    /// Accept a duplicate insert only when it is our own earlier attempt
    ///
    /// A retried insert whose first commit landed finds the report already
    /// there. It is ours if version 1 carries the id we generated.
    async fn confirm_inserted(&self, id: ReportId, initial: &ReportVersion) -> Result<()> {
        let query = "SELECT 1 FROM report_versions WHERE report_id = $1 AND id = $2";
        let ours = self
            .client
            .query_opt(query, &[id.as_uuid(), initial.id.as_uuid()])
            .await?
            .is_some();

        if ours {
            tracing::debug!(report_id = %id, "Report insert already committed");
            Ok(())
        } else {
            Err(MedReportError::ConcurrencyConflict(format!(
                "report {id} already exists"
            )))
        }
    }

    /// One append attempt; `Ok(None)` means the version number was taken
    async fn try_append(
        &self,
        report_id: ReportId,
        pending: PendingVersion,
        expected_revision: Option<u64>,
    ) -> Result<Option<AppendOutcome>> {
        let id: &Uuid = report_id.as_uuid();
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;

        let row = tx
            .query_opt("SELECT revision FROM reports WHERE id = $1 FOR UPDATE", &[id])
            .await
            .map_err(|e| map_db_error("Failed to lock report", e))?
            .ok_or_else(|| MedReportError::report_not_found(report_id))?;
        let current: i64 = row.get(0);

        if let Some(expected) = expected_revision {
            if current != revision_to_sql(expected)? {
                return Err(MedReportError::ConcurrencyConflict(format!(
                    "report {report_id} is at revision {current}, expected {expected}"
                )));
            }
        }

        let next: i32 = tx
            .query_one(
                "SELECT COALESCE(MAX(version_number), 0) + 1 FROM report_versions WHERE report_id = $1",
                &[id],
            )
            .await
            .map_err(|e| map_db_error("Failed to compute next version number", e))?
            .get(0);
        let next = u32::try_from(next).map_err(|_| {
            MedReportError::StoreUnavailable(format!("invalid next version number {next}"))
        })?;

        let version = pending.into_version(report_id, next)?;
        let pg_version = PostgreSQLVersion::from_domain(&version)?;

        if let Err(e) = tx
            .execute(
                INSERT_VERSION,
                &[
                    &pg_version.id,
                    &pg_version.report_id,
                    &pg_version.version_number,
                    &pg_version.content,
                    &pg_version.saved_at,
                    &pg_version.saved_by,
                    &pg_version.comment,
                    &pg_version.content_sha256,
                ],
            )
            .await
        {
            if is_unique_violation(&e) {
                return Ok(None);
            }
            return Err(map_db_error("Failed to insert version", e));
        }

        tx.execute(
            "UPDATE reports SET last_modified = GREATEST(last_modified, $1), revision = revision + 1 WHERE id = $2",
            &[&version.saved_at, id],
        )
        .await
        .map_err(|e| map_db_error("Failed to advance report", e))?;

        let reload = format!("{SELECT_REPORT} WHERE r.id = $1");
        let row = tx
            .query_one(reload.as_str(), &[id])
            .await
            .map_err(|e| map_db_error("Failed to reload report", e))?;
        let report = PostgreSQLReport::from_row(&row)?.to_domain()?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit append", e))?;

        Ok(Some(AppendOutcome { report, version }))
    }
}

#[async_trait]
impl ReportStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn insert_report(&self, report: &Report, initial: &ReportVersion) -> Result<()> {
        let pg_report = PostgreSQLReport::from_domain(report)?;
        let pg_version = PostgreSQLVersion::from_domain(initial)?;

        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;

        let insert_report = r#"
            INSERT INTO reports (
                id, hospital_id, patient_national_id, patient_first_name, patient_last_name,
                specialty, report_type, status, created_by, created_at, last_modified,
                finalized_at, revision
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#;

        let inserted = tx
            .execute(
                insert_report,
                &[
                    &pg_report.id,
                    &pg_report.hospital_id,
                    &pg_report.patient_national_id,
                    &pg_report.patient_first_name,
                    &pg_report.patient_last_name,
                    &pg_report.specialty,
                    &pg_report.report_type,
                    &pg_report.status,
                    &pg_report.created_by,
                    &pg_report.created_at,
                    &pg_report.last_modified,
                    &pg_report.finalized_at,
                    &pg_report.revision,
                ],
            )
            .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                // Release the aborted transaction before querying on another connection
                drop(tx);
                drop(conn);
                return self.confirm_inserted(report.id, initial).await;
            }
            Err(e) => return Err(map_db_error("Failed to insert report", e)),
        }

        tx.execute(
            INSERT_VERSION,
            &[
                &pg_version.id,
                &pg_version.report_id,
                &pg_version.version_number,
                &pg_version.content,
                &pg_version.saved_at,
                &pg_version.saved_by,
                &pg_version.comment,
                &pg_version.content_sha256,
            ],
        )
        .await
        .map_err(|e| map_db_error("Failed to insert initial version", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit report creation", e))?;

        tracing::debug!(report_id = %report.id, "Report inserted into PostgreSQL");
        Ok(())
    }

    async fn get_report(&self, id: ReportId) -> Result<Report> {
        let query = format!("{SELECT_REPORT} WHERE r.id = $1");
        let row = self
            .client
            .query_opt(&query, &[id.as_uuid()])
            .await?
            .ok_or_else(|| MedReportError::report_not_found(id))?;

        PostgreSQLReport::from_row(&row)?.to_domain()
    }

    async fn update_status(&self, report: &Report, expected_revision: u64) -> Result<Report> {
        let update = r#"
            UPDATE reports
            SET status = $1, last_modified = $2, finalized_at = $3, revision = revision + 1
            WHERE id = $4 AND revision = $5
        "#;

        let updated = self
            .client
            .execute(
                update,
                &[
                    &report.status.as_str(),
                    &report.last_modified,
                    &report.finalized_at,
                    report.id.as_uuid(),
                    &revision_to_sql(expected_revision)?,
                ],
            )
            .await?;

        if updated == 0 {
            return Err(self.conflict_or_missing(report.id, expected_revision).await);
        }

        // The guard held, so nothing but the fields written here changed
        let mut stored = report.clone();
        stored.revision = expected_revision + 1;
        Ok(stored)
    }

    async fn append_version(
        &self,
        report_id: ReportId,
        pending: PendingVersion,
        expected_revision: Option<u64>,
    ) -> Result<AppendOutcome> {
        for attempt in 1..=self.max_append_attempts {
            if let Some(outcome) = self
                .try_append(report_id, pending.clone(), expected_revision)
                .await?
            {
                return Ok(outcome);
            }

            tracing::warn!(
                report_id = %report_id,
                attempt = attempt,
                max_attempts = self.max_append_attempts,
                "Version number already taken, retrying append"
            );
        }

        Err(MedReportError::ConcurrencyConflict(format!(
            "could not claim a version number for report {report_id} after {} attempts",
            self.max_append_attempts
        )))
    }

    async fn delete_report(&self, id: ReportId, expected_revision: u64) -> Result<()> {
        // report_versions rows go with it through ON DELETE CASCADE
        let deleted = self
            .client
            .execute(
                "DELETE FROM reports WHERE id = $1 AND revision = $2",
                &[id.as_uuid(), &revision_to_sql(expected_revision)?],
            )
            .await?;

        if deleted == 0 {
            return Err(self.conflict_or_missing(id, expected_revision).await);
        }
        Ok(())
    }

    async fn list_versions(&self, report_id: ReportId) -> Result<Vec<ReportVersion>> {
        let query = format!("{SELECT_VERSION} WHERE report_id = $1 ORDER BY version_number DESC");
        let rows = self.client.query(&query, &[report_id.as_uuid()]).await?;

        rows.iter()
            .map(|row| PostgreSQLVersion::from_row(row)?.to_domain())
            .collect()
    }

    async fn get_version(
        &self,
        report_id: ReportId,
        version_number: u32,
    ) -> Result<ReportVersion> {
        let number = i32::try_from(version_number)
            .map_err(|_| MedReportError::version_not_found(report_id, version_number))?;
        let query = format!("{SELECT_VERSION} WHERE report_id = $1 AND version_number = $2");
        let row = self
            .client
            .query_opt(&query, &[report_id.as_uuid(), &number])
            .await?
            .ok_or_else(|| MedReportError::version_not_found(report_id, version_number))?;

        PostgreSQLVersion::from_row(&row)?.to_domain()
    }

    async fn latest_version(&self, report_id: ReportId) -> Result<ReportVersion> {
        let query =
            format!("{SELECT_VERSION} WHERE report_id = $1 ORDER BY version_number DESC LIMIT 1");
        let row = self
            .client
            .query_opt(&query, &[report_id.as_uuid()])
            .await?
            .ok_or_else(|| {
                MedReportError::NotFound(format!("no versions for report {report_id}"))
            })?;

        PostgreSQLVersion::from_row(&row)?.to_domain()
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let query = format!(
            "{SELECT_REPORT} WHERE r.created_by = $1 AND ($2::TEXT IS NULL OR r.status = $2) \
             ORDER BY r.last_modified DESC LIMIT $3 OFFSET $4"
        );
        let status = filter.status.map(|s| s.as_str());
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(filter.offset).unwrap_or(i64::MAX);

        let rows = self
            .client
            .query(
                &query,
                &[filter.created_by.as_uuid(), &status, &limit, &offset],
            )
            .await?;

        tracing::debug!(count = rows.len(), "Listed reports from PostgreSQL");

        rows.iter()
            .map(|row| PostgreSQLReport::from_row(row)?.to_domain())
            .collect()
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}
