//! Report service
//!
//! The only component that mutates reports. Each operation reads the report,
//! checks workflow and content rules, and issues one conditional store write
//! carrying the revision it read. A concurrent writer therefore turns into a
//! `ConcurrencyConflict` instead of a lost update.
//!
//! Every store call runs under the configured timeout. Calls that fail as
//! `StoreUnavailable` (including timeouts) are retried with exponential
//! backoff; conflicts are handed back to the caller untouched.

use crate::adapters::database::factory::create_report_store;
use crate::adapters::database::traits::{AppendOutcome, ReportStore};
use crate::config::schema::{MedReportConfig, ServiceConfig};
use crate::core::ledger::{LedgerAudit, VersionLedger};
use crate::core::workflow;
use crate::domain::content::ReportContent;
use crate::domain::ids::{NationalId, ReportId, UserId};
use crate::domain::report::{NewReport, Report, ReportFilter};
use crate::domain::status::ReportStatus;
use crate::domain::version::{
    restored_comment, PendingVersion, ReportVersion, AUTO_SAVE_COMMENT, INITIAL_VERSION_COMMENT,
};
use crate::domain::{MedReportError, Result};
use crate::{log_report_event, log_retry_attempt};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates the workflow engine, the validator and the ledger
///
/// Store calls use `service.store_timeout_ms` unless the caller scopes a
/// different bound with [`ReportService::with_store_timeout`]. Dropping an
/// operation's future cancels the store call in flight.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore + Send + Sync>,
    ledger: VersionLedger,
    config: ServiceConfig,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore + Send + Sync>, config: ServiceConfig) -> Self {
        Self {
            ledger: VersionLedger::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    /// Build the store selected by configuration and wrap it
    pub fn from_config(config: &MedReportConfig) -> Result<Self> {
        let store = create_report_store(config)?;
        Ok(Self::new(store, config.service.clone()))
    }

    /// A handle whose store calls use `timeout` instead of the configured one
    ///
    /// The bound applies to each attempt; retries still follow the retry
    /// policy.
    pub fn with_store_timeout(&self, timeout: Duration) -> Self {
        let mut scoped = self.clone();
        scoped.config.store_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        scoped
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn backend_name(&self) -> &str {
        self.store.backend_name()
    }

    /// Check that the store is reachable
    pub async fn test_connection(&self) -> Result<()> {
        self.call_store("test_connection", || self.store.test_connection())
            .await
    }

    /// Create tables and indexes if missing
    pub async fn ensure_schema(&self) -> Result<()> {
        self.call_store("ensure_schema", || self.store.ensure_schema())
            .await
    }

    /// Create a draft report with an empty version 1
    ///
    /// Retrying the insert after a lost acknowledgement is safe: the store
    /// recognises its own earlier commit by the initial version's id.
    ///
    /// # Errors
    ///
    /// `InvalidPatientId` if the national id is not exactly 13 characters.
    pub async fn create(&self, request: NewReport) -> Result<Report> {
        let national_id = NationalId::new(request.national_id.clone())
            .map_err(MedReportError::InvalidPatientId)?;

        let now = Utc::now();
        let report = Report::new_draft(request, national_id, now);
        let initial = PendingVersion::new(
            ReportContent::default(),
            report.created_by,
            INITIAL_VERSION_COMMENT,
        )
        .saved_at(now)
        .into_version(report.id, 1)?;

        self.call_store("insert_report", || {
            self.store.insert_report(&report, &initial)
        })
        .await?;

        log_report_event!(
            report.id,
            "Report created",
            patient = %report.patient.national_id.masked(),
            specialty = %report.specialty,
            report_type = %report.report_type,
            author_id = %report.created_by
        );

        Ok(report)
    }

    /// Load a report with its current content
    pub async fn get_report(&self, report_id: ReportId) -> Result<Report> {
        self.call_store("get_report", || self.store.get_report(report_id))
            .await
    }

    /// Save new content as the next version of a draft
    ///
    /// Content is not validated here; completeness is only checked when the
    /// report is submitted for review.
    ///
    /// # Errors
    ///
    /// `EditNotAllowed` unless the report is a draft, `ConcurrencyConflict`
    /// if the report changed since it was read. A retry after a lost
    /// acknowledgement also reports `ConcurrencyConflict` even though the
    /// first attempt's version was saved; reload the report to see it.
    pub async fn update_content(
        &self,
        report_id: ReportId,
        content: ReportContent,
        editor_id: UserId,
    ) -> Result<AppendOutcome> {
        let report = self.get_report(report_id).await?;
        ensure_editable(&report)?;

        let pending = PendingVersion::new(content, editor_id, AUTO_SAVE_COMMENT);
        let outcome = self
            .call_store("append_version", || {
                self.ledger
                    .append_guarded(report_id, pending.clone(), report.revision)
            })
            .await?;

        log_report_event!(
            report_id,
            "Report content saved",
            version = outcome.version.version_number,
            editor_id = %editor_id,
            revision = outcome.report.revision
        );

        Ok(outcome)
    }

    /// Move a report to another workflow state
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for edges outside the workflow table (including
    /// self-transitions), `IncompleteContent` when submitting an incomplete
    /// draft for review, `ConcurrencyConflict` if the report changed since it
    /// was read.
    pub async fn change_status(&self, report_id: ReportId, target: ReportStatus) -> Result<Report> {
        let report = self.get_report(report_id).await?;
        let from = report.status;

        if !workflow::can_transition(from, target) {
            return Err(MedReportError::InvalidTransition { from, to: target });
        }

        if workflow::requires_complete_content(from, target) {
            let outcome = report.content.validate();
            if !outcome.is_valid() {
                tracing::debug!(
                    report_id = %report_id,
                    violations = outcome.violations.len(),
                    "Report content incomplete for review"
                );
                return Err(MedReportError::IncompleteContent(outcome.into_violations()));
            }
        }

        let expected_revision = report.revision;
        let mut updated = report;
        updated.apply_status(target, Utc::now());

        let stored = self
            .call_store("update_status", || {
                self.store.update_status(&updated, expected_revision)
            })
            .await?;

        log_report_event!(
            report_id,
            "Report status changed",
            from = %from,
            to = %target,
            patient = %stored.patient.national_id.masked(),
            revision = stored.revision
        );

        Ok(stored)
    }

    /// Append a copy of a historical version as the newest version
    ///
    /// History is never rewritten; the new entry is annotated with the
    /// version it came from.
    ///
    /// # Errors
    ///
    /// `EditNotAllowed` unless the report is a draft, `NotFound` if the
    /// version does not exist, `ConcurrencyConflict` as for
    /// [`ReportService::update_content`].
    pub async fn restore_version(
        &self,
        report_id: ReportId,
        version_number: u32,
        editor_id: UserId,
    ) -> Result<AppendOutcome> {
        let report = self.get_report(report_id).await?;
        ensure_editable(&report)?;

        let source = self
            .call_store("get_version", || {
                self.ledger.get_version(report_id, version_number)
            })
            .await?;

        let pending = PendingVersion::new(
            source.content,
            editor_id,
            restored_comment(version_number),
        );
        let outcome = self
            .call_store("append_version", || {
                self.ledger
                    .append_guarded(report_id, pending.clone(), report.revision)
            })
            .await?;

        log_report_event!(
            report_id,
            "Report version restored",
            restored_from = version_number,
            version = outcome.version.version_number,
            editor_id = %editor_id
        );

        Ok(outcome)
    }

    /// Delete a draft together with its whole ledger
    ///
    /// # Errors
    ///
    /// `EditNotAllowed` unless the report is a draft.
    pub async fn delete(&self, report_id: ReportId) -> Result<()> {
        let report = self.get_report(report_id).await?;
        ensure_editable(&report)?;

        self.call_store("delete_report", || {
            self.store.delete_report(report_id, report.revision)
        })
        .await?;

        log_report_event!(
            report_id,
            "Report deleted",
            patient = %report.patient.national_id.masked()
        );

        Ok(())
    }

    /// Ledger entries of an existing report, newest first
    pub async fn list_versions(&self, report_id: ReportId) -> Result<Vec<ReportVersion>> {
        // Distinguish "no such report" from an empty ledger
        self.get_report(report_id).await?;
        self.call_store("list_versions", || self.ledger.list_versions(report_id))
            .await
    }

    pub async fn get_version(&self, report_id: ReportId, version_number: u32) -> Result<ReportVersion> {
        self.call_store("get_version", || {
            self.ledger.get_version(report_id, version_number)
        })
        .await
    }

    pub async fn latest_version(&self, report_id: ReportId) -> Result<ReportVersion> {
        self.call_store("latest_version", || self.ledger.latest(report_id))
            .await
    }

    /// A clinician's reports, most recently modified first
    ///
    /// A zero limit becomes the configured default; larger limits are capped
    /// at the configured maximum.
    pub async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        let filter = self.clamp_filter(filter);
        self.call_store("list_reports", || self.store.list_reports(&filter))
            .await
    }

    /// Check ledger numbering, checksums and the materialized content
    pub async fn audit_ledger(&self, report_id: ReportId) -> Result<LedgerAudit> {
        self.call_store("audit_ledger", || self.ledger.audit(report_id))
            .await
    }

    fn clamp_filter(&self, mut filter: ReportFilter) -> ReportFilter {
        if filter.limit == 0 {
            filter.limit = self.config.list_default_limit;
        }
        filter.limit = filter.limit.min(self.config.list_max_limit);
        filter
    }

    /// Run a store call under the timeout, retrying unavailability with backoff
    async fn call_store<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let retry = &self.config.retry;
        let timeout = self.config.store_timeout();
        let mut attempt = 0;

        loop {
            let error = match tokio::time::timeout(timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if e.is_store_unavailable() => e,
                Ok(Err(e)) => return Err(e),
                Err(_) => MedReportError::StoreUnavailable(format!(
                    "{operation} timed out after {}ms",
                    timeout.as_millis()
                )),
            };

            attempt += 1;
            if attempt > retry.max_retries {
                tracing::error!(
                    operation = operation,
                    attempts = attempt,
                    error = %error,
                    "Store call failed after retries"
                );
                return Err(error);
            }

            let delay = retry.delay_for_attempt(attempt);
            log_retry_attempt!(
                operation,
                attempt,
                retry.max_retries,
                delay.as_millis() as u64,
                error
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn ensure_editable(report: &Report) -> Result<()> {
    if report.status.is_editable() {
        Ok(())
    } else {
        Err(MedReportError::EditNotAllowed {
            status: report.status,
        })
    }
}
