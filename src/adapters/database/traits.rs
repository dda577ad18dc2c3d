//! Persistence abstraction
//!
//! This module defines the trait that storage adapters implement to back the
//! report service. The store is the single source of truth and the only
//! shared mutable resource; the trait is shaped so that the two writes which
//! must be atomic (ledger append with report update, conditional status
//! update) are single calls an adapter can run as one unit.

use crate::domain::ids::ReportId;
use crate::domain::report::{Report, ReportFilter};
use crate::domain::version::{PendingVersion, ReportVersion};
use crate::domain::Result;
use async_trait::async_trait;

/// Outcome of an atomic ledger append
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// Report after its materialized content, `last_modified` and revision advanced
    pub report: Report,

    /// The entry that was appended
    pub version: ReportVersion,
}

/// Storage backend for reports and their version ledgers
///
/// Implementations must guarantee:
/// - version numbers per report are exactly `1..=N`, even under concurrent
///   appends
/// - ledger entries are never mutated after `append_version` returns
/// - conditional writes fail with `ConcurrencyConflict` when the stored
///   revision differs from the expected one
/// - driver failures surface as `StoreUnavailable`
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Test the backend connection
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they don't exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert a new report together with its first ledger entry
    ///
    /// Repeating an insert that already committed succeeds; the stored
    /// version 1 carrying `initial.id` identifies it.
    ///
    /// # Errors
    ///
    /// `ConcurrencyConflict` if a different report with the same id exists.
    async fn insert_report(&self, report: &Report, initial: &ReportVersion) -> Result<()>;

    /// Load a report with its materialized content and current revision
    ///
    /// # Errors
    ///
    /// `NotFound` if the report does not exist.
    async fn get_report(&self, id: ReportId) -> Result<Report>;

    /// Conditionally persist a status change
    ///
    /// Writes `status`, `last_modified` and `finalized_at` from `report` only
    /// if the stored revision equals `expected_revision`, then bumps the
    /// revision. Returns the report as stored.
    ///
    /// # Errors
    ///
    /// `NotFound` if the report vanished, `ConcurrencyConflict` on a revision
    /// mismatch.
    async fn update_status(&self, report: &Report, expected_revision: u64) -> Result<Report>;

    /// Atomically append a ledger entry and advance the report
    ///
    /// Assigns the next version number, inserts the entry, and updates the
    /// report's content, `last_modified` (to the entry's `saved_at`) and
    /// revision in one unit. With `expected_revision` set the append is also
    /// conditioned on the report not having changed since it was read.
    ///
    /// # Errors
    ///
    /// `NotFound` if the report does not exist, `ConcurrencyConflict` on a
    /// revision mismatch.
    async fn append_version(
        &self,
        report_id: ReportId,
        pending: PendingVersion,
        expected_revision: Option<u64>,
    ) -> Result<AppendOutcome>;

    /// Conditionally delete a report and all of its ledger entries
    async fn delete_report(&self, id: ReportId, expected_revision: u64) -> Result<()>;

    /// Ledger entries for a report, newest first (empty if none)
    async fn list_versions(&self, report_id: ReportId) -> Result<Vec<ReportVersion>>;

    /// A single ledger entry
    ///
    /// # Errors
    ///
    /// `NotFound` if the report has no entry with that number.
    async fn get_version(&self, report_id: ReportId, version_number: u32)
        -> Result<ReportVersion>;

    /// The entry with the highest version number
    ///
    /// # Errors
    ///
    /// `NotFound` if the report has no entries.
    async fn latest_version(&self, report_id: ReportId) -> Result<ReportVersion>;

    /// Reports created by a clinician, most recently modified first
    ///
    /// `filter.limit` is applied as given; clamping is the caller's job.
    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>>;

    /// Backend name for logs and CLI output
    fn backend_name(&self) -> &str;
}
