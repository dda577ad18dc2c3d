//! Version ledger
//!
//! Append-only history of content snapshots per report. Numbering and
//! atomicity are delegated to [`ReportStore::append_version`]; this type adds
//! the ledger-shaped API and an integrity audit on top.

use crate::adapters::database::traits::{AppendOutcome, ReportStore};
use crate::domain::content::ReportContent;
use crate::domain::ids::{ReportId, UserId};
use crate::domain::version::{PendingVersion, ReportVersion};
use crate::domain::Result;
use serde::Serialize;
use std::sync::Arc;

/// Result of re-reading a report's full ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    pub report_id: ReportId,
    pub version_count: usize,

    /// Highest version number present, if any
    pub latest_version: Option<u32>,

    /// Numbers absent from `1..=latest_version`
    pub missing_numbers: Vec<u32>,

    /// Numbers present more than once
    pub duplicate_numbers: Vec<u32>,

    /// Entries whose content no longer hashes to the stored checksum
    pub checksum_mismatches: Vec<u32>,

    /// Whether the report's materialized content equals the latest entry's
    pub content_matches_latest: bool,
}

impl LedgerAudit {
    /// Whether the ledger satisfies every integrity rule
    pub fn is_consistent(&self) -> bool {
        self.missing_numbers.is_empty()
            && self.duplicate_numbers.is_empty()
            && self.checksum_mismatches.is_empty()
            && self.content_matches_latest
    }
}

/// Ledger view over a report store
#[derive(Clone)]
pub struct VersionLedger {
    store: Arc<dyn ReportStore + Send + Sync>,
}

impl VersionLedger {
    pub fn new(store: Arc<dyn ReportStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Append a snapshot under the next free number
    ///
    /// Not conditioned on the report's revision: concurrent appends all
    /// succeed with distinct numbers. Use [`VersionLedger::append_guarded`]
    /// when the caller read the report first.
    pub async fn append(
        &self,
        report_id: ReportId,
        content: ReportContent,
        author_id: UserId,
        comment: impl Into<String>,
    ) -> Result<ReportVersion> {
        let pending = PendingVersion::new(content, author_id, comment);
        let outcome = self.store.append_version(report_id, pending, None).await?;
        Ok(outcome.version)
    }

    /// Append only if the report is still at `expected_revision`
    pub async fn append_guarded(
        &self,
        report_id: ReportId,
        pending: PendingVersion,
        expected_revision: u64,
    ) -> Result<AppendOutcome> {
        self.store
            .append_version(report_id, pending, Some(expected_revision))
            .await
    }

    /// All entries, newest first
    pub async fn list_versions(&self, report_id: ReportId) -> Result<Vec<ReportVersion>> {
        self.store.list_versions(report_id).await
    }

    pub async fn get_version(&self, report_id: ReportId, version_number: u32) -> Result<ReportVersion> {
        self.store.get_version(report_id, version_number).await
    }

    pub async fn latest(&self, report_id: ReportId) -> Result<ReportVersion> {
        self.store.latest_version(report_id).await
    }

    /// Re-read the report and its ledger and check them against each other
    ///
    /// # Errors
    ///
    /// `NotFound` if the report does not exist.
    pub async fn audit(&self, report_id: ReportId) -> Result<LedgerAudit> {
        let report = self.store.get_report(report_id).await?;
        let mut versions = self.store.list_versions(report_id).await?;
        versions.sort_by_key(|v| v.version_number);

        let mut duplicate_numbers = Vec::new();
        for pair in versions.windows(2) {
            if pair[0].version_number == pair[1].version_number
                && !duplicate_numbers.contains(&pair[0].version_number)
            {
                duplicate_numbers.push(pair[0].version_number);
            }
        }

        let latest_version = versions.last().map(|v| v.version_number);
        let missing_numbers = match latest_version {
            Some(max) => (1..=max)
                .filter(|n| versions.binary_search_by_key(n, |v| v.version_number).is_err())
                .collect(),
            None => Vec::new(),
        };

        let mut checksum_mismatches = Vec::new();
        for version in &versions {
            if !version.verify_checksum()? {
                checksum_mismatches.push(version.version_number);
            }
        }

        let content_matches_latest = versions
            .last()
            .is_some_and(|latest| latest.content == report.content);

        let audit = LedgerAudit {
            report_id,
            version_count: versions.len(),
            latest_version,
            missing_numbers,
            duplicate_numbers,
            checksum_mismatches,
            content_matches_latest,
        };

        if audit.is_consistent() {
            tracing::debug!(
                report_id = %report_id,
                version_count = audit.version_count,
                "Ledger audit passed"
            );
        } else {
            tracing::warn!(
                report_id = %report_id,
                missing = ?audit.missing_numbers,
                duplicates = ?audit.duplicate_numbers,
                checksum_mismatches = ?audit.checksum_mismatches,
                content_matches_latest = audit.content_matches_latest,
                "Ledger audit found inconsistencies"
            );
        }

        Ok(audit)
    }
}
