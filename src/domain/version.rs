//! Version ledger entries
//!
//! A `ReportVersion` is an immutable snapshot of a report's full content.
//! Entries are created only by the store's atomic append, which assigns the
//! version number; callers hand over a [`PendingVersion`].

use super::content::ReportContent;
use super::ids::{ReportId, UserId, VersionId};
use super::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Comment recorded on version 1
pub const INITIAL_VERSION_COMMENT: &str = "Initial version";

/// Comment recorded on content saves
pub const AUTO_SAVE_COMMENT: &str = "Auto-save";

/// Comment recorded when a historical version is re-appended
pub fn restored_comment(version_number: u32) -> String {
    format!("Restored from version {version_number}")
}

/// Immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub id: VersionId,
    pub report_id: ReportId,

    /// Position in the ledger, starting at 1 with no gaps
    pub version_number: u32,

    pub content: ReportContent,
    pub saved_at: DateTime<Utc>,
    pub saved_by: UserId,
    pub comment: String,

    /// Hex SHA-256 of the content's JSON encoding at append time
    pub content_sha256: String,
}

impl ReportVersion {
    /// Recomputes the checksum and compares it with the stored one
    pub fn verify_checksum(&self) -> Result<bool> {
        Ok(content_checksum(&self.content)? == self.content_sha256)
    }
}

/// A snapshot waiting for the store to assign its version number
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVersion {
    pub content: ReportContent,
    pub saved_by: UserId,
    pub comment: String,
    pub saved_at: DateTime<Utc>,
}

impl PendingVersion {
    pub fn new(content: ReportContent, saved_by: UserId, comment: impl Into<String>) -> Self {
        Self {
            content,
            saved_by,
            comment: comment.into(),
            saved_at: Utc::now(),
        }
    }

    /// Overrides the save timestamp
    pub fn saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    /// Seals the snapshot under the number the store assigned
    pub fn into_version(self, report_id: ReportId, version_number: u32) -> Result<ReportVersion> {
        let content_sha256 = content_checksum(&self.content)?;
        Ok(ReportVersion {
            id: VersionId::new(),
            report_id,
            version_number,
            content: self.content,
            saved_at: self.saved_at,
            saved_by: self.saved_by,
            comment: self.comment,
            content_sha256,
        })
    }
}

/// Hex SHA-256 over the JSON encoding of the content
pub fn content_checksum(content: &ReportContent) -> Result<String> {
    let bytes = serde_json::to_vec(content)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
