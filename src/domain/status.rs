//! Report workflow status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow state of a report
///
/// `Signed` and `Cancelled` are terminal. Which moves between states are
/// legal lives in [`crate::core::workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Being authored; the only editable state
    Draft,
    /// Submitted for review
    InReview,
    /// Approved by a reviewer
    Approved,
    /// Signed off; terminal
    Signed,
    /// Abandoned; terminal
    Cancelled,
}

impl ReportStatus {
    /// Every status, in workflow order
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Draft,
        ReportStatus::InReview,
        ReportStatus::Approved,
        ReportStatus::Signed,
        ReportStatus::Cancelled,
    ];

    /// Storage / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::InReview => "in_review",
            ReportStatus::Approved => "approved",
            ReportStatus::Signed => "signed",
            ReportStatus::Cancelled => "cancelled",
        }
    }

    /// Whether content may be edited, restored or the report deleted
    pub fn is_editable(&self) -> bool {
        *self == ReportStatus::Draft
    }

    /// Whether a report in this state carries a finalization timestamp
    pub fn is_finalized(&self) -> bool {
        matches!(self, ReportStatus::Approved | ReportStatus::Signed)
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Signed | ReportStatus::Cancelled)
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(ReportStatus::Draft),
            "in_review" | "inreview" => Ok(ReportStatus::InReview),
            "approved" => Ok(ReportStatus::Approved),
            "signed" => Ok(ReportStatus::Signed),
            "cancelled" => Ok(ReportStatus::Cancelled),
            other => Err(format!(
                "Invalid status '{other}'. Must be one of: draft, in_review, approved, signed, cancelled"
            )),
        }
    }
}
