//! Status workflow engine
//!
//! The transition table is fixed domain knowledge, so it is a `match` rather
//! than runtime state. Functions here are pure: they never look at content
//! and never touch the store. Completeness gating is composed on top by the
//! report service.

use crate::domain::ReportStatus;

/// States reachable in one step from `current`
///
/// Self-loops never appear; terminal states return an empty slice.
pub fn allowed_targets(current: ReportStatus) -> &'static [ReportStatus] {
    use crate::domain::ReportStatus::*;
    match current {
        Draft => &[InReview, Cancelled],
        InReview => &[Draft, Approved, Cancelled],
        Approved => &[Signed, Draft],
        Signed => &[],
        Cancelled => &[],
    }
}

/// Whether `current -> target` is an edge of the workflow
///
/// # Examples
///
/// ```
/// use medreport::core::workflow::can_transition;
/// use medreport::domain::ReportStatus;
///
/// assert!(can_transition(ReportStatus::Draft, ReportStatus::InReview));
/// assert!(!can_transition(ReportStatus::Draft, ReportStatus::Signed));
/// assert!(!can_transition(ReportStatus::Draft, ReportStatus::Draft));
/// ```
pub fn can_transition(current: ReportStatus, target: ReportStatus) -> bool {
    allowed_targets(current).contains(&target)
}

/// Whether moving to `target` requires complete content
pub fn requires_complete_content(current: ReportStatus, target: ReportStatus) -> bool {
    current == ReportStatus::Draft && target == ReportStatus::InReview
}
