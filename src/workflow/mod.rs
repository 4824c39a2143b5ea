pub mod engine;
pub mod status;

pub use engine::{EngineError, WorkflowEngine};
pub use status::{ReviewOutcome, SubmissionStatus};

use thiserror::Error;

use crate::hierarchy::AdminLevel;

/// Errors from workflow transition planning and application
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} a submission in state '{status}'")]
    InvalidSourceState { action: &'static str, status: SubmissionStatus },

    #[error("Submission is awaiting {expected} review, not {actual}")]
    WrongReviewerLevel { expected: AdminLevel, actual: AdminLevel },

    #[error("No review level {direction} {level}")]
    LevelOutOfRange { level: AdminLevel, direction: &'static str },

    #[error("A comment is required when returning a submission")]
    CommentRequired,

    #[error("Submission state changed concurrently; re-fetch and retry")]
    StaleState,
}

/// Planned outcome of a workflow transition.
///
/// The planner is pure; applying `status`/`level` to storage (together
/// with the decision row) is the engine's job and happens in one
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: SubmissionStatus,
    pub level: AdminLevel,
}

/// Plan a unit's (re-)submission into the review chain.
///
/// Valid from `draft` and from every returned state; either way the
/// submission re-enters at the first review level.
pub fn plan_submit(current: SubmissionStatus) -> Result<Transition, WorkflowError> {
    if current != SubmissionStatus::Draft && current.returned_to().is_none() {
        return Err(WorkflowError::InvalidSourceState { action: "submit", status: current });
    }
    Ok(Transition {
        status: SubmissionStatus::DistrictPending,
        level: AdminLevel::District,
    })
}

/// Plan an approval by a reviewer at `reviewer_level`.
///
/// Advances to the next level's pending state, or to `completed` from
/// the final level.
pub fn plan_approve(
    current: SubmissionStatus,
    current_level: AdminLevel,
    reviewer_level: AdminLevel,
) -> Result<Transition, WorkflowError> {
    let pending_at = current.pending_at().ok_or(WorkflowError::InvalidSourceState {
        action: "approve",
        status: current,
    })?;
    debug_assert_eq!(pending_at, current_level);
    if reviewer_level != current_level {
        return Err(WorkflowError::WrongReviewerLevel {
            expected: current_level,
            actual: reviewer_level,
        });
    }
    match current_level.above() {
        Some(next) => Ok(Transition {
            status: SubmissionStatus::pending_at_level(next).ok_or(
                WorkflowError::LevelOutOfRange { level: next, direction: "above" },
            )?,
            level: next,
        }),
        // Approval at the final level completes the submission.
        None => Ok(Transition {
            status: SubmissionStatus::Completed,
            level: AdminLevel::Nationwide,
        }),
    }
}

/// Plan a return by a reviewer at `reviewer_level`.
///
/// Moves one level down toward the unit and parks the submission in that
/// level's returned state until the unit resubmits.
pub fn plan_return(
    current: SubmissionStatus,
    current_level: AdminLevel,
    reviewer_level: AdminLevel,
    comment: Option<&str>,
) -> Result<Transition, WorkflowError> {
    let pending_at = current.pending_at().ok_or(WorkflowError::InvalidSourceState {
        action: "return",
        status: current,
    })?;
    debug_assert_eq!(pending_at, current_level);
    if reviewer_level != current_level {
        return Err(WorkflowError::WrongReviewerLevel {
            expected: current_level,
            actual: reviewer_level,
        });
    }
    match comment {
        Some(c) if !c.trim().is_empty() => {}
        _ => return Err(WorkflowError::CommentRequired),
    }
    let down = current_level.below().ok_or(WorkflowError::LevelOutOfRange {
        level: current_level,
        direction: "below",
    })?;
    Ok(Transition {
        status: SubmissionStatus::returned_to_level(down).ok_or(
            WorkflowError::LevelOutOfRange { level: down, direction: "below" },
        )?,
        level: down,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_from_draft_enters_district_review() {
        let t = plan_submit(SubmissionStatus::Draft).unwrap();
        assert_eq!(t.status, SubmissionStatus::DistrictPending);
        assert_eq!(t.level, AdminLevel::District);
    }

    #[test]
    fn submit_from_returned_reenters_at_district() {
        for status in [
            SubmissionStatus::UnitReturned,
            SubmissionStatus::DistrictReturned,
            SubmissionStatus::DivisionReturned,
            SubmissionStatus::RegionReturned,
        ] {
            let t = plan_submit(status).unwrap();
            assert_eq!(t.status, SubmissionStatus::DistrictPending);
            assert_eq!(t.level, AdminLevel::District);
        }
    }

    #[test]
    fn submit_rejected_mid_review() {
        for status in [
            SubmissionStatus::DistrictPending,
            SubmissionStatus::RegionPending,
            SubmissionStatus::Completed,
        ] {
            assert!(matches!(
                plan_submit(status),
                Err(WorkflowError::InvalidSourceState { action: "submit", .. })
            ));
        }
    }

    #[test]
    fn four_approvals_reach_completed_without_skipping() {
        let mut status = SubmissionStatus::DistrictPending;
        let mut level = AdminLevel::District;
        let mut approvals = 0;
        while status != SubmissionStatus::Completed {
            let t = plan_approve(status, level, level).unwrap();
            // Never skip: the next pending level is exactly one above
            if let Some(next_pending) = t.status.pending_at() {
                assert_eq!(Some(next_pending), level.above());
            }
            status = t.status;
            level = t.level;
            approvals += 1;
        }
        assert_eq!(approvals, 4);
        assert_eq!(level, AdminLevel::Nationwide);
    }

    #[test]
    fn approve_requires_matching_level() {
        let err = plan_approve(
            SubmissionStatus::DivisionPending,
            AdminLevel::Division,
            AdminLevel::District,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::WrongReviewerLevel { expected: AdminLevel::Division, actual: AdminLevel::District }
        ));
    }

    #[test]
    fn approve_rejected_outside_pending() {
        assert!(matches!(
            plan_approve(SubmissionStatus::Draft, AdminLevel::Unit, AdminLevel::District),
            Err(WorkflowError::InvalidSourceState { action: "approve", .. })
        ));
        assert!(matches!(
            plan_approve(SubmissionStatus::Completed, AdminLevel::Nationwide, AdminLevel::Nationwide),
            Err(WorkflowError::InvalidSourceState { .. })
        ));
    }

    #[test]
    fn return_lands_one_level_down() {
        let t = plan_return(
            SubmissionStatus::RegionPending,
            AdminLevel::Region,
            AdminLevel::Region,
            Some("missing enrolment figures"),
        )
        .unwrap();
        assert_eq!(t.status, SubmissionStatus::DivisionReturned);
        assert_eq!(t.level, AdminLevel::Division);

        let t = plan_return(
            SubmissionStatus::DistrictPending,
            AdminLevel::District,
            AdminLevel::District,
            Some("incomplete"),
        )
        .unwrap();
        assert_eq!(t.status, SubmissionStatus::UnitReturned);
        assert_eq!(t.level, AdminLevel::Unit);
    }

    #[test]
    fn return_requires_comment() {
        for comment in [None, Some(""), Some("   ")] {
            assert!(matches!(
                plan_return(
                    SubmissionStatus::DistrictPending,
                    AdminLevel::District,
                    AdminLevel::District,
                    comment,
                ),
                Err(WorkflowError::CommentRequired)
            ));
        }
    }

    #[test]
    fn returned_then_resubmitted_restarts_at_district() {
        let t = plan_return(
            SubmissionStatus::DivisionPending,
            AdminLevel::Division,
            AdminLevel::Division,
            Some("figures disagree with roster"),
        )
        .unwrap();
        assert_eq!(t.status, SubmissionStatus::DistrictReturned);
        let t = plan_submit(t.status).unwrap();
        assert_eq!(t.status, SubmissionStatus::DistrictPending);
    }
}
