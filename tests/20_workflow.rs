mod common;

use anyhow::Result;

use census_api_rust::hierarchy::{AdminLevel, NodeRef};
use census_api_rust::scope::{resolve_scope, ScopeError};
use census_api_rust::workflow::{
    plan_approve, plan_return, plan_submit, SubmissionStatus, WorkflowError,
};

/// Walk one submission through the entire chain the way the review
/// handlers drive it: each reviewer approves at the level the
/// submission is currently parked at.
#[test]
fn full_chain_takes_exactly_four_approvals() -> Result<()> {
    let first = plan_submit(SubmissionStatus::Draft)?;
    assert_eq!(first.status, SubmissionStatus::DistrictPending);

    let mut status = first.status;
    let mut level = first.level;
    let mut trail = Vec::new();

    while status != SubmissionStatus::Completed {
        let t = plan_approve(status, level, level)?;
        trail.push((status, t.status));
        status = t.status;
        level = t.level;
    }

    assert_eq!(
        trail,
        vec![
            (SubmissionStatus::DistrictPending, SubmissionStatus::DivisionPending),
            (SubmissionStatus::DivisionPending, SubmissionStatus::RegionPending),
            (SubmissionStatus::RegionPending, SubmissionStatus::NationwidePending),
            (SubmissionStatus::NationwidePending, SubmissionStatus::Completed),
        ]
    );
    Ok(())
}

#[test]
fn return_parks_one_level_down_and_resubmit_restarts() -> Result<()> {
    // Approved up to region, then sent back.
    let t = plan_return(
        SubmissionStatus::RegionPending,
        AdminLevel::Region,
        AdminLevel::Region,
        Some("division totals disagree with the unit rosters"),
    )?;
    assert_eq!(t.status, SubmissionStatus::DivisionReturned);
    assert_eq!(t.level, AdminLevel::Division);

    // The unit edits and resubmits; review restarts at the bottom of
    // the chain, not where it left off.
    assert!(t.status.is_editable_by_unit());
    let resubmitted = plan_submit(t.status)?;
    assert_eq!(resubmitted.status, SubmissionStatus::DistrictPending);
    assert_eq!(resubmitted.level, AdminLevel::District);
    Ok(())
}

#[test]
fn unit_editability_tracks_status() {
    for editable in [
        SubmissionStatus::Draft,
        SubmissionStatus::UnitReturned,
        SubmissionStatus::DistrictReturned,
        SubmissionStatus::DivisionReturned,
        SubmissionStatus::RegionReturned,
    ] {
        assert!(editable.is_editable_by_unit(), "{editable}");
    }
    for frozen in [
        SubmissionStatus::DistrictPending,
        SubmissionStatus::DivisionPending,
        SubmissionStatus::RegionPending,
        SubmissionStatus::NationwidePending,
        SubmissionStatus::Completed,
    ] {
        assert!(!frozen.is_editable_by_unit(), "{frozen}");
    }
}

#[test]
fn reviewer_level_must_match_the_parked_level() {
    // A district head cannot act on a submission already at division.
    let err = plan_approve(
        SubmissionStatus::DivisionPending,
        AdminLevel::Division,
        AdminLevel::District,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::WrongReviewerLevel {
            expected: AdminLevel::Division,
            actual: AdminLevel::District
        }
    ));

    // Nor can a region head reach down and approve early.
    assert!(plan_approve(
        SubmissionStatus::DistrictPending,
        AdminLevel::District,
        AdminLevel::Region,
    )
    .is_err());

    assert!(plan_return(
        SubmissionStatus::DistrictPending,
        AdminLevel::District,
        AdminLevel::Division,
        Some("wrong desk"),
    )
    .is_err());
}

#[test]
fn completed_submissions_are_immutable() {
    assert!(matches!(
        plan_submit(SubmissionStatus::Completed),
        Err(WorkflowError::InvalidSourceState { action: "submit", .. })
    ));
    assert!(matches!(
        plan_approve(SubmissionStatus::Completed, AdminLevel::Nationwide, AdminLevel::Nationwide),
        Err(WorkflowError::InvalidSourceState { action: "approve", .. })
    ));
    assert!(matches!(
        plan_return(
            SubmissionStatus::Completed,
            AdminLevel::Nationwide,
            AdminLevel::Nationwide,
            Some("too late"),
        ),
        Err(WorkflowError::InvalidSourceState { action: "return", .. })
    ));
}

/// The review handlers authorize the submission's unit against the
/// reviewer's scope before consulting the planner. A reviewer from the
/// right level but the wrong subtree never reaches the transition.
#[test]
fn review_is_gated_by_scope_before_level() -> Result<()> {
    let tree = common::sample_tree();
    let submission_unit = NodeRef::Unit(1111);

    let own_district = resolve_scope(&common::district_admin(1, 11, 111), &tree)?;
    own_district.authorize_node(&tree, submission_unit)?;
    let t = plan_approve(
        SubmissionStatus::DistrictPending,
        AdminLevel::District,
        AdminLevel::District,
    )?;
    assert_eq!(t.status, SubmissionStatus::DivisionPending);

    let other_district = resolve_scope(&common::district_admin(2, 21, 211), &tree)?;
    assert!(matches!(
        other_district.authorize_node(&tree, submission_unit),
        Err(ScopeError::AccessDenied(NodeRef::Unit(1111)))
    ));
    Ok(())
}

#[test]
fn status_strings_round_trip_through_storage_form() {
    let all = [
        SubmissionStatus::Draft,
        SubmissionStatus::DistrictPending,
        SubmissionStatus::DivisionPending,
        SubmissionStatus::RegionPending,
        SubmissionStatus::NationwidePending,
        SubmissionStatus::UnitReturned,
        SubmissionStatus::DistrictReturned,
        SubmissionStatus::DivisionReturned,
        SubmissionStatus::RegionReturned,
        SubmissionStatus::Completed,
    ];
    for status in all {
        assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(SubmissionStatus::parse("draft"), Some(SubmissionStatus::Draft));
    assert_eq!(
        SubmissionStatus::parse("district_pending"),
        Some(SubmissionStatus::DistrictPending)
    );
    assert_eq!(SubmissionStatus::parse("approved"), None);
}
