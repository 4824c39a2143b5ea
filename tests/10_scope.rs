mod common;

use anyhow::Result;

use census_api_rust::hierarchy::{AdminLevel, NodeRef};
use census_api_rust::policy::{
    effective_capabilities, ensure_can_assign, ensure_capability, Capability, PolicyError,
};
use census_api_rust::scope::{resolve_scope, Scope, ScopeError};

#[test]
fn division_admin_reaches_own_districts_and_units_only() -> Result<()> {
    let tree = common::sample_tree();
    let admin = common::division_admin(1, 11);
    let scope = resolve_scope(&admin, &tree)?;

    for inside in [
        NodeRef::Division(11),
        NodeRef::District(111),
        NodeRef::District(112),
        NodeRef::Unit(1111),
        NodeRef::Unit(1112),
        NodeRef::Unit(1121),
    ] {
        scope.authorize_node(&tree, inside)?;
    }

    // Sibling division, own region, and the other region are all out.
    for outside in [
        NodeRef::Division(12),
        NodeRef::District(121),
        NodeRef::Unit(1211),
        NodeRef::Region(1),
        NodeRef::Region(2),
        NodeRef::Unit(2111),
    ] {
        assert!(
            matches!(scope.authorize_node(&tree, outside), Err(ScopeError::AccessDenied(n)) if n == outside),
            "{outside:?} should be denied"
        );
    }
    Ok(())
}

#[test]
fn scope_unit_enumeration_per_level() -> Result<()> {
    let tree = common::sample_tree();

    let nationwide = resolve_scope(&common::nationwide_admin(), &tree)?;
    assert_eq!(nationwide, Scope::Unrestricted);
    assert_eq!(nationwide.units(&tree)?, vec![1111, 1112, 1121, 1211, 2111]);

    let region = resolve_scope(&common::region_admin(1), &tree)?;
    assert_eq!(region.units(&tree)?, vec![1111, 1112, 1121, 1211]);

    let district = resolve_scope(&common::district_admin(1, 11, 112), &tree)?;
    assert_eq!(district.units(&tree)?, vec![1121]);

    let unit = resolve_scope(&common::unit_admin(2, 21, 211, 2111), &tree)?;
    assert_eq!(unit.units(&tree)?, vec![2111]);
    Ok(())
}

#[test]
fn account_creation_stays_inside_scope_and_below_ceiling() -> Result<()> {
    let tree = common::sample_tree();
    let creator = common::division_admin(1, 11);
    let creator_scope = resolve_scope(&creator, &tree)?;

    let caps = effective_capabilities(creator.level, &creator.capability_overrides());
    ensure_capability(&caps, Capability::CreateAdministrators)?;

    // A district account under the creator's division is assignable.
    let in_scope = common::district_admin(1, 11, 111);
    ensure_can_assign(creator.level, in_scope.level)?;
    creator_scope.authorize_admin(&tree, &in_scope)?;

    // Same level elsewhere in the tree is a scope failure, not a level one.
    let sibling = common::district_admin(1, 12, 121);
    ensure_can_assign(creator.level, sibling.level)?;
    assert!(matches!(
        creator_scope.authorize_admin(&tree, &sibling),
        Err(ScopeError::AdminAccessDenied(_))
    ));

    // A region account is above the ceiling regardless of placement.
    assert!(matches!(
        ensure_can_assign(creator.level, AdminLevel::Region),
        Err(PolicyError::AssignmentAboveLevel { .. })
    ));
    Ok(())
}

#[test]
fn stored_flags_narrow_level_defaults_end_to_end() -> Result<()> {
    let mut reviewer = common::district_admin(1, 11, 111);
    let caps = effective_capabilities(reviewer.level, &reviewer.capability_overrides());
    ensure_capability(&caps, Capability::ApproveSubmissions)?;

    reviewer.can_approve_submissions = Some(false);
    let narrowed = effective_capabilities(reviewer.level, &reviewer.capability_overrides());
    assert!(matches!(
        ensure_capability(&narrowed, Capability::ApproveSubmissions),
        Err(PolicyError::CapabilityMissing(Capability::ApproveSubmissions))
    ));

    // A stored true on a unit account grants nothing new.
    let mut clerk = common::unit_admin(1, 11, 111, 1111);
    clerk.can_create_admins = Some(true);
    clerk.can_view_system_logs = Some(true);
    let caps = effective_capabilities(clerk.level, &clerk.capability_overrides());
    assert!(!caps.create_administrators);
    assert!(!caps.view_system_logs);
    Ok(())
}

#[test]
fn misanchored_rows_never_resolve_to_a_scope() {
    let tree = common::sample_tree();

    // District 121 sits under division 12, not 11.
    let crossed = common::district_admin(1, 11, 121);
    assert!(matches!(
        resolve_scope(&crossed, &tree),
        Err(ScopeError::InconsistentAnchor { level: AdminLevel::Division, .. })
    ));

    // Anchor column empty for the account's own level.
    let anchorless = common::admin_at(AdminLevel::Division, Some(1), None, None, None);
    assert!(matches!(
        resolve_scope(&anchorless, &tree),
        Err(ScopeError::MissingAnchor { level: AdminLevel::Division, .. })
    ));

    // Anchor pointing at a node the hierarchy does not know.
    let dangling = common::unit_admin(1, 11, 111, 9999);
    assert!(resolve_scope(&dangling, &tree).is_err());
}

#[test]
fn admin_listing_visibility_matches_anchor_containment() -> Result<()> {
    let tree = common::sample_tree();
    let manager = common::division_admin(1, 11);
    let scope = resolve_scope(&manager, &tree)?;

    let everyone = [
        common::nationwide_admin(),
        common::region_admin(1),
        common::division_admin(1, 11),
        common::district_admin(1, 11, 111),
        common::unit_admin(1, 11, 112, 1121),
        common::district_admin(2, 21, 211),
    ];

    let visible: Vec<&str> = everyone
        .iter()
        .filter(|a| scope.can_access_admin(&tree, a).unwrap_or(false))
        .map(|a| a.email.as_str())
        .collect();

    // Own account, own district heads, own unit clerks. No ancestors,
    // no other subtrees.
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|e| e.starts_with("division")
        || e.starts_with("district")
        || e.starts_with("unit")));
    Ok(())
}
