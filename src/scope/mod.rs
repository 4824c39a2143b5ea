use thiserror::Error;

use crate::database::models::Administrator;
use crate::hierarchy::{AdminLevel, GeoError, GeographicTree, NodeRef};

/// Errors from scope resolution and access checks
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Administrator {email} has no {level} anchor")]
    MissingAnchor { email: String, level: AdminLevel },

    #[error("Administrator {email} anchor {anchor:?} does not match its {level} assignment")]
    InconsistentAnchor { email: String, anchor: NodeRef, level: AdminLevel },

    #[error("Access denied to {0:?}")]
    AccessDenied(NodeRef),

    #[error("Access denied to administrator {0}")]
    AdminAccessDenied(String),

    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// The closed subtree an administrator may act on.
///
/// Resolved fresh from current administrator state on every mutating
/// call; never cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Nationwide administrators see everything.
    Unrestricted,
    /// Everyone else sees their anchor node and its descendants.
    Subtree { anchor: NodeRef },
}

impl Scope {
    /// True iff `node` is the anchor or one of its descendants.
    pub fn can_access_node(&self, tree: &GeographicTree, node: NodeRef) -> Result<bool, GeoError> {
        match self {
            Self::Unrestricted => {
                if tree.contains(node) {
                    Ok(true)
                } else {
                    // Unknown nodes are never accessible, even nationwide
                    Ok(false)
                }
            }
            Self::Subtree { anchor } => tree.is_self_or_descendant(node, *anchor),
        }
    }

    /// True iff the other administrator's own anchor falls inside this
    /// scope. Nationwide accounts are only visible to an unrestricted
    /// scope.
    pub fn can_access_admin(
        &self,
        tree: &GeographicTree,
        other: &Administrator,
    ) -> Result<bool, GeoError> {
        match self {
            Self::Unrestricted => Ok(true),
            Self::Subtree { .. } => match other.anchor() {
                Some(anchor) => self.can_access_node(tree, anchor),
                None => Ok(false),
            },
        }
    }

    /// Access check that surfaces denial as an error instead of an empty
    /// result, so scope-bypass bugs cannot hide behind empty lists.
    pub fn authorize_node(&self, tree: &GeographicTree, node: NodeRef) -> Result<(), ScopeError> {
        if self.can_access_node(tree, node)? {
            Ok(())
        } else {
            Err(ScopeError::AccessDenied(node))
        }
    }

    pub fn authorize_admin(
        &self,
        tree: &GeographicTree,
        other: &Administrator,
    ) -> Result<(), ScopeError> {
        if self.can_access_admin(tree, other)? {
            Ok(())
        } else {
            Err(ScopeError::AdminAccessDenied(other.email.clone()))
        }
    }

    /// All unit ids inside this scope, sorted.
    pub fn units(&self, tree: &GeographicTree) -> Result<Vec<i64>, GeoError> {
        match self {
            Self::Unrestricted => Ok(tree.all_units()),
            Self::Subtree { anchor } => tree.units_under(*anchor),
        }
    }
}

/// Resolve an administrator's scope against a tree snapshot.
///
/// Validates that the anchor exists and that the stored ancestor columns
/// agree with the tree's parent chain; an account whose columns disagree
/// with the hierarchy resolves to an error, never to a wider scope.
pub fn resolve_scope(admin: &Administrator, tree: &GeographicTree) -> Result<Scope, ScopeError> {
    if admin.level == AdminLevel::Nationwide {
        return Ok(Scope::Unrestricted);
    }

    let anchor = admin.anchor().ok_or_else(|| ScopeError::MissingAnchor {
        email: admin.email.clone(),
        level: admin.level,
    })?;
    if !tree.contains(anchor) {
        return Err(ScopeError::Geo(match anchor {
            NodeRef::Region(id) => GeoError::UnknownRegion(id),
            NodeRef::Division(id) => GeoError::UnknownDivision(id),
            NodeRef::District(id) => GeoError::UnknownDistrict(id),
            NodeRef::Unit(id) => GeoError::UnknownUnit(id),
        }));
    }

    // Every populated ancestor column above the anchor must lie on the
    // anchor's actual parent chain.
    let stored = [
        (AdminLevel::Region, admin.region_id.map(NodeRef::Region)),
        (AdminLevel::Division, admin.division_id.map(NodeRef::Division)),
        (AdminLevel::District, admin.district_id.map(NodeRef::District)),
    ];
    for (level, stored_node) in stored {
        if level <= anchor.level() {
            continue;
        }
        if let Some(node) = stored_node {
            if tree.ancestor_at(anchor, level)? != Some(node) {
                return Err(ScopeError::InconsistentAnchor {
                    email: admin.email.clone(),
                    anchor: node,
                    level,
                });
            }
        }
    }

    Ok(Scope::Subtree { anchor })
}
