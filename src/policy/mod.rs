use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hierarchy::AdminLevel;

/// Errors from permission checks
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Action requires the '{0}' capability")]
    CapabilityMissing(Capability),

    #[error("A {assigner} administrator cannot assign the {target} level")]
    AssignmentAboveLevel { assigner: AdminLevel, target: AdminLevel },
}

/// Capability flags an administrator may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateAdministrators,
    ManageAdministrators,
    SetDeadlines,
    ApproveSubmissions,
    ViewSystemLogs,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateAdministrators => "create-administrators",
            Self::ManageAdministrators => "manage-administrators",
            Self::SetDeadlines => "set-deadlines",
            Self::ApproveSubmissions => "approve-submissions",
            Self::ViewSystemLogs => "view-system-logs",
        };
        f.write_str(s)
    }
}

/// A concrete set of capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub create_administrators: bool,
    pub manage_administrators: bool,
    pub set_deadlines: bool,
    pub approve_submissions: bool,
    pub view_system_logs: bool,
}

impl CapabilitySet {
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateAdministrators => self.create_administrators,
            Capability::ManageAdministrators => self.manage_administrators,
            Capability::SetDeadlines => self.set_deadlines,
            Capability::ApproveSubmissions => self.approve_submissions,
            Capability::ViewSystemLogs => self.view_system_logs,
        }
    }
}

/// Per-administrator stored flags. `None` inherits the level default;
/// `Some(false)` narrows. A stored `true` is intersected with the level
/// default so it can never widen beyond it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityOverrides {
    pub create_administrators: Option<bool>,
    pub manage_administrators: Option<bool>,
    pub set_deadlines: Option<bool>,
    pub approve_submissions: Option<bool>,
    pub view_system_logs: Option<bool>,
}

/// Immutable level-default capability table.
///
/// This table is authoritative; stored per-administrator flags only
/// narrow it.
#[must_use]
pub fn level_defaults(level: AdminLevel) -> CapabilitySet {
    match level {
        AdminLevel::Nationwide => CapabilitySet {
            create_administrators: true,
            manage_administrators: true,
            set_deadlines: true,
            approve_submissions: true,
            view_system_logs: true,
        },
        AdminLevel::Region => CapabilitySet {
            create_administrators: false,
            manage_administrators: false,
            set_deadlines: true,
            approve_submissions: true,
            view_system_logs: true,
        },
        AdminLevel::Division => CapabilitySet {
            create_administrators: true,
            manage_administrators: true,
            set_deadlines: false,
            approve_submissions: true,
            view_system_logs: false,
        },
        AdminLevel::District => CapabilitySet {
            create_administrators: false,
            manage_administrators: false,
            set_deadlines: false,
            approve_submissions: true,
            view_system_logs: false,
        },
        AdminLevel::Unit => CapabilitySet::default(),
    }
}

/// Effective capabilities: the level default narrowed by stored flags.
#[must_use]
pub fn effective_capabilities(level: AdminLevel, overrides: &CapabilityOverrides) -> CapabilitySet {
    let defaults = level_defaults(level);
    CapabilitySet {
        create_administrators: defaults.create_administrators
            && overrides.create_administrators.unwrap_or(true),
        manage_administrators: defaults.manage_administrators
            && overrides.manage_administrators.unwrap_or(true),
        set_deadlines: defaults.set_deadlines && overrides.set_deadlines.unwrap_or(true),
        approve_submissions: defaults.approve_submissions
            && overrides.approve_submissions.unwrap_or(true),
        view_system_logs: defaults.view_system_logs && overrides.view_system_logs.unwrap_or(true),
    }
}

/// Highest level an administrator at `level` may create or assign.
#[must_use]
pub fn max_assignable_level(level: AdminLevel) -> AdminLevel {
    level
}

/// Enforce the role-assignment ceiling, independent of any flag override.
pub fn ensure_can_assign(assigner: AdminLevel, target: AdminLevel) -> Result<(), PolicyError> {
    if target > max_assignable_level(assigner) {
        return Err(PolicyError::AssignmentAboveLevel { assigner, target });
    }
    Ok(())
}

/// Enforce a capability on an effective set.
pub fn ensure_capability(set: &CapabilitySet, capability: Capability) -> Result<(), PolicyError> {
    if !set.contains(capability) {
        return Err(PolicyError::CapabilityMissing(capability));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nationwide_holds_everything() {
        let caps = level_defaults(AdminLevel::Nationwide);
        for c in [
            Capability::CreateAdministrators,
            Capability::ManageAdministrators,
            Capability::SetDeadlines,
            Capability::ApproveSubmissions,
            Capability::ViewSystemLogs,
        ] {
            assert!(caps.contains(c));
        }
    }

    #[test]
    fn level_default_table() {
        let region = level_defaults(AdminLevel::Region);
        assert!(!region.create_administrators);
        assert!(region.set_deadlines && region.approve_submissions && region.view_system_logs);

        let division = level_defaults(AdminLevel::Division);
        assert!(division.create_administrators && division.manage_administrators);
        assert!(division.approve_submissions);
        assert!(!division.set_deadlines && !division.view_system_logs);

        let district = level_defaults(AdminLevel::District);
        assert!(district.approve_submissions);
        assert!(!district.create_administrators && !district.view_system_logs);

        assert_eq!(level_defaults(AdminLevel::Unit), CapabilitySet::default());
    }

    #[test]
    fn overrides_narrow_but_never_widen() {
        let narrowed = effective_capabilities(
            AdminLevel::Division,
            &CapabilityOverrides { approve_submissions: Some(false), ..Default::default() },
        );
        assert!(!narrowed.approve_submissions);
        assert!(narrowed.create_administrators);

        // A stored true cannot grant what the level lacks
        let widened = effective_capabilities(
            AdminLevel::Unit,
            &CapabilityOverrides {
                create_administrators: Some(true),
                approve_submissions: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(widened, CapabilitySet::default());
    }

    #[test]
    fn assignment_ceiling_is_own_level() {
        for level in AdminLevel::ALL {
            assert_eq!(max_assignable_level(level), level);
            assert!(ensure_can_assign(level, level).is_ok());
            if let Some(above) = level.above() {
                assert!(matches!(
                    ensure_can_assign(level, above),
                    Err(PolicyError::AssignmentAboveLevel { .. })
                ));
            }
            if let Some(below) = level.below() {
                assert!(ensure_can_assign(level, below).is_ok());
            }
        }
    }
}
