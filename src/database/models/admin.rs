use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::hierarchy::{AdminLevel, NodeRef};
use crate::policy::CapabilityOverrides;

/// Account status. Deactivation is terminal; rows are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Inactive,
    Suspended,
}

impl AdminStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AdminStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown admin status: {value}"))
    }
}

/// An administrator account anchored to one node of the hierarchy.
///
/// The geographic foreign keys at-or-above the account's level anchor its
/// scope; which of them must be populated depends on `level` and is
/// validated by the scope resolver, not by storage constraints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Administrator {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    #[sqlx(try_from = "String")]
    pub level: AdminLevel,
    pub region_id: Option<i64>,
    pub division_id: Option<i64>,
    pub district_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub can_create_admins: Option<bool>,
    pub can_manage_admins: Option<bool>,
    pub can_set_deadlines: Option<bool>,
    pub can_approve_submissions: Option<bool>,
    pub can_view_system_logs: Option<bool>,
    #[sqlx(try_from = "String")]
    pub status: AdminStatus,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Administrator {
    /// The account's anchor node at its own level. `None` for nationwide
    /// accounts (their scope is unrestricted) and for accounts whose
    /// anchor column is missing, which the scope resolver rejects.
    #[must_use]
    pub fn anchor(&self) -> Option<NodeRef> {
        match self.level {
            AdminLevel::Nationwide => None,
            AdminLevel::Region => self.region_id.map(NodeRef::Region),
            AdminLevel::Division => self.division_id.map(NodeRef::Division),
            AdminLevel::District => self.district_id.map(NodeRef::District),
            AdminLevel::Unit => self.unit_id.map(NodeRef::Unit),
        }
    }

    /// Stored capability flags as a narrowing override set.
    #[must_use]
    pub fn capability_overrides(&self) -> CapabilityOverrides {
        CapabilityOverrides {
            create_administrators: self.can_create_admins,
            manage_administrators: self.can_manage_admins,
            set_deadlines: self.can_set_deadlines,
            approve_submissions: self.can_approve_submissions,
            view_system_logs: self.can_view_system_logs,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AdminStatus::Active
    }
}
