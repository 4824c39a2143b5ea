use serde::{Deserialize, Serialize};

use crate::hierarchy::AdminLevel;

/// Lifecycle state of a submission.
///
/// The forward chain is draft -> district_pending -> division_pending ->
/// region_pending -> nationwide_pending -> completed. A return from a
/// review level parks the submission in the returned state one level
/// below the reviewer; only resubmission re-enters the forward chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    DistrictPending,
    DivisionPending,
    RegionPending,
    NationwidePending,
    UnitReturned,
    DistrictReturned,
    DivisionReturned,
    RegionReturned,
    Completed,
}

impl SubmissionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "district_pending" => Some(Self::DistrictPending),
            "division_pending" => Some(Self::DivisionPending),
            "region_pending" => Some(Self::RegionPending),
            "nationwide_pending" => Some(Self::NationwidePending),
            "unit_returned" => Some(Self::UnitReturned),
            "district_returned" => Some(Self::DistrictReturned),
            "division_returned" => Some(Self::DivisionReturned),
            "region_returned" => Some(Self::RegionReturned),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::DistrictPending => "district_pending",
            Self::DivisionPending => "division_pending",
            Self::RegionPending => "region_pending",
            Self::NationwidePending => "nationwide_pending",
            Self::UnitReturned => "unit_returned",
            Self::DistrictReturned => "district_returned",
            Self::DivisionReturned => "division_returned",
            Self::RegionReturned => "region_returned",
            Self::Completed => "completed",
        }
    }

    /// The review level this status is awaiting, for pending states.
    #[must_use]
    pub fn pending_at(&self) -> Option<AdminLevel> {
        match self {
            Self::DistrictPending => Some(AdminLevel::District),
            Self::DivisionPending => Some(AdminLevel::Division),
            Self::RegionPending => Some(AdminLevel::Region),
            Self::NationwidePending => Some(AdminLevel::Nationwide),
            _ => None,
        }
    }

    /// The level a returned submission was sent back to.
    #[must_use]
    pub fn returned_to(&self) -> Option<AdminLevel> {
        match self {
            Self::UnitReturned => Some(AdminLevel::Unit),
            Self::DistrictReturned => Some(AdminLevel::District),
            Self::DivisionReturned => Some(AdminLevel::Division),
            Self::RegionReturned => Some(AdminLevel::Region),
            _ => None,
        }
    }

    /// Pending state for a review level. None for unit, which never reviews.
    #[must_use]
    pub fn pending_at_level(level: AdminLevel) -> Option<Self> {
        match level {
            AdminLevel::District => Some(Self::DistrictPending),
            AdminLevel::Division => Some(Self::DivisionPending),
            AdminLevel::Region => Some(Self::RegionPending),
            AdminLevel::Nationwide => Some(Self::NationwidePending),
            AdminLevel::Unit => None,
        }
    }

    /// Returned state for the level a submission is sent back to.
    /// None for nationwide, which nothing can return to.
    #[must_use]
    pub fn returned_to_level(level: AdminLevel) -> Option<Self> {
        match level {
            AdminLevel::Unit => Some(Self::UnitReturned),
            AdminLevel::District => Some(Self::DistrictReturned),
            AdminLevel::Division => Some(Self::DivisionReturned),
            AdminLevel::Region => Some(Self::RegionReturned),
            AdminLevel::Nationwide => None,
        }
    }

    /// Drafts and returned submissions are editable by the owning unit.
    #[must_use]
    pub fn is_editable_by_unit(&self) -> bool {
        *self == Self::Draft || self.returned_to().is_some()
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SubmissionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown submission status: {value}"))
    }
}

/// Outcome recorded on a review decision row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
    Returned,
}

impl ReviewOutcome {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Returned => "returned",
        }
    }
}

impl std::fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ReviewOutcome {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown review outcome: {value}"))
    }
}
