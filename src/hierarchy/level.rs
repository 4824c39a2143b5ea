use serde::{Deserialize, Serialize};

/// Administrative level in the organizational hierarchy.
///
/// Levels are ordered from lowest to highest authority. The discriminant
/// doubles as the role-assignment rank: an administrator may only assign
/// levels numerically at or below its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    /// Reporting unit; owns drafts, holds no review authority.
    Unit = 1,
    /// First review level.
    District = 2,
    /// Second review level.
    Division = 3,
    /// Third review level.
    Region = 4,
    /// Final review level.
    Nationwide = 5,
}

impl AdminLevel {
    /// Parse a level from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unit" => Some(Self::Unit),
            "district" => Some(Self::District),
            "division" => Some(Self::Division),
            "region" => Some(Self::Region),
            "nationwide" => Some(Self::Nationwide),
            _ => None,
        }
    }

    /// Storage/display string for the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::District => "district",
            Self::Division => "division",
            Self::Region => "region",
            Self::Nationwide => "nationwide",
        }
    }

    /// Numeric rank, nationwide=5 down to unit=1.
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// The level one step up the chain, or `None` above nationwide.
    #[must_use]
    pub fn above(&self) -> Option<Self> {
        match self {
            Self::Unit => Some(Self::District),
            Self::District => Some(Self::Division),
            Self::Division => Some(Self::Region),
            Self::Region => Some(Self::Nationwide),
            Self::Nationwide => None,
        }
    }

    /// The level one step down the chain, or `None` below unit.
    #[must_use]
    pub fn below(&self) -> Option<Self> {
        match self {
            Self::Unit => None,
            Self::District => Some(Self::Unit),
            Self::Division => Some(Self::District),
            Self::Region => Some(Self::Division),
            Self::Nationwide => Some(Self::Region),
        }
    }

    /// True for levels that sit in the review chain (everything above unit).
    #[must_use]
    pub fn is_review_level(&self) -> bool {
        !matches!(self, Self::Unit)
    }

    /// All levels, lowest first.
    pub const ALL: [AdminLevel; 5] = [
        AdminLevel::Unit,
        AdminLevel::District,
        AdminLevel::Division,
        AdminLevel::Region,
        AdminLevel::Nationwide,
    ];
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AdminLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown admin level: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_rank() {
        assert!(AdminLevel::Unit < AdminLevel::District);
        assert!(AdminLevel::District < AdminLevel::Division);
        assert!(AdminLevel::Division < AdminLevel::Region);
        assert!(AdminLevel::Region < AdminLevel::Nationwide);
        assert_eq!(AdminLevel::Nationwide.rank(), 5);
        assert_eq!(AdminLevel::Unit.rank(), 1);
    }

    #[test]
    fn above_and_below_are_inverse() {
        for level in AdminLevel::ALL {
            if let Some(up) = level.above() {
                assert_eq!(up.below(), Some(level));
            }
            if let Some(down) = level.below() {
                assert_eq!(down.above(), Some(level));
            }
        }
        assert_eq!(AdminLevel::Nationwide.above(), None);
        assert_eq!(AdminLevel::Unit.below(), None);
    }

    #[test]
    fn parse_round_trips() {
        for level in AdminLevel::ALL {
            assert_eq!(AdminLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(AdminLevel::parse("galaxy"), None);
    }
}
