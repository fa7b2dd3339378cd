//! ============================================================================
//! Tier Types - Membership tiers and the access comparison rule
//! ============================================================================
//! Defines the four membership tiers, their explicit rank table, and the
//! rule deciding whether a user's tier meets an event's required tier.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::TierPassError;

/// Membership tiers, lowest to highest.
///
/// Serialized as the lowercase name. Deserialization goes through
/// [`FromStr`], so every input path accepts the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tier {
    /// Default tier on account creation
    #[default]
    Free,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Every tier in rank order
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Silver, Tier::Gold, Tier::Platinum];

    /// Get the numeric rank for comparison
    pub fn rank(&self) -> u8 {
        match self {
            Tier::Free => 1,
            Tier::Silver => 2,
            Tier::Gold => 3,
            Tier::Platinum => 4,
        }
    }

    /// Check if this tier meets the tier an event requires
    pub fn can_access(&self, required: Tier) -> bool {
        self.rank() >= required.rank()
    }

    /// Lowercase wire name ("free", "silver", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }

    /// Get human-readable tier name
    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }

    /// Styling key attached to tier badges
    pub fn badge_class(&self) -> &'static str {
        match self {
            Tier::Free => "tier-free",
            Tier::Silver => "tier-silver",
            Tier::Gold => "tier-gold",
            Tier::Platinum => "tier-platinum",
        }
    }

    /// Benefits advertised for this tier
    pub fn perks(&self) -> &'static [&'static str] {
        match self {
            Tier::Free => &["Community events", "Basic workshops", "Monthly newsletters"],
            Tier::Silver => &[
                "All Free features",
                "Advanced workshops",
                "Networking events",
                "Priority support",
            ],
            Tier::Gold => &[
                "All Silver features",
                "Masterclasses",
                "VIP networking",
                "Expert consultations",
            ],
            Tier::Platinum => &[
                "All Gold features",
                "Exclusive galas",
                "CEO roundtables",
                "Personal concierge",
            ],
        }
    }

    /// The next tier up, if any
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Free => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => None,
        }
    }

    pub fn is_max(&self) -> bool {
        self.next().is_none()
    }
}

/// Free-function form of [`Tier::can_access`]
pub fn can_access(user_tier: Tier, event_tier: Tier) -> bool {
    user_tier.can_access(event_tier)
}

/// Tiers a user on `current` may upgrade to, in rank order
pub fn upgrade_options(current: Tier) -> Vec<Tier> {
    Tier::ALL
        .into_iter()
        .filter(|t| t.rank() > current.rank())
        .collect()
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierPassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            _ => Err(TierPassError::InvalidTierValue(s.to_string())),
        }
    }
}

impl TryFrom<String> for Tier {
    type Error = TierPassError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
