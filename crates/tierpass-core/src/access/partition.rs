//! ============================================================================
//! Access Partitioner - Splits events by whether a tier can view them
//! ============================================================================
//! Pure function of (events, tier, now). Recomputed on every tier change or
//! event refresh; nothing here is cached.
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Tier;
use crate::events::Event;

/// Dashboard summary counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_events: usize,
    pub accessible_events: usize,
    pub restricted_events: usize,
    /// Accessible events scheduled strictly after the evaluation instant
    pub upcoming_events: usize,
}

/// Events split into what `tier` may view and what it may not.
/// Both halves keep the input's date order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPartition {
    pub tier: Tier,
    pub accessible: Vec<Event>,
    pub restricted: Vec<Event>,
    pub stats: DashboardStats,
}

impl AccessPartition {
    /// Number of events an upgrade could unlock
    pub fn unlockable_count(&self) -> usize {
        self.restricted.len()
    }

    /// Lowest tier that would unlock at least one restricted event
    pub fn cheapest_unlock(&self) -> Option<Tier> {
        self.restricted.iter().map(|e| e.tier).min()
    }

    /// Restricted events that upgrading to `target` would unlock
    pub fn unlocked_by(&self, target: Tier) -> usize {
        self.restricted
            .iter()
            .filter(|e| target.can_access(e.tier))
            .count()
    }
}

/// Partition `events` for a user on `tier`, evaluated at `now`
pub fn partition(events: &[Event], tier: Tier, now: DateTime<Utc>) -> AccessPartition {
    let (accessible, restricted): (Vec<Event>, Vec<Event>) = events
        .iter()
        .cloned()
        .partition(|event| tier.can_access(event.tier));

    let stats = summarize(events.len(), &accessible, &restricted, now);

    AccessPartition {
        tier,
        accessible,
        restricted,
        stats,
    }
}

fn summarize(
    total: usize,
    accessible: &[Event],
    restricted: &[Event],
    now: DateTime<Utc>,
) -> DashboardStats {
    DashboardStats {
        total_events: total,
        accessible_events: accessible.len(),
        restricted_events: restricted.len(),
        upcoming_events: accessible.iter().filter(|e| e.is_upcoming(now)).count(),
    }
}
