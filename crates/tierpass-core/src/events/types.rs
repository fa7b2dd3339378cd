//! ============================================================================
//! Event Types - Read-only event records and their wire rows
//! ============================================================================

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Tier;
use crate::error::{Result, TierPassError};

/// An event listing. Created and updated externally; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Scheduled date-time of the event
    pub event_date: DateTime<Utc>,
    pub image_url: String,
    /// Minimum tier required to view the event
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event is scheduled strictly after `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.event_date > now
    }
}

/// Event row as returned by the data service, before validation
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub tier: String,
    pub created_at: String,
    pub updated_at: String,
}

impl EventRow {
    /// Validate the row. An unknown tier is `InvalidTierValue`; anything
    /// else malformed is a fetch failure.
    pub(crate) fn into_event(self) -> Result<Event> {
        let tier: Tier = self.tier.parse()?;
        let event_date = parse_timestamp(&self.event_date)
            .map_err(|e| malformed(&self.id, "event_date", e))?;
        let created_at = parse_timestamp(&self.created_at)
            .map_err(|e| malformed(&self.id, "created_at", e))?;
        let updated_at = parse_timestamp(&self.updated_at)
            .map_err(|e| malformed(&self.id, "updated_at", e))?;

        Ok(Event {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            event_date,
            image_url: self.image_url.unwrap_or_default(),
            tier,
            created_at,
            updated_at,
        })
    }
}

fn malformed(id: &str, field: &str, reason: String) -> TierPassError {
    TierPassError::RemoteFetch(format!("event {} has malformed {}: {}", id, field, reason))
}

/// Parse an RFC 3339 timestamp; zone-less timestamps are taken as UTC
pub(crate) fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("'{}' ({})", raw, e))
}

/// Sample listings spread across all tiers, dated relative to `now`
pub fn demo_events(now: DateTime<Utc>) -> Vec<Event> {
    let created = now - Duration::days(60);
    let make = |id: &str, title: &str, description: &str, offset_days: i64, tier: Tier| Event {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        event_date: now + Duration::days(offset_days),
        image_url: format!("https://images.example.com/events/{}.jpg", id),
        tier,
        created_at: created,
        updated_at: created,
    };

    let mut events = vec![
        make("evt-001", "Community Meetup", "Monthly open meetup for all members.", -10, Tier::Free),
        make("evt-002", "Intro Workshop", "Hands-on basics for newcomers.", 1, Tier::Free),
        make("evt-003", "Advanced Workshop", "Deep dive for experienced members.", 5, Tier::Silver),
        make("evt-004", "Networking Night", "Meet peers across the industry.", 12, Tier::Silver),
        make("evt-005", "Masterclass", "Small-group session with an expert.", 21, Tier::Gold),
        make("evt-006", "VIP Mixer", "Invite-only evening reception.", -3, Tier::Gold),
        make("evt-007", "Annual Gala", "Black-tie gala for platinum members.", 45, Tier::Platinum),
        make("evt-008", "CEO Roundtable", "Closed-door leadership discussion.", 90, Tier::Platinum),
    ];
    events.sort_by_key(|e| e.event_date);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tier: &str, date: &str) -> EventRow {
        EventRow {
            id: "e1".into(),
            title: "Title".into(),
            description: Some("Desc".into()),
            event_date: date.into(),
            image_url: None,
            tier: tier.into(),
            created_at: "2025-01-01T00:00:00Z".into(),
            updated_at: "2025-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_row_into_event() {
        let event = row("gold", "2025-06-01T18:30:00+02:00").into_event().unwrap();
        assert_eq!(event.tier, Tier::Gold);
        assert_eq!(event.event_date.to_rfc3339(), "2025-06-01T16:30:00+00:00");
        assert_eq!(event.image_url, "");
    }

    #[test]
    fn test_row_with_unknown_tier() {
        let err = row("diamond", "2025-06-01T18:30:00Z").into_event().unwrap_err();
        assert_eq!(err, TierPassError::InvalidTierValue("diamond".into()));
    }

    #[test]
    fn test_row_with_bad_date() {
        let err = row("free", "next tuesday").into_event().unwrap_err();
        assert!(matches!(err, TierPassError::RemoteFetch(_)));
    }

    #[test]
    fn test_zoneless_timestamp_is_utc() {
        let dt = parse_timestamp("2025-03-04T05:06:07").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-04T05:06:07+00:00");
        let dt = parse_timestamp("2025-03-04 05:06:07.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_demo_events_sorted_and_cover_all_tiers() {
        let events = demo_events(Utc::now());
        assert!(events.windows(2).all(|w| w[0].event_date <= w[1].event_date));
        for tier in Tier::ALL {
            assert!(events.iter().any(|e| e.tier == tier));
        }
    }
}
