//! ============================================================================
//! Event Store - Fetches the full event collection, ordered by date
//! ============================================================================
//! Reads the `events` table from the data service's REST endpoint in one
//! call ("select all, order by event_date ascending"). No pagination.
//! ============================================================================

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::{Event, EventRow};
use crate::config::AppConfig;
use crate::error::{body_snippet, Result, TierPassError};

/// Default table holding event listings
pub const DEFAULT_EVENTS_TABLE: &str = "events";

/// Read-only source of event listings
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch every event, ascending by scheduled date-time.
    /// Zero rows is an empty vector, not an error.
    async fn fetch_events(&self) -> Result<Vec<Event>>;
}

/// Event store backed by the data service's REST API
pub struct SupabaseEventStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    table: String,
}

impl SupabaseEventStore {
    /// Create a store for the given project URL and anon key
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        Self::with_options(base_url, anon_key, DEFAULT_EVENTS_TABLE, Duration::from_secs(10))
    }

    /// Create with a custom table name and request timeout
    pub fn with_options(
        base_url: &str,
        anon_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TierPassError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            table: table.to_string(),
        })
    }

    /// Create from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let (url, key) = config.supabase_credentials()?;
        Self::with_options(url, key, &config.events_table, config.http_timeout)
    }

    /// Full query URL for the events table
    pub fn query_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=*&order=event_date.asc",
            self.base_url, self.table
        )
    }
}

#[async_trait]
impl EventSource for SupabaseEventStore {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        let url = self.query_url();
        debug!("Fetching events from {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TierPassError::RemoteFetch(format!("Failed to reach event service: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TierPassError::RemoteFetch(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!("Event service returned {}", status);
            return Err(TierPassError::RemoteFetch(format!(
                "Event service error ({}): {}",
                status,
                body_snippet(&body)
            )));
        }

        let events = parse_events(&body)?;
        info!("Fetched {} events", events.len());
        Ok(events)
    }
}

/// Parse a JSON array of event rows and sort it by date.
/// The sort is stable so rows sharing a date keep the service's order.
pub fn parse_events(body: &str) -> Result<Vec<Event>> {
    let rows: Vec<EventRow> = serde_json::from_str(body).map_err(|e| {
        TierPassError::RemoteFetch(format!("Failed to parse events: {} - body: {}", e, body_snippet(body)))
    })?;

    let mut events = rows
        .into_iter()
        .map(EventRow::into_event)
        .collect::<Result<Vec<_>>>()?;
    events.sort_by_key(|e| e.event_date);
    Ok(events)
}

/// In-memory event source for demo mode and tests
#[derive(Clone, Default)]
pub struct StaticEventSource {
    events: Arc<RwLock<Vec<Event>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl StaticEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the stored events (simulates an external update)
    pub async fn set_events(&self, events: Vec<Event>) {
        *self.events.write().await = events;
    }

    /// Make subsequent fetches fail with the given reason (None to recover)
    pub async fn set_failure(&self, reason: Option<&str>) {
        *self.failure.write().await = reason.map(str::to_string);
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(TierPassError::RemoteFetch(reason.clone()));
        }
        let mut events = self.events.read().await.clone();
        events.sort_by_key(|e| e.event_date);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Tier;

    const BODY: &str = r#"[
        {"id":"b","title":"Later","description":"d","event_date":"2030-02-01T10:00:00+00:00",
         "image_url":"https://x/b.jpg","tier":"gold","created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"},
        {"id":"a","title":"Sooner","description":null,"event_date":"2030-01-01T10:00:00+00:00",
         "image_url":"https://x/a.jpg","tier":"free","created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}
    ]"#;

    #[test]
    fn test_query_url() {
        let store = SupabaseEventStore::new("https://proj.supabase.co/", "anon").unwrap();
        assert_eq!(
            store.query_url(),
            "https://proj.supabase.co/rest/v1/events?select=*&order=event_date.asc"
        );
    }

    #[test]
    fn test_parse_events_sorts_by_date() {
        let events = parse_events(BODY).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "a");
        assert_eq!(events[0].tier, Tier::Free);
        assert_eq!(events[0].description, "");
        assert_eq!(events[1].id, "b");
    }

    #[test]
    fn test_parse_empty_collection() {
        assert!(parse_events("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_tier() {
        let body = BODY.replace("\"gold\"", "\"diamond\"");
        let err = parse_events(&body).unwrap_err();
        assert_eq!(err, TierPassError::InvalidTierValue("diamond".into()));
    }

    #[test]
    fn test_parse_garbage_is_fetch_error() {
        let err = parse_events("{\"message\":\"nope\"}").unwrap_err();
        assert!(matches!(err, TierPassError::RemoteFetch(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_fetch_error() {
        let store = SupabaseEventStore::with_options(
            "http://127.0.0.1:9",
            "anon",
            DEFAULT_EVENTS_TABLE,
            Duration::from_secs(2),
        )
        .unwrap();
        let err = store.fetch_events().await.unwrap_err();
        assert!(matches!(err, TierPassError::RemoteFetch(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_static_source_failure_toggle() {
        let source = StaticEventSource::new(parse_events(BODY).unwrap());
        assert_eq!(source.fetch_events().await.unwrap().len(), 2);

        source.set_failure(Some("offline")).await;
        assert!(source.fetch_events().await.is_err());

        source.set_failure(None).await;
        assert_eq!(source.fetch_events().await.unwrap().len(), 2);
    }
}
