//! ============================================================================
//! Events Module - Read-only access to event listings
//! ============================================================================
//! Fetches the full event collection from the data service, ordered by
//! scheduled date-time. This crate never creates, edits or deletes events.
//!
//! ## Usage
//! ```rust,ignore
//! use tierpass_core::events::{EventSource, SupabaseEventStore};
//!
//! let store = SupabaseEventStore::new("https://project.supabase.co", anon_key)?;
//! let events = store.fetch_events().await?;
//! ```
//! ============================================================================

mod store;
mod types;

pub use store::{parse_events, EventSource, StaticEventSource, SupabaseEventStore, DEFAULT_EVENTS_TABLE};
pub use types::{demo_events, Event};
