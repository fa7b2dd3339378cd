//! ============================================================================
//! TIERPASS-CORE: Tier-gated event access
//! ============================================================================
//! This crate handles all logic behind the TierPass dashboard:
//! - Membership tiers and the access comparison rule
//! - Event listings fetched from the data service, ordered by date
//! - Accessible/restricted partition and dashboard stats
//! - Tier upgrades persisted through the identity provider
//! ============================================================================

pub mod access;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod format;
pub mod identity;

// Re-export main types for convenience
pub use access::{
    can_access, partition, upgrade_options, AccessPartition, DashboardStats, Tier, TierUpgrader,
    UpgradeReceipt,
};
pub use config::AppConfig;
pub use dashboard::{DashboardSession, DashboardView, Notice};
pub use error::{Result, TierPassError};
pub use events::{
    demo_events, Event, EventSource, StaticEventSource, SupabaseEventStore, DEFAULT_EVENTS_TABLE,
};
pub use identity::{ClerkIdentity, IdentityProvider, InMemoryIdentity};
