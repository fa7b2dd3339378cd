//! ============================================================================
//! Access Module - Tier-gated access to event listings
//! ============================================================================
//! Provides the tier model, the accessible/restricted partition of an event
//! collection, and the upgrade path between tiers.
//!
//! ## Tiers
//! - **Free**: default on account creation
//! - **Silver**: advanced workshops, networking events
//! - **Gold**: masterclasses, VIP networking
//! - **Platinum**: every event
//!
//! Access is granted when `rank(user tier) >= rank(event tier)`. This check
//! runs client-side only; there is no server-side re-validation.
//!
//! ## Usage
//! ```rust,ignore
//! use tierpass_core::access::{partition, Tier};
//!
//! let view = partition(&events, Tier::Gold, chrono::Utc::now());
//! println!("{} of {} events unlocked", view.stats.accessible_events, view.stats.total_events);
//! ```
//! ============================================================================

mod partition;
mod types;
mod upgrade;

pub use partition::{partition, AccessPartition, DashboardStats};
pub use types::{can_access, upgrade_options, Tier};
pub use upgrade::{TierUpgrader, UpgradeReceipt};
