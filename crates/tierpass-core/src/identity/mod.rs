//! ============================================================================
//! Identity Module - Where a user's tier lives
//! ============================================================================
//! The identity provider owns the user profile; this crate only reads the
//! `tier` metadata key and writes it back on upgrade.
//!
//! ## Providers
//! - **ClerkIdentity**: backend REST API of the hosted identity service
//! - **InMemoryIdentity**: map-backed provider for demo mode and tests
//! ============================================================================

mod clerk;
mod memory;

pub use clerk::{tier_from_metadata, ClerkIdentity, TIER_METADATA_KEY};
pub use memory::InMemoryIdentity;

use async_trait::async_trait;

use crate::access::Tier;
use crate::error::Result;

/// Read/write access to the tier stored on a user profile
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current tier for the user. Absent metadata means the default tier.
    async fn current_tier(&self, user_id: &str) -> Result<Tier>;

    /// Persist a new tier for the user
    async fn set_tier(&self, user_id: &str, tier: Tier) -> Result<()>;
}
