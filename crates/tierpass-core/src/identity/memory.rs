//! In-process identity provider for demo mode and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::IdentityProvider;
use crate::access::Tier;
use crate::error::{Result, TierPassError};

/// Map-backed identity store. Cloning shares the underlying state.
///
/// The map lock is never held across an await, so a blocking lock is used
/// and seeding works on a store that is already shared.
#[derive(Clone, Default)]
pub struct InMemoryIdentity {
    tiers: Arc<RwLock<HashMap<String, Tier>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
    write_latency: Duration,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user with a tier
    pub fn with_user(self, user_id: &str, tier: Tier) -> Self {
        self.tiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), tier);
        self
    }

    /// Delay every write, to widen the window for overlapping requests
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    /// Make subsequent profile reads fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of write attempts that reached the store
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn current_tier(&self, user_id: &str) -> Result<Tier> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TierPassError::ProfileFetch("identity store unavailable".into()));
        }
        Ok(self
            .tiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn set_tier(&self, user_id: &str, tier: Tier) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if !self.write_latency.is_zero() {
            tokio::time::sleep(self.write_latency).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TierPassError::RemoteMutation(
                "identity store rejected the update".into(),
            ));
        }
        self.tiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), tier);
        Ok(())
    }
}
