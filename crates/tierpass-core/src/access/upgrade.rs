//! ============================================================================
//! Tier Upgrader - Persists tier upgrades through the identity provider
//! ============================================================================
//! Only upgrades are offered. The new tier is written to the identity store,
//! then an optional processing delay elapses before the call resolves.
//! Callers apply the tier only after a successful return; on error the
//! prior tier stays authoritative. One upgrade may be in flight at a time.
//! ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::Tier;
use crate::config::AppConfig;
use crate::error::{Result, TierPassError};
use crate::identity::IdentityProvider;

/// Confirmation returned by a successful upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub previous: Tier,
    pub tier: Tier,
}

/// Runs tier upgrades for one session
pub struct TierUpgrader<I: IdentityProvider + ?Sized> {
    identity: Arc<I>,
    processing_delay: Duration,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag however the upgrade ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<I: IdentityProvider + ?Sized> TierUpgrader<I> {
    /// Create an upgrader with no processing delay
    pub fn new(identity: Arc<I>) -> Self {
        Self::with_delay(identity, Duration::ZERO)
    }

    pub fn with_delay(identity: Arc<I>, processing_delay: Duration) -> Self {
        Self {
            identity,
            processing_delay,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn from_config(identity: Arc<I>, config: &AppConfig) -> Self {
        Self::with_delay(identity, config.upgrade_delay)
    }

    /// Whether an upgrade is outstanding (the upgrade control is disabled)
    pub fn is_upgrading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Upgrade `user_id` from `current` to `target`.
    ///
    /// Fails with `UpgradeNotAllowed` unless `target` ranks above `current`,
    /// and with `UpgradeInFlight` if another upgrade has not resolved yet.
    /// Neither case touches the identity store.
    pub async fn upgrade_tier(
        &self,
        user_id: &str,
        current: Tier,
        target: Tier,
    ) -> Result<UpgradeReceipt> {
        if target.rank() <= current.rank() {
            return Err(TierPassError::UpgradeNotAllowed { current, target });
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejected overlapping upgrade for {} to {}", user_id, target);
            return Err(TierPassError::UpgradeInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        info!("Upgrading {} from {} to {}", user_id, current, target);

        if let Err(e) = self.identity.set_tier(user_id, target).await {
            warn!("Upgrade for {} to {} failed: {}", user_id, target, e);
            return Err(match e {
                TierPassError::RemoteMutation(_) => e,
                other => TierPassError::RemoteMutation(other.to_string()),
            });
        }

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        info!("Upgrade confirmed: {} is now {}", user_id, target);
        Ok(UpgradeReceipt {
            previous: current,
            tier: target,
        })
    }
}
