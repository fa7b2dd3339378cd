//! ============================================================================
//! Dashboard Session - One user's tier, events and derived view
//! ============================================================================
//! Wires the pipeline together: identity -> tier, event source -> events,
//! then partition + stats on demand. Remote failures become a `Notice` on
//! the session instead of propagating; the last good event set is kept.
//!
//! Ordering:
//! - a confirmed upgrade is stored before `upgrade` returns, so every
//!   later view is computed against the new tier
//! - fetches are numbered; a fetch that finishes after a newer one started
//!   is dropped (last write wins)
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::access::{partition, upgrade_options, AccessPartition, Tier, TierUpgrader};
use crate::error::TierPassError;
use crate::events::{Event, EventSource};
use crate::identity::IdentityProvider;

/// User-visible error with an optional retry action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub retryable: bool,
    pub error: TierPassError,
}

impl From<TierPassError> for Notice {
    fn from(error: TierPassError) -> Self {
        Self {
            message: error.user_message(),
            retryable: error.is_retryable(),
            error,
        }
    }
}

/// Everything a consumer needs to render the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub user_id: String,
    pub tier: Tier,
    pub partition: AccessPartition,
    pub upgrade_options: Vec<Tier>,
    pub notice: Option<Notice>,
    pub loading: bool,
    pub upgrading: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    tier: Tier,
    events: Vec<Event>,
    notice: Option<Notice>,
    loading: bool,
}

/// Dashboard state for a single signed-in user
pub struct DashboardSession<E, I>
where
    E: EventSource + ?Sized,
    I: IdentityProvider + ?Sized,
{
    user_id: String,
    events: Arc<E>,
    identity: Arc<I>,
    upgrader: TierUpgrader<I>,
    state: RwLock<SessionState>,
    fetch_generation: AtomicU64,
}

impl<E, I> DashboardSession<E, I>
where
    E: EventSource + ?Sized,
    I: IdentityProvider + ?Sized,
{
    pub fn new(user_id: &str, events: Arc<E>, identity: Arc<I>, upgrader: TierUpgrader<I>) -> Self {
        Self {
            user_id: user_id.to_string(),
            events,
            identity,
            upgrader,
            state: RwLock::new(SessionState::default()),
            fetch_generation: AtomicU64::new(0),
        }
    }

    /// Start from a known tier instead of the default
    pub fn with_initial_tier(mut self, tier: Tier) -> Self {
        self.state.get_mut().tier = tier;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn tier(&self) -> Tier {
        self.state.read().await.tier
    }

    /// Read the tier from the identity provider, then fetch events
    pub async fn load(&self) -> DashboardView {
        match self.identity.current_tier(&self.user_id).await {
            Ok(tier) => {
                debug!("Loaded tier {} for {}", tier, self.user_id);
                self.state.write().await.tier = tier;
            }
            Err(e) => {
                warn!("Could not read tier for {}: {}", self.user_id, e);
                self.state.write().await.notice = Some(e.into());
                return self.view().await;
            }
        }
        self.refresh().await
    }

    /// Refetch events. This is the user-initiated retry action.
    pub async fn refresh(&self) -> DashboardView {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let result = self.events.fetch_events().await;

        {
            let mut state = self.state.write().await;
            if generation != self.fetch_generation.load(Ordering::SeqCst) {
                debug!("Discarding stale fetch #{} for {}", generation, self.user_id);
            } else {
                state.loading = false;
                match result {
                    Ok(events) => {
                        info!("Dashboard for {} has {} events", self.user_id, events.len());
                        state.events = events;
                        state.notice = None;
                    }
                    Err(e) => {
                        warn!("Event fetch failed for {}: {}", self.user_id, e);
                        state.notice = Some(e.into());
                    }
                }
            }
        }

        self.view().await
    }

    /// Upgrade to `target`. The session tier changes only after the identity
    /// store confirms; on failure the prior tier stays and a notice is set.
    pub async fn upgrade(&self, target: Tier) -> DashboardView {
        let current = self.tier().await;

        match self.upgrader.upgrade_tier(&self.user_id, current, target).await {
            Ok(receipt) => {
                let confirmed = self.confirm_tier(receipt.tier).await;
                let mut state = self.state.write().await;
                state.tier = confirmed;
                state.notice = None;
            }
            Err(e) => {
                self.state.write().await.notice = Some(e.into());
            }
        }

        self.view().await
    }

    /// Re-read the tier after a confirmed write. The confirmed value wins if
    /// the provider has not caught up yet or the read fails.
    async fn confirm_tier(&self, written: Tier) -> Tier {
        match self.identity.current_tier(&self.user_id).await {
            Ok(read) if read == written => read,
            Ok(read) => {
                warn!(
                    "Identity provider still reports {} for {} after upgrade to {}",
                    read, self.user_id, written
                );
                written
            }
            Err(e) => {
                warn!("Tier re-read failed for {}: {}", self.user_id, e);
                written
            }
        }
    }

    /// Clear the current notice (dismiss)
    pub async fn dismiss_notice(&self) {
        self.state.write().await.notice = None;
    }

    /// Current view evaluated now
    pub async fn view(&self) -> DashboardView {
        self.view_at(Utc::now()).await
    }

    /// Current view evaluated at `now`
    pub async fn view_at(&self, now: DateTime<Utc>) -> DashboardView {
        let state = self.state.read().await;
        DashboardView {
            user_id: self.user_id.clone(),
            tier: state.tier,
            partition: partition(&state.events, state.tier, now),
            upgrade_options: upgrade_options(state.tier),
            notice: state.notice.clone(),
            loading: state.loading,
            upgrading: self.upgrader.is_upgrading(),
        }
    }
}
