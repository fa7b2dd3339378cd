//! End-to-end dashboard flows over in-memory providers.

use chrono::Utc;
use std::sync::Arc;
use tierpass_core::{
    demo_events, DashboardSession, IdentityProvider, InMemoryIdentity, StaticEventSource, Tier,
    TierPassError, TierUpgrader,
};

fn build(
    tier: Tier,
) -> (
    DashboardSession<StaticEventSource, InMemoryIdentity>,
    StaticEventSource,
    Arc<InMemoryIdentity>,
) {
    let source = StaticEventSource::new(demo_events(Utc::now()));
    let identity = Arc::new(InMemoryIdentity::new().with_user("member", tier));
    let session = DashboardSession::new(
        "member",
        Arc::new(source.clone()),
        identity.clone(),
        TierUpgrader::new(identity.clone()),
    );
    (session, source, identity)
}

#[tokio::test]
async fn failed_platinum_upgrade_leaves_gold_in_place() {
    let (session, _, identity) = build(Tier::Gold);
    session.load().await;
    identity.set_fail_writes(true);

    let view = session.upgrade(Tier::Platinum).await;

    assert_eq!(view.tier, Tier::Gold);
    assert_eq!(session.tier().await, Tier::Gold);
    assert!(view.partition.restricted.iter().all(|e| e.tier == Tier::Platinum));
    assert!(!view.partition.restricted.is_empty());
    assert!(matches!(
        view.notice.map(|n| n.error),
        Some(TierPassError::RemoteMutation(_))
    ));
    assert_eq!(identity.current_tier("member").await.unwrap(), Tier::Gold);
}

#[tokio::test]
async fn retry_after_failed_fetch_recovers() {
    let (session, source, _) = build(Tier::Free);
    source.set_failure(Some("connection refused")).await;

    let failed = session.load().await;
    assert_eq!(failed.partition.stats.total_events, 0);
    assert!(failed.notice.as_ref().is_some_and(|n| n.retryable));

    source.set_failure(None).await;
    let recovered = session.refresh().await;
    assert!(recovered.notice.is_none());
    assert_eq!(recovered.partition.stats.total_events, 8);
    assert_eq!(recovered.partition.stats.accessible_events, 2);
}

#[tokio::test]
async fn upgrade_then_partition_reflects_new_tier() {
    let (session, _, _) = build(Tier::Free);
    let before = session.load().await;
    assert_eq!(before.partition.unlockable_count(), 6);

    let after = session.upgrade(Tier::Platinum).await;
    assert_eq!(after.tier, Tier::Platinum);
    assert!(after.partition.restricted.is_empty());
    assert!(after.upgrade_options.is_empty());
    assert!(!after.upgrading);
}
