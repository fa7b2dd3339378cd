// ============================================================================
// tierpass: terminal dashboard for tier-gated events
// ============================================================================
// Usage:
//   tierpass tiers                                  List tiers and perks
//   tierpass events                                 List every event
//   tierpass dashboard --user ID [--tier TIER]      Show a member's dashboard
//   tierpass upgrade --user ID --to TIER [--from T] Upgrade a member's tier
//                                                   (--from needs --demo)
//   tierpass check --user-tier T --event-tier T     Check a single access rule
//
// Global flags: --demo (in-memory sample data), --json (machine output)
// ============================================================================

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tierpass_core::format::{format_event_date, relative_time};
use tierpass_core::{
    can_access, demo_events, AppConfig, ClerkIdentity, DashboardSession, DashboardView, Event,
    EventSource, IdentityProvider, InMemoryIdentity, StaticEventSource, SupabaseEventStore, Tier,
    TierUpgrader,
};
use tracing::info;

/// TierPass event dashboard
#[derive(Parser)]
#[command(name = "tierpass", version, about = "Browse tier-gated events and manage membership tiers")]
struct Cli {
    /// Use built-in sample events and an in-memory identity store
    #[arg(long, global = true)]
    demo: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tiers with rank and perks
    Tiers,

    /// Fetch and list every event with its required tier
    Events,

    /// Show stats plus accessible and restricted events for a member
    Dashboard {
        /// Member id at the identity provider
        #[arg(long)]
        user: String,

        /// Use this tier instead of reading it from the identity provider.
        /// The identity provider is then not contacted at all.
        #[arg(long)]
        tier: Option<String>,
    },

    /// Upgrade a member to a higher tier
    Upgrade {
        #[arg(long)]
        user: String,

        /// Target tier: silver, gold or platinum
        #[arg(long)]
        to: String,

        /// Starting tier for the in-memory member (--demo only; default: free)
        #[arg(long)]
        from: Option<String>,
    },

    /// Check whether a member tier may view an event tier
    Check {
        #[arg(long)]
        user_tier: String,

        #[arg(long)]
        event_tier: String,
    },
}

type Session = DashboardSession<dyn EventSource, dyn IdentityProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file, if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tierpass=info,tierpass_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Tiers => cmd_tiers(cli.json),
        Commands::Events => cmd_events(&config, cli.demo, cli.json).await,
        Commands::Dashboard { user, tier } => {
            let tier = tier.as_deref().map(parse_tier).transpose()?;
            cmd_dashboard(&config, cli.demo, cli.json, &user, tier).await
        }
        Commands::Upgrade { user, to, from } => {
            let target = parse_tier(&to)?;
            let from = from.as_deref().map(parse_tier).transpose()?;
            cmd_upgrade(&config, cli.demo, cli.json, &user, target, from).await
        }
        Commands::Check {
            user_tier,
            event_tier,
        } => cmd_check(&user_tier, &event_tier, cli.json),
    }
}

fn parse_tier(raw: &str) -> Result<Tier> {
    raw.parse::<Tier>()
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))
}

fn event_source(config: &AppConfig, demo: bool) -> Result<Arc<dyn EventSource>> {
    if demo {
        return Ok(Arc::new(StaticEventSource::new(demo_events(Utc::now()))));
    }
    Ok(Arc::new(SupabaseEventStore::from_config(config)?))
}

/// Identity provider for a session. With `demo` or a caller-supplied tier
/// the member lives in memory and no credentials are needed.
fn identity_provider(
    config: &AppConfig,
    in_memory: bool,
    user: &str,
    seed: Option<Tier>,
) -> Result<Arc<dyn IdentityProvider>> {
    if in_memory {
        let identity = InMemoryIdentity::new().with_user(user, seed.unwrap_or_default());
        return Ok(Arc::new(identity));
    }
    Ok(Arc::new(ClerkIdentity::from_config(config)?))
}

fn build_session(
    config: &AppConfig,
    demo: bool,
    user: &str,
    seed: Option<Tier>,
    offline_identity: bool,
) -> Result<Session> {
    let events = event_source(config, demo)?;
    let identity = identity_provider(config, demo || offline_identity, user, seed)?;
    let upgrader = TierUpgrader::from_config(identity.clone(), config);
    Ok(DashboardSession::new(user, events, identity, upgrader))
}

fn cmd_tiers(json: bool) -> Result<()> {
    if json {
        let tiers: Vec<_> = Tier::ALL
            .iter()
            .map(|t| {
                serde_json::json!({
                    "tier": t,
                    "rank": t.rank(),
                    "perks": t.perks(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tiers)?);
        return Ok(());
    }

    println!("=== Membership Tiers ===");
    for tier in Tier::ALL {
        println!("\n{} (rank {})", tier.display_name(), tier.rank());
        for perk in tier.perks() {
            println!("  - {}", perk);
        }
    }
    Ok(())
}

async fn cmd_events(config: &AppConfig, demo: bool, json: bool) -> Result<()> {
    let source = event_source(config, demo)?;
    let events = match source.fetch_events().await {
        Ok(events) => events,
        Err(e) => bail!("{} ({})", e.user_message(), e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    print_event_table(&events);
    println!("\nTotal: {} events", events.len());
    Ok(())
}

async fn cmd_dashboard(
    config: &AppConfig,
    demo: bool,
    json: bool,
    user: &str,
    tier: Option<Tier>,
) -> Result<()> {
    let session = build_session(config, demo, user, tier, tier.is_some())?;
    let view = match tier {
        Some(tier) => session.with_initial_tier(tier).refresh().await,
        None => session.load().await,
    };
    render(&view, json)
}

async fn cmd_upgrade(
    config: &AppConfig,
    demo: bool,
    json: bool,
    user: &str,
    target: Tier,
    from: Option<Tier>,
) -> Result<()> {
    check_upgrade_flags(demo, from)?;
    let session = build_session(config, demo, user, from, false)?;
    let before = session.load().await;
    if before.notice.is_some() {
        return render(&before, json);
    }

    if !json {
        println!("Upgrading {} from {} to {}...", user, before.tier.display_name(), target.display_name());
    }
    let after = session.upgrade(target).await;
    if after.notice.is_none() {
        info!("{} upgraded to {}", user, after.tier);
        if !json {
            println!("Successfully upgraded to {} tier!\n", after.tier.display_name());
        }
    }
    render(&after, json)
}

/// `--from` seeds the in-memory member; a live tier always comes from the
/// identity provider
fn check_upgrade_flags(demo: bool, from: Option<Tier>) -> Result<()> {
    if from.is_some() && !demo {
        bail!("--from only applies with --demo; the live tier is read from the identity provider");
    }
    Ok(())
}

fn cmd_check(user_tier: &str, event_tier: &str, json: bool) -> Result<()> {
    let user = parse_tier(user_tier)?;
    let event = parse_tier(event_tier)?;
    let granted = can_access(user, event);

    if json {
        println!(
            "{}",
            serde_json::json!({ "user_tier": user, "event_tier": event, "granted": granted })
        );
    } else if granted {
        println!("{} members can access {} events.", user.display_name(), event.display_name());
    } else {
        println!(
            "{} members cannot access {} events. Upgrade to {} to access.",
            user.display_name(),
            event.display_name(),
            event.display_name()
        );
    }
    Ok(())
}

fn render(view: &DashboardView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print_dashboard(view);
    }

    if let Some(notice) = &view.notice {
        if notice.retryable {
            bail!("{} Run the command again to retry.", notice.message);
        }
        bail!("{}", notice.message);
    }
    Ok(())
}

fn print_dashboard(view: &DashboardView) {
    let stats = &view.partition.stats;

    println!("=== Dashboard: {} ===", view.user_id);
    println!("Your tier: {}", view.tier.display_name());
    println!();
    println!("Total Events: {}", stats.total_events);
    println!("Accessible:   {}", stats.accessible_events);
    println!("Upcoming:     {}", stats.upcoming_events);
    println!("Restricted:   {}", stats.restricted_events);

    if let Some(notice) = &view.notice {
        println!("\nSomething went wrong: {}", notice.message);
        return;
    }

    println!("\n--- Your Events ({}) ---", view.partition.accessible.len());
    if view.partition.accessible.is_empty() {
        println!("No accessible events found.");
        println!("Check back later for new events or upgrade your tier for more access.");
    } else {
        print_event_table(&view.partition.accessible);
    }

    if !view.partition.restricted.is_empty() {
        println!("\n--- Premium Events ({}) ---", view.partition.restricted.len());
        println!("Upgrade your tier to access these exclusive events");
        print_event_table(&view.partition.restricted);
    }

    if !view.upgrade_options.is_empty() {
        println!("\n--- Upgrade Options ---");
        for tier in &view.upgrade_options {
            println!(
                "  {:<10} unlocks {} more events",
                tier.display_name(),
                view.partition.unlocked_by(*tier)
            );
        }
    }
}

fn print_event_table(events: &[Event]) {
    let now = Utc::now();
    println!(
        "{:<10}  {:<9}  {:<40}  {:<14}  {}",
        "ID", "TIER", "DATE", "WHEN", "TITLE"
    );
    println!("{}", "-".repeat(100));
    for event in events {
        let title = event.title.chars().take(30).collect::<String>();
        println!(
            "{:<10}  {:<9}  {:<40}  {:<14}  {}",
            event.id,
            event.tier.display_name(),
            format_event_date(event.event_date),
            relative_time(event.event_date, now),
            title
        );
    }
}
