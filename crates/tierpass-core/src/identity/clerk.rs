//! ============================================================================
//! Clerk Identity - Tier metadata via the identity provider's backend API
//! ============================================================================
//! Upgrades are merged into `unsafe_metadata` with the metadata PATCH
//! endpoint. Reads look there first so a write is visible on the next
//! read, then fall back to `public_metadata` for tiers assigned by an
//! administrator.
//! ============================================================================

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::IdentityProvider;
use crate::access::Tier;
use crate::config::AppConfig;
use crate::error::{body_snippet, Result, TierPassError};

/// Metadata key holding the user's tier
pub const TIER_METADATA_KEY: &str = "tier";

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    public_metadata: Value,
    #[serde(default)]
    unsafe_metadata: Value,
}

/// Identity provider client using a backend secret key
pub struct ClerkIdentity {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ClerkIdentity {
    pub fn new(base_url: &str, secret_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, secret_key, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, secret_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TierPassError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    /// Create from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_timeout(&config.clerk_api_url, config.clerk_secret()?, config.http_timeout)
    }

    /// `{base}/v1/users/{user_id}[/metadata]` with the id percent-encoded
    pub fn user_url(&self, user_id: &str, metadata: bool) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TierPassError::Config(format!("Invalid identity API URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TierPassError::Config("Identity API URL cannot be a base".into()))?;
            segments.pop_if_empty().extend(["v1", "users", user_id]);
            if metadata {
                segments.push("metadata");
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn current_tier(&self, user_id: &str) -> Result<Tier> {
        let url = self.user_url(user_id, false)?;
        debug!("Reading tier metadata for user {}", user_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| TierPassError::ProfileFetch(format!("Failed to reach identity service: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TierPassError::ProfileFetch(format!("Failed to read profile body: {}", e)))?;

        if !status.is_success() {
            warn!("Profile read for {} returned {}", user_id, status);
            return Err(TierPassError::ProfileFetch(format!(
                "Identity service error ({}): {}",
                status,
                body_snippet(&body)
            )));
        }

        let user: UserResponse = serde_json::from_str(&body).map_err(|e| {
            TierPassError::ProfileFetch(format!(
                "Failed to parse user profile: {} - body: {}",
                e,
                body_snippet(&body)
            ))
        })?;

        let tier = tier_from_metadata(&user.unsafe_metadata, &user.public_metadata)?;
        debug!("User {} is on the {} tier", user.id, tier);
        Ok(tier)
    }

    async fn set_tier(&self, user_id: &str, tier: Tier) -> Result<()> {
        let url = self.user_url(user_id, true)?;
        let body = json!({ "unsafe_metadata": { TIER_METADATA_KEY: tier } });

        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                TierPassError::RemoteMutation(format!("Failed to reach identity service: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Tier update for {} rejected with {}", user_id, status);
            return Err(TierPassError::RemoteMutation(format!(
                "Identity service error ({}): {}",
                status,
                body_snippet(&body)
            )));
        }

        info!("Stored {} tier for user {}", tier, user_id);
        Ok(())
    }
}

/// Resolve the tier from profile metadata. The field upgrades write to
/// (`unsafe_metadata`) wins over `public_metadata`; absent in both means
/// the default tier; anything present that is not a tier name is an error.
pub fn tier_from_metadata(written: &Value, public: &Value) -> Result<Tier> {
    for metadata in [written, public] {
        match metadata.get(TIER_METADATA_KEY) {
            None | Some(Value::Null) => continue,
            Some(Value::String(raw)) => return raw.parse(),
            Some(other) => return Err(TierPassError::InvalidTierValue(other.to_string())),
        }
    }
    Ok(Tier::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_url() {
        let identity = ClerkIdentity::new("https://api.clerk.com/", "sk").unwrap();
        assert_eq!(
            identity.user_url("user_123", false).unwrap().as_str(),
            "https://api.clerk.com/v1/users/user_123"
        );
        assert_eq!(
            identity.user_url("user_123", true).unwrap().as_str(),
            "https://api.clerk.com/v1/users/user_123/metadata"
        );
    }

    #[test]
    fn test_user_url_encodes_id() {
        let identity = ClerkIdentity::new("https://api.clerk.com", "sk").unwrap();
        let url = identity.user_url("a/b c", false).unwrap();
        assert_eq!(url.as_str(), "https://api.clerk.com/v1/users/a%2Fb%20c");
    }

    #[test]
    fn test_written_tier_wins_over_public() {
        let written = json!({ TIER_METADATA_KEY: Tier::Gold });
        let tier = tier_from_metadata(&written, &json!({"tier": "free"})).unwrap();
        assert_eq!(tier, Tier::Gold);
    }

    #[test]
    fn test_upgrade_body_is_what_next_read_sees() {
        // Signed up with a public tier, then upgraded through set_tier
        let patch = json!({ "unsafe_metadata": { TIER_METADATA_KEY: Tier::Gold } });
        let public = json!({"tier": "free"});
        let tier = tier_from_metadata(&patch["unsafe_metadata"], &public).unwrap();
        assert_eq!(tier, Tier::Gold);
    }

    #[test]
    fn test_tier_falls_back_to_public_metadata() {
        let tier = tier_from_metadata(&json!({}), &json!({"tier": "platinum"})).unwrap();
        assert_eq!(tier, Tier::Platinum);
    }

    #[test]
    fn test_missing_tier_defaults_to_free() {
        assert_eq!(tier_from_metadata(&Value::Null, &json!({})).unwrap(), Tier::Free);
    }

    #[test]
    fn test_unknown_tier_is_not_coerced() {
        let err = tier_from_metadata(&json!({"tier": "bronze"}), &json!({})).unwrap_err();
        assert_eq!(err, TierPassError::InvalidTierValue("bronze".into()));
        let err = tier_from_metadata(&json!({"tier": 3}), &json!({})).unwrap_err();
        assert!(matches!(err, TierPassError::InvalidTierValue(_)));
    }

    #[tokio::test]
    async fn test_unreachable_identity_service() {
        let identity =
            ClerkIdentity::with_timeout("http://127.0.0.1:9", "sk", Duration::from_secs(2)).unwrap();
        let read = identity.current_tier("user_1").await.unwrap_err();
        assert!(matches!(read, TierPassError::ProfileFetch(_)));
        let write = identity.set_tier("user_1", Tier::Gold).await.unwrap_err();
        assert!(matches!(write, TierPassError::RemoteMutation(_)));
    }
}
