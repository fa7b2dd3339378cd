//! ============================================================================
//! Application Config - Environment-driven settings
//! ============================================================================
//! Values come from the process environment (the binary loads `.env`
//! first). Credentials are optional until a live service is used.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TierPassError};
use crate::events::DEFAULT_EVENTS_TABLE;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_EVENTS_TABLE: &str = "TIERPASS_EVENTS_TABLE";
pub const ENV_CLERK_SECRET_KEY: &str = "CLERK_SECRET_KEY";
pub const ENV_CLERK_API_URL: &str = "CLERK_API_URL";
pub const ENV_UPGRADE_DELAY_MS: &str = "TIERPASS_UPGRADE_DELAY_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TIERPASS_HTTP_TIMEOUT_SECS";

/// Default identity provider backend API
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";

/// Simulated processing delay after a tier upgrade is persisted
pub const DEFAULT_UPGRADE_DELAY_MS: u64 = 1500;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub events_table: String,
    pub clerk_secret_key: Option<String>,
    pub clerk_api_url: String,
    pub upgrade_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            events_table: DEFAULT_EVENTS_TABLE.to_string(),
            clerk_secret_key: None,
            clerk_api_url: DEFAULT_CLERK_API_URL.to_string(),
            upgrade_delay: Duration::from_millis(DEFAULT_UPGRADE_DELAY_MS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let upgrade_delay = match non_empty(ENV_UPGRADE_DELAY_MS) {
            Some(raw) => Duration::from_millis(parse_number(ENV_UPGRADE_DELAY_MS, &raw)?),
            None => defaults.upgrade_delay,
        };
        let http_timeout = match non_empty(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_number(ENV_HTTP_TIMEOUT_SECS, &raw)?),
            None => defaults.http_timeout,
        };

        Ok(Self {
            supabase_url: non_empty(ENV_SUPABASE_URL),
            supabase_anon_key: non_empty(ENV_SUPABASE_ANON_KEY),
            events_table: non_empty(ENV_EVENTS_TABLE).unwrap_or(defaults.events_table),
            clerk_secret_key: non_empty(ENV_CLERK_SECRET_KEY),
            clerk_api_url: non_empty(ENV_CLERK_API_URL).unwrap_or(defaults.clerk_api_url),
            upgrade_delay,
            http_timeout,
        })
    }

    /// Data service URL and anon key, or a config error naming what is missing
    pub fn supabase_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or_else(|| missing(ENV_SUPABASE_URL))?;
        let key = self
            .supabase_anon_key
            .as_deref()
            .ok_or_else(|| missing(ENV_SUPABASE_ANON_KEY))?;
        Ok((url, key))
    }

    /// Identity provider secret key
    pub fn clerk_secret(&self) -> Result<&str> {
        self.clerk_secret_key
            .as_deref()
            .ok_or_else(|| missing(ENV_CLERK_SECRET_KEY))
    }
}

fn missing(var: &str) -> TierPassError {
    TierPassError::Config(format!("Missing environment variable {}", var))
}

fn parse_number(var: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| TierPassError::Config(format!("{} must be a whole number: {}", var, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.events_table, "events");
        assert_eq!(config.clerk_api_url, DEFAULT_CLERK_API_URL);
        assert_eq!(config.upgrade_delay, Duration::from_millis(1500));
        assert!(config.supabase_credentials().is_err());
        assert!(config.clerk_secret().is_err());
    }

    #[test]
    fn test_reads_values() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_SUPABASE_URL, "https://p.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, "anon"),
            (ENV_CLERK_SECRET_KEY, "sk_test"),
            (ENV_UPGRADE_DELAY_MS, "0"),
            (ENV_EVENTS_TABLE, "listings"),
        ]))
        .unwrap();
        assert_eq!(
            config.supabase_credentials().unwrap(),
            ("https://p.supabase.co", "anon")
        );
        assert_eq!(config.clerk_secret().unwrap(), "sk_test");
        assert_eq!(config.upgrade_delay, Duration::ZERO);
        assert_eq!(config.events_table, "listings");
    }

    #[test]
    fn test_missing_key_names_variable() {
        let config =
            AppConfig::from_lookup(lookup(&[(ENV_SUPABASE_URL, "https://p.supabase.co")])).unwrap();
        match config.supabase_credentials() {
            Err(TierPassError::Config(msg)) => assert!(msg.contains(ENV_SUPABASE_ANON_KEY)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_UPGRADE_DELAY_MS, "soon")])).unwrap_err();
        assert!(matches!(err, TierPassError::Config(_)));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_SUPABASE_URL, "  ")])).unwrap();
        assert!(config.supabase_url.is_none());
    }
}
