//! ============================================================================
//! Error Types - Failures surfaced by the tier-access core
//! ============================================================================
//! Every variant is caught at the boundary nearest its origin and turned
//! into a user-visible message plus an optional retry action.
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::access::Tier;

/// Result alias used across the core crate
pub type Result<T> = std::result::Result<T, TierPassError>;

/// Error types for the tier-access core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TierPassError {
    /// Event retrieval failed (recoverable, user may retry)
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// Reading the user's profile from the identity provider failed
    /// (recoverable, user may retry)
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    /// Tier update failed (recoverable, prior tier remains authoritative)
    #[error("Remote mutation failed: {0}")]
    RemoteMutation(String),

    /// An unrecognized tier string was encountered
    #[error("Invalid tier value: '{0}' (expected free, silver, gold or platinum)")]
    InvalidTierValue(String),

    #[error("Cannot change tier from {current} to {target}: only upgrades are offered")]
    UpgradeNotAllowed { current: Tier, target: Tier },

    #[error("A tier upgrade is already in progress")]
    UpgradeInFlight,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TierPassError {
    /// Whether the user should be offered a retry action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TierPassError::RemoteFetch(_)
                | TierPassError::ProfileFetch(_)
                | TierPassError::RemoteMutation(_)
        )
    }

    /// Message suitable for showing to the end user
    pub fn user_message(&self) -> String {
        match self {
            TierPassError::RemoteFetch(_) => "Failed to load events. Please try again.".into(),
            TierPassError::ProfileFetch(_) => {
                "Failed to load your membership tier. Please try again.".into()
            }
            TierPassError::RemoteMutation(_) => "Failed to upgrade tier. Please try again.".into(),
            TierPassError::InvalidTierValue(value) => {
                format!("Unrecognized membership tier '{}'.", value)
            }
            TierPassError::UpgradeNotAllowed { current, target } => format!(
                "You are on the {} tier; {} is not an upgrade.",
                current.display_name(),
                target.display_name()
            ),
            TierPassError::UpgradeInFlight => {
                "An upgrade is already being processed. Please wait.".into()
            }
            TierPassError::Config(msg) => format!("Configuration problem: {}", msg),
        }
    }
}

/// First 200 characters of a response body, for error messages
pub(crate) fn body_snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TierPassError::RemoteFetch("timeout".into()).is_retryable());
        assert!(TierPassError::RemoteMutation("500".into()).is_retryable());
        assert!(TierPassError::ProfileFetch("502".into()).is_retryable());
        assert!(!TierPassError::InvalidTierValue("bronze".into()).is_retryable());
        assert!(!TierPassError::UpgradeInFlight.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            TierPassError::RemoteFetch("x".into()).user_message(),
            "Failed to load events. Please try again."
        );
        assert_eq!(
            TierPassError::RemoteMutation("x".into()).user_message(),
            "Failed to upgrade tier. Please try again."
        );
        assert_eq!(
            TierPassError::ProfileFetch("x".into()).user_message(),
            "Failed to load your membership tier. Please try again."
        );
        let msg = TierPassError::UpgradeNotAllowed {
            current: Tier::Gold,
            target: Tier::Silver,
        }
        .user_message();
        assert!(msg.contains("Gold"));
        assert!(msg.contains("Silver"));
    }

    #[test]
    fn test_body_snippet_truncates() {
        let body = "x".repeat(500);
        assert_eq!(body_snippet(&body).len(), 200);
        assert_eq!(body_snippet("short"), "short");
    }
}
