//! Reconciler configuration

use anneal_types::release::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the atomic release driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Field-owner identity declared on every patch
    #[serde(default = "default_field_owner")]
    pub field_owner: String,

    /// Deadline in seconds for the final best-effort patch after the
    /// ambient cancellation fires
    #[serde(default = "default_cancel_patch_timeout")]
    pub cancel_patch_timeout_secs: u64,

    /// Timeout in seconds for engine operations when neither the object
    /// nor the matching policy declares one
    #[serde(default = "default_default_timeout")]
    pub default_timeout_secs: u64,
}

impl ReconcilerConfig {
    /// The configured fallback timeout as a duration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            field_owner: default_field_owner(),
            cancel_patch_timeout_secs: default_cancel_patch_timeout(),
            default_timeout_secs: default_default_timeout(),
        }
    }
}

fn default_field_owner() -> String {
    "anneal-release-controller".to_string()
}

fn default_cancel_patch_timeout() -> u64 {
    5
}

fn default_default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.field_owner, "anneal-release-controller");
        assert_eq!(config.cancel_patch_timeout_secs, 5);
        assert_eq!(config.default_timeout_secs, 300);
        assert_eq!(config.default_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: ReconcilerConfig =
            serde_json::from_str(r#"{"field_owner": "custom-owner"}"#).unwrap();
        assert_eq!(config.field_owner, "custom-owner");
        assert_eq!(config.cancel_patch_timeout_secs, 5);
        assert_eq!(config.default_timeout_secs, 300);
    }

    #[test]
    fn test_configured_timeout_overrides_default() {
        let config: ReconcilerConfig =
            serde_json::from_str(r#"{"default_timeout_secs": 120}"#).unwrap();
        assert_eq!(config.default_timeout(), Duration::from_secs(120));
    }
}
