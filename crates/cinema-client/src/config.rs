//! Client configuration loaded from environment variables.
//!
//! Defaults point at a backend on localhost so the engine runs with zero
//! configuration during development.

use std::time::Duration;

use cinema_shared::constants::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_MS};

use crate::relations::JoinPolicy;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the catalog backend.
    /// Env: `CINEMA_API_URL`
    /// Default: `http://localhost:8080`
    pub api_url: String,

    /// Per-request transport timeout.
    /// Env: `CINEMA_REQUEST_TIMEOUT_MS`
    /// Default: 30 s
    pub request_timeout: Duration,

    /// How a relation batch settles when one upsert fails.
    /// Env: `CINEMA_RELATION_JOIN` (`fail-fast` / `all-settled`)
    /// Default: `fail-fast`
    pub relation_join: JoinPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            relation_join: JoinPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("CINEMA_API_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.api_url = url.to_string();
            }
        }

        if let Some(val) = lookup("CINEMA_REQUEST_TIMEOUT_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid CINEMA_REQUEST_TIMEOUT_MS, using default"
                ),
            }
        }

        if let Some(val) = lookup("CINEMA_RELATION_JOIN") {
            match val.parse::<JoinPolicy>() {
                Ok(policy) => config.relation_join = policy,
                Err(e) => tracing::warn!(error = %e, "Invalid CINEMA_RELATION_JOIN, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.relation_join, JoinPolicy::FailFast);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("CINEMA_API_URL", "https://api.cinema.test"),
            ("CINEMA_REQUEST_TIMEOUT_MS", "1500"),
            ("CINEMA_RELATION_JOIN", "all-settled"),
        ]));
        assert_eq!(config.api_url, "https://api.cinema.test");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.relation_join, JoinPolicy::AllSettled);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("CINEMA_API_URL", "  "),
            ("CINEMA_REQUEST_TIMEOUT_MS", "soon"),
            ("CINEMA_RELATION_JOIN", "whenever"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }
}
