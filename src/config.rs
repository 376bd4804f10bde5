//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheBuilder;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Zero turns off the TTL, the entry caps and the lifetime cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cache-wide TTL in milliseconds
    pub ttl_ms: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Whether reads renew the entry they hit
    pub renew_on_read: bool,
    /// How long after insertion reads may keep renewing an entry, in milliseconds
    pub max_lifetime_ms: u64,
    /// Maximum number of keys in the range index
    pub index_max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_RENEW_ON_READ` - Renew entries on read (default: false)
    /// - `CACHE_MAX_LIFETIME_MS` - Renewal cap in milliseconds (default: 0)
    /// - `INDEX_MAX_ENTRIES` - Maximum range index keys (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_ms: env_or("CACHE_TTL_MS", defaults.ttl_ms),
            max_entries: env_or("CACHE_MAX_ENTRIES", defaults.max_entries),
            renew_on_read: env_or("CACHE_RENEW_ON_READ", defaults.renew_on_read),
            max_lifetime_ms: env_or("CACHE_MAX_LIFETIME_MS", defaults.max_lifetime_ms),
            index_max_entries: env_or("INDEX_MAX_ENTRIES", defaults.index_max_entries),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// A cache builder carrying the configured cache options.
    pub fn cache_builder(&self) -> CacheBuilder {
        CacheBuilder::new()
            .ttl_ms(self.ttl_ms)
            .capacity(self.max_entries)
            .renew_on_read(self.renew_on_read)
            .max_lifetime(Duration::from_millis(self.max_lifetime_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_ms: 300_000,
            max_entries: 1000,
            renew_on_read: false,
            max_lifetime_ms: 0,
            index_max_entries: 0,
            server_port: 3000,
        }
    }
}

/// Reads and parses `name`, falling back when unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ttl_ms, 300_000);
        assert_eq!(config.max_entries, 1000);
        assert!(!config.renew_on_read);
        assert_eq!(config.max_lifetime_ms, 0);
        assert_eq!(config.index_max_entries, 0);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env() {
        // Single test touching the environment, so no cross-test races
        for name in [
            "CACHE_TTL_MS",
            "CACHE_MAX_ENTRIES",
            "CACHE_RENEW_ON_READ",
            "CACHE_MAX_LIFETIME_MS",
            "INDEX_MAX_ENTRIES",
            "SERVER_PORT",
        ] {
            env::remove_var(name);
        }
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("CACHE_TTL_MS", "50");
        env::set_var("CACHE_RENEW_ON_READ", "true");
        env::set_var("SERVER_PORT", "not-a-port");
        let config = Config::from_env();
        assert_eq!(config.ttl_ms, 50);
        assert!(config.renew_on_read);
        assert_eq!(config.server_port, 3000);

        env::remove_var("CACHE_TTL_MS");
        env::remove_var("CACHE_RENEW_ON_READ");
        env::remove_var("SERVER_PORT");
    }

    #[test]
    fn test_cache_builder_from_config() {
        let config = Config {
            ttl_ms: 0,
            max_entries: 10,
            max_lifetime_ms: 2_000,
            ..Config::default()
        };
        let settings = config.cache_builder().settings();

        assert_eq!(settings.ttl_ms, None);
        assert_eq!(settings.capacity, NonZeroUsize::new(10));
        assert_eq!(settings.max_lifetime_ms, Some(2_000));
    }
}
