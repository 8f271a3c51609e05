//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_EXPIRATION_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_VALUE_ATTRIBUTE};

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Row store table holding cache entries
    pub table: String,
    /// Namespace prepended to every key (joined with `:`)
    pub prefix: String,
    /// Primary key column name
    pub key_attribute: String,
    /// Payload column name
    pub value_attribute: String,
    /// Expiration column name
    pub expiration_attribute: String,
    /// Default TTL in seconds for HTTP writes without explicit TTL
    pub default_ttl: i64,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-row sweep interval in seconds, 0 disables the sweeper
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TABLE` - Table name (default: cache)
    /// - `CACHE_PREFIX` - Key prefix (default: empty)
    /// - `CACHE_KEY_ATTRIBUTE` - Primary key column (default: key)
    /// - `CACHE_VALUE_ATTRIBUTE` - Value column (default: value)
    /// - `CACHE_EXPIRATION_ATTRIBUTE` - Expiration column (default: expires_at)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            table: env::var("CACHE_TABLE").unwrap_or(defaults.table),
            prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.prefix),
            key_attribute: env::var("CACHE_KEY_ATTRIBUTE").unwrap_or(defaults.key_attribute),
            value_attribute: env::var("CACHE_VALUE_ATTRIBUTE").unwrap_or(defaults.value_attribute),
            expiration_attribute: env::var("CACHE_EXPIRATION_ATTRIBUTE")
                .unwrap_or(defaults.expiration_attribute),
            default_ttl: parsed("DEFAULT_TTL", defaults.default_ttl),
            server_port: parsed("SERVER_PORT", defaults.server_port),
            sweep_interval: parsed("SWEEP_INTERVAL", defaults.sweep_interval),
        }
    }
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: "cache".to_string(),
            prefix: String::new(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            value_attribute: DEFAULT_VALUE_ATTRIBUTE.to_string(),
            expiration_attribute: DEFAULT_EXPIRATION_ATTRIBUTE.to_string(),
            default_ttl: 300,
            server_port: 3000,
            sweep_interval: 60,
        }
    }
}
