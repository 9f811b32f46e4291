//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rapport_shared::constants::{DEFAULT_HTTP_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_MESSAGE_LEN};
use rapport_social::SocialPolicy;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:4000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: the platform data directory (see `Database::default_path`).
    pub database_path: Option<PathBuf>,

    /// Refuse messages between users who are not friends.
    /// Env: `REQUIRE_FRIENDSHIP_FOR_MESSAGING` (true/false)
    /// Default: `false`
    pub require_friendship_for_messaging: bool,

    /// Maximum message length in characters.
    /// Env: `MAX_MESSAGE_LEN`
    /// Default: `4096`
    pub max_message_len: usize,

    /// Deadline applied to every HTTP request.
    /// Env: `REQUEST_TIMEOUT_SECS`
    /// Default: `30`
    pub request_timeout: Duration,

    /// bcrypt work factor for new passwords.
    /// Env: `BCRYPT_COST`
    /// Default: `bcrypt::DEFAULT_COST`
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            require_friendship_for_messaging: false,
            max_message_len: MAX_MESSAGE_LEN,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("REQUIRE_FRIENDSHIP_FOR_MESSAGING") {
            config.require_friendship_for_messaging = val == "true" || val == "1";
        }

        if let Some(val) = lookup("MAX_MESSAGE_LEN") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_message_len = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_MESSAGE_LEN, using default"),
            }
        }

        if let Some(val) = lookup("REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => config.request_timeout = Duration::from_secs(n),
                _ => tracing::warn!(value = %val, "Invalid REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(val) = lookup("BCRYPT_COST") {
            match val.parse::<u32>() {
                Ok(n) if (4..=31).contains(&n) => config.bcrypt_cost = n,
                _ => tracing::warn!(value = %val, "Invalid BCRYPT_COST, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn social_policy(&self) -> SocialPolicy {
        SocialPolicy {
            require_friendship_for_messaging: self.require_friendship_for_messaging,
            max_message_len: self.max_message_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_env(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 4000).into());
        assert!(!config.require_friendship_for_messaging);
        assert_eq!(config.social_policy(), SocialPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = with_env(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/rapport.db"),
            ("REQUIRE_FRIENDSHIP_FOR_MESSAGING", "true"),
            ("MAX_MESSAGE_LEN", "280"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("BCRYPT_COST", "4"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/rapport.db")));
        assert!(config.social_policy().require_friendship_for_messaging);
        assert_eq!(config.social_policy().max_message_len, 280);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = with_env(&[
            ("HTTP_ADDR", "nowhere"),
            ("MAX_MESSAGE_LEN", "0"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
            ("BCRYPT_COST", "99"),
        ]);
        let defaults = ServerConfig::default();
        assert_eq!(config.http_addr, defaults.http_addr);
        assert_eq!(config.max_message_len, defaults.max_message_len);
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.bcrypt_cost, defaults.bcrypt_cost);
    }
}
