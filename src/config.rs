//! Configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a compiled-in default, so an empty environment is valid.
//! Numeric values that fail to parse fall back to the default. Only the
//! names service URL is validated: it must be http(s).

use std::time::Duration;

pub const DEFAULT_NAMES_API_BASE_URL: &str = "https://6854f3b06a6ef0ed66309ff9.mockapi.io/api";
pub const DEFAULT_NAMES_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_NAMES_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_LOCAL_TYPING_DELAY_MS: u64 = 2000;
pub const DEFAULT_REMOTE_TYPING_DELAY_MS: u64 = 3000;
pub const DEFAULT_CHANNEL_NAME: &str = "#composers";
pub const DEFAULT_CHANNEL_MEMBERS: u32 = 42;

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value was present but unusable.
    #[error("config parse failed: {0}")]
    ConfigParse(String),
}

// =============================================================================
// NAMES SERVICE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamesTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamesConfig {
    /// Base URL without a trailing slash; the roster lives at `{base_url}/names`.
    pub base_url: String,
    pub timeouts: NamesTimeouts,
}

impl NamesConfig {
    /// Build the names service config from environment variables.
    ///
    /// Optional:
    /// - `NAMES_API_BASE_URL`: default mock API endpoint
    /// - `NAMES_REQUEST_TIMEOUT_SECS`: default 10
    /// - `NAMES_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigParse`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("NAMES_API_BASE_URL").unwrap_or_else(|_| DEFAULT_NAMES_API_BASE_URL.to_string());
        let base_url = parse_base_url(&raw)?;
        let timeouts = NamesTimeouts {
            request_secs: env_parse("NAMES_REQUEST_TIMEOUT_SECS", DEFAULT_NAMES_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("NAMES_CONNECT_TIMEOUT_SECS", DEFAULT_NAMES_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { base_url, timeouts })
    }
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NAMES_API_BASE_URL.to_string(),
            timeouts: NamesTimeouts {
                request_secs: DEFAULT_NAMES_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_NAMES_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

// =============================================================================
// TYPING DELAYS
// =============================================================================

/// Countdowns used by `start_typing` and the `simulate_*` commands when no delay is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelays {
    /// How long the local indicator stays visible after the last keystroke.
    pub local: Duration,
    /// How long a simulated remote participant "types" before posting.
    pub remote: Duration,
}

impl TypingDelays {
    /// Read `TYPING_LOCAL_DELAY_MS` and `TYPING_REMOTE_DELAY_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            local: Duration::from_millis(env_parse("TYPING_LOCAL_DELAY_MS", DEFAULT_LOCAL_TYPING_DELAY_MS)),
            remote: Duration::from_millis(env_parse("TYPING_REMOTE_DELAY_MS", DEFAULT_REMOTE_TYPING_DELAY_MS)),
        }
    }
}

impl Default for TypingDelays {
    fn default() -> Self {
        Self {
            local: Duration::from_millis(DEFAULT_LOCAL_TYPING_DELAY_MS),
            remote: Duration::from_millis(DEFAULT_REMOTE_TYPING_DELAY_MS),
        }
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub name: String,
    pub members: u32,
}

impl ChannelConfig {
    /// Read `CHANNEL_NAME` and `CHANNEL_MEMBERS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            name: std::env::var("CHANNEL_NAME").unwrap_or_else(|_| DEFAULT_CHANNEL_NAME.to_string()),
            members: env_parse("CHANNEL_MEMBERS", DEFAULT_CHANNEL_MEMBERS),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub names: NamesConfig,
    pub delays: TypingDelays,
    pub channel: ChannelConfig,
}

impl AppConfig {
    /// Build the full configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Propagates [`NamesConfig::from_env`] failures.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self { names: NamesConfig::from_env()?, delays: TypingDelays::from_env(), channel: ChannelConfig::from_env() })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::ConfigParse(format!(
            "NAMES_API_BASE_URL must start with http:// or https:// (got '{raw}')"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
