//! Server configuration
//!
//! Built once in `main` and handed to the router state; nothing else reads
//! the environment.

use std::fmt;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Directory holding `index.html` and `pos.html`
    pub static_dir: String,
    /// Currency used when a request omits one
    pub default_currency: String,
    /// The single terminal reader this server drives
    pub reader_id: String,
    pub processor: ProcessorConfig,
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4242,
            log_level: "info".to_string(),
            static_dir: "./public".to_string(),
            default_currency: "usd".to_string(),
            reader_id: String::new(),
            processor: ProcessorConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> ServerResult<()> {
        if self.processor.secret_key.trim().is_empty() {
            return Err(ServerError::Config(
                "STRIPE_SECRET_KEY must be set".to_string(),
            ));
        }
        if self.reader_id.trim().is_empty() {
            return Err(ServerError::Config(
                "STRIPE_READER_ID must be set".to_string(),
            ));
        }
        if self.default_currency.trim().is_empty() {
            return Err(ServerError::Config(
                "default currency must not be empty".to_string(),
            ));
        }
        if self.poll.max_attempts == 0 {
            return Err(ServerError::Config(
                "POS_POLL_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payment processor connection settings
#[derive(Clone)]
pub struct ProcessorConfig {
    pub api_base: String,
    pub secret_key: String,
    /// Timeout per outbound request
    pub timeout_secs: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Reader polling and post-payment prompt settings
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status checks (milliseconds)
    pub interval_ms: u64,

    /// Status checks before giving up
    pub max_attempts: u32,

    /// Consecutive failed status fetches tolerated before aborting
    pub max_fetch_errors: u32,

    /// Delay between responding and prompting for receipt details (milliseconds)
    pub collect_delay_ms: u64,

    /// Prompt for receipt email/phone on the reader after success
    pub collect_inputs: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            max_attempts: 120,
            max_fetch_errors: 3,
            collect_delay_ms: 1000,
            collect_inputs: true,
        }
    }
}

impl PollConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval_ms: std::env::var("POS_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.interval_ms),
            max_attempts: std::env::var("POS_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            max_fetch_errors: std::env::var("POS_POLL_MAX_FETCH_ERRORS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_fetch_errors),
            collect_delay_ms: std::env::var("POS_COLLECT_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.collect_delay_ms),
            collect_inputs: std::env::var("POS_COLLECT_INPUTS")
                .ok()
                .map(|s| s == "true" || s == "1")
                .unwrap_or(defaults.collect_inputs),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn collect_delay(&self) -> Duration {
        Duration::from_millis(self.collect_delay_ms)
    }
}
