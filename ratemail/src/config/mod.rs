//! Configuration management for ratemail
//!
//! Embedding applications usually build [`SmtpConfig`] and [`DedupConfig`]
//! directly. For services that prefer file/env driven setup, configuration
//! can be loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `RATEMAIL_` prefix, `__` for nesting)
//! 2. The TOML file passed to [`RatemailConfig::load_from`] (or `./ratemail.toml`)
//! 3. Hardcoded defaults (fallback)
//!
//! Environment variable format: `RATEMAIL_SECTION__FIELD_NAME`
//! - Example: `RATEMAIL_SMTP__HOST=smtp.example.com`
//! - Example: `RATEMAIL_DEDUP__EXPIRY_MS=3600000`
//!
//! # Example Configuration
//!
//! ```toml
//! # ratemail.toml
//! [smtp]
//! host = "smtp.example.com"
//! port = 587
//! username = "alerts"
//! password = "secret"
//! from = "alerts@example.com"
//! use_tls = true
//! timeout_secs = 60
//!
//! [dedup]
//! expiry_ms = 86400000
//! sweep_mode = "periodic"
//! lock_scope = "cache_only"
//! normalization = "concatenated"
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::MailerError;
use crate::fingerprint::Normalization;

/// Default SMTP operation timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default dedup expiry window in milliseconds (24 hours)
pub const DEFAULT_EXPIRY_MS: u64 = 24 * 60 * 60 * 1000;

/// Longest accepted expiry window or sweep interval (10 years)
pub const MAX_WINDOW: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Default configuration file name used by [`RatemailConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "ratemail.toml";

/// SMTP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Sender address used as the From header
    pub from: String,

    /// Use STARTTLS
    pub use_tls: bool,

    /// Dial/send timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            use_tls: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SmtpConfig {
    /// Create SMTP configuration from explicit connection parameters
    ///
    /// Uses STARTTLS and the default 60 second timeout.
    #[must_use]
    pub fn new(host: &str, port: u16, username: &str, password: &str, from: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            from: from.to_string(),
            ..Self::default()
        }
    }

    /// Create SMTP configuration from environment variables
    ///
    /// Expects the following environment variables:
    /// - `SMTP_HOST`: SMTP server hostname
    /// - `SMTP_PORT`: SMTP server port (default: 587)
    /// - `SMTP_USERNAME`: SMTP username
    /// - `SMTP_PASSWORD`: SMTP password
    /// - `SMTP_FROM`: sender address
    /// - `SMTP_USE_TLS`: Use TLS (default: true)
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if required environment variables are missing
    pub fn from_env() -> Result<Self, MailerError> {
        let host = std::env::var("SMTP_HOST")
            .map_err(|_| MailerError::config("SMTP_HOST environment variable not set"))?;

        let port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .map_err(|_| MailerError::config("SMTP_PORT must be a valid port number"))?;

        let username = std::env::var("SMTP_USERNAME")
            .map_err(|_| MailerError::config("SMTP_USERNAME environment variable not set"))?;

        let password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| MailerError::config("SMTP_PASSWORD environment variable not set"))?;

        let from = std::env::var("SMTP_FROM")
            .map_err(|_| MailerError::config("SMTP_FROM environment variable not set"))?;

        let use_tls = std::env::var("SMTP_USE_TLS")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            username,
            password,
            from,
            use_tls,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Operation timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How expired fingerprints are swept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Sweep on a fixed repeating interval for the life of the cache
    #[default]
    Periodic,

    /// Sweep once after the first interval, then stop
    ///
    /// Entries recorded after that sweep are only ever treated as expired
    /// on lookup and never removed.
    OneShot,
}

/// What the dedup lock covers during `send_rate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// Lock only around cache reads and writes
    ///
    /// Sends run concurrently. Two identical messages submitted at the same
    /// instant may both be dispatched before either is recorded.
    #[default]
    CacheOnly,

    /// Hold a cache-wide gate across check, send and record
    ///
    /// Guarantees at most one send per fingerprint per window, but serializes
    /// every deduplicated send through the cache.
    WholeSend,
}

/// Dedup cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Age in milliseconds after which a fingerprint no longer suppresses sends
    pub expiry_ms: u64,

    /// Milliseconds between sweeps (defaults to the expiry)
    pub sweep_interval_ms: Option<u64>,

    /// Periodic or one-shot sweeping
    pub sweep_mode: SweepMode,

    /// Critical section used by `send_rate`
    pub lock_scope: LockScope,

    /// How fingerprints mask timestamps
    pub normalization: Normalization,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            expiry_ms: DEFAULT_EXPIRY_MS,
            sweep_interval_ms: None,
            sweep_mode: SweepMode::Periodic,
            lock_scope: LockScope::CacheOnly,
            normalization: Normalization::Concatenated,
        }
    }
}

impl DedupConfig {
    /// Set the expiry window (millisecond precision)
    #[must_use]
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry_ms = duration_to_millis(expiry);
        self
    }

    /// Set the sweep interval (millisecond precision)
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = Some(duration_to_millis(interval));
        self
    }

    /// Set the sweep mode
    #[must_use]
    pub const fn with_sweep_mode(mut self, mode: SweepMode) -> Self {
        self.sweep_mode = mode;
        self
    }

    /// Set the lock scope
    #[must_use]
    pub const fn with_lock_scope(mut self, scope: LockScope) -> Self {
        self.lock_scope = scope;
        self
    }

    /// Set the fingerprint normalization
    #[must_use]
    pub const fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Expiry window as a `Duration`
    #[must_use]
    pub const fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_ms)
    }

    /// Sweep interval as a `Duration`, never shorter than one millisecond
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        let millis = self.sweep_interval_ms.unwrap_or(self.expiry_ms);
        Duration::from_millis(millis.max(1))
    }

    /// Check that the windows are usable by the cache and its sweeper
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if the expiry or an explicit sweep
    /// interval is zero, or if either exceeds [`MAX_WINDOW`].
    pub fn validate(&self) -> Result<(), MailerError> {
        if self.expiry_ms == 0 {
            return Err(MailerError::config("dedup expiry must be at least 1ms"));
        }

        if self.sweep_interval_ms == Some(0) {
            return Err(MailerError::config("dedup sweep interval must be at least 1ms"));
        }

        let now = Instant::now();
        let windows = [
            ("expiry", self.expiry()),
            ("sweep interval", self.sweep_interval()),
        ];
        for (name, window) in windows {
            if window > MAX_WINDOW || now.checked_add(window).is_none() {
                return Err(MailerError::config(format!(
                    "dedup {name} of {}ms exceeds the maximum of {}ms",
                    window.as_millis(),
                    MAX_WINDOW.as_millis()
                )));
            }
        }

        Ok(())
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Complete ratemail configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RatemailConfig {
    /// SMTP transport settings
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Dedup cache settings
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl RatemailConfig {
    /// Load configuration from `./ratemail.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file or environment contains values that fail
    /// type conversion or dedup validation.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - Configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    /// - The dedup settings fail [`DedupConfig::validate`]
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ratemail::config::RatemailConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RatemailConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config: Self = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            // Environment variables override everything
            .merge(Env::prefixed("RATEMAIL_").split("__").lowercase(true))
            .extract()?;

        config.dedup.validate()?;

        Ok(config)
    }
}
