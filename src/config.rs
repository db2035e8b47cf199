//! Server configuration.

use crate::{BrowserError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Idle time after which a session is evicted.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often the expiry sweeper runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Upper bound on the credential probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of generated presigned URLs.
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Configuration for the s3browser server.
///
/// Use the builder pattern for ergonomic configuration:
///
/// ```
/// use s3browser::Config;
/// use std::time::Duration;
///
/// let config = Config::new()
///     .with_bind("127.0.0.1:9090")
///     .with_static_dir("frontend/dist")
///     .with_probe_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.bind, "127.0.0.1:9090");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address (default: "0.0.0.0:8080")
    pub bind: String,

    /// Directory holding the built frontend, served at `/`
    pub static_dir: Option<PathBuf>,

    /// Session idle time-to-live (default: 24 hours)
    pub session_ttl: Duration,

    /// Expiry sweep interval (default: 1 hour)
    pub sweep_interval: Duration,

    /// Timeout for the connect probe (default: 30 seconds)
    pub probe_timeout: Duration,

    /// Per-request timeout (default: 30 seconds)
    pub request_timeout: Duration,

    /// Grace period for in-flight requests at shutdown (default: 10 seconds)
    pub shutdown_grace: Duration,

    /// Presigned URL lifetime (default: 15 minutes)
    pub presign_expiry: Duration,

    /// Maximum accepted upload body in bytes (default: 32 MiB)
    pub max_upload_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: None,
            session_ttl: SESSION_TTL,
            sweep_interval: SWEEP_INTERVAL,
            probe_timeout: PROBE_TIMEOUT,
            request_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(10),
            presign_expiry: PRESIGN_EXPIRY,
            max_upload_size: 32 << 20,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from `S3BROWSER_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// Recognized variables:
    /// - `S3BROWSER_BIND`: listen address
    /// - `S3BROWSER_STATIC_DIR`: frontend directory
    /// - `S3BROWSER_PROBE_TIMEOUT_SECS`: connect probe timeout
    /// - `S3BROWSER_MAX_UPLOAD_MB`: upload size limit
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::InvalidInput`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = lookup("S3BROWSER_BIND") {
            config.bind = bind;
        }

        if let Some(dir) = lookup("S3BROWSER_STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(secs) = lookup("S3BROWSER_PROBE_TIMEOUT_SECS") {
            config.probe_timeout = Duration::from_secs(parse_number("S3BROWSER_PROBE_TIMEOUT_SECS", &secs)?);
        }

        if let Some(mb) = lookup("S3BROWSER_MAX_UPLOAD_MB") {
            config.max_upload_size = usize::try_from(parse_number("S3BROWSER_MAX_UPLOAD_MB", &mb)?)
                .ok()
                .and_then(|n| n.checked_mul(1024 * 1024))
                .ok_or_else(|| {
                    BrowserError::InvalidInput(format!("S3BROWSER_MAX_UPLOAD_MB={mb:?}: too large"))
                })?;
        }

        Ok(config)
    }

    /// Sets the listen address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Sets the directory the frontend is served from.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Sets the session idle time-to-live.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the expiry sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the connect probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| BrowserError::InvalidInput(format!("{key}={value:?}: {e}")))
}
