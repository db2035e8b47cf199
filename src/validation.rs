//! Connect-parameter validation and credential probing.
//!
//! Validation happens in two stages: [`ConnectRequest::validate`] checks the
//! mandatory fields and normalizes the endpoint without touching the network,
//! then [`CredentialValidator::validate`] builds a client and probes the live
//! endpoint exactly once.

use crate::client::StorageClient;
use crate::config::PROBE_TIMEOUT;
use crate::factory::ClientFactory;
use crate::{BrowserError, Result};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Message returned when any mandatory connect field is missing.
pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: endpoint, access_key, secret_key, and region are required";

/// Maximum allowed length for object keys.
const MAX_KEY_LENGTH: usize = 1024;

/// Raw connection parameters as submitted by the user.
///
/// Absent string fields deserialize as empty strings and `use_ssl` defaults
/// to `false`, so a partially-filled form reaches [`validate`](Self::validate)
/// instead of failing deserialization.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectRequest {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub use_ssl: bool,
}

impl ConnectRequest {
    /// Creates a request with `use_ssl = false`.
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
            use_ssl: false,
        }
    }

    /// Sets the TLS flag used when the endpoint has no scheme.
    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// Checks the mandatory fields and normalizes the endpoint.
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Validation`] if endpoint, access key, secret key
    /// or region is empty or whitespace-only.
    ///
    /// # Example
    ///
    /// ```
    /// use s3browser::validation::ConnectRequest;
    ///
    /// let creds = ConnectRequest::new("minio.local:9000", "AKIA1234", "secret", "us-east-1")
    ///     .validate()
    ///     .unwrap();
    /// assert_eq!(creds.endpoint(), "http://minio.local:9000");
    ///
    /// assert!(ConnectRequest::new("minio.local:9000", "AKIA1234", "", "us-east-1")
    ///     .validate()
    ///     .is_err());
    /// ```
    pub fn validate(&self) -> Result<Credentials> {
        let fields = [&self.endpoint, &self.access_key, &self.secret_key, &self.region];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(BrowserError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        Ok(Credentials {
            endpoint: normalize_endpoint(self.endpoint.trim(), self.use_ssl),
            access_key: self.access_key.trim().to_string(),
            secret_key: self.secret_key.clone(),
            region: self.region.trim().to_string(),
            use_ssl: self.use_ssl,
        })
    }
}

impl fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("endpoint", &self.endpoint)
            .field("access_key", &mask_access_key(&self.access_key))
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}

/// Validated, immutable connection credentials.
///
/// Only obtainable through [`ConnectRequest::validate`], so holding one means
/// every mandatory field is present and the endpoint carries a scheme.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    endpoint: String,
    access_key: String,
    secret_key: String,
    region: String,
    use_ssl: bool,
}

impl Credentials {
    /// Endpoint URI including scheme.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("access_key", &mask_access_key(&self.access_key))
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}

/// Prefixes a scheme onto an endpoint that lacks one.
///
/// # Example
///
/// ```
/// use s3browser::validation::normalize_endpoint;
///
/// assert_eq!(normalize_endpoint("minio.local:9000", false), "http://minio.local:9000");
/// assert_eq!(normalize_endpoint("s3.example.com", true), "https://s3.example.com");
/// assert_eq!(normalize_endpoint("http://localhost:9000/", true), "http://localhost:9000");
/// ```
pub fn normalize_endpoint(endpoint: &str, use_ssl: bool) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let lower = endpoint.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else if use_ssl {
        format!("https://{endpoint}")
    } else {
        format!("http://{endpoint}")
    }
}

/// Returns the first four characters of an access key followed by `...`.
pub fn mask_access_key(access_key: &str) -> String {
    let prefix: String = access_key.chars().take(4).collect();
    format!("{prefix}...")
}

/// Validates a bucket name taken from a request.
///
/// # Errors
///
/// Returns [`BrowserError::InvalidInput`] if the name is empty.
pub fn validate_bucket_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BrowserError::InvalidInput("Bucket name is required".to_string()));
    }
    Ok(())
}

/// Validates an object key taken from a request.
///
/// # Errors
///
/// Returns [`BrowserError::InvalidInput`] if the key is empty, longer than
/// 1024 bytes, or contains a null byte.
pub fn validate_object_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(BrowserError::InvalidInput("Object key is required".to_string()));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(BrowserError::InvalidInput(format!(
            "Object key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    if key.contains('\0') {
        return Err(BrowserError::InvalidInput(
            "Object key contains null byte".to_string(),
        ));
    }

    Ok(())
}

/// Credentials that passed the live probe, together with the client that proved them.
pub struct ValidatedConnection {
    pub credentials: Credentials,
    pub client: Arc<dyn StorageClient>,
}

impl fmt::Debug for ValidatedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConnection")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Turns raw connect parameters into a proven, usable client handle.
///
/// Mutates no state. A failed validation leaves nothing behind.
#[derive(Clone)]
pub struct CredentialValidator {
    factory: Arc<dyn ClientFactory>,
    probe_timeout: Duration,
}

impl CredentialValidator {
    /// Creates a validator with the default 30 second probe timeout.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    /// Overrides the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Validates fields, builds a client, and probes the endpoint once.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::Validation`]: a mandatory field is missing (no network call made)
    /// - [`BrowserError::Connection`]: client construction, the probe, or the
    ///   probe timeout failed
    pub async fn validate(&self, request: &ConnectRequest) -> Result<ValidatedConnection> {
        let credentials = request.validate()?;

        let client = self
            .factory
            .build(&credentials)
            .await
            .map_err(into_connection_error)?;

        debug!(
            endpoint = %credentials.endpoint(),
            factory = self.factory.name(),
            "probing storage endpoint"
        );

        match tokio::time::timeout(self.probe_timeout, client.probe()).await {
            Ok(Ok(())) => Ok(ValidatedConnection { credentials, client }),
            Ok(Err(e)) => {
                warn!(endpoint = %credentials.endpoint(), error = %e, "connection probe failed");
                Err(into_connection_error(e))
            }
            Err(_) => {
                warn!(endpoint = %credentials.endpoint(), "connection probe timed out");
                Err(BrowserError::connection(format!(
                    "probe timed out after {}s",
                    self.probe_timeout.as_secs_f32()
                )))
            }
        }
    }
}

fn into_connection_error(err: BrowserError) -> BrowserError {
    match err {
        e @ BrowserError::Connection { .. } => e,
        other => BrowserError::connection(other),
    }
}
