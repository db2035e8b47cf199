//! Client factory: the seam between credentials and a concrete storage client.

use crate::client::StorageClient;
use crate::validation::Credentials;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Builds storage clients from validated credentials.
///
/// Construction must not perform network I/O; proving the credentials is the
/// job of [`StorageClient::probe`], called by the
/// [`CredentialValidator`](crate::validation::CredentialValidator).
///
/// # Example
///
/// ```
/// use s3browser::backends::mock::MockClientFactory;
/// use s3browser::factory::ClientFactory;
/// use s3browser::validation::ConnectRequest;
///
/// #[tokio::main]
/// async fn main() -> s3browser::Result<()> {
///     let factory = MockClientFactory::new();
///     let creds = ConnectRequest::new("minio.local:9000", "AKIAEXAMPLE", "secret", "us-east-1")
///         .validate()?;
///
///     let client = factory.build(&creds).await?;
///     client.probe().await?;
///     assert_eq!(factory.probe_count(), 1);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Returns a short name for logs (e.g. "s3", "mock").
    fn name(&self) -> &str;

    /// Constructs a client for the normalized endpoint, static credentials
    /// and region, configured for path-style addressing.
    async fn build(&self, credentials: &Credentials) -> Result<Arc<dyn StorageClient>>;
}

/// Returns the default factory for this build.
///
/// This is the aws-sdk-s3 factory when the `s3` feature is enabled.
#[cfg(feature = "s3")]
pub fn default_factory() -> Arc<dyn ClientFactory> {
    Arc::new(crate::backends::s3::S3ClientFactory::new())
}
