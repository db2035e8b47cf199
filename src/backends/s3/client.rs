//! aws-sdk-s3 storage client and factory.

use crate::client::StorageClient;
use crate::factory::ClientFactory;
use crate::item::{Bucket, ObjectData, ObjectSummary};
use crate::validation::Credentials;
use crate::{BrowserError, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials as StaticCredentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTimeFormat};
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builds [`S3StorageClient`]s from session credentials.
#[derive(Debug, Default, Clone)]
pub struct S3ClientFactory;

impl S3ClientFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClientFactory for S3ClientFactory {
    fn name(&self) -> &str {
        "s3"
    }

    async fn build(&self, credentials: &Credentials) -> Result<Arc<dyn StorageClient>> {
        let provider = StaticCredentials::new(
            credentials.access_key(),
            credentials.secret_key(),
            None,
            None,
            "s3browser",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region().to_string()))
            .credentials_provider(provider)
            .endpoint_url(credentials.endpoint())
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        debug!(endpoint = %credentials.endpoint(), region = %credentials.region(), "S3 client built");

        Ok(Arc::new(S3StorageClient::new(Client::from_conf(s3_config))))
    }
}

/// Storage client backed by `aws_sdk_s3::Client`.
#[derive(Debug, Clone)]
pub struct S3StorageClient {
    client: Client,
}

impl S3StorageClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Converts an SDK error, keeping the S3 error code when the service sent one.
fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> BrowserError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    BrowserError::storage(operation, code, message)
}

#[async_trait]
impl StorageClient for S3StorageClient {
    async fn probe(&self) -> Result<()> {
        // Exactly one round trip per probe
        self.client
            .list_buckets()
            .customize()
            .config_override(
                aws_sdk_s3::config::Builder::default().retry_config(RetryConfig::disabled()),
            )
            .send()
            .await
            .map_err(|e| sdk_error("list_buckets", e))?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| sdk_error("list_buckets", e))?;

        Ok(response
            .buckets()
            .iter()
            .map(|bucket| Bucket {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket
                    .creation_date()
                    .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| sdk_error("create_bucket", e))?;
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| sdk_error("delete_bucket", e))?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| sdk_error("list_objects", e))?;

        Ok(response
            .contents()
            .iter()
            .map(|obj| ObjectSummary {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or_default(),
                etag: obj.e_tag().unwrap_or_default().to_string(),
                storage_class: obj
                    .storage_class()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("get_object", e))?;

        let content_type = response.content_type().map(str::to_string);
        let content_length = response.content_length();

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| BrowserError::storage("get_object", None, e.to_string()))?
            .into_bytes();

        Ok(ObjectData {
            body,
            content_type,
            content_length,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .acl(ObjectCannedAcl::Private)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| sdk_error("put_object", e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("delete_object", e))?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        response_content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| BrowserError::InvalidInput(format!("invalid presign expiry: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .response_content_type(response_content_type)
            .presigned(presign_config)
            .await
            .map_err(|e| sdk_error("presign_get", e))?;

        Ok(request.uri().to_string())
    }
}
