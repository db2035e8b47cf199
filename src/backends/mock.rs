//! Mock storage client for testing.
//!
//! This backend provides a complete in-memory object store with error
//! injection and probe counting, so code that uses s3browser can be tested
//! without a live endpoint.

use crate::client::StorageClient;
use crate::factory::ClientFactory;
use crate::item::{Bucket, ObjectData, ObjectSummary};
use crate::validation::Credentials;
use crate::{BrowserError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MockObject {
    body: Bytes,
    content_type: String,
    etag: String,
}

#[derive(Debug, Clone)]
struct MockBucket {
    created: DateTime<Utc>,
    objects: BTreeMap<String, MockObject>,
}

/// In-memory storage client.
///
/// Clones share the same buckets and counters.
///
/// # Example
///
/// ```
/// use s3browser::backends::mock::MockStorageClient;
/// use s3browser::client::StorageClient;
/// use s3browser::BrowserError;
///
/// #[tokio::main]
/// async fn main() -> s3browser::Result<()> {
///     let mut client = MockStorageClient::new();
///     client.set_object("photos", "cat.png", "meow").await;
///
///     assert_eq!(client.list_objects("photos").await?.len(), 1);
///
///     // Simulate a service failure
///     client.storage_error = Some("AccessDenied".to_string());
///     let err = client.list_buckets().await.unwrap_err();
///     assert_eq!(err.storage_code(), Some("AccessDenied"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MockStorageClient {
    buckets: Arc<RwLock<BTreeMap<String, MockBucket>>>,
    probes: Arc<AtomicUsize>,

    /// Error message returned from `probe()`
    pub probe_error: Option<String>,
    /// Delay before `probe()` completes
    pub probe_delay: Option<Duration>,
    /// S3 error code returned from every bucket and object operation
    pub storage_error: Option<String>,
}

impl MockStorageClient {
    /// Creates a client with no buckets.
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(BTreeMap::new())),
            probes: Arc::new(AtomicUsize::new(0)),
            probe_error: None,
            probe_delay: None,
            storage_error: None,
        }
    }

    /// Pre-populates an empty bucket.
    pub async fn set_bucket(&self, name: impl Into<String>) {
        let mut buckets = self.buckets.write().await;
        buckets.entry(name.into()).or_insert_with(|| MockBucket {
            created: Utc::now(),
            objects: BTreeMap::new(),
        });
    }

    /// Pre-populates an object, creating its bucket if needed.
    pub async fn set_object(
        &self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<Bytes>,
    ) {
        let key = key.into();
        let content_type = crate::item::guess_content_type(&key);
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(bucket.into()).or_insert_with(|| MockBucket {
            created: Utc::now(),
            objects: BTreeMap::new(),
        });
        bucket.objects.insert(key, new_object(body.into(), content_type));
    }

    /// Number of `probe()` calls made through this client and its clones.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn check_injected(&self, operation: &str) -> Result<()> {
        match self.storage_error {
            Some(ref code) => Err(BrowserError::storage(
                operation,
                Some(code.clone()),
                format!("injected {code}"),
            )),
            None => Ok(()),
        }
    }
}

impl Default for MockStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

fn new_object(body: Bytes, content_type: String) -> MockObject {
    MockObject {
        body,
        content_type,
        etag: format!("\"{}\"", uuid::Uuid::new_v4().simple()),
    }
}

fn no_such_bucket(operation: &str, bucket: &str) -> BrowserError {
    BrowserError::storage(
        operation,
        Some("NoSuchBucket".to_string()),
        format!("The specified bucket does not exist: {bucket}"),
    )
}

#[async_trait]
impl StorageClient for MockStorageClient {
    async fn probe(&self) -> Result<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }

        match self.probe_error {
            Some(ref err) => Err(BrowserError::storage("list_buckets", None, err.clone())),
            None => Ok(()),
        }
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        self.check_injected("list_buckets")?;

        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .map(|(name, b)| Bucket {
                name: name.clone(),
                creation_date: b.created.to_rfc3339_opts(SecondsFormat::Secs, true),
            })
            .collect())
    }

    async fn create_bucket(&self, name: &str) -> Result<()> {
        self.check_injected("create_bucket")?;

        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(name) {
            return Err(BrowserError::storage(
                "create_bucket",
                Some("BucketAlreadyOwnedByYou".to_string()),
                format!("bucket already exists: {name}"),
            ));
        }

        buckets.insert(
            name.to_string(),
            MockBucket {
                created: Utc::now(),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.check_injected("delete_bucket")?;

        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get(name)
            .ok_or_else(|| no_such_bucket("delete_bucket", name))?;

        if !bucket.objects.is_empty() {
            return Err(BrowserError::storage(
                "delete_bucket",
                Some("BucketNotEmpty".to_string()),
                "The bucket you tried to delete is not empty",
            ));
        }

        buckets.remove(name);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>> {
        self.check_injected("list_objects")?;

        let buckets = self.buckets.read().await;
        let b = buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket("list_objects", bucket))?;

        Ok(b.objects
            .iter()
            .map(|(key, obj)| ObjectSummary {
                key: key.clone(),
                size: obj.body.len() as i64,
                etag: obj.etag.clone(),
                storage_class: "STANDARD".to_string(),
            })
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        self.check_injected("get_object")?;

        let buckets = self.buckets.read().await;
        let obj = buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket("get_object", bucket))?
            .objects
            .get(key)
            .ok_or_else(|| {
                BrowserError::storage(
                    "get_object",
                    Some("NoSuchKey".to_string()),
                    format!("The specified key does not exist: {key}"),
                )
            })?;

        Ok(ObjectData {
            body: obj.body.clone(),
            content_type: Some(obj.content_type.clone()),
            content_length: Some(obj.body.len() as i64),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<()> {
        self.check_injected("put_object")?;

        let mut buckets = self.buckets.write().await;
        let b = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket("put_object", bucket))?;

        b.objects
            .insert(key.to_string(), new_object(body, content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.check_injected("delete_object")?;

        let mut buckets = self.buckets.write().await;
        let b = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket("delete_object", bucket))?;

        // S3 deletes are idempotent
        b.objects.remove(key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        response_content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        self.check_injected("presign_get")?;

        Ok(format!(
            "mock://{}/{}?response-content-type={}&X-Amz-Expires={}",
            bucket,
            key,
            response_content_type,
            expires_in.as_secs()
        ))
    }
}

/// Factory handing out [`MockStorageClient`]s that share one in-memory store.
///
/// Counts `build()` and `probe()` calls so tests can assert that invalid
/// input never reaches the network.
pub struct MockClientFactory {
    template: MockStorageClient,
    builds: AtomicUsize,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self {
            template: MockStorageClient::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// Makes every probe fail with `message`.
    pub fn with_probe_error(mut self, message: impl Into<String>) -> Self {
        self.template.probe_error = Some(message.into());
        self
    }

    /// Delays every probe by `delay`.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.template.probe_delay = Some(delay);
        self
    }

    /// Makes every bucket and object operation fail with the S3 error `code`.
    pub fn with_storage_error(mut self, code: impl Into<String>) -> Self {
        self.template.storage_error = Some(code.into());
        self
    }

    /// A client sharing the factory's store, for seeding fixtures.
    pub fn client(&self) -> MockStorageClient {
        self.template.clone()
    }

    pub fn probe_count(&self) -> usize {
        self.template.probe_count()
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Default for MockClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientFactory for MockClientFactory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn build(&self, _credentials: &Credentials) -> Result<Arc<dyn StorageClient>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.template.clone()))
    }
}
