//! Storage client trait definition.
//!
//! This module defines the [`StorageClient`] trait: the live connection handle
//! a session owns. The session subsystem only ever calls [`StorageClient::probe`];
//! the remaining operations are thin pass-throughs used by the HTTP handlers.

use crate::item::{Bucket, ObjectData, ObjectSummary};
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// A reusable connection to an S3-compatible object store, bound to one set
/// of credentials and one endpoint.
///
/// All implementations must be `Send + Sync` so a single handle can be shared
/// read-only by every request presenting the same session token.
///
/// # Implementations
///
/// - **SDK-based**: [`S3StorageClient`](crate::backends::s3::S3StorageClient)
/// - **Testing**: [`MockStorageClient`](crate::backends::mock::MockStorageClient)
///   with error injection
#[async_trait]
pub trait StorageClient: Send + Sync {
    // ========================================================================
    // Connection
    // ========================================================================

    /// Performs one cheap read-only call proving the credentials work.
    ///
    /// The caller bounds this with its own timeout.
    async fn probe(&self) -> Result<()>;

    // ========================================================================
    // Buckets
    // ========================================================================

    /// Lists all buckets the credentials can see.
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// Creates a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Storage`](crate::BrowserError::Storage) carrying
    /// the service error code (e.g. `BucketAlreadyOwnedByYou`).
    async fn create_bucket(&self, name: &str) -> Result<()>;

    /// Deletes a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Storage`](crate::BrowserError::Storage) with code
    /// `BucketNotEmpty`, `NoSuchBucket` or `AccessDenied` for the common cases.
    async fn delete_bucket(&self, name: &str) -> Result<()>;

    // ========================================================================
    // Objects
    // ========================================================================

    /// Lists objects in a bucket (first page only).
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>>;

    /// Fetches an object body.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData>;

    /// Stores an object with a private ACL.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<()>;

    /// Deletes an object.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Generates a temporary GET URL for an object.
    ///
    /// `response_content_type` overrides the `Content-Type` the store returns
    /// when the URL is fetched.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        response_content_type: &str,
        expires_in: Duration,
    ) -> Result<String>;
}
