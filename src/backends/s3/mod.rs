//! S3-compatible object store backend.
//!
//! Talks to AWS S3, MinIO, Ceph RGW, LocalStack or anything else speaking the
//! S3 API, using the official AWS SDK.
//!
//! # Addressing
//!
//! Clients always use path-style addressing (`http://host/bucket/key`), since
//! most self-hosted endpoints do not resolve virtual-hosted bucket names.
//!
//! # Example
//!
//! ```no_run
//! use s3browser::backends::s3::S3ClientFactory;
//! use s3browser::session::SessionStore;
//! use s3browser::validation::{ConnectRequest, CredentialValidator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> s3browser::Result<()> {
//!     let validator = CredentialValidator::new(Arc::new(S3ClientFactory::new()));
//!     let store = SessionStore::new(validator);
//!
//!     let req = ConnectRequest::new("localhost:9000", "minioadmin", "minioadmin", "us-east-1");
//!     let session = store.create(&req).await?;
//!
//!     for bucket in session.client().list_buckets().await? {
//!         println!("{}", bucket.name);
//!     }
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{S3ClientFactory, S3StorageClient};
