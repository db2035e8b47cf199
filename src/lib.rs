//! s3browser - Web front end for S3-compatible object storage.
//!
//! A user connects once with an endpoint and access keys. The server probes
//! the endpoint, keeps a ready storage client in an in-memory session, and
//! hands the browser an opaque `session_id` cookie. Every later bucket or
//! object request resolves that cookie to its session before touching
//! storage.
//!
//! # Components
//!
//! - [`CredentialValidator`]: checks connect fields, builds a client, and
//!   probes the endpoint with a single `ListBuckets` call.
//! - [`SessionStore`]: token to session map with idle-time tracking.
//! - [`ExpirySweeper`]: background task evicting sessions idle past the TTL.
//! - [`AuthGate`]: the only path from a token to a storage client.
//!
//! # Quick Start
//!
//! ```
//! use s3browser::backends::mock::MockClientFactory;
//! use s3browser::{AuthGate, ConnectRequest, CredentialValidator, SessionStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> s3browser::Result<()> {
//!     let validator = CredentialValidator::new(Arc::new(MockClientFactory::new()));
//!     let store = Arc::new(SessionStore::new(validator));
//!
//!     let request = ConnectRequest::new("minio.local:9000", "AKIAEXAMPLE", "secret", "us-east-1");
//!     let session = store.create(&request).await?;
//!
//!     let gate = AuthGate::new(store.clone());
//!     let buckets = gate
//!         .guard(Some(session.token()), |session| async move {
//!             session.client().list_buckets().await
//!         })
//!         .await?;
//!     assert!(buckets.is_empty());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `mock` | yes | In-memory storage client for tests |
//! | `s3` | yes | aws-sdk-s3 client, required by the binary |

pub mod app;
pub mod backends;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod factory;
pub mod gate;
pub mod item;
pub mod server;
pub mod session;
pub mod sweeper;
pub mod validation;

pub use client::StorageClient;
pub use config::Config;
pub use error::{BrowserError, Result};
pub use factory::ClientFactory;
pub use gate::AuthGate;
pub use session::{Session, SessionStore};
pub use sweeper::ExpirySweeper;
pub use validation::{ConnectRequest, CredentialValidator, Credentials};
