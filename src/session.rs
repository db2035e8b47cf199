//! In-memory session store.
//!
//! This module provides [`SessionStore`], the authoritative map from opaque
//! token to [`Session`]. A session binds a validated set of credentials to a
//! live [`StorageClient`] and tracks when it was last used so the
//! [`ExpirySweeper`](crate::sweeper::ExpirySweeper) can evict idle ones.
//!
//! # Locking
//!
//! The map sits behind a single `tokio::sync::RwLock`. Every operation that
//! writes, including [`SessionStore::get`] (which refreshes `last_used_at`),
//! takes the write lock. The network probe in [`SessionStore::create`] runs
//! before the lock is acquired, so the lock is never held across I/O.

use crate::client::StorageClient;
use crate::clock::{Clock, SystemClock};
use crate::validation::{ConnectRequest, CredentialValidator, Credentials, ValidatedConnection};
use crate::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Random bytes per session token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// An authenticated binding between a token and a live storage client.
///
/// Values handed out by the store are snapshots: the client handle is shared,
/// the timestamps reflect the moment of the lookup.
#[derive(Clone)]
pub struct Session {
    token: String,
    credentials: Credentials,
    client: Arc<dyn StorageClient>,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
}

impl Session {
    /// The opaque bearer token identifying this session.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The storage client bound to this session's credentials.
    pub fn client(&self) -> &Arc<dyn StorageClient> {
        &self.client
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> DateTime<Utc> {
        self.last_used_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &format!("{}...", token_prefix(&self.token)))
            .field("credentials", &self.credentials)
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .finish_non_exhaustive()
    }
}

/// Generates a fresh session token.
///
/// 32 bytes from the thread-local CSPRNG (ChaCha, seeded from the OS),
/// encoded as unpadded URL-safe base64 so it can travel in a cookie unescaped.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}

/// Concurrency-safe table of active sessions.
///
/// Only the operations below touch the map, so callers cannot bypass the
/// lock discipline.
///
/// # Example
///
/// ```
/// use s3browser::backends::mock::MockClientFactory;
/// use s3browser::session::SessionStore;
/// use s3browser::validation::{ConnectRequest, CredentialValidator};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> s3browser::Result<()> {
///     let validator = CredentialValidator::new(Arc::new(MockClientFactory::new()));
///     let store = SessionStore::new(validator);
///
///     let req = ConnectRequest::new("minio.local:9000", "AKIAEXAMPLE", "secret", "us-east-1");
///     let session = store.create(&req).await?;
///
///     assert!(store.get(session.token()).await.is_some());
///     store.delete(session.token()).await;
///     assert!(store.get(session.token()).await.is_none());
///     Ok(())
/// }
/// ```
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    validator: CredentialValidator,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates an empty store using wall-clock time.
    pub fn new(validator: CredentialValidator) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            validator,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the request against the live endpoint and admits a new session.
    ///
    /// The session is invisible to lookups until this returns `Ok`.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::Validation`](crate::BrowserError::Validation): a
    ///   mandatory field is missing
    /// - [`BrowserError::Connection`](crate::BrowserError::Connection): the
    ///   probe failed or timed out
    ///
    /// Nothing is inserted on failure.
    pub async fn create(&self, request: &ConnectRequest) -> Result<Session> {
        let ValidatedConnection { credentials, client } = self.validator.validate(request).await?;

        let mut sessions = self.sessions.write().await;

        let token = loop {
            let candidate = generate_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let now = self.clock.now();
        let session = Session {
            token: token.clone(),
            credentials,
            client,
            created_at: now,
            last_used_at: now,
        };
        sessions.insert(token, session.clone());
        let active = sessions.len();
        drop(sessions);

        info!(
            session = token_prefix(session.token()),
            endpoint = %session.credentials.endpoint(),
            active,
            "session created"
        );

        Ok(session)
    }

    /// Looks up a session and refreshes its `last_used_at`.
    ///
    /// Returns `None` for unknown, deleted or evicted tokens. `last_used_at`
    /// never moves backwards, even if the clock does.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;

        let Some(session) = sessions.get_mut(token) else {
            debug!("session lookup miss");
            return None;
        };

        let now = self.clock.now();
        if now > session.last_used_at {
            session.last_used_at = now;
        }

        Some(session.clone())
    }

    /// Removes a session.
    ///
    /// Idempotent: returns `false` when the token was absent.
    pub async fn delete(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);

        match removed {
            Some(session) => {
                info!(session = token_prefix(session.token()), "session deleted");
                true
            }
            None => false,
        }
    }

    /// Evicts every session idle for longer than `ttl`.
    ///
    /// A session is evicted iff `last_used_at < now - ttl`. Returns the number
    /// of sessions removed.
    pub async fn sweep(&self, ttl: std::time::Duration) -> usize {
        let Ok(ttl) = Duration::from_std(ttl) else {
            return 0;
        };

        let mut sessions = self.sessions.write().await;

        let Some(cutoff) = self.clock.now().checked_sub_signed(ttl) else {
            return 0;
        };

        let before = sessions.len();
        sessions.retain(|token, session| {
            let keep = session.last_used_at >= cutoff;
            if !keep {
                info!(session = token_prefix(token), "session expired and removed");
            }
            keep
        });

        before - sessions.len()
    }

    /// Drops every session. Used at shutdown.
    pub async fn clear(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
