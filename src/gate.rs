//! Auth gate: the single enforcement point in front of protected operations.

use crate::session::{Session, SessionStore};
use crate::{BrowserError, Result};
use std::future::Future;
use std::sync::Arc;

/// Resolves caller-presented tokens to live sessions.
///
/// A missing token, an unknown token and an expired token are all rejected
/// with the same [`BrowserError::Unauthenticated`], so callers learn nothing
/// about which tokens ever existed.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<SessionStore>,
}

impl AuthGate {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Resolves a token, refreshing the session on success.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Unauthenticated`] when the token is absent,
    /// empty, or does not resolve to a live session.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Session> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(BrowserError::Unauthenticated)?;

        self.store
            .get(token)
            .await
            .ok_or(BrowserError::Unauthenticated)
    }

    /// Runs `op` with the resolved session, or rejects without running it.
    ///
    /// `op` is invoked at most once, after the session was confirmed live.
    /// No store lock is held while it runs.
    ///
    /// # Example
    ///
    /// ```
    /// use s3browser::backends::mock::MockClientFactory;
    /// use s3browser::gate::AuthGate;
    /// use s3browser::session::SessionStore;
    /// use s3browser::validation::CredentialValidator;
    /// use s3browser::BrowserError;
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let store = SessionStore::new(CredentialValidator::new(Arc::new(MockClientFactory::new())));
    ///     let gate = AuthGate::new(Arc::new(store));
    ///
    ///     let result = gate
    ///         .guard(None, |session| async move { session.client().list_buckets().await })
    ///         .await;
    ///     assert!(matches!(result, Err(BrowserError::Unauthenticated)));
    /// }
    /// ```
    pub async fn guard<F, Fut, T>(&self, token: Option<&str>, op: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.authorize(token).await?;
        op(session).await
    }
}
