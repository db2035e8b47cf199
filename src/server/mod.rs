//! HTTP surface: router, shared state and handlers.
//!
//! Routes under `/api/session`, `/api/connect` and `/api/logout` are public.
//! Every other `/api` route takes an [`AuthSession`](extract::AuthSession)
//! and is rejected with 401 before its handler runs when the caller has no
//! live session.

pub mod error;
pub mod extract;
pub mod handlers;

use crate::config::Config;
use crate::factory::ClientFactory;
use crate::gate::AuthGate;
use crate::session::SessionStore;
use crate::validation::CredentialValidator;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use handlers::{bucket, object, session};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub gate: AuthGate,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the validator, store and gate for `factory`.
    pub fn new(config: Config, factory: Arc<dyn ClientFactory>) -> Self {
        let validator = CredentialValidator::new(factory).with_probe_timeout(config.probe_timeout);
        let sessions = Arc::new(SessionStore::new(validator));
        Self::with_store(config, sessions)
    }

    /// Builds state around an existing store.
    pub fn with_store(config: Config, sessions: Arc<SessionStore>) -> Self {
        Self {
            gate: AuthGate::new(sessions.clone()),
            sessions,
            config: Arc::new(config),
        }
    }
}

fn api_routes(request_timeout: Duration) -> Router<AppState> {
    let timed = Router::new()
        .route("/session/status", get(session::check_session))
        .route("/logout", post(session::logout))
        .route("/buckets", get(bucket::list_buckets))
        .route(
            "/buckets/{name}",
            put(bucket::create_bucket).delete(bucket::delete_bucket),
        )
        .route(
            "/objects",
            get(object::list_objects).post(object::upload_object_by_filename),
        )
        .route(
            "/objects/{*key}",
            get(object::view_object)
                .post(object::upload_object)
                .delete(object::delete_object),
        )
        .route("/presigned-url", get(object::presigned_url))
        // Legacy aliases
        .route("/list", get(object::list_objects))
        .route("/view/{*key}", get(object::view_object))
        .route("/delete/{*key}", delete(object::delete_object))
        .layer(TimeoutLayer::new(request_timeout));

    // Connect is bounded by the probe timeout, not the request timeout
    Router::new()
        .route("/connect", post(session::connect))
        .merge(timed)
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().nest("/api", api_routes(state.config.request_timeout));

    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    router
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
