//! Connect, logout and session-status endpoints.

use crate::server::extract::{removal_cookie, session_cookie, session_token};
use crate::server::AppState;
use crate::validation::{mask_access_key, ConnectRequest};
use crate::BrowserError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Result of a connection attempt.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Whether the caller holds a live session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub has_session: bool,
}

fn connect_failure(message: impl Into<String>) -> Response {
    let body = ConnectResponse {
        success: false,
        message: message.into(),
        session_id: None,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// `GET /api/session/status`
pub async fn check_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<SessionStatusResponse> {
    let token = session_token(&jar);
    let has_session = state.gate.authorize(token.as_deref()).await.is_ok();
    Json(SessionStatusResponse { has_session })
}

/// `POST /api/connect`
///
/// Probes the endpoint and, on success, sets the `session_id` cookie.
pub async fn connect(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Failed to parse connection request");
            return connect_failure(format!("Invalid request format: {}", rejection.body_text()));
        }
    };

    info!(
        endpoint = %request.endpoint,
        region = %request.region,
        access_key = %mask_access_key(&request.access_key),
        "Creating S3 connection"
    );

    let session = match state.sessions.create(&request).await {
        Ok(session) => session,
        Err(BrowserError::Validation(message)) => return connect_failure(message),
        Err(e) => {
            error!(error = %e, "Failed to create session");
            return connect_failure(format!("Connection failed: {e}"));
        }
    };

    let token = session.token().to_string();
    let jar = jar.add(session_cookie(token.clone(), state.config.session_ttl));

    let body = ConnectResponse {
        success: true,
        message: "Connection successful".to_string(),
        session_id: Some(token),
    };
    (jar, Json(body)).into_response()
}

/// `POST /api/logout`
///
/// Always succeeds; an absent or stale cookie is simply cleared.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        state.sessions.delete(&token).await;
    }

    let jar = jar.add(removal_cookie());
    (
        jar,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
