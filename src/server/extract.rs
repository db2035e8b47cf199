//! Request extractors and cookie helpers.

use super::error::ApiError;
use super::AppState;
use crate::session::Session;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::time::Duration;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// A live session resolved by the [`AuthGate`](crate::gate::AuthGate).
///
/// Taking this as a handler argument makes the handler protected: axum rejects
/// the request with 401 before the handler body runs when the `session_id`
/// cookie is absent or does not resolve to a live session.
pub struct AuthSession(pub Session);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).map(|c| c.value());

        let session = state.gate.authorize(token).await?;
        Ok(AuthSession(session))
    }
}

/// Returns the token from the session cookie, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Builds the `session_id` cookie: HTTP-only, `SameSite=Strict`, lifetime bounded by `ttl`.
pub fn session_cookie(token: impl Into<String>, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(ttl.as_secs() as i64))
        .build()
}

/// Builds a cookie that clears `session_id` in the browser.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
