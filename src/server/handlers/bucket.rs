//! Bucket endpoints.

use crate::item::Bucket;
use crate::server::error::ApiError;
use crate::server::extract::AuthSession;
use crate::validation::validate_bucket_name;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

/// `GET /api/buckets`
pub async fn list_buckets(AuthSession(session): AuthSession) -> Result<Json<Vec<Bucket>>, ApiError> {
    let buckets = session.client().list_buckets().await?;
    Ok(Json(buckets))
}

/// `PUT /api/buckets/{name}`
pub async fn create_bucket(
    AuthSession(session): AuthSession,
    Path(name): Path<String>,
) -> Result<(StatusCode, String), ApiError> {
    validate_bucket_name(&name)?;
    session.client().create_bucket(&name).await?;

    info!(bucket = %name, "Bucket created");
    Ok((StatusCode::CREATED, format!("Bucket {name} created successfully")))
}

/// `DELETE /api/buckets/{name}`
pub async fn delete_bucket(
    AuthSession(session): AuthSession,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_bucket_name(&name)?;
    session.client().delete_bucket(&name).await?;

    info!(bucket = %name, "Bucket deleted");
    Ok(StatusCode::NO_CONTENT)
}
