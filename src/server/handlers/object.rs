//! Object endpoints.

use crate::item::{guess_content_type, ObjectSummary};
use crate::server::error::ApiError;
use crate::server::extract::AuthSession;
use crate::server::AppState;
use crate::session::Session;
use crate::validation::{validate_bucket_name, validate_object_key};
use crate::BrowserError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// `?bucket=` query shared by the object routes.
#[derive(Debug, Default, Deserialize)]
pub struct BucketQuery {
    pub bucket: Option<String>,
}

impl BucketQuery {
    fn bucket(&self) -> Result<&str, BrowserError> {
        let bucket = self
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| BrowserError::InvalidInput("Bucket name is required".to_string()))?;
        validate_bucket_name(bucket)?;
        Ok(bucket)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PresignQuery {
    pub bucket: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
}

/// `GET /api/objects?bucket=`
pub async fn list_objects(
    AuthSession(session): AuthSession,
    Query(query): Query<BucketQuery>,
) -> Result<Json<Vec<ObjectSummary>>, ApiError> {
    let bucket = query.bucket()?;
    let objects = session.client().list_objects(bucket).await?;
    Ok(Json(objects))
}

/// `GET /api/objects/{key}?bucket=`
pub async fn view_object(
    AuthSession(session): AuthSession,
    Path(key): Path<String>,
    Query(query): Query<BucketQuery>,
) -> Result<Response, ApiError> {
    let bucket = query.bucket()?;
    validate_object_key(&key)?;

    let object = session.client().get_object(bucket, &key).await?;
    let content_type = object
        .content_type
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| guess_content_type(&key));

    debug!(bucket = %bucket, key = %key, bytes = object.body.len(), "Serving object");
    Ok(([(header::CONTENT_TYPE, content_type)], object.body).into_response())
}

/// `POST /api/objects/{key}?bucket=`
pub async fn upload_object(
    AuthSession(session): AuthSession,
    Path(key): Path<String>,
    Query(query): Query<BucketQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, String), ApiError> {
    store_upload(session, Some(key), query, multipart).await
}

/// `POST /api/objects?bucket=`
///
/// The object key is taken from the uploaded file's name.
pub async fn upload_object_by_filename(
    AuthSession(session): AuthSession,
    Query(query): Query<BucketQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, String), ApiError> {
    store_upload(session, None, query, multipart).await
}

async fn store_upload(
    session: Session,
    key: Option<String>,
    query: BucketQuery,
    mut multipart: Multipart,
) -> Result<(StatusCode, String), ApiError> {
    let bucket = query.bucket()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BrowserError::InvalidInput(format!("Unable to parse form: {}", e.body_text())))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| BrowserError::InvalidInput(format!("Error retrieving file: {}", e.body_text())))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| BrowserError::InvalidInput("Error retrieving file: no file field".to_string()))?;

    let key = key.filter(|k| !k.is_empty()).unwrap_or(file_name);
    validate_object_key(&key)?;

    let content_type = guess_content_type(&key);
    let size = data.len();
    session
        .client()
        .put_object(bucket, &key, data, &content_type)
        .await?;

    info!(bucket = %bucket, key = %key, bytes = size, "Object uploaded");
    Ok((
        StatusCode::CREATED,
        format!("File {key} uploaded successfully to bucket {bucket}"),
    ))
}

/// `DELETE /api/objects/{key}?bucket=`
pub async fn delete_object(
    AuthSession(session): AuthSession,
    Path(key): Path<String>,
    Query(query): Query<BucketQuery>,
) -> Result<StatusCode, ApiError> {
    let bucket = query.bucket()?;
    validate_object_key(&key)?;

    session.client().delete_object(bucket, &key).await?;

    info!(bucket = %bucket, key = %key, "Object deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/presigned-url?bucket=&key=`
pub async fn presigned_url(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(query): Query<PresignQuery>,
) -> Result<Json<PresignResponse>, ApiError> {
    let (Some(bucket), Some(key)) = (
        query.bucket.filter(|b| !b.is_empty()),
        query.key.filter(|k| !k.is_empty()),
    ) else {
        return Err(BrowserError::InvalidInput("Bucket and key are required".to_string()).into());
    };
    validate_bucket_name(&bucket)?;
    validate_object_key(&key)?;

    let url = session
        .client()
        .presign_get(
            &bucket,
            &key,
            &guess_content_type(&key),
            state.config.presign_expiry,
        )
        .await?;

    Ok(Json(PresignResponse { url }))
}
