//! HTTP API tests against the router with the in-memory storage client.
//!
//! Run with:
//!   cargo test --test http_api

#![cfg(feature = "mock")]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use s3browser::backends::mock::MockClientFactory;
use s3browser::client::StorageClient;
use s3browser::clock::ManualClock;
use s3browser::server::{create_router, AppState};
use s3browser::validation::MISSING_FIELDS_MESSAGE;
use s3browser::{Config, CredentialValidator, SessionStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    factory: Arc<MockClientFactory>,
    state: AppState,
}

fn test_app_with(factory: MockClientFactory, config: Config) -> TestApp {
    let factory = Arc::new(factory);
    let state = AppState::new(config, factory.clone());
    TestApp {
        router: create_router(state.clone()),
        factory,
        state,
    }
}

fn test_app() -> TestApp {
    test_app_with(MockClientFactory::new(), Config::new())
}

fn connect_body() -> Value {
    json!({
        "endpoint": "minio.local:9000",
        "access_key": "AKIAEXAMPLE",
        "secret_key": "secret",
        "region": "us-east-1",
        "use_ssl": false
    })
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Connects and returns the `session_id=...` pair for the Cookie header.
async fn connect(app: &TestApp) -> String {
    let (status, headers, _) = send(&app.router, json_request("/api/connect", &connect_body())).await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn has_session(app: &TestApp, cookie: Option<&str>) -> bool {
    let (status, _, body) = send(&app.router, request(Method::GET, "/api/session/status", cookie)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    body["has_session"].as_bool().unwrap()
}

fn multipart_request(uri: &str, cookie: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "s3browser-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_connect_sets_session_cookie() {
    let app = test_app();
    let (status, headers, body) = send(&app.router, json_request("/api/connect", &connect_body())).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Connection successful");
    let token = body["session_id"].as_str().unwrap();
    assert!(!token.is_empty());

    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with(&format!("session_id={token}")));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));

    assert_eq!(app.factory.probe_count(), 1);
    assert_eq!(app.state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_connect_missing_field_makes_no_call() {
    let app = test_app();
    let mut body = connect_body();
    body.as_object_mut().unwrap().remove("secret_key");

    let (status, headers, body) = send(&app.router, json_request("/api/connect", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get(header::SET_COOKIE).is_none());
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], MISSING_FIELDS_MESSAGE);
    assert!(body.get("session_id").is_none());

    assert_eq!(app.factory.build_count(), 0);
    assert_eq!(app.factory.probe_count(), 0);
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_connect_probe_failure() {
    let app = test_app_with(
        MockClientFactory::new().with_probe_error("InvalidAccessKeyId"),
        Config::new(),
    );
    let (status, headers, body) = send(&app.router, json_request("/api/connect", &connect_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get(header::SET_COOKIE).is_none());
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Connection failed:"));
    assert!(message.contains("InvalidAccessKeyId"));
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_connect_malformed_body() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/connect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request format"));
}

#[tokio::test]
async fn test_status_without_cookie() {
    let app = test_app();
    assert!(!has_session(&app, None).await);
    assert!(!has_session(&app, Some("session_id=bogus")).await);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = test_app();
    let cookie = connect(&app).await;
    let token = cookie.trim_start_matches("session_id=").to_string();
    assert!(has_session(&app, Some(&cookie)).await);

    let (status, headers, body) = send(&app.router, request(Method::POST, "/api/logout", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["message"], "Logged out successfully");

    assert!(!has_session(&app, Some(&cookie)).await);
    assert!(app.state.sessions.get(&token).await.is_none());

    let (status, _, _) = send(&app.router, request(Method::GET, "/api/buckets", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = test_app();
    let (status, _, _) = send(&app.router, request(Method::POST, "/api/logout", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_idle_session_swept() {
    let clock = Arc::new(ManualClock::new());
    let factory = Arc::new(MockClientFactory::new());
    let store = Arc::new(
        SessionStore::new(CredentialValidator::new(factory.clone())).with_clock(clock.clone()),
    );
    let state = AppState::with_store(Config::new(), store.clone());
    let app = TestApp {
        router: create_router(state.clone()),
        factory,
        state,
    };

    let stale = connect(&app).await;
    clock.advance(chrono::Duration::hours(24));
    let fresh = connect(&app).await;
    clock.advance(chrono::Duration::hours(1));

    assert_eq!(store.sweep(Duration::from_secs(24 * 3600)).await, 1);

    assert!(!has_session(&app, Some(&stale)).await);
    assert!(has_session(&app, Some(&fresh)).await);
    let token = stale.trim_start_matches("session_id=");
    assert!(store.get(token).await.is_none());
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = test_app();
    let cases = [
        (Method::GET, "/api/buckets"),
        (Method::PUT, "/api/buckets/photos"),
        (Method::DELETE, "/api/buckets/photos"),
        (Method::GET, "/api/objects?bucket=photos"),
        (Method::GET, "/api/objects/cat.png?bucket=photos"),
        (Method::DELETE, "/api/objects/cat.png?bucket=photos"),
        (Method::GET, "/api/presigned-url?bucket=photos&key=cat.png"),
        (Method::GET, "/api/list?bucket=photos"),
        (Method::GET, "/api/view/cat.png?bucket=photos"),
        (Method::DELETE, "/api/delete/cat.png?bucket=photos"),
    ];

    for (method, uri) in cases {
        for cookie in [None, Some("session_id="), Some("session_id=bogus")] {
            let (status, _, body) = send(&app.router, request(method.clone(), uri, cookie)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri} {cookie:?}");
            assert_eq!(body, b"No valid session");
        }
    }

    // No storage client was ever built
    assert_eq!(app.factory.build_count(), 0);
}

#[tokio::test]
async fn test_bucket_lifecycle() {
    let app = test_app();
    let cookie = connect(&app).await;

    let (status, _, body) = send(&app.router, request(Method::PUT, "/api/buckets/photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, b"Bucket photos created successfully");

    let (status, _, body) = send(&app.router, request(Method::GET, "/api/buckets", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let buckets: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(buckets[0]["name"], "photos");

    let (status, _, _) = send(&app.router, request(Method::DELETE, "/api/buckets/photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app.router, request(Method::DELETE, "/api/buckets/photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Bucket not found.");
}

#[tokio::test]
async fn test_delete_non_empty_bucket_conflict() {
    let app = test_app();
    app.factory.client().set_object("docs", "a.txt", "hello").await;
    let cookie = connect(&app).await;

    let (status, _, body) = send(&app.router, request(Method::DELETE, "/api/buckets/docs", Some(&cookie))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(String::from_utf8(body).unwrap().contains("not empty"));
}

#[tokio::test]
async fn test_access_denied_maps_to_forbidden() {
    let app = test_app_with(MockClientFactory::new().with_storage_error("AccessDenied"), Config::new());
    let cookie = connect(&app).await;

    let (status, _, _) = send(&app.router, request(Method::DELETE, "/api/buckets/docs", Some(&cookie))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_object_lifecycle() {
    let app = test_app();
    app.factory.client().set_bucket("photos").await;
    let cookie = connect(&app).await;

    let (status, _, body) = send(
        &app.router,
        multipart_request("/api/objects/notes/readme.txt?bucket=photos", &cookie, "ignored.bin", "hello"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        b"File notes/readme.txt uploaded successfully to bucket photos"
    );

    let (status, _, body) = send(&app.router, request(Method::GET, "/api/objects?bucket=photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let objects: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(objects[0]["key"], "notes/readme.txt");
    assert_eq!(objects[0]["size"], 5);

    let (status, headers, body) = send(
        &app.router,
        request(Method::GET, "/api/objects/notes/readme.txt?bucket=photos", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body, b"hello");

    let (status, _, _) = send(
        &app.router,
        request(Method::DELETE, "/api/objects/notes/readme.txt?bucket=photos", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app.router, request(Method::GET, "/api/list?bucket=photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn test_upload_uses_file_name_without_key() {
    let app = test_app();
    app.factory.client().set_bucket("photos").await;
    let cookie = connect(&app).await;

    let (status, _, _) = send(
        &app.router,
        multipart_request("/api/objects?bucket=photos", &cookie, "cat.png", "png-bytes"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, headers, _) = send(&app.router, request(Method::GET, "/api/view/cat.png?bucket=photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_missing_bucket_query() {
    let app = test_app();
    let cookie = connect(&app).await;

    let (status, _, body) = send(&app.router, request(Method::GET, "/api/objects", Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Bucket name is required");
}

#[tokio::test]
async fn test_missing_object() {
    let app = test_app();
    app.factory.client().set_bucket("photos").await;
    let cookie = connect(&app).await;

    let (status, _, _) = send(&app.router, request(Method::GET, "/api/objects/nope.txt?bucket=photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_presigned_url() {
    let app = test_app();
    let cookie = connect(&app).await;

    let (status, _, body) = send(
        &app.router,
        request(Method::GET, "/api/presigned-url?bucket=photos&key=cat.png", Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("mock://photos/cat.png"));
    assert!(url.contains("response-content-type=image/png"));
    assert!(url.contains("X-Amz-Expires=900"));

    let (status, _, _) = send(&app.router, request(Method::GET, "/api/presigned-url?bucket=photos", Some(&cookie))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_method() {
    let app = test_app();
    let (status, _, _) = send(&app.router, request(Method::GET, "/api/connect", None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    let app = test_app_with(MockClientFactory::new(), Config::new().with_max_upload_size(512));
    app.factory.client().set_bucket("photos").await;
    let cookie = connect(&app).await;

    let (status, _, _) = send(
        &app.router,
        multipart_request("/api/objects/big.txt?bucket=photos", &cookie, "big.txt", &"x".repeat(4096)),
    )
    .await;
    assert!(status.is_client_error());
    assert!(app.factory.client().list_objects("photos").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_static_dir_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>s3browser</h1>").unwrap();

    let app = test_app_with(MockClientFactory::new(), Config::new().with_static_dir(dir.path()));

    let (status, _, body) = send(&app.router, request(Method::GET, "/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>s3browser</h1>");

    // API routes still take precedence
    assert!(!has_session(&app, None).await);
}

async fn assert_connect_timed_out(app: &TestApp) {
    let (status, headers, body) = send(&app.router, json_request("/api/connect", &connect_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get(header::SET_COOKIE).is_none());
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Connection failed:"));
    assert!(message.contains("timed out"));
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_connect_slow_endpoint_default_config() {
    let app = test_app_with(
        MockClientFactory::new().with_probe_delay(Duration::from_secs(120)),
        Config::new(),
    );
    assert_connect_timed_out(&app).await;
    assert_eq!(app.factory.probe_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connect_probe_timeout_above_request_timeout() {
    let app = test_app_with(
        MockClientFactory::new().with_probe_delay(Duration::from_secs(120)),
        Config::new().with_probe_timeout(Duration::from_secs(60)),
    );
    assert_connect_timed_out(&app).await;
}
