//! Shared helpers for router-level tests.
//!
//! Each test builds the real router over the in-memory stores and drives
//! it through `tower::ServiceExt::oneshot`, so the full extract → service →
//! store path runs without a database.

// Each test binary uses a subset of these helpers
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use emporium_api::{ApiConfig, AppState, Stores, router};

pub const BASE_URL: &str = "http://localhost:8080";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused-in-tests"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: BASE_URL.to_owned(),
        jwt_secret: SecretString::from("kD93mQ7xLapR2vN8wZc4yTb6hJf1sGu0"),
        upload_dir: PathBuf::from("unused-in-tests"),
    }
}

/// The application router over in-memory stores.
pub fn app() -> Router {
    router(AppState::new(test_config(), Stores::in_memory()))
}

/// Send a JSON request; returns status and parsed body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    send(app, request).await
}

/// Send any request; returns status and parsed JSON body (Null if empty
/// or not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Register an account and return `(user_id, access_token)`.
pub async fn register(app: &Router, email: &str, role: Option<&str>) -> (i64, String) {
    let mut body = serde_json::json!({
        "name": "Test User",
        "email": email,
        "password": "correct horse battery",
    });
    if let Some(role) = role {
        body["role"] = Value::String(role.to_owned());
    }

    let (status, json) = send_json(app, "POST", "/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "register failed: {json}");

    let data = &json["data"];
    (
        data["user_id"].as_i64().expect("user_id"),
        data["access_token"].as_str().expect("access_token").to_owned(),
    )
}

/// Register an admin and seed one category; returns `(admin_token, category_id)`.
pub async fn admin_with_category(app: &Router) -> (String, i64) {
    let (_, admin) = register(app, "admin@example.com", Some("admin")).await;

    let (status, json) = send_json(
        app,
        "POST",
        "/api/categories",
        Some(&admin),
        Some(serde_json::json!({"name": "Gadgets"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "category create failed: {json}");

    (admin, json["data"]["id"].as_i64().expect("category id"))
}

/// Create a product as admin; returns its id.
pub async fn create_product(
    app: &Router,
    admin: &str,
    category_id: i64,
    name: &str,
    price: &str,
) -> i64 {
    let (status, json) = send_json(
        app,
        "POST",
        "/api/products",
        Some(admin),
        Some(serde_json::json!({
            "name": name,
            "description": "a test product",
            "price": price,
            "stock_quantity": 10,
            "category_id": category_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "product create failed: {json}");

    json["data"]["id"].as_i64().expect("product id")
}

/// Build a multipart request uploading the given files.
pub fn multipart_request(uri: &str, token: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    const BOUNDARY: &str = "emporium-test-boundary";

    let mut body: Vec<u8> = Vec::new();
    for (file_name, content_type, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}
