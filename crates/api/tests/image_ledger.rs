//! Image ledger flows through the full router, multipart included.

mod common;

use axum::http::StatusCode;

use common::{admin_with_category, app, create_product, multipart_request, send, send_json};

const PNG_BYTES: &[u8] = b"not-a-real-png-but-bytes-enough";

#[tokio::test]
async fn upload_and_serve_roundtrip() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images?primary=true"),
        &admin,
        &[("photo.png", "image/png", PNG_BYTES)],
    );
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK, "{json}");
    let image = &json["data"];
    assert_eq!(image["is_primary"], true);
    assert_eq!(image["display_order"], 0);
    assert_eq!(image["original_file_name"], "photo.png");

    // The recorded URL resolves through the public serving route
    let url = image["url"].as_str().expect("url");
    let path = url.strip_prefix(common::BASE_URL).expect("path");
    let request = axum::http::Request::builder()
        .uri(path)
        .body(axum::body::Body::empty())
        .expect("request");
    let response = {
        use tower::ServiceExt;
        app.clone().oneshot(request).await.expect("response")
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
}

#[tokio::test]
async fn second_primary_upload_demotes_first() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;
    let uri = format!("/api/products/{product_id}/images?primary=true");

    for name in ["a.png", "b.png"] {
        let request = multipart_request(&uri, &admin, &[(name, "image/png", PNG_BYTES)]);
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = send_json(
        &app,
        "GET",
        &format!("/api/products/{product_id}/images"),
        None,
        None,
    )
    .await;
    let images = json["data"].as_array().expect("images");
    let primaries: Vec<_> = images
        .iter()
        .filter(|i| i["is_primary"] == true)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["original_file_name"], "b.png");
}

#[tokio::test]
async fn batch_upload_primary_rules_and_dense_order() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images/batch"),
        &admin,
        &[
            ("a.png", "image/png", PNG_BYTES),
            ("b.png", "image/png", PNG_BYTES),
            ("c.png", "image/png", PNG_BYTES),
        ],
    );
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK, "{json}");
    let images = json["data"].as_array().expect("images");
    assert_eq!(images.len(), 3);
    assert_eq!(images[0]["is_primary"], true);
    assert_eq!(images[1]["is_primary"], false);
    assert_eq!(images[2]["is_primary"], false);

    let orders: Vec<i64> = images
        .iter()
        .map(|i| i["display_order"].as_i64().expect("order"))
        .collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let big = vec![0_u8; 5 * 1024 * 1024 + 1];
    let request = multipart_request(
        &format!("/api/products/{product_id}/images"),
        &admin,
        &[("big.png", "image/png", &big)],
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_file_type_is_rejected() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images"),
        &admin,
        &[("notes.txt", "text/plain", b"hello")],
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_to_unknown_product_is_not_found() {
    let app = app();
    let (admin, _) = admin_with_category(&app).await;

    let request = multipart_request(
        "/api/products/9999/images",
        &admin,
        &[("a.png", "image/png", PNG_BYTES)],
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_primary_and_display_order() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images/batch"),
        &admin,
        &[
            ("a.png", "image/png", PNG_BYTES),
            ("b.png", "image/png", PNG_BYTES),
        ],
    );
    let (_, json) = send(&app, request).await;
    let images = json["data"].as_array().expect("images");
    let second_id = images[1]["id"].as_i64().expect("image id");

    let (status, json) = send_json(
        &app,
        "PUT",
        &format!("/api/products/{product_id}/images/{second_id}/primary"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["is_primary"], true);

    let (_, json) = send_json(
        &app,
        "GET",
        &format!("/api/products/{product_id}/images/primary"),
        None,
        None,
    )
    .await;
    assert_eq!(json["data"]["id"].as_i64(), Some(second_id));

    let (status, json) = send_json(
        &app,
        "PUT",
        &format!("/api/images/{second_id}/display-order"),
        Some(&admin),
        Some(serde_json::json!({"display_order": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["display_order"], 7);
}

#[tokio::test]
async fn delete_image_removes_served_bytes() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images"),
        &admin,
        &[("a.png", "image/png", PNG_BYTES)],
    );
    let (_, json) = send(&app, request).await;
    let image_id = json["data"]["id"].as_i64().expect("image id");
    let file_name = json["data"]["file_name"].as_str().expect("file name").to_owned();

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/images/{image_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/images/products/{product_id}/{file_name}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn uploads_require_admin() {
    let app = app();
    let (admin, category_id) = admin_with_category(&app).await;
    let product_id = create_product(&app, &admin, category_id, "Widget", "19.99").await;
    let (_, customer) = common::register(&app, "shopper@example.com", None).await;

    let request = multipart_request(
        &format!("/api/products/{product_id}/images"),
        &customer,
        &[("a.png", "image/png", PNG_BYTES)],
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
