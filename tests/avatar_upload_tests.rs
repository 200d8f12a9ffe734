// SPDX-License-Identifier: MIT

//! Avatar upload body handling: empty and oversized uploads must come
//! back as validation errors from the handler, not as transport-level
//! rejections.

mod common;

use axum::body::{self, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

async fn post_avatar(data: Vec<u8>) -> (StatusCode, Value) {
    let (app, key) = common::create_test_app();
    let token = common::mint_access_token(Uuid::new_v4(), &key);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/me/avatar")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "image/png")
                .body(Body::from(data))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn oversized_avatar_is_a_validation_error() {
    let (status, json) = post_avatar(vec![0u8; MAX_AVATAR_BYTES + 1]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation");
}

#[tokio::test]
async fn empty_avatar_is_a_validation_error() {
    let (status, json) = post_avatar(Vec::new()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation");
}

#[tokio::test]
async fn avatar_at_the_cap_passes_size_validation() {
    // A body exactly at the cap clears the size check and proceeds to
    // storage, which is mocked offline here and fails as a backend error.
    let (status, _) = post_avatar(vec![0u8; MAX_AVATAR_BYTES]).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
