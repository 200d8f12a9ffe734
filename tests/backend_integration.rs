// SPDX-License-Identifier: MIT

//! Integration tests against a live Supabase project.
//!
//! These run only when SUPABASE_URL and SUPABASE_SERVICE_KEY are set,
//! and expect the profiles/projects/socials tables plus the avatar
//! bucket to exist. Rows and objects they create are cleaned up.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use portfolio_api::config::Config;
use portfolio_api::db::{OrderDirection, PostgrestDb};
use portfolio_api::models::{NewProfile, Project, Social};
use portfolio_api::routes::create_router;
use portfolio_api::services::{IdentityClient, StorageClient};
use portfolio_api::AppState;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

fn test_db() -> PostgrestDb {
    PostgrestDb::new(
        &std::env::var("SUPABASE_URL").unwrap(),
        &std::env::var("SUPABASE_SERVICE_KEY").unwrap(),
    )
}

fn test_storage() -> StorageClient {
    StorageClient::new(
        &std::env::var("SUPABASE_URL").unwrap(),
        &std::env::var("SUPABASE_SERVICE_KEY").unwrap(),
        &std::env::var("AVATAR_BUCKET").unwrap_or_else(|_| "profile-pictures".to_string()),
    )
}

fn unique_username() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("it_user_{nanos}")
}

#[tokio::test]
async fn test_profile_round_trip_and_username_conflict() {
    require_backend!();

    let db = test_db();
    let user_id = Uuid::new_v4();
    let username = unique_username();

    assert!(db.get_profile(user_id).await.unwrap().is_none());

    db.insert_profile(&NewProfile {
        id: user_id,
        username: username.clone(),
    })
    .await
    .unwrap();

    let profile = db.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.username, username);
    assert!(!profile.is_admin);

    let found = db.find_profile_by_username(&username).await.unwrap();
    assert_eq!(found.unwrap().id, user_id);

    // Second insert with the same username must surface as a conflict
    let dup = db
        .insert_profile(&NewProfile {
            id: Uuid::new_v4(),
            username: username.clone(),
        })
        .await;
    assert!(matches!(
        dup,
        Err(portfolio_api::error::AppError::Conflict(_))
    ));

    let renamed = unique_username();
    db.update_username(user_id, &renamed).await.unwrap();
    let profile = db.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(profile.username, renamed);
}

/// Build a router over the live database with a local signing key, so
/// tests can mint their own session tokens.
fn live_app(db: PostgrestDb) -> (axum::Router, Vec<u8>) {
    let mut config = Config::test_default();
    config.supabase_url = std::env::var("SUPABASE_URL")
        .unwrap()
        .trim_end_matches('/')
        .to_string();
    config.supabase_service_key = std::env::var("SUPABASE_SERVICE_KEY").unwrap();
    let signing_key = config.jwt_secret.clone();

    let state = Arc::new(AppState {
        config,
        db,
        identity: IdentityClient::new_mock(),
        storage: StorageClient::new_mock(),
    });

    (create_router(state), signing_key)
}

#[tokio::test]
async fn test_rename_to_taken_username_is_refused_without_write() {
    require_backend!();

    let db = test_db();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let name_a = unique_username();
    let name_b = unique_username();

    db.insert_profile(&NewProfile {
        id: user_a,
        username: name_a.clone(),
    })
    .await
    .unwrap();
    db.insert_profile(&NewProfile {
        id: user_b,
        username: name_b.clone(),
    })
    .await
    .unwrap();

    let (app, key) = live_app(db.clone());
    let token = common::mint_access_token(user_a, &key);

    let rename = |name: String, token: String| {
        Request::builder()
            .method(Method::PUT)
            .uri("/api/me/username")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"username":"{name}"}}"#)))
            .unwrap()
    };

    // Renaming A to B's name is refused, and A's row is untouched
    let response = app
        .clone()
        .oneshot(rename(name_b.clone(), token.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let profile = db.get_profile(user_a).await.unwrap().unwrap();
    assert_eq!(profile.username, name_a);

    // Renaming A to its own current name succeeds as a no-op
    let response = app.oneshot(rename(name_a.clone(), token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = db.get_profile(user_a).await.unwrap().unwrap();
    assert_eq!(profile.username, name_a);
}

#[tokio::test]
async fn test_project_crud_and_ordering() {
    require_backend!();

    let db = test_db();

    let older = json!({
        "title": "Integration project (older)",
        "description": "first",
        "project_url": "https://example.com/a",
    });
    let newer = json!({
        "title": "Integration project (newer)",
        "description": "second",
        "project_url": "https://example.com/b",
    });
    db.insert_record::<Project, _>(&older).await.unwrap();
    db.insert_record::<Project, _>(&newer).await.unwrap();

    // Default listing is newest-first
    let projects = db
        .list_records::<Project>(OrderDirection::Descending)
        .await
        .unwrap();
    let mine: Vec<&Project> = projects
        .iter()
        .filter(|p| p.title.starts_with("Integration project"))
        .collect();
    assert!(mine.len() >= 2);
    let newer_pos = mine.iter().position(|p| p.title.ends_with("(newer)")).unwrap();
    let older_pos = mine.iter().position(|p| p.title.ends_with("(older)")).unwrap();
    assert!(newer_pos < older_pos);

    let target = mine[newer_pos].id;
    db.update_record::<Project, _>(target, &json!({"description": "edited"}))
        .await
        .unwrap();
    let projects = db
        .list_records::<Project>(OrderDirection::Descending)
        .await
        .unwrap();
    let edited = projects.iter().find(|p| p.id == target).unwrap();
    assert_eq!(edited.description, "edited");

    for p in mine.iter().map(|p| p.id).collect::<Vec<_>>() {
        db.delete_record::<Project>(p).await.unwrap();
    }
}

#[tokio::test]
async fn test_delete_missing_record_is_a_no_op() {
    require_backend!();

    let db = test_db();
    db.delete_record::<Social>(i64::MAX - 7).await.unwrap();
}

#[tokio::test]
async fn test_social_listing_is_oldest_first() {
    require_backend!();

    let db = test_db();

    db.insert_record::<Social, _>(&json!({
        "platform": "GitHub",
        "url": "https://github.com/integration-test",
    }))
    .await
    .unwrap();

    let socials = db
        .list_records::<Social>(OrderDirection::Ascending)
        .await
        .unwrap();
    let mine: Vec<&Social> = socials
        .iter()
        .filter(|s| s.url.contains("integration-test"))
        .collect();
    assert!(!mine.is_empty());

    // Ascending order means our fresh row sits at the tail
    let last = socials.last().unwrap();
    assert!(last.created_at >= mine[0].created_at);

    for s in mine.iter().map(|s| s.id).collect::<Vec<_>>() {
        db.delete_record::<Social>(s).await.unwrap();
    }
}

#[tokio::test]
async fn test_avatar_upload_fetch_and_probe() {
    require_backend!();

    let storage = test_storage();
    let user_id = Uuid::new_v4();

    assert!(!storage.avatar_exists(user_id).await.unwrap());
    assert!(storage.fetch_avatar(user_id).await.unwrap().is_none());

    // Minimal PNG header plus padding, enough for a byte-equality check
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 64]);

    let object = storage.upload_avatar(user_id, data.clone()).await.unwrap();
    assert!(object.path.ends_with(&format!("{user_id}.png")));

    assert!(storage.avatar_exists(user_id).await.unwrap());
    let fetched = storage.fetch_avatar(user_id).await.unwrap().unwrap();
    assert_eq!(fetched, data);

    // Re-upload overwrites in place
    let replacement = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
    storage
        .upload_avatar(user_id, replacement.clone())
        .await
        .unwrap();
    let fetched = storage.fetch_avatar(user_id).await.unwrap().unwrap();
    assert_eq!(fetched, replacement);
}
