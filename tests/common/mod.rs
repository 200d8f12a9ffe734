// SPDX-License-Identifier: MIT

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use portfolio_api::config::Config;
use portfolio_api::db::PostgrestDb;
use portfolio_api::routes::create_router;
use portfolio_api::services::{IdentityClient, StorageClient};
use portfolio_api::AppState;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Check if a live Supabase backend is configured via environment.
#[allow(dead_code)]
pub fn backend_available() -> bool {
    std::env::var("SUPABASE_URL").is_ok()
        && std::env::var("SUPABASE_SERVICE_KEY").is_ok()
}

/// Skip test with message if no live backend is configured.
#[macro_export]
macro_rules! require_backend {
    () => {
        if !crate::common::backend_available() {
            eprintln!("⚠️  Skipping: SUPABASE_URL / SUPABASE_SERVICE_KEY not set");
            return;
        }
    };
}

/// Mint a provider-style access token for a test identity.
#[allow(dead_code)]
pub fn mint_access_token(user_id: Uuid, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        email: Option<String>,
        aud: String,
        exp: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: Some("user@example.com".to_string()),
        aud: "authenticated".to_string(),
        exp: now + 86400,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Create a test app with offline mock collaborator services.
/// Returns the router and the JWT signing key for minting tokens.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Vec<u8>) {
    let config = Config::test_default();
    let signing_key = config.jwt_secret.clone();

    let state = Arc::new(AppState {
        config,
        db: PostgrestDb::new_mock(),
        identity: IdentityClient::new_mock(),
        storage: StorageClient::new_mock(),
    });

    (create_router(state), signing_key)
}
