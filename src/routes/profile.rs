// SPDX-License-Identifier: MIT

//! Profile routes for the authenticated identity: profile data,
//! username changes, avatar upload and download.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::AppState;

/// Upper bound on an uploaded avatar image.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    // The extractor limit sits above the avatar cap; oversized uploads
    // reach the handler and come back as validation errors, not a bare 413.
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/username", put(update_username))
        .route("/api/me/avatar", get(get_avatar).post(upload_avatar))
        .layer(DefaultBodyLimit::max(2 * MAX_AVATAR_BYTES))
}

// ─── Profile ─────────────────────────────────────────────────

/// Current user's profile, including the admin flag so the client can
/// gate its mutation controls in the same round trip.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub has_avatar: bool,
}

/// Get the authenticated identity's profile.
///
/// A missing profile row (sign-up never finished inserting it) is 404,
/// distinct from a backend failure.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .db
        .get_profile(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user.user_id)))?;

    // Avatar presence is cosmetic; a probe failure degrades to "none"
    let has_avatar = match state.storage.avatar_exists(user.user_id).await {
        Ok(exists) => exists,
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Avatar probe failed");
            false
        }
    };

    Ok(Json(ProfileResponse {
        id: profile.id,
        username: profile.username,
        email: user.email,
        is_admin: profile.is_admin,
        has_avatar,
    }))
}

// ─── Username ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct UsernameResponse {
    pub username: String,
}

/// Change the identity's username.
///
/// Pre-checks the name against all other profile rows and refuses with
/// a conflict when taken. The check and the write are not atomic; a
/// concurrent rename to the same name can slip through (accepted).
async fn update_username(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateUsernameRequest>,
) -> Result<Json<UsernameResponse>> {
    let username = normalize_username(&req.username)?;

    if let Some(existing) = state.db.find_profile_by_username(&username).await? {
        if existing.id != user.user_id {
            return Err(AppError::Conflict(
                "This username is already taken. Please choose another one.".to_string(),
            ));
        }
        // Renaming to the current name: nothing to write
        return Ok(Json(UsernameResponse { username }));
    }

    state.db.update_username(user.user_id, &username).await?;
    tracing::info!(user_id = %user.user_id, username = %username, "Username updated");

    Ok(Json(UsernameResponse { username }))
}

/// Trim and require a non-empty username.
fn normalize_username(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }
    Ok(trimmed.to_string())
}

// ─── Avatar ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AvatarUploadResponse {
    pub path: String,
}

/// Upload (or replace) the identity's avatar.
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<AvatarUploadResponse>> {
    if body.is_empty() {
        return Err(AppError::Validation("avatar image is required".to_string()));
    }
    if body.len() > MAX_AVATAR_BYTES {
        return Err(AppError::Validation(format!(
            "avatar image exceeds {} bytes",
            MAX_AVATAR_BYTES
        )));
    }

    let object = state
        .storage
        .upload_avatar(user.user_id, body.to_vec())
        .await?;

    Ok(Json(AvatarUploadResponse { path: object.path }))
}

/// Download the identity's avatar bytes.
///
/// Absent avatars and fetch failures both come back as 404 so the
/// client falls back to its initial-letter placeholder; failures are
/// logged, never fatal to the page.
async fn get_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let bytes = match state.storage.fetch_avatar(user.user_id).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return Err(AppError::NotFound("No avatar uploaded".to_string()));
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Avatar fetch failed");
            return Err(AppError::NotFound("No avatar uploaded".to_string()));
        }
    };

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}
