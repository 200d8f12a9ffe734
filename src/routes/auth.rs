// SPDX-License-Identifier: MIT

//! Authentication routes: sign-up, sign-in, refresh, sign-out.
//!
//! Tokens are issued by the identity provider and passed through; the
//! access token is additionally set as an HttpOnly session cookie so
//! browser clients need no token handling of their own.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{extract_token, SESSION_COOKIE};
use crate::models::NewProfile;
use crate::services::SessionTokens;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/signout", post(sign_out))
}

/// Build the session cookie carrying the provider access token.
fn session_cookie(access_token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie used to clear the session on sign-out.
fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

// ─── Sign Up ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Create an identity and its profile row.
///
/// The username pre-check is best-effort: two concurrent sign-ups
/// choosing the same name can both pass it. The window is accepted.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    req.validate()?;
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }

    // Username pre-check before any identity is created
    if state.db.find_profile_by_username(username).await?.is_some() {
        return Err(AppError::Conflict(
            "Username already exists. Please choose a different username.".to_string(),
        ));
    }

    let user = state.identity.sign_up(&req.email, &req.password).await?;

    let profile = NewProfile {
        id: user.id,
        username: username.to_string(),
    };
    if let Err(e) = state.db.insert_profile(&profile).await {
        // A constraint violation here means the identity already had a
        // profile row (repeat sign-up with the same email)
        if let AppError::Conflict(msg) = &e {
            tracing::warn!(user_id = %user.id, error = %msg, "Profile insert conflict");
            return Err(AppError::Conflict(
                "An account already exists for this email. Please sign in.".to_string(),
            ));
        }
        return Err(e);
    }

    tracing::info!(user_id = %user.id, username, "Sign-up complete");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user_id: user.id,
            message: "Sign-up successful! Please check your email for verification.".to_string(),
        }),
    ))
}

// ─── Sign In / Refresh ───────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Exchange credentials for a session.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SessionTokens>)> {
    req.validate()?;

    let tokens = state.identity.sign_in(&req.email, &req.password).await?;
    let jar = jar.add(session_cookie(tokens.access_token.clone()));

    Ok((jar, Json(tokens)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Exchange a refresh token for a fresh session.
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RefreshRequest>,
) -> Result<(CookieJar, Json<SessionTokens>)> {
    req.validate()?;

    let tokens = state.identity.refresh(&req.refresh_token).await?;
    let jar = jar.add(session_cookie(tokens.access_token.clone()));

    Ok((jar, Json(tokens)))
}

// ─── Sign Out ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SignOutResponse {
    pub success: bool,
}

/// Invalidate the provider session and clear the cookie.
///
/// The cookie is cleared even when the provider call fails; the client
/// must discard any profile or avatar data it holds for the identity.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<SignOutResponse>)> {
    if let Some(token) = extract_token(&jar, &headers) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!(error = %e, "Provider sign-out failed, clearing session anyway");
        }
    }

    let jar = jar.remove(removal_cookie());
    Ok((jar, Json(SignOutResponse { success: true })))
}
