// SPDX-License-Identifier: MIT

//! Session resolution middleware.
//!
//! Every protected request resolves the current session exactly once
//! here: the provider-issued access token is read from the session
//! cookie or the Authorization header, verified against the provider's
//! JWT secret, and the resulting identity is injected as a request
//! extension. Handlers never poll the identity service themselves.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Cookie holding the provider access token.
pub const SESSION_COOKIE: &str = "portfolio_token";

/// Claims consumed from the provider's access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// User email, if shared
    #[serde(default)]
    pub email: Option<String>,
    /// Audience (`authenticated` for signed-in users)
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Authenticated identity extracted from the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Pull the access token out of a request: session cookie first, then
/// bearer header. `None` is "unauthenticated", distinct from invalid.
pub fn extract_token(jar: &CookieJar, headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Verify an access token and extract the identity it proves.
pub fn verify_token(token: &str, jwt_secret: &[u8]) -> Result<AuthUser, AppError> {
    let key = DecodingKey::from_secret(jwt_secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated"]);

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    let user_id: Uuid = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        email: token_data.claims.email,
    })
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let auth_user = verify_token(&token, &state.config.jwt_secret)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
