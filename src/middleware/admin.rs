// SPDX-License-Identifier: MIT

//! Admin gate middleware.
//!
//! Mutation routes are gated on the `is_admin` flag of the caller's
//! profile row, re-checked on every request. Any failure to resolve the
//! flag (missing row, database error) fails closed to forbidden. This is
//! the server-side enforcement backing the client's cosmetic gate.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that requires the authenticated identity to be an admin.
/// Must run after `require_auth`.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let is_admin = match state.db.get_profile(user.user_id).await {
        Ok(Some(profile)) => profile.is_admin,
        Ok(None) => {
            tracing::warn!(user_id = %user.user_id, "Admin check: no profile row");
            false
        }
        Err(e) => {
            // Fail closed: an unreadable flag is not an admin
            tracing::warn!(user_id = %user.user_id, error = %e, "Admin check failed");
            false
        }
    };

    if !is_admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
