// SPDX-License-Identifier: MIT

//! Social link routes: public listing, admin-gated mutations.
//!
//! Same CRUD shape as projects; differs only in the record fields and
//! in listing oldest-first so rendered icons keep their order.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::db::{ListRecord, OrderDirection};
use crate::error::{AppError, Result};
use crate::models::{Platform, Social};
use crate::routes::{parse_direction, validate_http_url};
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/socials", get(list_socials))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/socials", post(create_social))
        .route("/api/socials/{id}", put(update_social).delete(delete_social))
}

#[derive(Serialize)]
pub struct SocialListResponse {
    pub socials: Vec<Social>,
}

#[derive(Deserialize)]
struct ListQuery {
    order: Option<String>,
}

/// Caller-supplied social link fields. The platform arrives as a plain
/// string and must name one of the known platforms.
#[derive(Debug, Deserialize, Validate)]
pub struct SocialFields {
    #[validate(length(min = 1, message = "platform is required"))]
    pub platform: String,
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,
}

/// Validated insert/update payload.
#[derive(Debug, Serialize)]
struct SocialWrite {
    platform: Platform,
    url: String,
}

impl SocialFields {
    fn normalized(mut self) -> Result<SocialWrite> {
        self.platform = self.platform.trim().to_string();
        self.url = self.url.trim().to_string();
        self.validate()?;

        let platform: Platform = self
            .platform
            .parse()
            .map_err(|e: crate::models::social::UnknownPlatform| {
                AppError::Validation(e.to_string())
            })?;

        Ok(SocialWrite {
            platform,
            url: self.url,
        })
    }
}

async fn fetch_list(
    state: &AppState,
    direction: OrderDirection,
) -> Result<Json<SocialListResponse>> {
    let socials = state.db.list_records::<Social>(direction).await?;
    Ok(Json(SocialListResponse { socials }))
}

/// List all social links, oldest first by default.
async fn list_socials(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SocialListResponse>> {
    let direction = parse_direction(query.order.as_deref(), Social::DEFAULT_ORDER)?;
    fetch_list(&state, direction).await
}

/// Create a social link, then return the refreshed list.
async fn create_social(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<SocialFields>,
) -> Result<Json<SocialListResponse>> {
    let write = fields.normalized()?;
    state.db.insert_record::<Social, _>(&write).await?;
    tracing::info!(platform = %write.platform, "Social link created");

    fetch_list(&state, Social::DEFAULT_ORDER).await
}

/// Update a social link by id, then return the refreshed list.
async fn update_social(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(fields): Json<SocialFields>,
) -> Result<Json<SocialListResponse>> {
    let write = fields.normalized()?;
    state.db.update_record::<Social, _>(id, &write).await?;
    tracing::info!(id, "Social link updated");

    fetch_list(&state, Social::DEFAULT_ORDER).await
}

/// Delete a social link by id, then return the refreshed list.
/// Deleting an id that no longer exists succeeds as a no-op.
async fn delete_social(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SocialListResponse>> {
    state.db.delete_record::<Social>(id).await?;
    tracing::info!(id, "Social link deleted");

    fetch_list(&state, Social::DEFAULT_ORDER).await
}
