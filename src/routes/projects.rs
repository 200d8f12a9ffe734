// SPDX-License-Identifier: MIT

//! Project list routes: public listing, admin-gated mutations.
//!
//! Every mutation responds with a fresh `list` read instead of patching
//! state locally, so the returned grid always reflects the last
//! successful server read.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::db::{ListRecord, OrderDirection};
use crate::error::Result;
use crate::models::Project;
use crate::routes::{parse_direction, validate_http_url};
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/projects", get(list_projects))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", post(create_project))
        .route("/api/projects/{id}", put(update_project).delete(delete_project))
}

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ListQuery {
    order: Option<String>,
}

/// Caller-supplied project fields; id and created_at come from the
/// table. Title and URL are required, checked before any network call.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ProjectFields {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_http_url"))]
    pub project_url: String,
}

impl ProjectFields {
    fn normalized(mut self) -> Result<Self> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.project_url = self.project_url.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

async fn fetch_list(
    state: &AppState,
    direction: OrderDirection,
) -> Result<Json<ProjectListResponse>> {
    let projects = state.db.list_records::<Project>(direction).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// List all projects, newest first by default.
async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProjectListResponse>> {
    let direction = parse_direction(query.order.as_deref(), Project::DEFAULT_ORDER)?;
    fetch_list(&state, direction).await
}

/// Create a project, then return the refreshed list.
async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<ProjectFields>,
) -> Result<Json<ProjectListResponse>> {
    let fields = fields.normalized()?;
    state.db.insert_record::<Project, _>(&fields).await?;
    tracing::info!(title = %fields.title, "Project created");

    fetch_list(&state, Project::DEFAULT_ORDER).await
}

/// Update a project by id, then return the refreshed list.
async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(fields): Json<ProjectFields>,
) -> Result<Json<ProjectListResponse>> {
    let fields = fields.normalized()?;
    state.db.update_record::<Project, _>(id, &fields).await?;
    tracing::info!(id, "Project updated");

    fetch_list(&state, Project::DEFAULT_ORDER).await
}

/// Delete a project by id, then return the refreshed list.
/// Deleting an id that no longer exists succeeds as a no-op.
async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectListResponse>> {
    state.db.delete_record::<Project>(id).await?;
    tracing::info!(id, "Project deleted");

    fetch_list(&state, Project::DEFAULT_ORDER).await
}
