// SPDX-License-Identifier: MIT

//! PostgREST client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (one row per identity, username lookups)
//! - List records (projects and socials, a shared CRUD shape)
//!
//! All requests use the service-role key; authorization decisions are
//! made in this application before any row is touched.

use crate::db::tables;
use crate::error::AppError;
use crate::models::{NewProfile, Profile, Project, Social};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Ordering direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

/// A row kind that lives in an ordered collection with uniform CRUD.
///
/// Instantiated exactly twice: projects (newest first) and socials
/// (oldest first).
pub trait ListRecord: DeserializeOwned + Serialize + Send + Sync {
    const TABLE: &'static str;
    const DEFAULT_ORDER: OrderDirection;
}

impl ListRecord for Project {
    const TABLE: &'static str = tables::PROJECTS;
    const DEFAULT_ORDER: OrderDirection = OrderDirection::Descending;
}

impl ListRecord for Social {
    const TABLE: &'static str = tables::SOCIALS;
    const DEFAULT_ORDER: OrderDirection = OrderDirection::Ascending;
}

/// PostgREST database client.
#[derive(Clone)]
pub struct PostgrestDb {
    backend: Option<HttpBackend>,
}

#[derive(Clone)]
struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpBackend {
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.rest_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

impl PostgrestDb {
    /// Create a new PostgREST client against a Supabase project URL.
    pub fn new(supabase_url: &str, service_key: &str) -> Self {
        Self {
            backend: Some(HttpBackend {
                http: reqwest::Client::new(),
                base_url: supabase_url.trim_end_matches('/').to_string(),
                service_key: service_key.to_string(),
            }),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    /// Helper to get the backend or return an error if offline.
    fn get_backend(&self) -> Result<&HttpBackend, AppError> {
        self.backend
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by identity id. `Ok(None)` means no row exists,
    /// which callers must treat differently from a request failure.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::GET, tables::PROFILES)
            .query(&[
                ("id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<Profile> = check_response(response, tables::PROFILES)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Find a profile holding the given username.
    ///
    /// This is the best-effort pre-check used before sign-up and rename;
    /// it is not atomic with the subsequent write.
    pub async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::GET, tables::PROFILES)
            .query(&[
                ("username", format!("eq.{}", username)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<Profile> = check_response(response, tables::PROFILES)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Insert the profile row for a new identity.
    ///
    /// A 409 from the store (foreign key or duplicate id) surfaces as
    /// `Conflict` so the sign-up flow can report it.
    pub async fn insert_profile(&self, profile: &NewProfile) -> Result<(), AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::POST, tables::PROFILES)
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, tables::PROFILES).await?;
        Ok(())
    }

    /// Update the username on an identity's profile row.
    pub async fn update_username(&self, user_id: Uuid, username: &str) -> Result<(), AppError> {
        let body = serde_json::json!({ "username": username });

        let response = self
            .get_backend()?
            .request(reqwest::Method::PATCH, tables::PROFILES)
            .query(&[("id", format!("eq.{}", user_id))])
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, tables::PROFILES).await?;
        Ok(())
    }

    // ─── List Record Operations ──────────────────────────────────

    /// Fetch the full collection, freshly, ordered by creation time.
    /// No caching: every call is a new read.
    pub async fn list_records<T: ListRecord>(
        &self,
        direction: OrderDirection,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::GET, T::TABLE)
            .query(&[
                ("select", "*".to_string()),
                ("order", format!("created_at.{}", direction.as_str())),
            ])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, T::TABLE)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a record. The body carries only caller-supplied fields;
    /// id and created_at come from the table defaults.
    pub async fn insert_record<T: ListRecord, B: Serialize>(
        &self,
        fields: &B,
    ) -> Result<(), AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::POST, T::TABLE)
            .header("Prefer", "return=minimal")
            .json(fields)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, T::TABLE).await?;
        Ok(())
    }

    /// Update a record by id.
    pub async fn update_record<T: ListRecord, B: Serialize>(
        &self,
        id: i64,
        fields: &B,
    ) -> Result<(), AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::PATCH, T::TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(fields)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, T::TABLE).await?;
        Ok(())
    }

    /// Delete a record by id.
    ///
    /// A filtered delete with no matching row succeeds; deleting a
    /// non-existent id is a no-op reported as success.
    pub async fn delete_record<T: ListRecord>(&self, id: i64) -> Result<(), AppError> {
        let response = self
            .get_backend()?
            .request(reqwest::Method::DELETE, T::TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response, T::TABLE).await?;
        Ok(())
    }
}

/// Check response status, mapping PostgREST failures onto the app's
/// error taxonomy. Returns the response for callers that parse a body.
async fn check_response(
    response: reqwest::Response,
    table: &str,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(table, status = %status, body = %body, "PostgREST request failed");

    if status == reqwest::StatusCode::CONFLICT {
        // Constraint violation (foreign key / duplicate key)
        return Err(AppError::Conflict(postgrest_message(&body)));
    }

    if status.is_server_error() {
        return Err(AppError::Backend(format!(
            "{} request failed: {}",
            table, status
        )));
    }

    Err(AppError::Database(format!(
        "{} request failed: {} {}",
        table,
        status,
        postgrest_message(&body)
    )))
}

/// Pull the human-readable message out of a PostgREST error body.
fn postgrest_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
