// SPDX-License-Identifier: MIT

//! Object storage client for avatar blobs.
//!
//! One live object per identity at a deterministic path
//! (`public/<user_id>.png`), overwritten on upload and never versioned.
//! Fetch is a two-step probe: list the folder first, then download.

use crate::error::AppError;
use uuid::Uuid;

/// Object storage client, scoped to a single bucket.
#[derive(Clone)]
pub struct StorageClient {
    backend: Option<HttpBackend>,
    bucket: String,
}

#[derive(Clone)]
struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpBackend {
    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn list_url(&self, bucket: &str) -> String {
        format!("{}/storage/v1/object/list/{}", self.base_url, bucket)
    }
}

/// One entry from a folder listing.
#[derive(Debug, serde::Deserialize)]
struct ObjectEntry {
    name: String,
}

/// Reference to a stored object, returned after upload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub path: String,
}

/// Deterministic avatar path for an identity.
pub fn avatar_path(user_id: Uuid) -> String {
    format!("public/{}.png", user_id)
}

impl StorageClient {
    /// Create a new storage client against a Supabase project URL.
    pub fn new(supabase_url: &str, service_key: &str, bucket: &str) -> Self {
        Self {
            backend: Some(HttpBackend {
                http: reqwest::Client::new(),
                base_url: supabase_url.trim_end_matches('/').to_string(),
                service_key: service_key.to_string(),
            }),
            bucket: bucket.to_string(),
        }
    }

    /// Create a mock client for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            backend: None,
            bucket: "profile-pictures".to_string(),
        }
    }

    fn get_backend(&self) -> Result<&HttpBackend, AppError> {
        self.backend.as_ref().ok_or_else(|| {
            AppError::Backend("Storage service not connected (offline mode)".to_string())
        })
    }

    /// Upload an avatar, overwriting any prior object at the identity's
    /// path (upsert semantics).
    pub async fn upload_avatar(&self, user_id: Uuid, data: Vec<u8>) -> Result<ObjectRef, AppError> {
        let backend = self.get_backend()?;
        let path = avatar_path(user_id);

        let response = backend
            .http
            .post(backend.object_url(&self.bucket, &path))
            .header("apikey", &backend.service_key)
            .bearer_auth(&backend.service_key)
            .header("Content-Type", "image/png")
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Avatar upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Avatar upload rejected");
            return Err(AppError::Backend(format!("Avatar upload failed: {}", status)));
        }

        tracing::info!(user_id = %user_id, path = %path, "Avatar stored");
        Ok(ObjectRef {
            bucket: self.bucket.clone(),
            path,
        })
    }

    /// Probe whether an avatar object exists for the identity.
    pub async fn avatar_exists(&self, user_id: Uuid) -> Result<bool, AppError> {
        let backend = self.get_backend()?;
        let file_name = format!("{}.png", user_id);

        let response = backend
            .http
            .post(backend.list_url(&self.bucket))
            .header("apikey", &backend.service_key)
            .bearer_auth(&backend.service_key)
            .json(&serde_json::json!({
                "prefix": "public",
                "search": file_name,
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Avatar listing failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Avatar listing rejected");
            return Err(AppError::Backend(format!("Avatar listing failed: {}", status)));
        }

        let entries: Vec<ObjectEntry> = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid listing response: {}", e)))?;

        Ok(entries.iter().any(|e| e.name == file_name))
    }

    /// Fetch the avatar bytes for an identity.
    ///
    /// Two round trips by design: probe the listing first, then
    /// download. `Ok(None)` means no avatar has been uploaded.
    pub async fn fetch_avatar(&self, user_id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
        if !self.avatar_exists(user_id).await? {
            return Ok(None);
        }

        let backend = self.get_backend()?;
        let path = avatar_path(user_id);

        let response = backend
            .http
            .get(backend.object_url(&self.bucket, &path))
            .header("apikey", &backend.service_key)
            .bearer_auth(&backend.service_key)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Avatar download failed: {}", e)))?;

        let status = response.status();
        // Listing raced with a delete; treat the same as never uploaded
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Backend(format!(
                "Avatar download failed: {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Backend(format!("Avatar download failed: {}", e)))?;

        Ok(Some(bytes.to_vec()))
    }
}
