// SPDX-License-Identifier: MIT

//! GoTrue identity client: sign-up, password sign-in, token refresh,
//! sign-out. The token bundle the provider issues is passed through
//! opaquely; only the user id and email are consumed here.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity service client.
#[derive(Clone)]
pub struct IdentityClient {
    backend: Option<HttpBackend>,
}

#[derive(Clone)]
struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HttpBackend {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

/// Token bundle issued by the provider on sign-in or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthUserInfo,
}

/// The two identity attributes this application consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Sign-up response shape varies with the project's email-confirmation
/// setting: a bare user object when confirmation is required, a full
/// session otherwise.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user: Option<AuthUserInfo>,
}

/// Error body returned by GoTrue.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl IdentityClient {
    /// Create a new identity client against a Supabase project URL.
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            backend: Some(HttpBackend {
                http: reqwest::Client::new(),
                base_url: supabase_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
            }),
        }
    }

    /// Create a mock client for testing (offline mode).
    pub fn new_mock() -> Self {
        Self { backend: None }
    }

    fn get_backend(&self) -> Result<&HttpBackend, AppError> {
        self.backend.as_ref().ok_or_else(|| {
            AppError::Backend("Identity service not connected (offline mode)".to_string())
        })
    }

    /// Register a new identity with the provider.
    ///
    /// An email that already has an account maps to `Conflict`.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUserInfo, AppError> {
        let backend = self.get_backend()?;

        let response = backend
            .http
            .post(backend.auth_url("signup"))
            .header("apikey", &backend.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-up request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = auth_error_message(response).await;
            tracing::warn!(status = %status, error = %message, "Identity sign-up rejected");
            return Err(match status.as_u16() {
                // GoTrue reports an already-registered email as unprocessable
                422 => AppError::Conflict(message),
                400 => AppError::Validation(message),
                _ => AppError::Backend(format!("Sign-up failed: {}", status)),
            });
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid sign-up response: {}", e)))?;

        let user = match (body.user, body.id) {
            (Some(user), _) => user,
            (None, Some(id)) => AuthUserInfo {
                id,
                email: body.email,
            },
            (None, None) => {
                return Err(AppError::Backend(
                    "Sign-up response carried no user".to_string(),
                ))
            }
        };

        tracing::info!(user_id = %user.id, "Identity created");
        Ok(user)
    }

    /// Exchange email + password for a session token bundle.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, AppError> {
        let backend = self.get_backend()?;

        let response = backend
            .http
            .post(backend.auth_url("token?grant_type=password"))
            .header("apikey", &backend.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-in request failed: {}", e)))?;

        self.parse_token_response(response, "sign-in").await
    }

    /// Exchange a refresh token for a fresh token bundle.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AppError> {
        let backend = self.get_backend()?;

        let response = backend
            .http
            .post(backend.auth_url("token?grant_type=refresh_token"))
            .header("apikey", &backend.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Refresh request failed: {}", e)))?;

        self.parse_token_response(response, "refresh").await
    }

    /// Invalidate the session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let backend = self.get_backend()?;

        let response = backend
            .http
            .post(backend.auth_url("logout"))
            .header("apikey", &backend.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-out request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(AppError::InvalidToken);
            }
            return Err(AppError::Backend(format!("Sign-out failed: {}", status)));
        }

        Ok(())
    }

    async fn parse_token_response(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> Result<SessionTokens, AppError> {
        let status = response.status();
        if !status.is_success() {
            let message = auth_error_message(response).await;
            tracing::warn!(status = %status, error = %message, operation, "Token grant rejected");
            return Err(match status.as_u16() {
                // Bad credentials or a stale refresh token
                400 | 401 => AppError::Unauthorized,
                _ => AppError::Backend(format!("{} failed: {}", operation, status)),
            });
        }

        let tokens: SessionTokens = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid token response: {}", e)))?;

        tracing::info!(user_id = %tokens.user.id, operation, "Session tokens issued");
        Ok(tokens)
    }
}

/// Extract the provider's error message, falling back to raw text.
async fn auth_error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(|e| e.msg.or(e.error_description))
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url() {
        let backend = HttpBackend {
            http: reqwest::Client::new(),
            base_url: "https://test-project.supabase.co".to_string(),
            anon_key: "key".to_string(),
        };
        assert_eq!(
            backend.auth_url("token?grant_type=password"),
            "https://test-project.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_session_tokens_deserialization() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": "6f2b09dc-7f3a-4c8e-9a51-0b3f6d1f0a11", "email": "a@b.c" }
        }"#;

        let tokens: SessionTokens = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.expires_in, 3600);
        assert_eq!(tokens.user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_signup_response_both_shapes() {
        // Confirmation-required shape: bare user object
        let bare: SignUpResponse = serde_json::from_str(
            r#"{ "id": "6f2b09dc-7f3a-4c8e-9a51-0b3f6d1f0a11", "email": "a@b.c" }"#,
        )
        .unwrap();
        assert!(bare.id.is_some());
        assert!(bare.user.is_none());

        // Auto-confirm shape: full session with nested user
        let session: SignUpResponse = serde_json::from_str(
            r#"{ "access_token": "x", "user": { "id": "6f2b09dc-7f3a-4c8e-9a51-0b3f6d1f0a11" } }"#,
        )
        .unwrap();
        assert!(session.user.is_some());
    }

    #[tokio::test]
    async fn test_offline_mock_errors() {
        let identity = IdentityClient::new_mock();
        let err = identity.sign_in("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
    }
}
