// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! All collaborator credentials (Supabase service key, anon key, JWT
//! secret) are read once at startup and held in memory.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (e.g. `https://xyz.supabase.co`)
    pub supabase_url: String,
    /// Service-role key used for table and storage operations
    pub supabase_service_key: String,
    /// Anon (publishable) key used for identity operations
    pub supabase_anon_key: String,
    /// JWT secret used to verify provider-issued access tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// Storage bucket holding avatar objects
    pub avatar_bucket: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("SUPABASE_JWT_SECRET"))?
                .into_bytes(),
            avatar_bucket: env::var("AVATAR_BUCKET")
                .unwrap_or_else(|_| "profile-pictures".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "https://test-project.supabase.co".to_string(),
            supabase_service_key: "test_service_key".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            avatar_bucket: "profile-pictures".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
