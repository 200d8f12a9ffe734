// SPDX-License-Identifier: MIT

//! Portfolio API: backend for a personal portfolio/blog site.
//!
//! This crate provides the HTTP API for profiles, projects, and social
//! links, delegating authentication, row storage, and avatar storage to
//! Supabase (GoTrue, PostgREST, object storage).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::PostgrestDb;
use services::{IdentityClient, StorageClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: PostgrestDb,
    pub identity: IdentityClient,
    pub storage: StorageClient,
}
