// SPDX-License-Identifier: MIT

//! Portfolio API Server
//!
//! Serves the portfolio site's profiles, projects, and social links,
//! backed by Supabase for identity, tables, and avatar storage.

use portfolio_api::{
    config::Config,
    db::PostgrestDb,
    services::{IdentityClient, StorageClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Portfolio API");

    // Collaborator service clients (all lazy HTTP, no startup handshake)
    let db = PostgrestDb::new(&config.supabase_url, &config.supabase_service_key);
    let identity = IdentityClient::new(&config.supabase_url, &config.supabase_anon_key);
    let storage = StorageClient::new(
        &config.supabase_url,
        &config.supabase_service_key,
        &config.avatar_bucket,
    );
    tracing::info!(url = %config.supabase_url, "Supabase clients initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        storage,
    });

    // Build router
    let app = portfolio_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
