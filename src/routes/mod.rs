// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod profile;
pub mod projects;
pub mod socials;

use crate::db::OrderDirection;
use crate::error::{AppError, Result};
use crate::middleware::{require_admin, require_auth};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Parse an `order` query value, falling back to the collection's
/// default direction.
pub(crate) fn parse_direction(
    raw: Option<&str>,
    default: OrderDirection,
) -> Result<OrderDirection> {
    match raw {
        None => Ok(default),
        Some("asc") => Ok(OrderDirection::Ascending),
        Some("desc") => Ok(OrderDirection::Descending),
        Some(other) => Err(AppError::Validation(format!(
            "invalid order '{}': expected 'asc' or 'desc'",
            other
        ))),
    }
}

/// Validator for fields that must hold an http(s) URL.
pub(crate) fn validate_http_url(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("http_url")
            .with_message("must be an http(s) URL".into()))
    }
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes: marketing lists, health, and the auth flows
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(projects::public_routes())
        .merge(socials::public_routes());

    // Protected routes: require a valid session
    let protected_routes = profile::routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Admin routes: session plus a per-request admin gate
    let admin_routes = projects::admin_routes()
        .merge(socials::admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
