// ABOUTME: Server wiring: shared resource container, router assembly, and the serve loop
// ABOUTME: Spawns the broadcast expiry reaper alongside the HTTP listener
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! # Server assembly
//!
//! [`ServerResources`] carries the expensive shared objects (database pool,
//! auth manager, configuration) behind `Arc`s so route handlers never
//! recreate them. [`run`] assembles the router, starts the broadcast expiry
//! reaper, and serves until the process exits.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::routes::{
    AuthRoutes, AvailabilityRoutes, BookingRoutes, BroadcastRoutes, DashboardRoutes, HealthRoutes,
    ReviewRoutes, ServiceRoutes,
};
use crate::scheduling::broadcast;

/// Centralized resource container for dependency injection
///
/// Holds all shared server resources so handlers clone `Arc`s instead of
/// rebuilding expensive objects per request.
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database pool
    pub database: Arc<Database>,
    /// JWT issue/validate
    pub auth_manager: Arc<AuthManager>,
    /// Environment-derived configuration
    pub config: Arc<ServerConfig>,
    /// Process start, for the health endpoint's uptime
    pub started_at: Instant,
}

impl ServerResources {
    /// Create new server resources with proper `Arc` sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config,
            started_at: Instant::now(),
        }
    }
}

/// Assemble the application router with tracing and CORS layers
#[must_use]
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(ServiceRoutes::routes(resources.clone()))
        .merge(AvailabilityRoutes::routes(resources.clone()))
        .merge(BookingRoutes::routes(resources.clone()))
        .merge(BroadcastRoutes::routes(resources.clone()))
        .merge(ReviewRoutes::routes(resources.clone()))
        .merge(DashboardRoutes::routes(resources.clone()))
        .merge(HealthRoutes::routes(resources.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&resources.config))
}

/// Configure CORS from the allowed-origins list
///
/// An empty list or a `*` entry allows any origin (development mode);
/// otherwise only the listed origins are permitted.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = &config.cors.allowed_origins;
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
}

/// Serve the booking platform until the process exits
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server terminates
/// abnormally
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    broadcast::spawn_expiry_reaper(
        resources.database.as_ref().clone(),
        resources.config.broadcast.reaper_interval_secs,
        resources.config.broadcast.expired_retention_days,
    );
    info!(
        interval_secs = resources.config.broadcast.reaper_interval_secs,
        "Broadcast expiry reaper started"
    );

    let router = build_router(&resources);
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, router)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
