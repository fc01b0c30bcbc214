// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides system health and readiness endpoints for monitoring infrastructure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Health check routes for service monitoring
//!
//! `/health` reports overall status including database reachability;
//! `/ready` answers load balancer liveness probes without touching any
//! dependency. Both always return 200 so probes can read the body.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::constants::service_names;
use crate::server::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/ready", get(Self::ready_handler))
            .with_state(resources)
    }

    /// Full health report with database reachability
    async fn health_handler(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        let database = match resources.database.ping().await {
            Ok(()) => "connected",
            Err(_) => "degraded",
        };
        let status = if database == "connected" {
            "healthy"
        } else {
            "degraded"
        };

        Json(serde_json::json!({
            "success": true,
            "status": status,
            "service": service_names::EVENTRA_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "uptime_secs": resources.started_at.elapsed().as_secs(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Liveness probe, independent of dependencies
    async fn ready_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "ready",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
