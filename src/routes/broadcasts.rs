// ABOUTME: Broadcast request route handlers for posting and first-accept-wins claiming
// ABOUTME: Provides REST endpoints for the open request feed and manager acceptance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Broadcast request routes
//!
//! Customers post requests without naming a manager; every manager sees the
//! open feed and the first to accept wins the job. Acceptance returns the
//! booking derived from the request in the same transaction.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BroadcastRequest};
use crate::routes::authenticated_manager;
use crate::routes::services::parse_id;
use crate::scheduling::broadcast::{self, NewBroadcast};
use crate::server::ServerResources;

/// Response carrying a single broadcast request
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    /// Always true on the success path
    pub success: bool,
    /// The broadcast record
    pub broadcast: BroadcastRequest,
}

/// Response carrying a list of broadcast requests
#[derive(Debug, Serialize)]
pub struct BroadcastsResponse {
    /// Always true on the success path
    pub success: bool,
    /// Broadcast requests, newest first
    pub broadcasts: Vec<BroadcastRequest>,
    /// Number of requests returned
    pub total: usize,
}

/// Response for a successful acceptance
#[derive(Debug, Serialize)]
pub struct AcceptBroadcastResponse {
    /// Always true on the success path
    pub success: bool,
    /// The booking derived from the accepted request
    pub booking: Booking,
}

/// Broadcast route handlers
pub struct BroadcastRoutes;

impl BroadcastRoutes {
    /// Create all broadcast routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/broadcasts", post(Self::handle_create_broadcast))
            .route("/broadcasts/open", get(Self::handle_open_broadcasts))
            .route(
                "/broadcasts/accepted",
                get(Self::handle_accepted_broadcasts),
            )
            .route("/broadcasts/:broadcast_id/accept", post(Self::handle_accept))
            .with_state(resources)
    }

    /// Handle public broadcast posting
    async fn handle_create_broadcast(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<NewBroadcast>,
    ) -> Result<Response, AppError> {
        let broadcast = broadcast::create_broadcast(
            &resources.database,
            request,
            resources.config.broadcast.request_ttl_days,
        )
        .await?;

        Ok((
            StatusCode::CREATED,
            Json(BroadcastResponse {
                success: true,
                broadcast,
            }),
        )
            .into_response())
    }

    /// Handle the manager-facing open request feed
    async fn handle_open_broadcasts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticated_manager(&headers, &resources)?;

        let broadcasts = broadcast::open_broadcasts(&resources.database).await?;

        Ok((
            StatusCode::OK,
            Json(BroadcastsResponse {
                success: true,
                total: broadcasts.len(),
                broadcasts,
            }),
        )
            .into_response())
    }

    /// Handle listing the requests this manager has won
    async fn handle_accepted_broadcasts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let broadcasts =
            broadcast::accepted_broadcasts(&resources.database, manager_id).await?;

        Ok((
            StatusCode::OK,
            Json(BroadcastsResponse {
                success: true,
                total: broadcasts.len(),
                broadcasts,
            }),
        )
            .into_response())
    }

    /// Handle a manager claiming an open broadcast
    async fn handle_accept(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(broadcast_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let broadcast_id = parse_id(&broadcast_id, "broadcast id")?;

        let booking =
            broadcast::accept_broadcast(&resources.database, manager_id, broadcast_id).await?;

        Ok((
            StatusCode::CREATED,
            Json(AcceptBroadcastResponse {
                success: true,
                booking,
            }),
        )
            .into_response())
    }
}
