// ABOUTME: Dashboard route handlers for manager business statistics
// ABOUTME: Provides a REST endpoint aggregating bookings, revenue, reviews, and open requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Dashboard routes
//!
//! One endpoint composes the aggregate queries a manager's home screen
//! needs: booking counts by status, upcoming work, completed revenue,
//! review stats, and the size of the open broadcast feed.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::database::BookingStatusCount;
use crate::errors::AppError;
use crate::routes::authenticated_manager;
use crate::server::ServerResources;

/// Aggregated manager statistics
#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    /// Always true on the success path
    pub success: bool,
    /// Booking counts grouped by lifecycle status
    pub bookings_by_status: Vec<BookingStatusCount>,
    /// All bookings regardless of status
    pub total_bookings: i64,
    /// Future-dated Pending or Confirmed bookings
    pub upcoming_bookings: i64,
    /// Revenue summed over Completed bookings
    pub completed_revenue: f64,
    /// Number of reviews received
    pub total_reviews: i64,
    /// Mean review rating; absent with no reviews
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Open, unexpired broadcast requests available to claim
    pub open_broadcasts: i64,
}

/// Dashboard route handlers
pub struct DashboardRoutes;

impl DashboardRoutes {
    /// Create all dashboard routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/dashboard/stats", get(Self::handle_stats))
            .with_state(resources)
    }

    /// Handle the aggregated statistics request
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let db = &resources.database;

        let bookings_by_status = db.count_bookings_by_status(manager_id).await?;
        let total_bookings = bookings_by_status.iter().map(|c| c.count).sum();
        let upcoming_bookings = db
            .count_upcoming_bookings(manager_id, Utc::now().date_naive())
            .await?;
        let completed_revenue = db.sum_completed_revenue(manager_id).await?;
        let (total_reviews, average_rating) = db.review_stats(manager_id).await?;
        let open_broadcasts = db.count_open_broadcasts(Utc::now()).await?;

        Ok((
            StatusCode::OK,
            Json(DashboardStatsResponse {
                success: true,
                bookings_by_status,
                total_bookings,
                upcoming_bookings,
                completed_revenue,
                total_reviews,
                average_rating,
                open_broadcasts,
            }),
        )
            .into_response())
    }
}
