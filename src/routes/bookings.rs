// ABOUTME: Booking route handlers for customer booking creation and manager lifecycle control
// ABOUTME: Provides REST endpoints for creating, listing, and transitioning bookings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Booking routes
//!
//! Creation is public (customers book a manager by id); listing and status
//! transitions require the owning manager's token. All lifecycle rules live
//! in the scheduling engine; handlers only translate HTTP.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::routes::authenticated_manager;
use crate::routes::services::parse_id;
use crate::scheduling::lifecycle::{self, NewBooking};
use crate::server::ServerResources;

/// Public booking creation request: the target manager plus booking fields
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Manager being booked
    pub manager_id: String,
    /// Booking fields
    #[serde(flatten)]
    pub booking: NewBooking,
}

/// Query parameters for the booking listing
#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    /// Restrict to one lifecycle status
    #[serde(default)]
    status: Option<String>,
    /// Page size; defaults to the platform limit
    #[serde(default)]
    limit: Option<i64>,
    /// Rows to skip
    #[serde(default)]
    offset: Option<i64>,
}

/// Request body for a booking status transition
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target status: `confirmed`, `cancelled`, or `completed`
    pub status: String,
}

/// Response carrying a single booking
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Always true on the success path
    pub success: bool,
    /// The booking record
    pub booking: Booking,
}

/// Response carrying a page of bookings
#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    /// Always true on the success path
    pub success: bool,
    /// Bookings ordered by event date, newest first
    pub bookings: Vec<Booking>,
    /// Number of bookings returned
    pub total: usize,
}

/// Booking route handlers
pub struct BookingRoutes;

impl BookingRoutes {
    /// Create all booking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/bookings", post(Self::handle_create_booking))
            .route("/bookings", get(Self::handle_list_bookings))
            .route("/bookings/:booking_id", get(Self::handle_get_booking))
            .route(
                "/bookings/:booking_id/status",
                patch(Self::handle_transition),
            )
            .with_state(resources)
    }

    /// Handle public booking creation
    async fn handle_create_booking(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateBookingRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = parse_id(&request.manager_id, "manager id")?;

        resources
            .database
            .get_manager(manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Manager"))?;

        let booking =
            lifecycle::create_booking(&resources.database, manager_id, request.booking).await?;

        Ok((
            StatusCode::CREATED,
            Json(BookingResponse {
                success: true,
                booking,
            }),
        )
            .into_response())
    }

    /// Handle the manager's booking listing with optional status filter
    async fn handle_list_bookings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<ListBookingsQuery>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let status = params
            .status
            .as_deref()
            .map(str::parse::<BookingStatus>)
            .transpose()?;
        let limit = params
            .limit
            .unwrap_or(limits::DEFAULT_BOOKINGS_LIMIT)
            .clamp(1, limits::MAX_BOOKINGS_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let bookings = resources
            .database
            .list_bookings(manager_id, status, limit, offset)
            .await?;

        Ok((
            StatusCode::OK,
            Json(BookingsResponse {
                success: true,
                total: bookings.len(),
                bookings,
            }),
        )
            .into_response())
    }

    /// Handle fetching a single booking
    async fn handle_get_booking(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(booking_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let booking_id = parse_id(&booking_id, "booking id")?;

        let booking = resources
            .database
            .get_booking_for_manager(booking_id, manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking"))?;

        Ok((
            StatusCode::OK,
            Json(BookingResponse {
                success: true,
                booking,
            }),
        )
            .into_response())
    }

    /// Handle a booking lifecycle transition
    async fn handle_transition(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(booking_id): Path<String>,
        Json(request): Json<TransitionRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let booking_id = parse_id(&booking_id, "booking id")?;
        let target: BookingStatus = request.status.parse()?;

        let booking = lifecycle::transition_booking(
            &resources.database,
            manager_id,
            booking_id,
            target,
            resources.config.booking.mark_whole_day_on_confirm,
        )
        .await?;

        Ok((
            StatusCode::OK,
            Json(BookingResponse {
                success: true,
                booking,
            }),
        )
            .into_response())
    }
}
