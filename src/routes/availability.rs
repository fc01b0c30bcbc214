// ABOUTME: Availability calendar route handlers for day upserts, weekend batches, and queries
// ABOUTME: Provides REST endpoints for calendar management and the public availability check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Availability calendar routes
//!
//! Calendar writes go through the scheduling engine so the first-of-month
//! lockout and slot validation apply uniformly. The public check endpoint
//! answers customer-facing "can I book this manager on this date" queries
//! without authentication.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::{parse_wall_clock, AvailabilityDay, DayStatus};
use crate::routes::authenticated_manager;
use crate::routes::services::parse_id;
use crate::scheduling::calendar::{
    self, AvailabilityUpdate, CalendarView, WeekendBatchInput, WeekendBatchOutcome,
};
use crate::scheduling::{query, sync};
use crate::server::ServerResources;

/// Query parameters for the availability range listing
#[derive(Debug, Deserialize)]
struct RangeQuery {
    /// Inclusive start date; unbounded when absent
    #[serde(default)]
    from: Option<NaiveDate>,
    /// Inclusive end date; unbounded when absent
    #[serde(default)]
    to: Option<NaiveDate>,
}

/// Query parameters for the month calendar view
#[derive(Debug, Deserialize)]
struct CalendarQuery {
    /// Month, 1 through 12
    month: u32,
    /// Calendar year
    year: i32,
}

/// Query parameters for the occupancy repair endpoint
#[derive(Debug, Deserialize)]
struct RepairQuery {
    /// Date whose occupancy should be recomputed
    date: NaiveDate,
}

/// Query parameters for the public availability check
#[derive(Debug, Deserialize)]
struct CheckQuery {
    /// Date to check
    date: NaiveDate,
    /// Optional wall-clock time, `HH:MM`
    #[serde(default)]
    time: Option<String>,
}

/// Response carrying a single availability day
#[derive(Debug, Serialize)]
pub struct AvailabilityDayResponse {
    /// Always true on the success path
    pub success: bool,
    /// The stored availability record
    pub day: AvailabilityDay,
}

/// Response carrying a range of availability days
#[derive(Debug, Serialize)]
pub struct AvailabilityListResponse {
    /// Always true on the success path
    pub success: bool,
    /// Days ordered by date
    pub days: Vec<AvailabilityDay>,
    /// Number of days returned
    pub total: usize,
}

/// Response for the weekend batch operation
#[derive(Debug, Serialize)]
pub struct WeekendBatchResponse {
    /// Always true on the success path
    pub success: bool,
    /// Per-date outcome: applied days and skipped dates with reasons
    #[serde(flatten)]
    pub outcome: WeekendBatchOutcome,
}

/// Response confirming an availability deletion
#[derive(Debug, Serialize)]
pub struct DeleteAvailabilityResponse {
    /// Always true on the success path
    pub success: bool,
    /// Human-readable confirmation
    pub message: String,
}

/// Response carrying the merged month calendar
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    /// Always true on the success path
    pub success: bool,
    /// Availability and events for the month
    pub calendar: CalendarView,
}

/// Response for the occupancy repair endpoint
#[derive(Debug, Serialize)]
pub struct RepairResponse {
    /// Always true on the success path
    pub success: bool,
    /// Whether an availability record existed to recompute
    pub repaired: bool,
    /// The recomputed record, when one existed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<AvailabilityDay>,
}

/// Response for the public availability check
#[derive(Debug, Serialize)]
pub struct CheckAvailabilityResponse {
    /// Always true on the success path
    pub success: bool,
    /// Whether the requested date/time can take a new booking
    pub available: bool,
    /// Status backing the verdict
    pub status: DayStatus,
    /// Why the date/time is unavailable, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Availability route handlers
pub struct AvailabilityRoutes;

impl AvailabilityRoutes {
    /// Create all availability and calendar routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/availability", get(Self::handle_range))
            .route("/availability", post(Self::handle_upsert))
            .route("/availability/weekends", post(Self::handle_weekend_batch))
            .route(
                "/availability/:availability_id",
                delete(Self::handle_delete),
            )
            .route("/calendar", get(Self::handle_calendar))
            .route("/calendar/repair", post(Self::handle_repair))
            .route(
                "/managers/:manager_id/availability/check",
                get(Self::handle_check),
            )
            .with_state(resources)
    }

    /// Handle listing availability over a date range
    async fn handle_range(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<RangeQuery>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        if let (Some(from), Some(to)) = (params.from, params.to) {
            if from > to {
                return Err(AppError::validation(
                    "Range start must not be after range end",
                    &["from", "to"],
                ));
            }
        }

        let days = calendar::availability_range(
            &resources.database,
            manager_id,
            params.from,
            params.to,
        )
        .await?;

        Ok((
            StatusCode::OK,
            Json(AvailabilityListResponse {
                success: true,
                total: days.len(),
                days,
            }),
        )
            .into_response())
    }

    /// Handle an availability upsert for a single date
    async fn handle_upsert(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<AvailabilityUpdate>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let day = calendar::update_availability(&resources.database, manager_id, request).await?;

        Ok((
            StatusCode::OK,
            Json(AvailabilityDayResponse { success: true, day }),
        )
            .into_response())
    }

    /// Handle the weekend batch operation for a month
    async fn handle_weekend_batch(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<WeekendBatchInput>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let outcome =
            calendar::set_weekend_availability(&resources.database, manager_id, request).await?;

        Ok((
            StatusCode::OK,
            Json(WeekendBatchResponse {
                success: true,
                outcome,
            }),
        )
            .into_response())
    }

    /// Handle deleting an availability record
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(availability_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let availability_id = parse_id(&availability_id, "availability id")?;

        calendar::delete_availability(&resources.database, manager_id, availability_id).await?;

        info!(manager_id = %manager_id, availability_id = %availability_id, "Availability deleted");

        Ok((
            StatusCode::OK,
            Json(DeleteAvailabilityResponse {
                success: true,
                message: "Availability deleted".to_owned(),
            }),
        )
            .into_response())
    }

    /// Handle the merged month calendar view
    async fn handle_calendar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<CalendarQuery>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let calendar =
            calendar::month_calendar(&resources.database, manager_id, params.month, params.year)
                .await?;

        Ok((
            StatusCode::OK,
            Json(CalendarResponse {
                success: true,
                calendar,
            }),
        )
            .into_response())
    }

    /// Handle recomputing occupancy for one date from booking state
    ///
    /// Recovery endpoint for when a projection write failed after a booking
    /// transition committed.
    async fn handle_repair(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<RepairQuery>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let day = sync::project_occupancy(
            &resources.database,
            manager_id,
            params.date,
            resources.config.booking.mark_whole_day_on_confirm,
        )
        .await?;

        info!(manager_id = %manager_id, date = %params.date, repaired = day.is_some(), "Occupancy repair requested");

        Ok((
            StatusCode::OK,
            Json(RepairResponse {
                success: true,
                repaired: day.is_some(),
                day,
            }),
        )
            .into_response())
    }

    /// Handle the public availability check
    async fn handle_check(
        State(resources): State<Arc<ServerResources>>,
        Path(manager_id): Path<String>,
        Query(params): Query<CheckQuery>,
    ) -> Result<Response, AppError> {
        let manager_id = parse_id(&manager_id, "manager id")?;

        let time = match params.time.as_deref() {
            None => None,
            Some(raw) => Some(parse_wall_clock(raw).ok_or_else(|| {
                AppError::validation(format!("Invalid time format: {raw}"), &["time"])
            })?),
        };

        let decision =
            query::check_availability(&resources.database, manager_id, params.date, time).await?;

        Ok((
            StatusCode::OK,
            Json(CheckAvailabilityResponse {
                success: true,
                available: decision.available,
                status: decision.status,
                reason: decision.reason,
            }),
        )
            .into_response())
    }
}
