// ABOUTME: Route module organization for the Eventra booking platform HTTP endpoints
// ABOUTME: Provides centralized route definitions organized by domain with a shared auth helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Route modules for the booking platform
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the scheduling engine and database layers. Handlers
//! return [`AppError`] so every failure leaves the server as a structured
//! JSON envelope.

use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::errors::AppError;
use crate::server::ServerResources;

/// Manager registration, login, and profile routes
pub mod auth;
/// Availability calendar and occupancy-repair routes
pub mod availability;
/// Booking creation, listing, and lifecycle routes
pub mod bookings;
/// Broadcast request posting and first-accept-wins claiming routes
pub mod broadcasts;
/// Aggregated manager dashboard statistics route
pub mod dashboard;
/// Health check and system status routes
pub mod health;
/// Customer review routes
pub mod reviews;
/// Service offering management routes
pub mod services;

/// Authentication route handlers
pub use auth::AuthRoutes;
/// Availability route handlers
pub use availability::AvailabilityRoutes;
/// Booking route handlers
pub use bookings::BookingRoutes;
/// Broadcast route handlers
pub use broadcasts::BroadcastRoutes;
/// Dashboard route handlers
pub use dashboard::DashboardRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Review route handlers
pub use reviews::ReviewRoutes;
/// Service offering route handlers
pub use services::ServiceRoutes;

/// Resolve the authenticated manager from the `Authorization` header
///
/// # Errors
///
/// Returns [`AppError::auth_required`] when the header is absent and
/// [`AppError::auth_invalid`] when the token is malformed, expired, or
/// carries a subject that is not a valid manager id.
pub(crate) fn authenticated_manager(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<Uuid, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Authorization header must use the Bearer scheme"))?;

    let claims = resources
        .auth_manager
        .validate_token(token)
        .map_err(|e| AppError::auth_invalid(format!("Token validation failed: {e}")))?;

    Uuid::parse_str(&claims.sub)
        .map_err(|e| AppError::auth_invalid(format!("Token subject is not a manager id: {e}")))
}
