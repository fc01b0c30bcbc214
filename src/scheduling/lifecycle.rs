// ABOUTME: Booking lifecycle management: creation validation and status transitions
// ABOUTME: Transitions are compare-and-set writes; calendar sync afterwards is best-effort
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, DayStatus, PaymentStatus};
use crate::scheduling::sync;

/// Fields a customer submits when booking a manager directly
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    /// Customer display name
    pub customer_name: String,
    /// Customer contact address
    pub customer_email: String,
    /// Optional phone contact
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Kind of event being booked
    pub event_type: String,
    /// Event day, strictly in the future
    pub date: NaiveDate,
    /// Wall-clock start, `HH:MM`
    pub time: String,
    /// Venue or address
    #[serde(default)]
    pub location: Option<String>,
    /// Services requested from the manager's catalog
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    /// Agreed price, non-negative
    #[serde(default)]
    pub total_amount: f64,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Create a Pending booking for a manager
///
/// Every requested service must belong to the manager and be active, and an
/// availability record with day-level status `available` must exist for the
/// date. The slot is deliberately NOT occupied here: multiple pending
/// requests may contend for the same slot, resolved when one of them is
/// confirmed.
///
/// # Errors
///
/// Returns `ValidationFailed` for a past date or negative amount,
/// `InvalidServices` when the service set does not check out, and
/// `Unavailable` when the date is not open
pub async fn create_booking(
    db: &Database,
    manager_id: Uuid,
    input: NewBooking,
) -> AppResult<Booking> {
    validate_booking_input(&input)?;

    let unique_services: Vec<Uuid> = input
        .service_ids
        .iter()
        .copied()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if !unique_services.is_empty() {
        let found = db
            .count_active_services(manager_id, &unique_services)
            .await
            .map_err(|e| AppError::database(format!("Failed to verify services: {e}")))?;
        let found = usize::try_from(found).unwrap_or(0);
        if found != unique_services.len() {
            return Err(AppError::invalid_services(unique_services.len(), found));
        }
    }

    let day = db
        .get_availability_day(manager_id, input.date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?
        .ok_or_else(|| {
            AppError::unavailable(format!("Manager has no availability on {}", input.date))
        })?;
    if day.status != DayStatus::Available {
        return Err(AppError::unavailable(format!(
            "Manager is not available on {}",
            input.date
        )));
    }

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        manager_id,
        customer_name: input.customer_name,
        customer_email: input.customer_email,
        customer_phone: input.customer_phone,
        event_type: input.event_type,
        date: input.date,
        time: input.time,
        location: input.location,
        service_ids: input.service_ids,
        total_amount: input.total_amount,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        notes: input.notes,
        created_at: now,
        updated_at: now,
    };

    db.create_booking(&booking)
        .await
        .map_err(|e| AppError::database(format!("Failed to create booking: {e}")))?;

    info!(
        booking_id = %booking.id,
        manager_id = %manager_id,
        date = %booking.date,
        "Booking created"
    );

    Ok(booking)
}

/// Move a booking to a new status
///
/// The write is a compare-and-set keyed on the status the booking held when
/// it was read; a concurrent transition makes the write miss and surfaces as
/// `Conflict`. Transitions that affect occupancy re-project the calendar for
/// the booking's date afterwards — projection failures are logged and
/// swallowed, never propagated, because booking state is authoritative and
/// the calendar can be repaired later.
///
/// # Errors
///
/// Returns `NotFound` for a missing or foreign booking, `InvalidTransition`
/// when the state machine forbids the move, and `Conflict` when a concurrent
/// transition won the race
pub async fn transition_booking(
    db: &Database,
    manager_id: Uuid,
    booking_id: Uuid,
    target: BookingStatus,
    mark_whole_day: bool,
) -> AppResult<Booking> {
    let current = db
        .get_booking_for_manager(booking_id, manager_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load booking: {e}")))?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    if !current.status.can_transition_to(target) {
        return Err(AppError::invalid_transition(current.status, target));
    }

    let updated = db
        .update_booking_status(booking_id, manager_id, current.status, target)
        .await
        .map_err(|e| AppError::database(format!("Failed to update booking: {e}")))?;
    if updated == 0 {
        return Err(AppError::conflict(
            "Booking status changed concurrently, reload and retry",
        ));
    }

    info!(
        booking_id = %booking_id,
        manager_id = %manager_id,
        from = %current.status,
        to = %target,
        "Booking transitioned"
    );

    if affects_occupancy(current.status, target) {
        if let Err(e) = sync::project_occupancy(db, manager_id, current.date, mark_whole_day).await
        {
            warn!(
                booking_id = %booking_id,
                date = %current.date,
                error = %e,
                "Calendar synchronization failed after booking transition"
            );
        }
    }

    db.get_booking_for_manager(booking_id, manager_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to reload booking: {e}")))?
        .ok_or_else(|| AppError::internal("Booking vanished after transition"))
}

/// Whether a transition changes what occupies the calendar
///
/// Confirmation commits occupancy; cancelling a confirmed booking releases
/// it. Completion keeps the day stamped as a historical record, and
/// cancelling a pending booking never occupied anything.
const fn affects_occupancy(from: BookingStatus, to: BookingStatus) -> bool {
    matches!(
        (from, to),
        (_, BookingStatus::Confirmed) | (BookingStatus::Confirmed, BookingStatus::Cancelled)
    )
}

fn validate_booking_input(input: &NewBooking) -> AppResult<()> {
    if input.customer_name.trim().is_empty() {
        return Err(AppError::validation(
            "Customer name is required",
            &["customer_name"],
        ));
    }
    if input.customer_email.trim().is_empty() {
        return Err(AppError::validation(
            "Customer email is required",
            &["customer_email"],
        ));
    }
    if input.date <= Utc::now().date_naive() {
        return Err(AppError::validation(
            "Booking date must be in the future",
            &["date"],
        ));
    }
    if input.total_amount < 0.0 {
        return Err(AppError::validation(
            "Total amount cannot be negative",
            &["total_amount"],
        ));
    }
    Ok(())
}
