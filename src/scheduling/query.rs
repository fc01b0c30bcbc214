// ABOUTME: Availability queries composing calendar state with live booking state
// ABOUTME: Never trusts calendar status alone; confirmed bookings veto drifted records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{DayStatus, TimeSlot};
use crate::scheduling::sync::slot_occupant;

/// Answer to "is this manager available at date/time"
#[derive(Debug, Serialize)]
pub struct AvailabilityDecision {
    /// Whether the request can be served
    pub available: bool,
    /// Effective status behind the answer
    pub status: DayStatus,
    /// Why the request cannot be served, when it cannot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AvailabilityDecision {
    fn open() -> Self {
        Self {
            available: true,
            status: DayStatus::Available,
            reason: None,
        }
    }

    fn closed(status: DayStatus, reason: impl Into<String>) -> Self {
        Self {
            available: false,
            status,
            reason: Some(reason.into()),
        }
    }
}

/// Check whether a manager can take a booking on a date, optionally at a time
///
/// Calendar status alone is not trusted: synchronization after booking
/// transitions is best-effort, so a record can claim `available` while a
/// confirmed booking already occupies it. Confirmed bookings therefore veto
/// the calendar's answer. Decision order: no record, then day-level status,
/// then full-day vs slot-level resolution.
///
/// With no `time` on a slot-level record, the day's aggregate status
/// answers: some slot may still be free even while others are booked.
///
/// # Errors
///
/// Returns a database error if a read fails
pub async fn check_availability(
    db: &Database,
    manager_id: Uuid,
    date: NaiveDate,
    time: Option<NaiveTime>,
) -> AppResult<AvailabilityDecision> {
    let Some(day) = db
        .get_availability_day(manager_id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?
    else {
        return Ok(AvailabilityDecision::closed(
            DayStatus::Unavailable,
            "No availability published for this date",
        ));
    };

    if day.status != DayStatus::Available {
        return Ok(AvailabilityDecision::closed(
            day.status,
            "Day is not open for booking",
        ));
    }

    let confirmed = db
        .confirmed_bookings_on_date(manager_id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load confirmed bookings: {e}")))?;

    if day.is_full_day {
        if confirmed.is_empty() {
            return Ok(AvailabilityDecision::open());
        }
        return Ok(AvailabilityDecision::closed(
            DayStatus::Booked,
            "A confirmed booking already occupies this date",
        ));
    }

    match time {
        Some(time) => {
            let Some(slot) = day.slot_matching(time) else {
                return Ok(AvailabilityDecision::closed(
                    DayStatus::Unavailable,
                    "No time slot covers the requested time",
                ));
            };
            Ok(resolve_slot(slot, &confirmed))
        }
        // Day-level aggregate already passed the status gate above
        None => Ok(AvailabilityDecision::open()),
    }
}

fn resolve_slot(slot: &TimeSlot, confirmed: &[crate::models::Booking]) -> AvailabilityDecision {
    if slot.status != DayStatus::Available {
        return AvailabilityDecision::closed(slot.status, "Time slot is not open for booking");
    }
    if slot_occupant(slot, confirmed).is_some() {
        return AvailabilityDecision::closed(
            DayStatus::Booked,
            "A confirmed booking already occupies this time slot",
        );
    }
    AvailabilityDecision::open()
}
