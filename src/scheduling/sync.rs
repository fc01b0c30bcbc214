// ABOUTME: Calendar occupancy projection recomputed from confirmed bookings
// ABOUTME: Booking state is authoritative; calendar occupancy is derived and repairable at any time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{AvailabilityDay, Booking, DayStatus, TimeSlot};

/// Recompute calendar occupancy for one (manager, date) from booking state
///
/// The projection is rebuilt from scratch rather than patched: every
/// confirmed booking on the date re-stamps the day or its matching slot, and
/// stale `booked` markers whose booking is no longer confirmed revert to
/// `available`. A day or slot the manager marked `unavailable` by hand is
/// never touched. Confirmed bookings are applied in update order, so two
/// confirmations contending for one slot resolve to the last writer.
///
/// With `mark_whole_day` set, a confirmation stamps every slot of the day
/// regardless of its time window. Kept for compatibility with calendars
/// written by deployments that ran in that mode; slot-specific stamping is
/// the default.
///
/// Returns `None` when no availability record exists for the date.
///
/// # Errors
///
/// Returns a database error if a read or the final write fails
pub async fn project_occupancy(
    db: &Database,
    manager_id: Uuid,
    date: NaiveDate,
    mark_whole_day: bool,
) -> AppResult<Option<AvailabilityDay>> {
    let Some(mut day) = db
        .get_availability_day(manager_id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?
    else {
        debug!(
            manager_id = %manager_id,
            %date,
            "No availability record for date, nothing to project"
        );
        return Ok(None);
    };

    let confirmed = db
        .confirmed_bookings_on_date(manager_id, date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load confirmed bookings: {e}")))?;

    if day.is_full_day || mark_whole_day {
        project_whole_day(&mut day, &confirmed);
    } else {
        project_slots(&mut day, &confirmed);
    }

    db.upsert_availability_day(&day)
        .await
        .map_err(|e| AppError::database(format!("Failed to store projection: {e}")))?;

    debug!(
        manager_id = %manager_id,
        %date,
        status = %day.status,
        confirmed = confirmed.len(),
        "Calendar occupancy projected"
    );

    Ok(Some(day))
}

/// Day-level projection, also used for the whole-day compatibility mode
fn project_whole_day(day: &mut AvailabilityDay, confirmed: &[Booking]) {
    if let Some(winner) = confirmed.last() {
        day.status = DayStatus::Booked;
        day.booking_id = Some(winner.id);
        for slot in &mut day.time_slots {
            slot.status = DayStatus::Booked;
            slot.booking_id = Some(winner.id);
        }
        return;
    }

    // No confirmed bookings: revert stale markers, keep manual blocks
    if day.status == DayStatus::Booked {
        day.status = DayStatus::Available;
        day.booking_id = None;
    }
    for slot in &mut day.time_slots {
        if slot.status == DayStatus::Booked {
            slot.status = DayStatus::Available;
            slot.booking_id = None;
        }
    }
}

/// Slot-level projection: only the slot covering a booking's time is stamped
fn project_slots(day: &mut AvailabilityDay, confirmed: &[Booking]) {
    for booking in confirmed {
        if booking.event_time().is_none() {
            warn!(
                booking_id = %booking.id,
                time = %booking.time,
                "Confirmed booking has an unparsable time, slot projection skips it"
            );
        }
    }

    for slot in &mut day.time_slots {
        match slot_occupant(slot, confirmed) {
            Some(owner) => {
                slot.status = DayStatus::Booked;
                slot.booking_id = Some(owner.id);
            }
            None => {
                if slot.status == DayStatus::Booked {
                    slot.status = DayStatus::Available;
                    slot.booking_id = None;
                }
            }
        }
    }

    // Day-level aggregate; a manual unavailable day stays blocked
    if day.status != DayStatus::Unavailable {
        let fully_booked = !day.time_slots.is_empty()
            && day
                .time_slots
                .iter()
                .all(|slot| slot.status == DayStatus::Booked);
        day.status = if fully_booked {
            DayStatus::Booked
        } else {
            DayStatus::Available
        };
        day.booking_id = None;
    }
}

/// The confirmed booking currently occupying a slot, if any
///
/// Bookings arrive in update order, so the last match is the latest writer.
pub(crate) fn slot_occupant<'a>(slot: &TimeSlot, confirmed: &'a [Booking]) -> Option<&'a Booking> {
    confirmed
        .iter()
        .filter(|booking| booking.event_time().is_some_and(|time| slot.contains(time)))
        .last()
}
