// ABOUTME: Calendar store operations extracted from route handlers
// ABOUTME: Availability upserts, weekend batches, deletion guards, and month view assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

use chrono::{Datelike, Days, Months, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AvailabilityDay, Booking, DayStatus, TimeSlot, WeekendAvailability,
};

/// Mutable fields accepted by an availability upsert
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityUpdate {
    /// Calendar day the record covers
    pub date: NaiveDate,
    /// When true, slot-level granularity is bypassed
    #[serde(default)]
    pub is_full_day: bool,
    /// Day-level status, authoritative for full-day records
    #[serde(default)]
    pub status: DayStatus,
    /// Slot entries, required non-empty when not full-day
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Saturday/Sunday applicability flags
    #[serde(default)]
    pub weekend: Option<WeekendAvailability>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for the batch weekend-setting operation
#[derive(Debug, Clone, Deserialize)]
pub struct WeekendBatchInput {
    /// Month to process, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Which weekend days to touch
    #[serde(default)]
    pub weekend: WeekendAvailability,
    /// Applied to every selected date
    #[serde(default)]
    pub is_full_day: bool,
    /// Applied to every selected date
    #[serde(default)]
    pub status: DayStatus,
    /// Applied to every selected date
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Applied to every selected date
    #[serde(default)]
    pub notes: Option<String>,
}

/// Per-date outcome of a weekend batch
#[derive(Debug, Serialize)]
pub struct WeekendBatchOutcome {
    /// Records that were written
    pub applied: Vec<AvailabilityDay>,
    /// Dates that failed, with the reason each one failed
    pub skipped: Vec<SkippedDate>,
}

/// A weekend date the batch could not process
#[derive(Debug, Serialize)]
pub struct SkippedDate {
    /// Date that was skipped
    pub date: NaiveDate,
    /// Why it was skipped
    pub reason: String,
}

/// One month of availability and live bookings, merged for display
#[derive(Debug, Serialize)]
pub struct CalendarView {
    /// Month covered, 1-12
    pub month: u32,
    /// Year covered
    pub year: i32,
    /// Availability records in the month, ordered by date
    pub availability: Vec<AvailabilityDay>,
    /// Pending and Confirmed bookings rendered as display events
    pub events: Vec<CalendarEvent>,
}

/// A booking rendered for the calendar view
#[derive(Debug, Serialize)]
pub struct CalendarEvent {
    /// Booking behind the event
    pub booking_id: Uuid,
    /// Display title
    pub title: String,
    /// Event day
    pub date: NaiveDate,
    /// Wall-clock start
    pub time: String,
    /// Current booking status
    pub status: crate::models::BookingStatus,
}

/// Upsert one availability record
///
/// The first calendar day of every month is permanently locked against
/// edits. Exactly one record exists per (manager, date): a second write for
/// an already-recorded day overwrites the mutable fields in place, keeping
/// the record id.
///
/// # Errors
///
/// Returns `Locked` for the 1st of any month, `ValidationFailed` for an
/// empty slot set on a non-full-day record or a slot with `start >= end`,
/// and a database error if the write fails
pub async fn update_availability(
    db: &Database,
    manager_id: Uuid,
    update: AvailabilityUpdate,
) -> AppResult<AvailabilityDay> {
    guard_first_of_month(update.date)?;
    validate_slot_payload(&update)?;

    let now = Utc::now();
    let day = AvailabilityDay {
        id: Uuid::new_v4(),
        manager_id,
        date: update.date,
        is_full_day: update.is_full_day,
        status: update.status,
        booking_id: None,
        time_slots: update.time_slots,
        weekend: update.weekend,
        notes: update.notes,
        created_at: now,
        updated_at: now,
    };

    db.upsert_availability_day(&day)
        .await
        .map_err(|e| AppError::database(format!("Failed to store availability: {e}")))?;

    // Re-read: on conflict the stored id and created_at survive
    db.get_availability_day(manager_id, update.date)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?
        .ok_or_else(|| AppError::internal("Availability record vanished after upsert"))
}

/// Apply one payload to every selected weekend day of a month
///
/// Saturdays and Sundays are enumerated per the payload flags, always
/// excluding the 1st of the month. Each date is processed independently; a
/// failure on one date never aborts the others.
///
/// # Errors
///
/// Returns `ValidationFailed` when the month is out of range. Per-date
/// failures land in the outcome's `skipped` list instead of propagating
pub async fn set_weekend_availability(
    db: &Database,
    manager_id: Uuid,
    input: WeekendBatchInput,
) -> AppResult<WeekendBatchOutcome> {
    // Validates month/year before touching any date
    month_bounds(input.year, input.month)?;

    let mut outcome = WeekendBatchOutcome {
        applied: Vec::new(),
        skipped: Vec::new(),
    };

    for date in weekend_dates(input.year, input.month, input.weekend) {
        let update = AvailabilityUpdate {
            date,
            is_full_day: input.is_full_day,
            status: input.status,
            time_slots: input.time_slots.clone(),
            weekend: Some(input.weekend),
            notes: input.notes.clone(),
        };

        match update_availability(db, manager_id, update).await {
            Ok(day) => outcome.applied.push(day),
            Err(e) => outcome.skipped.push(SkippedDate {
                date,
                reason: e.message,
            }),
        }
    }

    info!(
        manager_id = %manager_id,
        month = input.month,
        year = input.year,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "Weekend availability batch processed"
    );

    Ok(outcome)
}

/// Delete an availability record
///
/// # Errors
///
/// Returns `NotFound` when the record is missing or owned by another
/// manager, `Locked` for the 1st of any month, and `Conflict` while any
/// Pending or Confirmed booking exists on that date
pub async fn delete_availability(
    db: &Database,
    manager_id: Uuid,
    availability_id: Uuid,
) -> AppResult<()> {
    let day = db
        .get_availability_by_id(availability_id, manager_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?
        .ok_or_else(|| AppError::not_found("Availability record"))?;

    guard_first_of_month(day.date)?;

    let has_live_bookings = db
        .live_bookings_exist(manager_id, day.date)
        .await
        .map_err(|e| AppError::database(format!("Failed to check bookings: {e}")))?;
    if has_live_bookings {
        return Err(AppError::conflict(
            "Availability has pending or confirmed bookings and cannot be deleted",
        ));
    }

    let deleted = db
        .delete_availability_day(availability_id, manager_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete availability: {e}")))?;
    if deleted == 0 {
        return Err(AppError::not_found("Availability record"));
    }

    Ok(())
}

/// Ordered availability records, optionally bounded by a date range
///
/// # Errors
///
/// Returns a database error if the query fails
pub async fn availability_range(
    db: &Database,
    manager_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Vec<AvailabilityDay>> {
    db.get_availability_range(manager_id, from, to)
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))
}

/// Compose one month of availability records and live bookings
///
/// Every Pending or Confirmed booking in the month becomes a display event
/// titled `"<event type> - <customer name>"`.
///
/// # Errors
///
/// Returns `ValidationFailed` when the month is out of range, or a database
/// error if a query fails
pub async fn month_calendar(
    db: &Database,
    manager_id: Uuid,
    month: u32,
    year: i32,
) -> AppResult<CalendarView> {
    let (first, last) = month_bounds(year, month)?;

    let availability = db
        .get_availability_range(manager_id, Some(first), Some(last))
        .await
        .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?;

    let bookings = db
        .live_bookings_in_range(manager_id, first, last)
        .await
        .map_err(|e| AppError::database(format!("Failed to load bookings: {e}")))?;

    Ok(CalendarView {
        month,
        year,
        availability,
        events: bookings.iter().map(display_event).collect(),
    })
}

fn display_event(booking: &Booking) -> CalendarEvent {
    CalendarEvent {
        booking_id: booking.id,
        title: format!("{} - {}", booking.event_type, booking.customer_name),
        date: booking.date,
        time: booking.time.clone(),
        status: booking.status,
    }
}

/// The 1st of every month is locked against calendar edits
fn guard_first_of_month(date: NaiveDate) -> AppResult<()> {
    if date.day() == 1 {
        return Err(AppError::locked(format!(
            "The first day of the month ({date}) is locked and cannot be edited"
        )));
    }
    Ok(())
}

fn validate_slot_payload(update: &AvailabilityUpdate) -> AppResult<()> {
    if !update.is_full_day && update.time_slots.is_empty() {
        return Err(AppError::validation(
            "Time slots are required when the day is not full-day",
            &["time_slots"],
        ));
    }
    for slot in &update.time_slots {
        slot.validate()?;
    }
    Ok(())
}

/// First and last day of a month
fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation("Month must be between 1 and 12", &["month"]))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .ok_or_else(|| AppError::validation("Year is out of range", &["year"]))?;
    Ok((first, last))
}

/// Saturdays and Sundays of a month per the payload flags, never the 1st
fn weekend_dates(year: i32, month: u32, weekend: WeekendAvailability) -> Vec<NaiveDate> {
    let Ok((_, last)) = month_bounds(year, month) else {
        return Vec::new();
    };

    (2..=last.day())
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| match date.weekday() {
            Weekday::Sat => weekend.saturday,
            Weekday::Sun => weekend.sunday,
            _ => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2025, 7).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 7, 31).unwrap());

        let (_, feb_last) = month_bounds(2024, 2).unwrap();
        assert_eq!(feb_last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn test_weekend_dates_both_days() {
        let days = weekend_dates(2025, 7, WeekendAvailability::default());
        let expected: Vec<u32> = vec![5, 6, 12, 13, 19, 20, 26, 27];
        assert_eq!(days.iter().map(Datelike::day).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_weekend_dates_exclude_first_of_month() {
        // March 2025 starts on a Saturday
        let days = weekend_dates(
            2025,
            3,
            WeekendAvailability {
                saturday: true,
                sunday: false,
            },
        );
        let expected: Vec<u32> = vec![8, 15, 22, 29];
        assert_eq!(days.iter().map(Datelike::day).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_weekend_dates_single_day_flag() {
        // June 2025 starts on a Sunday, which stays excluded
        let days = weekend_dates(
            2025,
            6,
            WeekendAvailability {
                saturday: false,
                sunday: true,
            },
        );
        let expected: Vec<u32> = vec![8, 15, 22, 29];
        assert_eq!(days.iter().map(Datelike::day).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_first_of_month_guard() {
        let first = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert!(guard_first_of_month(first).is_err());

        let second = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        assert!(guard_first_of_month(second).is_ok());
    }
}
