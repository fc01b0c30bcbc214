// ABOUTME: Core data models and types for the Eventra booking platform
// ABOUTME: Defines Manager, AvailabilityDay, Booking, BroadcastRequest and their status enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! # Data Models
//!
//! Core data structures shared across the booking server: manager accounts,
//! service offerings, availability calendars with their time slots, bookings,
//! broadcast requests, and reviews.
//!
//! Status enums carry their own storage encoding (`as_str`/`FromStr`) so the
//! database layer and the JSON surface agree on the wire values, and
//! `BookingStatus` owns the transition matrix the lifecycle manager enforces.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Parse a wall-clock `HH:MM` string
#[must_use]
pub fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// An event-service manager account (the tenant of the platform)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    /// Unique manager identifier
    pub id: Uuid,
    /// Login email address (unique)
    pub email: String,
    /// Hashed password for authentication
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Public-facing business name
    pub business_name: String,
    /// Name of the owner or contact person
    pub owner_name: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// City the business operates from
    pub city: Option<String>,
    /// Free-text business description
    pub about: Option<String>,
    /// Whether the account is active
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last time the manager accessed the system
    pub last_active: DateTime<Utc>,
}

impl Manager {
    /// Create a new manager account with a fresh id and timestamps
    #[must_use]
    pub fn new(
        email: String,
        password_hash: String,
        business_name: String,
        owner_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            business_name,
            owner_name,
            phone: None,
            city: None,
            about: None,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }
}

/// A service a manager offers (catering, photography, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Unique service identifier
    pub id: Uuid,
    /// Owning manager
    pub manager_id: Uuid,
    /// Display name
    pub name: String,
    /// Category; must be one of `constants::SERVICE_CATEGORIES`
    pub category: String,
    /// Free-text description
    pub description: Option<String>,
    /// Price in the platform currency; non-negative
    pub price: f64,
    /// Whether the service can be booked
    pub is_active: bool,
    /// When the service was created
    pub created_at: DateTime<Utc>,
}

impl ServiceOffering {
    /// Create a new active service offering
    #[must_use]
    pub fn new(manager_id: Uuid, name: String, category: String, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            manager_id,
            name,
            category,
            description: None,
            price,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Day-level or slot-level availability status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Open for booking
    #[default]
    Available,
    /// Manually blocked by the manager
    Unavailable,
    /// Occupied by a confirmed booking
    Booked,
}

impl DayStatus {
    /// Storage encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Booked => "booked",
        }
    }
}

impl Display for DayStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            "booked" => Ok(Self::Booked),
            _ => Err(AppError::validation(format!("Invalid day status: {s}"), &["status"]).into()),
        }
    }
}

/// A time-bounded subdivision of a day's availability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    /// Wall-clock start, `HH:MM`
    pub start_time: String,
    /// Wall-clock end, `HH:MM`; must be after `start_time`
    pub end_time: String,
    /// Slot status
    pub status: DayStatus,
    /// Booking currently occupying this slot; set iff status is booked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
}

impl TimeSlot {
    /// Create an available slot for the given window
    #[must_use]
    pub fn available(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            status: DayStatus::Available,
            booking_id: None,
        }
    }

    /// Parse the slot boundaries; `None` when either side is malformed
    #[must_use]
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((
            parse_wall_clock(&self.start_time)?,
            parse_wall_clock(&self.end_time)?,
        ))
    }

    /// Whether the given time falls inside this slot (boundaries inclusive)
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.window()
            .is_some_and(|(start, end)| start <= time && time <= end)
    }

    /// Validate slot boundaries: both sides parse and start < end
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` naming the offending field
    pub fn validate(&self) -> AppResult<()> {
        let (start, end) = self.window().ok_or_else(|| {
            AppError::validation(
                format!(
                    "Time slot boundaries must be HH:MM, got {}-{}",
                    self.start_time, self.end_time
                ),
                &["time_slots"],
            )
        })?;

        if start >= end {
            return Err(AppError::validation(
                format!(
                    "Time slot start {} must be before end {}",
                    self.start_time, self.end_time
                ),
                &["time_slots"],
            ));
        }

        Ok(())
    }
}

/// Saturday/Sunday applicability flags for weekend batch scheduling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekendAvailability {
    /// Apply to Saturdays
    pub saturday: bool,
    /// Apply to Sundays
    pub sunday: bool,
}

impl Default for WeekendAvailability {
    fn default() -> Self {
        Self {
            saturday: true,
            sunday: true,
        }
    }
}

/// One availability record per (manager, calendar day)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityDay {
    /// Unique record identifier
    pub id: Uuid,
    /// Owning manager (immutable)
    pub manager_id: Uuid,
    /// Calendar day; unique together with `manager_id`
    pub date: NaiveDate,
    /// When true, slot-level granularity is bypassed
    pub is_full_day: bool,
    /// Day-level status; authoritative when `is_full_day` is true
    pub status: DayStatus,
    /// Booking occupying the day when `is_full_day` and status is booked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    /// Slot entries; required non-empty when not full-day
    pub time_slots: Vec<TimeSlot>,
    /// Weekend applicability flags from batch scheduling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend: Option<WeekendAvailability>,
    /// Free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityDay {
    /// Find the slot whose window contains the given time
    #[must_use]
    pub fn slot_matching(&self, time: NaiveTime) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|slot| slot.contains(time))
    }
}

/// Booking lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting manager confirmation
    Pending,
    /// Accepted by the manager; occupies calendar slots
    Confirmed,
    /// Cancelled by either party (terminal)
    Cancelled,
    /// Service delivered (terminal)
    Completed,
}

impl BookingStatus {
    /// Storage encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether this state admits no further transitions
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// The transition matrix: Pending -> Confirmed -> Completed, and
    /// Pending|Confirmed -> Cancelled
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Completed)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
        )
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(
                AppError::validation(format!("Invalid booking status: {s}"), &["status"]).into(),
            ),
        }
    }
}

/// Payment progress, independent of the booking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing received yet
    #[default]
    Pending,
    /// Deposit or partial amount received
    Partial,
    /// Fully paid
    Paid,
    /// Paid amount returned
    Refunded,
}

impl PaymentStatus {
    /// Storage encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            _ => Err(AppError::validation(
                format!("Invalid payment status: {s}"),
                &["payment_status"],
            )
            .into()),
        }
    }
}

/// A customer booking owned by a single manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: Uuid,
    /// Owning manager (immutable after creation)
    pub manager_id: Uuid,
    /// Customer display name
    pub customer_name: String,
    /// Customer contact email
    pub customer_email: String,
    /// Customer contact phone
    pub customer_phone: Option<String>,
    /// Kind of event (wedding, birthday, corporate, ...)
    pub event_type: String,
    /// Event date; strictly in the future at creation
    pub date: NaiveDate,
    /// Event start time, `HH:MM`
    pub time: String,
    /// Venue or address
    pub location: Option<String>,
    /// Booked services; all must belong to the manager and be active
    pub service_ids: Vec<Uuid>,
    /// Total amount; non-negative
    pub total_amount: f64,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Payment progress
    pub payment_status: PaymentStatus,
    /// Free text; carries the broadcast trace for derived bookings
    pub notes: Option<String>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Event time as `NaiveTime`, when well-formed
    #[must_use]
    pub fn event_time(&self) -> Option<NaiveTime> {
        parse_wall_clock(&self.time)
    }
}

/// Broadcast request lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    /// Visible to managers, not yet accepted
    Open,
    /// Claimed by exactly one manager
    Accepted,
    /// Past its expiry without acceptance
    Expired,
    /// Fulfilled end-to-end
    Completed,
}

impl BroadcastStatus {
    /// Storage encoding
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Completed => "completed",
        }
    }
}

impl Display for BroadcastStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BroadcastStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            "completed" => Ok(Self::Completed),
            _ => Err(
                AppError::validation(format!("Invalid broadcast status: {s}"), &["status"]).into(),
            ),
        }
    }
}

/// A customer-initiated open job post, claimable by any manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    /// Unique request identifier
    pub id: Uuid,
    /// Customer display name
    pub customer_name: String,
    /// Customer contact email
    pub customer_email: String,
    /// Customer contact phone
    pub customer_phone: Option<String>,
    /// Kind of event
    pub event_type: String,
    /// Requested event date
    pub date: NaiveDate,
    /// Requested event time, `HH:MM`
    pub time: String,
    /// Venue or address
    pub location: Option<String>,
    /// Expected number of guests
    pub guest_count: Option<i64>,
    /// Customer budget; becomes the derived booking's total amount
    pub budget: f64,
    /// Free-text requirements
    pub requirements: Option<String>,
    /// Lifecycle state
    pub status: BroadcastStatus,
    /// Manager who claimed the request; set exactly once
    pub accepted_by: Option<Uuid>,
    /// When the request was claimed
    pub accepted_at: Option<DateTime<Utc>>,
    /// Past this instant the record leaves open listings and is reaped
    pub expires_at: DateTime<Utc>,
    /// When the request was posted
    pub created_at: DateTime<Utc>,
}

impl BroadcastRequest {
    /// Whether the request is past its expiry instant
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A customer review of a manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review identifier
    pub id: Uuid,
    /// Reviewed manager
    pub manager_id: Uuid,
    /// Reviewer display name
    pub customer_name: String,
    /// Reviewer email; at most one review per (manager, email)
    pub customer_email: String,
    /// Rating, 1 through 5
    pub rating: i64,
    /// Free-text comment
    pub comment: Option<String>,
    /// When the review was posted
    pub created_at: DateTime<Utc>,
}
