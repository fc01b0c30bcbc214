// ABOUTME: Scheduling engine for availability calendars, booking lifecycle, and broadcast matching
// ABOUTME: Protocol-agnostic business logic shared by every route that touches calendar state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Scheduling engine
//!
//! Business rules live here so route handlers stay thin. Booking status is
//! the source of truth throughout; calendar occupancy is a derived projection
//! recomputed by [`sync`] whenever a booking transition lands, and repairable
//! at any time from booking state alone.

/// Broadcast request matching: first-accept-wins claims and the expiry reaper
pub mod broadcast;

/// Calendar store operations: upserts, weekend batches, deletion guards, month views
pub mod calendar;

/// Booking creation and status transitions
pub mod lifecycle;

/// Availability queries that compose calendar state with live bookings
pub mod query;

/// Calendar occupancy projection from confirmed bookings
pub mod sync;
