// ABOUTME: Main library entry point for the Eventra booking platform
// ABOUTME: Provides availability calendars, booking lifecycle, and broadcast matching over REST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

// Crate-level attributes:
// - recursion_limit: Increased from default 128 to 256 for complex derive macros
//   (serde, thiserror) on deeply nested types like calendar and booking responses
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Eventra Server
//!
//! A multi-tenant booking platform backend for event-service managers
//! (photographers, caterers, DJs, venues). Each manager maintains an
//! availability calendar and a service catalog; customers book requests
//! against them or broadcast requests that any matching manager can accept.
//!
//! ## Features
//!
//! - **Availability calendars**: Per-day slots with whole-day and hour-window
//!   granularity, weekend batch marking, and a first-of-month lockout
//! - **Booking lifecycle**: A guarded state machine from `Pending` through
//!   `Completed`, projecting occupancy onto the calendar on confirmation
//! - **Broadcast matching**: Open requests visible to every manager,
//!   first-accept-wins via a compare-and-set claim
//! - **Drift defense**: Availability queries cross-check confirmed bookings
//!   so a stale calendar never reports a booked day as free
//! - **Multi-tenant auth**: JWT sessions per manager with bcrypt credentials
//!
//! ## Quick Start
//!
//! 1. Point `DATABASE_URL` at a SQLite database (or use the default)
//! 2. Set `JWT_SECRET` so sessions survive restarts
//! 3. Start the server with `eventra-server`
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Domain types for managers, services, availability, bookings
//! - **Database**: SQLite persistence with embedded migrations
//! - **Scheduling**: Calendar, lifecycle, broadcast, and query engines
//! - **Routes**: REST handlers grouped per domain
//! - **Config**: Environment-driven configuration with validation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use eventra_server::config::environment::ServerConfig;
//! use eventra_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     // Start Eventra with loaded configuration
//!     println!("Eventra server configured with port: HTTP={}",
//!              config.http_port);
//!
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests (tests/).
// They must remain `pub` so external consumers can access them.

/// Authentication and session management
pub mod auth;

/// Configuration management and validation
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Multi-tenant database management
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Common data models for the booking domain
pub mod models;

/// `HTTP` routes for manager registration and booking flows
pub mod routes;

/// Calendar, booking lifecycle, broadcast, and availability query engines
pub mod scheduling;

/// HTTP server assembly and lifecycle
pub mod server;
