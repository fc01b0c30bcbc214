// ABOUTME: Configuration management module for centralized server settings and parameters
// ABOUTME: Handles environment configs, booking behavior, and broadcast reaper options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Configuration module for the Eventra booking server
//!
//! Centralized configuration management:
//!
//! - **Environment**: Server configuration from environment variables

/// Environment and server configuration
pub mod environment;
