// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, and manager creation helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Eventra
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `eventra_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use eventra_server::{
    auth::{generate_jwt_secret, hash_password, AuthManager},
    config::environment::{
        AuthConfig, BookingConfig, BroadcastConfig, CorsConfig, DatabaseConfig, DatabaseUrl,
        LogLevel, ServerConfig,
    },
    database::Database,
    models::Manager,
    server::ServerResources,
};
use std::sync::{Arc, Once};
use uuid::Uuid;

/// Password every test manager is created with
pub const TEST_PASSWORD: &str = "password123";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// File-backed test database for tests that exercise concurrent connections
///
/// An in-memory `SQLite` pool hands every pooled connection its own private
/// database, so tasks racing over cloned pools must share a file instead.
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn create_shared_test_database() -> Result<(Database, tempfile::TempDir)> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite:{}", dir.path().join("eventra_test.db").display());
    let database = Database::new(&url).await?;
    Ok((database, dir))
}

/// Create test authentication manager
pub fn create_test_auth_manager() -> Arc<AuthManager> {
    let jwt_secret = generate_jwt_secret();
    Arc::new(AuthManager::new(&jwt_secret, 24))
}

/// Baseline configuration for route tests
pub fn create_test_config() -> Arc<ServerConfig> {
    Arc::new(ServerConfig {
        http_port: 8081,
        log_level: LogLevel::Warn,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
            auto_migrate: true,
        },
        auth: AuthConfig {
            jwt_expiry_hours: 24,
        },
        booking: BookingConfig {
            mark_whole_day_on_confirm: false,
        },
        broadcast: BroadcastConfig {
            request_ttl_days: 7,
            reaper_interval_secs: 300,
            expired_retention_days: 30,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    })
}

/// Create test `ServerResources` with all components properly initialized
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;

    let jwt_secret = generate_jwt_secret();
    let auth_manager = AuthManager::new(&jwt_secret, 24);

    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        create_test_config(),
    )))
}

/// Create a standard test manager with a real bcrypt hash of [`TEST_PASSWORD`]
pub async fn create_test_manager(database: &Database) -> Result<(Uuid, Manager)> {
    create_test_manager_with_email(database, "owner@example.com").await
}

/// Create a test manager with a custom email
pub async fn create_test_manager_with_email(
    database: &Database,
    email: &str,
) -> Result<(Uuid, Manager)> {
    let manager = Manager::new(
        email.to_string(),
        hash_password(TEST_PASSWORD)?,
        "Prime Events".to_string(),
        "Sam Owner".to_string(),
    );
    let manager_id = manager.id;

    database.create_manager(&manager).await?;
    Ok((manager_id, manager))
}

/// Issue a session token for a manager directly through the auth manager
pub fn bearer_token(resources: &ServerResources, manager: &Manager) -> Result<String> {
    resources.auth_manager.generate_token(manager)
}
