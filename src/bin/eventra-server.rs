// ABOUTME: Server binary for the Eventra multi-tenant booking platform
// ABOUTME: Wires configuration, database, auth, and the HTTP router, then serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! # Eventra Booking Server Binary
//!
//! Starts the booking platform HTTP API with manager authentication,
//! availability calendars, booking lifecycle management, and the broadcast
//! request marketplace.

use anyhow::Result;
use clap::Parser;
use eventra_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::ServerConfig,
    constants::env_config,
    database::Database,
    logging, server,
    server::ServerResources,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "eventra-server")]
#[command(about = "Eventra - Multi-tenant booking platform for event-service managers")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args { http_port: None }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Eventra booking server");
    info!("{}", config.summary());

    let database = if config.database.auto_migrate {
        Database::new(&config.database.url.to_connection_string()).await?
    } else {
        Database::connect(&config.database.url.to_connection_string()).await?
    };
    info!(
        "Database initialized: {}",
        &config.database.url.to_connection_string()
    );

    let jwt_secret = match env_config::jwt_secret() {
        Some(secret) => secret.into_bytes(),
        None => {
            warn!("JWT_SECRET not set; using an ephemeral secret, sessions will not survive a restart");
            generate_jwt_secret().to_vec()
        }
    };
    let auth_manager = AuthManager::new(&jwt_secret, config.auth.jwt_expiry_hours);
    info!("Authentication manager initialized");

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));

    info!("Server starting on port {http_port}");
    display_available_endpoints(http_port);

    server::run(resources).await
}

/// Display all available API endpoints with their ports
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    display_auth_endpoints(&host, port);
    display_catalog_endpoints(&host, port);
    display_booking_endpoints(&host, port);
    display_broadcast_endpoints(&host, port);
    display_monitoring_endpoints(&host, port);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_auth_endpoints(host: &str, port: u16) {
    info!("Authentication & Profiles:");
    info!("   Register:          POST http://{host}:{port}/auth/register");
    info!("   Login:             POST http://{host}:{port}/auth/login");
    info!("   My Profile:        GET  http://{host}:{port}/managers/me");
    info!("   Update Profile:    PUT  http://{host}:{port}/managers/me");
}

#[allow(clippy::cognitive_complexity)]
fn display_catalog_endpoints(host: &str, port: u16) {
    info!("Services & Availability:");
    info!("   Create Service:    POST http://{host}:{port}/services");
    info!("   List Services:     GET  http://{host}:{port}/services");
    info!("   Public Services:   GET  http://{host}:{port}/managers/{{manager_id}}/services");
    info!("   Categories:        GET  http://{host}:{port}/categories");
    info!("   Set Availability:  POST http://{host}:{port}/availability");
    info!("   Weekend Batch:     POST http://{host}:{port}/availability/weekends");
    info!("   Month Calendar:    GET  http://{host}:{port}/calendar?month=&year=");
    info!("   Check Availability: GET http://{host}:{port}/managers/{{manager_id}}/availability/check?date=");
}

#[allow(clippy::cognitive_complexity)]
fn display_booking_endpoints(host: &str, port: u16) {
    info!("Bookings:");
    info!("   Create Booking:    POST http://{host}:{port}/bookings");
    info!("   List Bookings:     GET  http://{host}:{port}/bookings");
    info!("   Transition:        PATCH http://{host}:{port}/bookings/{{booking_id}}/status");
}

#[allow(clippy::cognitive_complexity)]
fn display_broadcast_endpoints(host: &str, port: u16) {
    info!("Broadcast Requests:");
    info!("   Post Request:      POST http://{host}:{port}/broadcasts");
    info!("   Open Feed:         GET  http://{host}:{port}/broadcasts/open");
    info!("   Accept Request:    POST http://{host}:{port}/broadcasts/{{broadcast_id}}/accept");
    info!("   My Accepted:       GET  http://{host}:{port}/broadcasts/accepted");
}

#[allow(clippy::cognitive_complexity)]
fn display_monitoring_endpoints(host: &str, port: u16) {
    info!("Reviews & Monitoring:");
    info!("   Post Review:       POST http://{host}:{port}/managers/{{manager_id}}/reviews");
    info!("   List Reviews:      GET  http://{host}:{port}/managers/{{manager_id}}/reviews");
    info!("   Dashboard Stats:   GET  http://{host}:{port}/dashboard/stats");
    info!("   Health Check:      GET  http://{host}:{port}/health");
}
