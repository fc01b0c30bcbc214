// ABOUTME: HTTP integration tests for broadcast request routes
// ABOUTME: Tests public posting, the open feed, and first-accept-wins claiming
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::uninlined_format_args)]

//! HTTP integration tests for broadcast request routes
//!
//! Covers the public posting endpoint, the authenticated open feed, and the
//! acceptance endpoint whose compare-and-swap guarantees a single winner.

mod common;
mod helpers;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use eventra_server::models::Manager;
use eventra_server::routes::BroadcastRoutes;
use eventra_server::server::ServerResources;
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Test setup helper for broadcast route testing
struct BroadcastTestSetup {
    resources: Arc<ServerResources>,
}

impl BroadcastTestSetup {
    async fn new() -> anyhow::Result<Self> {
        let resources = common::create_test_resources().await?;
        Ok(Self { resources })
    }

    fn routes(&self) -> axum::Router {
        BroadcastRoutes::routes(self.resources.clone())
    }

    async fn authed_manager(&self, email: &str) -> anyhow::Result<(Manager, String)> {
        let (_, manager) =
            common::create_test_manager_with_email(&self.resources.database, email).await?;
        let token = common::bearer_token(&self.resources, &manager)?;
        Ok((manager, token))
    }

    /// Post a broadcast through the public route, asserting success
    async fn post_broadcast(&self) -> serde_json::Value {
        let response = AxumTestRequest::post("/broadcasts")
            .json(&broadcast_body(future_date(30)))
            .send(self.routes())
            .await;
        assert_eq!(response.status(), 201);
        response.json()
    }
}

/// A date roughly `days_ahead` out, nudged off the locked 1st of the month
fn future_date(days_ahead: i64) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(days_ahead);
    if date.day() == 1 {
        date += Duration::days(1);
    }
    date
}

fn broadcast_body(date: NaiveDate) -> serde_json::Value {
    json!({
        "customer_name": "Riley Customer",
        "customer_email": "riley@example.com",
        "event_type": "Corporate Retreat",
        "date": date,
        "time": "10:00",
        "location": "Lakeside Resort",
        "guest_count": 60,
        "budget": 5000.0,
        "requirements": "Outdoor seating and a vegetarian menu"
    })
}

// ============================================================================
// POST /broadcasts - Public Posting Tests
// ============================================================================

#[tokio::test]
async fn test_create_broadcast_success() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");

    let response = AxumTestRequest::post("/broadcasts")
        .json(&broadcast_body(future_date(30)))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["broadcast"]["status"], "open");
    assert_eq!(body["broadcast"]["customer_name"], "Riley Customer");
    assert_eq!(body["broadcast"]["guest_count"], 60);
    assert!(body["broadcast"]["expires_at"].is_string());
    assert!(body["broadcast"]["accepted_by"].is_null());
}

#[tokio::test]
async fn test_create_broadcast_rejects_past_date() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let yesterday = Utc::now().date_naive() - Duration::days(1);

    let response = AxumTestRequest::post("/broadcasts")
        .json(&broadcast_body(yesterday))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_create_broadcast_rejects_negative_budget() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");

    let mut body = broadcast_body(future_date(30));
    body["budget"] = json!(-500.0);

    let response = AxumTestRequest::post("/broadcasts")
        .json(&body)
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// GET /broadcasts/open - Open Feed Tests
// ============================================================================

#[tokio::test]
async fn test_open_feed_requires_auth() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");

    let response = AxumTestRequest::get("/broadcasts/open").send(setup.routes()).await;

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_open_feed_lists_posted_requests() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (_, token) = setup
        .authed_manager("feed@example.com")
        .await
        .expect("Setup failed");

    setup.post_broadcast().await;
    setup.post_broadcast().await;

    let response = AxumTestRequest::get("/broadcasts/open")
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);
    for broadcast in body["broadcasts"].as_array().unwrap() {
        assert_eq!(broadcast["status"], "open");
    }
}

// ============================================================================
// POST /broadcasts/:broadcast_id/accept - Acceptance Tests
// ============================================================================

#[tokio::test]
async fn test_accept_broadcast_derives_booking() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (manager, token) = setup
        .authed_manager("winner@example.com")
        .await
        .expect("Setup failed");

    let posted = setup.post_broadcast().await;
    let broadcast_id = posted["broadcast"]["id"].as_str().unwrap().to_owned();

    let response = AxumTestRequest::post(&format!("/broadcasts/{}/accept", broadcast_id))
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let booking = &body["booking"];
    assert_eq!(booking["manager_id"], manager.id.to_string());
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["customer_name"], "Riley Customer");
    assert!((booking["total_amount"].as_f64().unwrap() - 5000.0).abs() < f64::EPSILON);
    assert_eq!(booking["service_ids"].as_array().unwrap().len(), 0);
    // The derived booking records its origin and the customer's requirements
    let notes = booking["notes"].as_str().unwrap();
    assert!(notes.contains(&broadcast_id));
    assert!(notes.contains("vegetarian menu"));
}

#[tokio::test]
async fn test_second_accept_loses() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (_, first_token) = setup
        .authed_manager("first@example.com")
        .await
        .expect("Setup failed");
    let (_, second_token) = setup
        .authed_manager("second@example.com")
        .await
        .expect("Setup failed");

    let posted = setup.post_broadcast().await;
    let broadcast_id = posted["broadcast"]["id"].as_str().unwrap().to_owned();

    let first = AxumTestRequest::post(&format!("/broadcasts/{}/accept", broadcast_id))
        .header("authorization", &format!("Bearer {}", first_token))
        .send(setup.routes())
        .await;
    assert_eq!(first.status(), 201);

    let second = AxumTestRequest::post(&format!("/broadcasts/{}/accept", broadcast_id))
        .header("authorization", &format!("Bearer {}", second_token))
        .send(setup.routes())
        .await;
    assert_eq!(second.status(), 409);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_accepted_request_leaves_open_feed() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (_, token) = setup
        .authed_manager("claimer@example.com")
        .await
        .expect("Setup failed");

    let posted = setup.post_broadcast().await;
    let broadcast_id = posted["broadcast"]["id"].as_str().unwrap().to_owned();

    let accept = AxumTestRequest::post(&format!("/broadcasts/{}/accept", broadcast_id))
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;
    assert_eq!(accept.status(), 201);

    let open = AxumTestRequest::get("/broadcasts/open")
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;
    let body: serde_json::Value = open.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_accepted_listing_shows_won_requests() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (manager, winner_token) = setup
        .authed_manager("victor@example.com")
        .await
        .expect("Setup failed");
    let (_, loser_token) = setup
        .authed_manager("rival@example.com")
        .await
        .expect("Setup failed");

    let posted = setup.post_broadcast().await;
    let broadcast_id = posted["broadcast"]["id"].as_str().unwrap().to_owned();

    let accept = AxumTestRequest::post(&format!("/broadcasts/{}/accept", broadcast_id))
        .header("authorization", &format!("Bearer {}", winner_token))
        .send(setup.routes())
        .await;
    assert_eq!(accept.status(), 201);

    let winner_view = AxumTestRequest::get("/broadcasts/accepted")
        .header("authorization", &format!("Bearer {}", winner_token))
        .send(setup.routes())
        .await;
    let body: serde_json::Value = winner_view.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["broadcasts"][0]["status"], "accepted");
    assert_eq!(
        body["broadcasts"][0]["accepted_by"],
        manager.id.to_string()
    );

    // The losing manager's accepted list stays empty
    let loser_view = AxumTestRequest::get("/broadcasts/accepted")
        .header("authorization", &format!("Bearer {}", loser_token))
        .send(setup.routes())
        .await;
    let body: serde_json::Value = loser_view.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_accept_unknown_broadcast() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (_, token) = setup
        .authed_manager("hopeful@example.com")
        .await
        .expect("Setup failed");

    let response = AxumTestRequest::post(&format!("/broadcasts/{}/accept", Uuid::new_v4()))
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_accept_invalid_broadcast_id() {
    let setup = BroadcastTestSetup::new().await.expect("Setup failed");
    let (_, token) = setup
        .authed_manager("typo@example.com")
        .await
        .expect("Setup failed");

    let response = AxumTestRequest::post("/broadcasts/not-a-uuid/accept")
        .header("authorization", &format!("Bearer {}", token))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 400);
}
