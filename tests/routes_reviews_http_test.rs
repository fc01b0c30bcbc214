// ABOUTME: HTTP integration tests for customer review routes
// ABOUTME: Tests public posting with rating bounds and the aggregated listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::uninlined_format_args)]

//! HTTP integration tests for customer review routes
//!
//! Reviews are fully public; these tests cover the per-email uniqueness
//! rule, rating bounds, and the aggregate stats on the listing.

mod common;
mod helpers;

use eventra_server::models::Manager;
use eventra_server::routes::ReviewRoutes;
use eventra_server::server::ServerResources;
use helpers::axum_test::AxumTestRequest;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Test setup helper for review route testing
struct ReviewTestSetup {
    resources: Arc<ServerResources>,
}

impl ReviewTestSetup {
    async fn new() -> anyhow::Result<Self> {
        let resources = common::create_test_resources().await?;
        Ok(Self { resources })
    }

    fn routes(&self) -> axum::Router {
        ReviewRoutes::routes(self.resources.clone())
    }

    async fn seeded_manager(&self) -> anyhow::Result<Manager> {
        let (_, manager) = common::create_test_manager(&self.resources.database).await?;
        Ok(manager)
    }

    /// Post a review through the public route, asserting success
    async fn post_review(&self, manager_id: Uuid, email: &str, rating: i64) {
        let response = AxumTestRequest::post(&format!("/managers/{}/reviews", manager_id))
            .json(&review_body(email, rating))
            .send(self.routes())
            .await;
        assert_eq!(response.status(), 201);
    }
}

fn review_body(email: &str, rating: i64) -> serde_json::Value {
    json!({
        "customer_name": "Riley Customer",
        "customer_email": email,
        "rating": rating,
        "comment": "Flawless coordination from start to finish"
    })
}

// ============================================================================
// POST /managers/:manager_id/reviews - Creation Tests
// ============================================================================

#[tokio::test]
async fn test_create_review_success() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    let response = AxumTestRequest::post(&format!("/managers/{}/reviews", manager.id))
        .json(&review_body("riley@example.com", 5))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["review"]["rating"], 5);
    assert_eq!(body["review"]["manager_id"], manager.id.to_string());
}

#[tokio::test]
async fn test_duplicate_review_conflicts() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    setup.post_review(manager.id, "repeat@example.com", 4).await;

    let response = AxumTestRequest::post(&format!("/managers/{}/reviews", manager.id))
        .json(&review_body("repeat@example.com", 2))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_review_rating_bounds() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    for rating in [0, 6, -1] {
        let response = AxumTestRequest::post(&format!("/managers/{}/reviews", manager.id))
            .json(&review_body("bounds@example.com", rating))
            .send(setup.routes())
            .await;
        assert_eq!(response.status(), 400, "rating {} should be rejected", rating);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn test_review_unknown_manager() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");

    let response = AxumTestRequest::post(&format!("/managers/{}/reviews", Uuid::new_v4()))
        .json(&review_body("ghost@example.com", 5))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_review_rejects_blank_name() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    let mut body = review_body("anon@example.com", 4);
    body["customer_name"] = json!("   ");

    let response = AxumTestRequest::post(&format!("/managers/{}/reviews", manager.id))
        .json(&body)
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// GET /managers/:manager_id/reviews - Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_reviews_with_stats() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    setup.post_review(manager.id, "a@example.com", 4).await;
    setup.post_review(manager.id, "b@example.com", 5).await;

    let response = AxumTestRequest::get(&format!("/managers/{}/reviews", manager.id))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);
    assert!((body["average_rating"].as_f64().unwrap() - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_list_reviews_empty() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");
    let manager = setup.seeded_manager().await.expect("Setup failed");

    let response = AxumTestRequest::get(&format!("/managers/{}/reviews", manager.id))
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
    // No reviews means no average at all
    assert!(body.get("average_rating").is_none());
}

#[tokio::test]
async fn test_list_reviews_invalid_manager_id() {
    let setup = ReviewTestSetup::new().await.expect("Setup failed");

    let response = AxumTestRequest::get("/managers/not-a-uuid/reviews")
        .send(setup.routes())
        .await;

    assert_eq!(response.status(), 400);
}
