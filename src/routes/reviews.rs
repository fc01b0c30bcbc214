// ABOUTME: Review route handlers for customer feedback on managers
// ABOUTME: Provides public REST endpoints for posting and listing reviews with rating stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Customer review routes
//!
//! Both endpoints are public: customers post reviews without an account,
//! identified by email. One review per (manager, email) pair; duplicates
//! surface as `Conflict`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::constants::limits;
use crate::errors::AppError;
use crate::models::Review;
use crate::routes::services::parse_id;
use crate::server::ServerResources;

/// Public review creation request
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    /// Reviewer display name
    pub customer_name: String,
    /// Reviewer email; one review per email per manager
    pub customer_email: String,
    /// Rating, 1 through 5
    pub rating: i64,
    /// Free-text comment
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response carrying a single review
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    /// Always true on the success path
    pub success: bool,
    /// The stored review
    pub review: Review,
}

/// Response carrying a manager's reviews and aggregate stats
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    /// Always true on the success path
    pub success: bool,
    /// Reviews, newest first
    pub reviews: Vec<Review>,
    /// Total number of reviews
    pub total: i64,
    /// Mean rating across all reviews; absent with no reviews
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

/// Review route handlers
pub struct ReviewRoutes;

impl ReviewRoutes {
    /// Create all review routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/managers/:manager_id/reviews",
                post(Self::handle_create_review),
            )
            .route(
                "/managers/:manager_id/reviews",
                get(Self::handle_list_reviews),
            )
            .with_state(resources)
    }

    /// Handle public review creation
    async fn handle_create_review(
        State(resources): State<Arc<ServerResources>>,
        Path(manager_id): Path<String>,
        Json(request): Json<CreateReviewRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = parse_id(&manager_id, "manager id")?;

        if request.customer_name.trim().is_empty() {
            return Err(AppError::validation(
                "Customer name is required",
                &["customer_name"],
            ));
        }
        if request.customer_email.trim().is_empty() {
            return Err(AppError::validation(
                "Customer email is required",
                &["customer_email"],
            ));
        }
        if !(limits::RATING_MIN..=limits::RATING_MAX).contains(&request.rating) {
            return Err(AppError::validation(
                format!(
                    "Rating must be between {} and {}",
                    limits::RATING_MIN,
                    limits::RATING_MAX
                ),
                &["rating"],
            ));
        }

        resources
            .database
            .get_manager(manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Manager"))?;

        let review = Review {
            id: Uuid::new_v4(),
            manager_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        let created = resources.database.create_review(&review).await?;
        if created.is_none() {
            return Err(AppError::conflict(
                "You have already reviewed this manager",
            ));
        }

        info!(manager_id = %manager_id, review_id = %review.id, rating = review.rating, "Review posted");

        Ok((
            StatusCode::CREATED,
            Json(ReviewResponse {
                success: true,
                review,
            }),
        )
            .into_response())
    }

    /// Handle the public review listing with aggregate stats
    async fn handle_list_reviews(
        State(resources): State<Arc<ServerResources>>,
        Path(manager_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = parse_id(&manager_id, "manager id")?;

        let reviews = resources.database.list_reviews(manager_id).await?;
        let (total, average_rating) = resources.database.review_stats(manager_id).await?;

        Ok((
            StatusCode::OK,
            Json(ReviewsResponse {
                success: true,
                reviews,
                total,
                average_rating,
            }),
        )
            .into_response())
    }
}
