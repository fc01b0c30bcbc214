// ABOUTME: Manager authentication route handlers for registration, login, and profile management
// ABOUTME: Provides REST endpoints for account creation and JWT-based session issuance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Authentication routes for manager accounts
//!
//! Handles manager registration, login, and profile reads/updates. Login
//! issues an HS256 JWT whose subject is the manager id; all protected
//! routes across the server validate that token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::Manager;
use crate::routes::authenticated_manager;
use crate::server::ServerResources;

/// Manager registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email, unique across the platform
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Public-facing business name
    pub business_name: String,
    /// Name of the owner or contact person
    pub owner_name: String,
    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// City the business operates from
    #[serde(default)]
    pub city: Option<String>,
    /// Free-text business description
    #[serde(default)]
    pub about: Option<String>,
}

/// Manager registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Always true on the success path
    pub success: bool,
    /// Id of the newly created manager
    pub manager_id: String,
    /// Registered email
    pub email: String,
}

/// Manager login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Registered email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Manager login response with session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always true on the success path
    pub success: bool,
    /// Bearer token for subsequent requests
    pub token: String,
    /// Token expiry as RFC 3339
    pub expires_at: String,
    /// Authenticated manager profile
    pub manager: Manager,
}

/// Profile update request; absent fields keep their stored value
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New business name
    #[serde(default)]
    pub business_name: Option<String>,
    /// New owner name
    #[serde(default)]
    pub owner_name: Option<String>,
    /// New contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// New city
    #[serde(default)]
    pub city: Option<String>,
    /// New business description
    #[serde(default)]
    pub about: Option<String>,
}

/// Manager profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Always true on the success path
    pub success: bool,
    /// Manager profile; the password hash never serializes
    pub manager: Manager,
}

/// Authentication route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/register", post(Self::handle_register))
            .route("/auth/login", post(Self::handle_login))
            .route("/managers/me", get(Self::handle_get_profile))
            .route("/managers/me", put(Self::handle_update_profile))
            .with_state(resources)
    }

    /// Handle manager registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        info!(email = %request.email, "Manager registration attempt");

        if !Self::is_valid_email(&request.email) {
            return Err(AppError::validation("Invalid email format", &["email"]));
        }
        if !Self::is_valid_password(&request.password) {
            return Err(AppError::validation(
                "Password must be at least 8 characters",
                &["password"],
            ));
        }
        if request.business_name.trim().is_empty() {
            return Err(AppError::validation(
                "Business name is required",
                &["business_name"],
            ));
        }
        if request.owner_name.trim().is_empty() {
            return Err(AppError::validation(
                "Owner name is required",
                &["owner_name"],
            ));
        }

        if resources
            .database
            .get_manager_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = hash_password(&request.password)?;
        let mut manager = Manager::new(
            request.email.clone(),
            password_hash,
            request.business_name,
            request.owner_name,
        );
        manager.phone = request.phone;
        manager.city = request.city;
        manager.about = request.about;

        let manager_id = resources.database.create_manager(&manager).await?;

        info!(email = %request.email, manager_id = %manager_id, "Manager registered");

        Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                manager_id: manager_id.to_string(),
                email: request.email,
            }),
        )
            .into_response())
    }

    /// Handle manager login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        info!(email = %request.email, "Manager login attempt");

        let manager = resources
            .database
            .get_manager_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        // Verify password on a blocking thread so bcrypt never stalls the executor
        let password = request.password.clone();
        let password_hash = manager.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            error!(email = %request.email, "Invalid password for manager");
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        if !manager.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        resources.database.update_last_active(manager.id).await?;

        let token = resources.auth_manager.generate_token(&manager)?;
        let expires_at = Utc::now() + Duration::hours(resources.config.auth.jwt_expiry_hours);

        info!(email = %request.email, manager_id = %manager.id, "Manager logged in");

        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                token,
                expires_at: expires_at.to_rfc3339(),
                manager,
            }),
        )
            .into_response())
    }

    /// Handle profile retrieval for the authenticated manager
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let manager = resources
            .database
            .get_manager(manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Manager"))?;

        Ok((
            StatusCode::OK,
            Json(ProfileResponse {
                success: true,
                manager,
            }),
        )
            .into_response())
    }

    /// Handle profile updates for the authenticated manager
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let mut manager = resources
            .database
            .get_manager(manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Manager"))?;

        if let Some(business_name) = request.business_name {
            if business_name.trim().is_empty() {
                return Err(AppError::validation(
                    "Business name cannot be empty",
                    &["business_name"],
                ));
            }
            manager.business_name = business_name;
        }
        if let Some(owner_name) = request.owner_name {
            if owner_name.trim().is_empty() {
                return Err(AppError::validation(
                    "Owner name cannot be empty",
                    &["owner_name"],
                ));
            }
            manager.owner_name = owner_name;
        }
        if let Some(phone) = request.phone {
            manager.phone = Some(phone);
        }
        if let Some(city) = request.city {
            manager.city = Some(city);
        }
        if let Some(about) = request.about {
            manager.about = Some(about);
        }

        resources.database.update_manager(&manager).await?;

        info!(manager_id = %manager_id, "Manager profile updated");

        Ok((
            StatusCode::OK,
            Json(ProfileResponse {
                success: true,
                manager,
            }),
        )
            .into_response())
    }

    /// Validate email format
    fn is_valid_email(email: &str) -> bool {
        if email.len() <= 5 {
            return false;
        }
        let Some(at_pos) = email.find('@') else {
            return false;
        };
        if at_pos == 0 || at_pos == email.len() - 1 {
            return false;
        }
        let domain_part = &email[at_pos + 1..];
        domain_part.contains('.')
    }

    /// Validate password strength
    const fn is_valid_password(password: &str) -> bool {
        password.len() >= 8
    }
}
