// ABOUTME: Service offering route handlers for manager catalog management
// ABOUTME: Provides REST endpoints for creating, listing, updating, and retiring services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

//! Service offering routes
//!
//! Managers maintain a catalog of offerings (catering, photography, ...)
//! that bookings reference by id. Deletion is a soft deactivate so
//! historical bookings keep resolving their service references.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::constants::{is_known_category, SERVICE_CATEGORIES};
use crate::errors::AppError;
use crate::models::ServiceOffering;
use crate::routes::authenticated_manager;
use crate::server::ServerResources;

/// Request body for creating a service offering
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    /// Display name
    pub name: String,
    /// Category; must be one of the platform categories
    pub category: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Price in the platform currency
    pub price: f64,
}

/// Request body for updating a service; absent fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New price
    #[serde(default)]
    pub price: Option<f64>,
    /// Reactivate or deactivate the service
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Response carrying a single service
#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    /// Always true on the success path
    pub success: bool,
    /// The service offering
    pub service: ServiceOffering,
}

/// Response carrying a list of services
#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    /// Always true on the success path
    pub success: bool,
    /// Services ordered newest first
    pub services: Vec<ServiceOffering>,
    /// Number of services returned
    pub total: usize,
}

/// Response confirming a service deactivation
#[derive(Debug, Serialize)]
pub struct DeactivateServiceResponse {
    /// Always true on the success path
    pub success: bool,
    /// Human-readable confirmation
    pub message: String,
}

/// Response listing the platform service categories
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    /// Always true on the success path
    pub success: bool,
    /// Known category names
    pub categories: &'static [&'static str],
}

/// Service offering route handlers
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all service management routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/services", post(Self::handle_create_service))
            .route("/services", get(Self::handle_list_services))
            .route("/services/:service_id", put(Self::handle_update_service))
            .route(
                "/services/:service_id",
                delete(Self::handle_deactivate_service),
            )
            .route(
                "/managers/:manager_id/services",
                get(Self::handle_public_services),
            )
            .route("/categories", get(Self::handle_categories))
            .with_state(resources)
    }

    /// Handle service creation
    async fn handle_create_service(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateServiceRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        if request.name.trim().is_empty() {
            return Err(AppError::validation("Service name is required", &["name"]));
        }
        if !is_known_category(&request.category) {
            return Err(AppError::validation(
                format!("Unknown service category: {}", request.category),
                &["category"],
            ));
        }
        if request.price < 0.0 {
            return Err(AppError::validation(
                "Price cannot be negative",
                &["price"],
            ));
        }

        let mut service =
            ServiceOffering::new(manager_id, request.name, request.category, request.price);
        service.description = request.description;

        resources.database.create_service(&service).await?;

        info!(manager_id = %manager_id, service_id = %service.id, "Service created");

        Ok((
            StatusCode::CREATED,
            Json(ServiceResponse {
                success: true,
                service,
            }),
        )
            .into_response())
    }

    /// Handle listing the authenticated manager's services, active or not
    async fn handle_list_services(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;

        let services = resources.database.list_services(manager_id, false).await?;

        Ok((
            StatusCode::OK,
            Json(ServicesResponse {
                success: true,
                total: services.len(),
                services,
            }),
        )
            .into_response())
    }

    /// Handle service updates
    async fn handle_update_service(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(service_id): Path<String>,
        Json(request): Json<UpdateServiceRequest>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let service_id = parse_id(&service_id, "service id")?;

        let mut service = resources
            .database
            .get_service(service_id, manager_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service"))?;

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(AppError::validation(
                    "Service name cannot be empty",
                    &["name"],
                ));
            }
            service.name = name;
        }
        if let Some(category) = request.category {
            if !is_known_category(&category) {
                return Err(AppError::validation(
                    format!("Unknown service category: {category}"),
                    &["category"],
                ));
            }
            service.category = category;
        }
        if let Some(description) = request.description {
            service.description = Some(description);
        }
        if let Some(price) = request.price {
            if price < 0.0 {
                return Err(AppError::validation(
                    "Price cannot be negative",
                    &["price"],
                ));
            }
            service.price = price;
        }
        if let Some(is_active) = request.is_active {
            service.is_active = is_active;
        }

        let updated = resources.database.update_service(&service).await?;
        if updated == 0 {
            return Err(AppError::not_found("Service"));
        }

        info!(manager_id = %manager_id, service_id = %service_id, "Service updated");

        Ok((
            StatusCode::OK,
            Json(ServiceResponse {
                success: true,
                service,
            }),
        )
            .into_response())
    }

    /// Handle service deactivation
    ///
    /// Soft delete: the row survives so existing bookings keep resolving
    /// their service references, but new bookings can no longer use it.
    async fn handle_deactivate_service(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(service_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = authenticated_manager(&headers, &resources)?;
        let service_id = parse_id(&service_id, "service id")?;

        let updated = resources
            .database
            .deactivate_service(service_id, manager_id)
            .await?;
        if updated == 0 {
            return Err(AppError::not_found("Service"));
        }

        info!(manager_id = %manager_id, service_id = %service_id, "Service deactivated");

        Ok((
            StatusCode::OK,
            Json(DeactivateServiceResponse {
                success: true,
                message: "Service deactivated".to_owned(),
            }),
        )
            .into_response())
    }

    /// Handle the public listing of a manager's active services
    async fn handle_public_services(
        State(resources): State<Arc<ServerResources>>,
        Path(manager_id): Path<String>,
    ) -> Result<Response, AppError> {
        let manager_id = parse_id(&manager_id, "manager id")?;

        let services = resources.database.list_services(manager_id, true).await?;

        Ok((
            StatusCode::OK,
            Json(ServicesResponse {
                success: true,
                total: services.len(),
                services,
            }),
        )
            .into_response())
    }

    /// Handle the public category listing
    async fn handle_categories(
        State(_resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        Ok((
            StatusCode::OK,
            Json(CategoriesResponse {
                success: true,
                categories: SERVICE_CATEGORIES,
            }),
        )
            .into_response())
    }
}

/// Parse a path segment as a UUID
pub(crate) fn parse_id(value: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value).map_err(|e| AppError::validation(format!("Invalid {what}: {e}"), &["id"]))
}
