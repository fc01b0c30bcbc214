// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Unified Error Handling System
//!
//! This module provides the centralized error handling system for the Eventra
//! booking server. It defines standard error codes, the application error type,
//! and HTTP response formatting so every route answers with the same
//! `{"success": false, "message": ...}` envelope.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1002,

    // Validation (3000-3999)
    #[serde(rename = "VALIDATION_FAILED")]
    ValidationFailed = 3000,

    // Business-rule contention (4000-4999)
    #[serde(rename = "NOT_FOUND")]
    NotFound = 4000,
    #[serde(rename = "CONFLICT")]
    Conflict = 4001,
    #[serde(rename = "LOCKED")]
    Locked = 4002,
    #[serde(rename = "UNAVAILABLE")]
    Unavailable = 4003,
    #[serde(rename = "INVALID_TRANSITION")]
    InvalidTransition = 4004,
    #[serde(rename = "INVALID_SERVICES")]
    InvalidServices = 4005,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 9002,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::ValidationFailed => 400,

            // 401 Unauthorized
            Self::AuthRequired | Self::AuthInvalid => 401,

            // 403 Forbidden
            Self::PermissionDenied => 403,

            // 404 Not Found
            Self::NotFound => 404,

            // 409 Conflict
            Self::Conflict
            | Self::Locked
            | Self::Unavailable
            | Self::InvalidTransition
            | Self::InvalidServices => 409,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::ValidationFailed => "The provided input is invalid",
            Self::NotFound => "The requested resource was not found",
            Self::Conflict => "The request conflicts with the current state of the resource",
            Self::Locked => "The resource is locked and cannot be modified",
            Self::Unavailable => "The requested date or time slot is not available",
            Self::InvalidTransition => "The requested status change is not allowed",
            Self::InvalidServices => "One or more referenced services are invalid",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::ConfigError => "Configuration error encountered",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Violated fields or other structured context for the client
    pub details: Option<serde_json::Value>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach structured details (e.g. the violated fields)
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response envelope: `{"success": false, "message": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            success: false,
            code: error.code,
            message: error.message,
            details: error.details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 500-class details stay in the log; the client gets the generic text.
        let body = if status.is_server_error() {
            error!(code = ?self.code, message = %self.message, "request failed");
            ErrorResponse {
                success: false,
                code: self.code,
                message: self.code.description().into(),
                details: None,
            }
        } else {
            ErrorResponse::from(self)
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Validation failure with the violated field names
    pub fn validation(message: impl Into<String>, fields: &[&str]) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
            .with_details(serde_json::json!({ "fields": fields }))
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Business-rule contention (duplicate, lost race, live bookings)
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// First-of-month immutability
    pub fn locked(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Locked, message)
    }

    /// No open slot for the requested date/time
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unavailable, message)
    }

    /// Illegal booking status change
    pub fn invalid_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("Cannot transition booking from {from} to {to}"),
        )
    }

    /// Service references that do not resolve to active services of the manager
    #[must_use]
    pub fn invalid_services(requested: usize, found: usize) -> Self {
        Self::new(
            ErrorCode::InvalidServices,
            format!("{requested} services requested but only {found} active services matched"),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

/// Conversion from `anyhow::Error` (database/infra layer) to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // A typed error wrapped somewhere in the chain keeps its code
        match error.downcast::<Self>() {
            Ok(app_error) => app_error,
            Err(error) => match error.source() {
                Some(source) => Self::new(ErrorCode::DatabaseError, error.to_string())
                    .with_details(serde_json::json!({
                        "source": source.to_string()
                    })),
                None => Self::new(ErrorCode::DatabaseError, error.to_string()),
            },
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            other => Self::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::ValidationFailed.http_status(), 400);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::Locked.http_status(), 409);
        assert_eq!(ErrorCode::InvalidTransition.http_status(), 409);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_app_error_creation() {
        let error = AppError::validation("date is required", &["date"]);

        assert_eq!(error.code, ErrorCode::ValidationFailed);
        assert!(error.details.is_some());
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::locked("The 1st of the month cannot be edited");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("LOCKED"));
        assert!(json.contains("1st of the month"));
    }

    #[test]
    fn test_invalid_services_message_carries_counts() {
        let error = AppError::invalid_services(3, 1);
        assert!(error.message.contains('3'));
        assert!(error.message.contains('1'));
    }
}
