// crates/teamdesk-api/src/error.rs
// ============================================================================
// Module: API Errors
// Description: HTTP status mapping for domain and authentication failures.
// Purpose: Give every rejected request a `{"message"}` body and a stable status.
// Dependencies: teamdesk-core, axum, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`ApiError`] is the rejection type of every handler and extractor.
//! Dependency failures are logged in full and answered with a generic
//! message; every other class echoes its human-readable reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use teamdesk_core::CoreError;
use teamdesk_core::IdentityError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Message returned in place of dependency failure details.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Request failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected bearer credential.
    #[error("{0}")]
    Unauthenticated(String),
    /// Domain operation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// Builds a validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Core(CoreError::validation(message))
    }

    /// Returns the HTTP status for the failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Core(CoreError::Gone(_)) => StatusCode::GONE,
            Self::Core(CoreError::Dependency(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCredential(_) => Self::Unauthenticated("Unauthorized".to_string()),
            IdentityError::Unavailable(detail) => Self::Core(CoreError::Dependency(detail)),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Core(CoreError::Dependency(detail)) => {
                tracing::error!(error = %detail, "request failed on a dependency");
                INTERNAL_MESSAGE.to_string()
            }
            Self::Unauthenticated(message)
            | Self::Core(
                CoreError::Validation(message)
                | CoreError::Forbidden(message)
                | CoreError::NotFound(message)
                | CoreError::Gone(message),
            ) => message,
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
