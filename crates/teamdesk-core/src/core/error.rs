// crates/teamdesk-core/src/core/error.rs
// ============================================================================
// Module: Teamdesk Error Taxonomy
// Description: Caller-visible failure classes for domain operations.
// Purpose: Distinguish validation, authorization, lookup, and dependency failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every domain operation returns [`CoreError`]. Messages are human-readable
//! and always safe to show to the caller; dependency failures carry internal
//! detail that hosts log but never echo back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Domain operation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Caller omitted a required identifier or sent a malformed value.
    #[error("{0}")]
    Validation(String),
    /// Principal is authenticated but lacks rights for the action.
    #[error("{0}")]
    Forbidden(String),
    /// Referenced resource does not exist or lies outside the caller's scope.
    #[error("{0}")]
    NotFound(String),
    /// Referenced resource existed but is no longer usable (expired invite).
    #[error("{0}")]
    Gone(String),
    /// Persistence or identity infrastructure failed.
    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl CoreError {
    /// Builds a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Builds a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Dependency(err.to_string())
    }
}
