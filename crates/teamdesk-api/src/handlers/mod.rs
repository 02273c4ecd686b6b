// crates/teamdesk-api/src/handlers/mod.rs
// ============================================================================
// Module: HTTP Handlers
// Description: Thin request adapters over the workspace services.
// Purpose: Decode requests, run the guard, call one operation, encode the result.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

//! ## Overview
//! Handlers never make authorization decisions of their own: they pick the
//! organization identifier, hand it to the Access Control Guard, and pass the
//! resulting context to a workspace operation. Bodies are decoded from raw
//! bytes so malformed JSON produces the same `{"message"}` shape as every
//! other rejection.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod activity;
pub mod organizations;
pub mod profiles;
pub mod projects;
pub mod session;
pub mod tasks;
pub mod team;

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::body::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use teamdesk_core::OrgContext;
use teamdesk_core::Principal;
use teamdesk_core::Role;
use teamdesk_core::select_organization_id;

use crate::auth::AppState;
use crate::error::ApiError;

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    /// Human-readable acknowledgement.
    pub message: &'static str,
}

impl Message {
    /// Wraps an acknowledgement.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
        }
    }
}

/// Decodes a JSON body; an empty body decodes as the default request.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(bytes: &Bytes) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::validation("Invalid JSON body"))
}

/// Runs the Access Control Guard for the first organization id present.
pub(crate) async fn org_context(
    state: &AppState,
    principal: &Principal,
    path: Option<&str>,
    body: Option<&str>,
    query: Option<&str>,
) -> Result<OrgContext, ApiError> {
    let organization_id = select_organization_id(path, body, query)?;
    let principal = principal.clone();
    state.blocking(move |workspace| workspace.authorize(&principal, organization_id)).await
}

/// Parses an optional role label.
pub(crate) fn parse_role(role: Option<&str>) -> Result<Option<Role>, ApiError> {
    match role.map(str::trim).filter(|role| !role.is_empty()) {
        None => Ok(None),
        Some(label) => {
            Role::parse(label).map(Some).ok_or_else(|| ApiError::validation("Invalid role"))
        }
    }
}

/// Trims an optional string and drops it when empty.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
