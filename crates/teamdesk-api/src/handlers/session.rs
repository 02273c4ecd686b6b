// crates/teamdesk-api/src/handlers/session.rs
// ============================================================================
// Module: Session Handlers
// Description: Sign-in, logout, and health endpoints.
// Purpose: Provision principals from identity tokens.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

//! ## Overview
//! Sign-in accepts the identity token from the body (`idToken`), the bearer
//! header, or `x-id-token`, in that order. Sessions are stateless: every
//! later request carries the identity token itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde::Serialize;
use teamdesk_core::SessionSummary;

use super::Message;
use super::parse_body;
use super::present;
use crate::auth::AppState;
use crate::auth::bearer_token;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Fallback header carrying the identity token.
const ID_TOKEN_HEADER: &str = "x-id-token";

/// Sign-in body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest {
    /// Identity token.
    id_token: Option<String>,
}

/// Health probe body.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /api/auth/session`
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SessionSummary>, ApiError> {
    let request: SessionRequest = parse_body(&body)?;
    let token = present(request.id_token)
        .or_else(|| bearer_token(&headers).ok())
        .or_else(|| {
            headers
                .get(ID_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .and_then(|value| present(Some(value)))
        })
        .ok_or_else(|| ApiError::validation("idToken is required"))?;
    let identity = state.verify_token(&token).await?;
    let summary =
        state.run(move |workspace| async move { workspace.sign_in(&identity).await }).await?;
    tracing::info!(user_id = %summary.user.id, "session established");
    Ok(Json(summary))
}

/// `POST /api/auth/logout`
pub async fn logout() -> Json<Message> {
    Json(Message::new("Logged out"))
}

/// `GET /health`
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
    })
}
