// crates/teamdesk-api/src/handlers/organizations.rs
// ============================================================================
// Module: Organization Handlers
// Description: Create, list, and direct member addition endpoints.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use teamdesk_core::MemberAddition;
use teamdesk_core::Organization;
use teamdesk_core::OrganizationSummary;

use super::org_context;
use super::parse_body;
use super::parse_role;
use super::present;
use crate::auth::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Organization creation body.
#[derive(Debug, Default, Deserialize)]
struct CreateOrganizationRequest {
    /// Organization name.
    name: Option<String>,
}

/// Direct member addition body.
#[derive(Debug, Default, Deserialize)]
struct AddMemberRequest {
    /// Email of an existing user.
    email: Option<String>,
    /// Role label; defaults to `MEMBER`.
    role: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /api/orgs`
pub async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Bytes,
) -> Result<Json<Organization>, ApiError> {
    let request: CreateOrganizationRequest = parse_body(&body)?;
    let organization = state
        .run(move |workspace| async move {
            workspace.create_organization(&principal, request.name.as_deref()).await
        })
        .await?;
    Ok(Json(organization))
}

/// `GET /api/orgs`
pub async fn list_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<Vec<OrganizationSummary>>, ApiError> {
    let organizations = state
        .run(move |workspace| async move { workspace.list_my_organizations(&principal).await })
        .await?;
    Ok(Json(organizations))
}

/// `POST /api/orgs/{org_id}/invite`
pub async fn add_member(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: AddMemberRequest = parse_body(&body)?;
    let email = present(request.email).ok_or_else(|| ApiError::validation("Email is required"))?;
    let role = parse_role(request.role.as_deref())?;
    let addition = state
        .run(move |workspace| async move { workspace.add_existing_user(&ctx, &email, role).await })
        .await?;
    let response = match addition {
        MemberAddition::Existing(membership) => Json(membership).into_response(),
        MemberAddition::Created(membership) => {
            (StatusCode::CREATED, Json(membership)).into_response()
        }
    };
    Ok(response)
}
