// crates/teamdesk-api/src/handlers/team.rs
// ============================================================================
// Module: Team Handlers
// Description: Team listing, invites, and membership administration.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

//! ## Overview
//! Listing and inviting are organization-scoped and take `orgId` from the
//! body or query string. Invite and membership administration address rows
//! by identifier; the workspace resolves the organization from the row and
//! checks the caller's membership there.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use teamdesk_core::Invite;
use teamdesk_core::InviteId;
use teamdesk_core::InviteIssued;
use teamdesk_core::InviteOutcome;
use teamdesk_core::MemberProjects;
use teamdesk_core::Membership;
use teamdesk_core::MembershipId;
use teamdesk_core::ProjectId;
use teamdesk_core::TeamListing;

use super::org_context;
use super::parse_body;
use super::parse_role;
use crate::auth::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Query parameters shared by team routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamQuery {
    /// Target organization.
    org_id: Option<String>,
    /// Invite token (accept only).
    token: Option<String>,
}

/// Invite body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteRequest {
    /// Invitee email.
    email: Option<String>,
    /// Offered role; defaults to `MEMBER`.
    role: Option<String>,
    /// Target organization.
    org_id: Option<String>,
}

/// Accept body.
#[derive(Debug, Default, Deserialize)]
struct AcceptRequest {
    /// Invite token.
    token: Option<String>,
}

/// Role change body.
#[derive(Debug, Default, Deserialize)]
struct RoleRequest {
    /// New role label.
    role: Option<String>,
}

/// Project grant replacement body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsRequest {
    /// Complete grant list.
    #[serde(default)]
    project_ids: Vec<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/team/members?orgId=`
pub async fn list_members(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<TeamQuery>,
) -> Result<Json<TeamListing>, ApiError> {
    let ctx = org_context(&state, &principal, None, None, query.org_id.as_deref()).await?;
    let listing = state.run(move |workspace| async move { workspace.list_team(&ctx).await }).await?;
    Ok(Json(listing))
}

/// `POST /api/team/invite`
pub async fn invite(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<TeamQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: InviteRequest = parse_body(&body)?;
    let ctx = org_context(
        &state,
        &principal,
        None,
        request.org_id.as_deref(),
        query.org_id.as_deref(),
    )
    .await?;
    let role = parse_role(request.role.as_deref())?;
    let outcome = state
        .run(move |workspace| async move {
            workspace.invite_member(&ctx, request.email.as_deref(), role).await
        })
        .await?;
    let response = match outcome {
        InviteOutcome::AlreadyMember(membership) => Json(membership).into_response(),
        InviteOutcome::Issued(issued) => (StatusCode::CREATED, Json(issued)).into_response(),
    };
    Ok(response)
}

/// `POST /api/team/accept-invite`
pub async fn accept(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<TeamQuery>,
    body: Bytes,
) -> Result<Json<Membership>, ApiError> {
    let request: AcceptRequest = parse_body(&body)?;
    let token = request.token.or(query.token);
    let membership = state
        .run(move |workspace| async move {
            workspace.accept_invite(&principal, token.as_deref()).await
        })
        .await?;
    Ok(Json(membership))
}

/// `POST /api/team/invites/{id}/resend`
pub async fn resend(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(invite_id): Path<String>,
) -> Result<Json<InviteIssued>, ApiError> {
    let invite_id = InviteId::new(invite_id);
    let issued = state
        .run(move |workspace| async move { workspace.resend_invite(&principal, &invite_id).await })
        .await?;
    Ok(Json(issued))
}

/// `PATCH /api/team/invites/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(invite_id): Path<String>,
) -> Result<Json<Invite>, ApiError> {
    let invite_id = InviteId::new(invite_id);
    let invite = state
        .run(move |workspace| async move { workspace.cancel_invite(&principal, &invite_id).await })
        .await?;
    Ok(Json(invite))
}

/// `PATCH /api/team/{id}/deactivate`
pub async fn deactivate(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(membership_id): Path<String>,
) -> Result<Json<Membership>, ApiError> {
    let membership_id = MembershipId::new(membership_id);
    let membership = state
        .run(move |workspace| async move {
            workspace.deactivate_member(&principal, &membership_id).await
        })
        .await?;
    Ok(Json(membership))
}

/// `PATCH /api/team/{id}/role`
pub async fn update_role(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(membership_id): Path<String>,
    body: Bytes,
) -> Result<Json<Membership>, ApiError> {
    let request: RoleRequest = parse_body(&body)?;
    let membership_id = MembershipId::new(membership_id);
    let membership = state
        .run(move |workspace| async move {
            workspace.update_member_role(&principal, &membership_id, request.role.as_deref()).await
        })
        .await?;
    Ok(Json(membership))
}

/// `PATCH /api/team/{id}/projects`
pub async fn update_projects(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(membership_id): Path<String>,
    body: Bytes,
) -> Result<Json<MemberProjects>, ApiError> {
    let request: ProjectsRequest = parse_body(&body)?;
    let project_ids: Vec<ProjectId> = request.project_ids.into_iter().map(ProjectId::new).collect();
    let membership_id = MembershipId::new(membership_id);
    let projects = state
        .run(move |workspace| async move {
            workspace.update_member_projects(&principal, &membership_id, &project_ids).await
        })
        .await?;
    Ok(Json(projects))
}
