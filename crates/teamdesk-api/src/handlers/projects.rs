// crates/teamdesk-api/src/handlers/projects.rs
// ============================================================================
// Module: Project Handlers
// Description: Scoped project listing, management, and access grants.
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
use serde::Deserialize;
use teamdesk_core::NewProject;
use teamdesk_core::Project;
use teamdesk_core::ProjectAccess;
use teamdesk_core::ProjectId;
use teamdesk_core::ProjectUpdate;
use teamdesk_core::UserId;

use super::Message;
use super::org_context;
use super::parse_body;
use super::present;
use crate::auth::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Project create/update body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRequest {
    /// Project name.
    name: Option<String>,
    /// Description.
    description: Option<String>,
    /// Private flag.
    is_private: Option<bool>,
    /// Cover image data URL.
    cover_image: Option<String>,
}

/// Access grant body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest {
    /// Member receiving access.
    user_id: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/projects/org/{org_id}`
pub async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let projects =
        state.run(move |workspace| async move { workspace.list_projects(&ctx).await }).await?;
    Ok(Json(projects))
}

/// `POST /api/projects/org/{org_id}`
pub async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: ProjectRequest = parse_body(&body)?;
    let draft = NewProject {
        name: request.name,
        description: request.description,
        is_private: request.is_private.unwrap_or(false),
        cover_image: request.cover_image,
    };
    let project = state
        .run(move |workspace| async move { workspace.create_project(&ctx, draft).await })
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `PUT /api/projects/org/{org_id}/projects/{project_id}`
pub async fn update(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, project_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Project>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: ProjectRequest = parse_body(&body)?;
    let project_id = ProjectId::new(project_id);
    let update = ProjectUpdate {
        name: request.name,
        description: request.description,
        is_private: request.is_private,
        cover_image: request.cover_image,
    };
    let project = state
        .run(move |workspace| async move {
            workspace.update_project(&ctx, &project_id, update).await
        })
        .await?;
    Ok(Json(project))
}

/// `DELETE /api/projects/org/{org_id}/projects/{project_id}`
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, project_id)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let project_id = ProjectId::new(project_id);
    state
        .run(move |workspace| async move { workspace.delete_project(&ctx, &project_id).await })
        .await?;
    Ok(Json(Message::new("Project deleted")))
}

/// `POST /api/projects/org/{org_id}/projects/{project_id}/access`
pub async fn grant_access(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, project_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ProjectAccess>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: GrantRequest = parse_body(&body)?;
    let user_id =
        present(request.user_id).ok_or_else(|| ApiError::validation("userId is required"))?;
    let project_id = ProjectId::new(project_id);
    let user_id = UserId::new(user_id);
    let access = state
        .run(move |workspace| async move {
            workspace.grant_project_access(&ctx, &project_id, &user_id).await
        })
        .await?;
    Ok(Json(access))
}

/// `DELETE /api/projects/org/{org_id}/projects/{project_id}/access/{user_id}`
pub async fn revoke_access(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, project_id, user_id)): Path<(String, String, String)>,
) -> Result<Json<Message>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let project_id = ProjectId::new(project_id);
    let user_id = UserId::new(user_id);
    state
        .run(move |workspace| async move {
            workspace.revoke_project_access(&ctx, &project_id, &user_id).await
        })
        .await?;
    Ok(Json(Message::new("Access revoked")))
}
