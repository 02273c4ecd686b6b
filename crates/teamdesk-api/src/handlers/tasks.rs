// crates/teamdesk-api/src/handlers/tasks.rs
// ============================================================================
// Module: Task Handlers
// Description: Scoped task listing, creation, status, assignees, and files.
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
use teamdesk_core::AttachmentId;
use teamdesk_core::NewAttachment;
use teamdesk_core::NewTask;
use teamdesk_core::ProjectId;
use teamdesk_core::Task;
use teamdesk_core::TaskAttachment;
use teamdesk_core::TaskDetail;
use teamdesk_core::TaskId;
use teamdesk_core::TaskSummary;
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

/// Task creation body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    /// Owning project.
    project_id: Option<String>,
    /// Title.
    title: Option<String>,
    /// Description.
    description: Option<String>,
    /// Status label.
    status: Option<String>,
    /// Priority label.
    priority: Option<String>,
    /// Due date.
    due_date: Option<String>,
}

/// Status change body.
#[derive(Debug, Default, Deserialize)]
struct StatusRequest {
    /// New status label.
    status: Option<String>,
}

/// Assignee replacement body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssigneesRequest {
    /// Complete assignee list.
    assignee_ids: Option<Vec<String>>,
}

/// Attachment upload body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRequest {
    /// File name.
    name: Option<String>,
    /// Declared content type.
    #[serde(alias = "type")]
    content_type: Option<String>,
    /// Inline `data:` URL.
    data_url: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/tasks/org/{org_id}`
pub async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<TaskSummary>>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let tasks = state.run(move |workspace| async move { workspace.list_tasks(&ctx).await }).await?;
    Ok(Json(tasks))
}

/// `POST /api/tasks/org/{org_id}`
pub async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(org_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: CreateTaskRequest = parse_body(&body)?;
    let draft = NewTask {
        project_id: present(request.project_id).map(ProjectId::new),
        title: request.title,
        description: request.description,
        status: request.status,
        priority: request.priority,
        due_date: request.due_date,
    };
    let task =
        state.run(move |workspace| async move { workspace.create_task(&ctx, draft).await }).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /api/tasks/org/{org_id}/{task_id}`
pub async fn detail(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, task_id)): Path<(String, String)>,
) -> Result<Json<TaskDetail>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let task_id = TaskId::new(task_id);
    let detail = state.blocking(move |workspace| workspace.get_task_detail(&ctx, &task_id)).await?;
    Ok(Json(detail))
}

/// `PATCH /api/tasks/org/{org_id}/{task_id}`
pub async fn update_status(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, task_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: StatusRequest = parse_body(&body)?;
    let task_id = TaskId::new(task_id);
    let task = state
        .run(move |workspace| async move {
            workspace.update_task_status(&ctx, &task_id, request.status.as_deref()).await
        })
        .await?;
    Ok(Json(task))
}

/// `PATCH /api/tasks/org/{org_id}/{task_id}/assignees`
pub async fn update_assignees(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, task_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<TaskDetail>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: AssigneesRequest = parse_body(&body)?;
    let assignees: Vec<UserId> = request
        .assignee_ids
        .ok_or_else(|| ApiError::validation("assigneeIds is required"))?
        .into_iter()
        .map(UserId::new)
        .collect();
    let task_id = TaskId::new(task_id);
    let detail = state
        .run(move |workspace| async move {
            workspace.update_task_assignees(&ctx, &task_id, &assignees).await
        })
        .await?;
    Ok(Json(detail))
}

/// `POST /api/tasks/org/{org_id}/{task_id}/attachments`
pub async fn add_attachment(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, task_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskAttachment>), ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let request: AttachmentRequest = parse_body(&body)?;
    let task_id = TaskId::new(task_id);
    let upload = NewAttachment {
        name: request.name,
        content_type: request.content_type,
        data_url: request.data_url,
    };
    let attachment = state
        .run(move |workspace| async move {
            workspace.add_task_attachment(&ctx, &task_id, upload).await
        })
        .await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// `DELETE /api/tasks/org/{org_id}/{task_id}/attachments/{attachment_id}`
pub async fn remove_attachment(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((org_id, task_id, attachment_id)): Path<(String, String, String)>,
) -> Result<Json<Message>, ApiError> {
    let ctx = org_context(&state, &principal, Some(&org_id), None, None).await?;
    let task_id = TaskId::new(task_id);
    let attachment_id = AttachmentId::new(attachment_id);
    state
        .run(move |workspace| async move {
            workspace.remove_task_attachment(&ctx, &task_id, &attachment_id).await
        })
        .await?;
    Ok(Json(Message::new("Attachment removed")))
}
