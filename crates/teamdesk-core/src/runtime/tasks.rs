// crates/teamdesk-core/src/runtime/tasks.rs
// ============================================================================
// Module: Teamdesk Tasks
// Description: Task creation, status moves, assignees, and attachments.
// Purpose: Mutate tasks under the project grants of the acting member.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Any active role may work on tasks, but non-owners only under projects they
//! hold a grant for. Every mutation invalidates `tasks:<org>` and records an
//! activity entry on a best-effort basis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::ActivityType;
use crate::core::AttachmentId;
use crate::core::CoreError;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::ProjectRef;
use crate::core::Role;
use crate::core::Task;
use crate::core::TaskAttachment;
use crate::core::TaskDetail;
use crate::core::TaskId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::NewActivity;
use crate::runtime::access::OrgContext;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Default status of new tasks.
pub const DEFAULT_TASK_STATUS: &str = "todo";
/// Default priority of new tasks.
pub const DEFAULT_TASK_PRIORITY: &str = "medium";

/// Task creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: Option<ProjectId>,
    /// Title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Status label; defaults to `todo`.
    pub status: Option<String>,
    /// Priority label; defaults to `medium`.
    pub priority: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` date.
    pub due_date: Option<String>,
}

/// Attachment upload request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAttachment {
    /// Display file name.
    pub name: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Inline `data:` URL.
    pub data_url: Option<String>,
}

/// Roles allowed to work on tasks.
const TASK_WORKERS: [Role; 3] = [Role::Owner, Role::Admin, Role::Member];

/// Trims a string and drops it when empty.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl Workspace {
    /// Loads a project of the organization the principal may work under.
    fn workable_project(&self, ctx: &OrgContext, project_id: &ProjectId) -> Result<Project, CoreError> {
        let project = self
            .store
            .get_project(project_id)?
            .filter(|project| project.organization_id == ctx.organization_id)
            .ok_or_else(|| CoreError::not_found("Project not found in organization"))?;
        if !ctx.is_privileged() && !self.store.has_access(&project.id, ctx.user_id())? {
            return Err(CoreError::forbidden("No access to this project"));
        }
        Ok(project)
    }

    /// Loads a task of the organization the principal may work on.
    fn workable_task(
        &self,
        ctx: &OrgContext,
        task_id: &TaskId,
        denied: &str,
    ) -> Result<(Task, Project), CoreError> {
        let task =
            self.store.get_task(task_id)?.ok_or_else(|| CoreError::not_found("Task not found"))?;
        let project = self
            .store
            .get_project(&task.project_id)?
            .filter(|project| project.organization_id == ctx.organization_id)
            .ok_or_else(|| CoreError::forbidden("Task not in this organization"))?;
        if !ctx.is_privileged() && !self.store.has_access(&project.id, ctx.user_id())? {
            return Err(CoreError::forbidden(denied));
        }
        Ok((task, project))
    }

    /// Builds the detail view of a task.
    fn task_detail(&self, task: Task, project: Project) -> Result<TaskDetail, CoreError> {
        let assignee_ids = self.store.list_assignees(&task.id)?;
        let attachments = self.store.list_attachments(&task.id)?;
        Ok(TaskDetail {
            task,
            project: ProjectRef {
                id: project.id,
                name: project.name,
            },
            assignee_ids,
            attachments,
        })
    }

    /// Creates a task under a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a missing project or title or an
    /// unparsable due date, [`CoreError::NotFound`] when the project lies
    /// outside the organization, and [`CoreError::Forbidden`] without a grant.
    pub async fn create_task(&self, ctx: &OrgContext, request: NewTask) -> Result<Task, CoreError> {
        ctx.require_role(&TASK_WORKERS)?;
        let project_id =
            request.project_id.ok_or_else(|| CoreError::validation("projectId is required"))?;
        let title = non_blank(request.title).ok_or_else(|| CoreError::validation("Title is required"))?;
        let due_date = match non_blank(request.due_date) {
            None => None,
            Some(raw) => Some(
                Timestamp::parse_date_or_datetime(&raw)
                    .ok_or_else(|| CoreError::validation("Invalid due date"))?,
            ),
        };
        let project = self.workable_project(ctx, &project_id)?;
        let now = self.now();
        let task = Task {
            id: TaskId::generate(),
            project_id: project.id,
            creator_id: ctx.user_id().clone(),
            title,
            description: request.description,
            status: non_blank(request.status).unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
            priority: non_blank(request.priority)
                .unwrap_or_else(|| DEFAULT_TASK_PRIORITY.to_string()),
            due_date,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_task(&task)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Tasks]).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::TaskCreated,
            message: "created a task".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(task.project_id.clone()),
            task_id: Some(task.id.clone()),
        });
        Ok(task)
    }

    /// Loads a task with its assignees and attachments.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for an unknown task and
    /// [`CoreError::Forbidden`] when it is outside the principal's reach.
    pub fn get_task_detail(&self, ctx: &OrgContext, task_id: &TaskId) -> Result<TaskDetail, CoreError> {
        let (task, project) = self.workable_task(ctx, task_id, "No access to this task")?;
        self.task_detail(task, project)
    }

    /// Moves a task to a new status.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a blank status,
    /// [`CoreError::NotFound`] for an unknown task, and
    /// [`CoreError::Forbidden`] when the task is outside the principal's reach.
    pub async fn update_task_status(
        &self,
        ctx: &OrgContext,
        task_id: &TaskId,
        status: Option<&str>,
    ) -> Result<Task, CoreError> {
        ctx.require_role(&TASK_WORKERS)?;
        let status = status
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .ok_or_else(|| CoreError::validation("Status is required"))?;
        let (mut task, _) = self.workable_task(ctx, task_id, "No access to move this task")?;
        let previous = std::mem::replace(&mut task.status, status.to_string());
        task.updated_at = self.now();
        self.store.update_task(&task)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Tasks]).await;
        if previous != task.status {
            self.record_best_effort(NewActivity {
                organization_id: ctx.organization_id.clone(),
                activity_type: ActivityType::TaskStatusChanged,
                message: format!("moved task from {previous} to {}", task.status),
                actor_id: ctx.user_id().clone(),
                project_id: Some(task.project_id.clone()),
                task_id: Some(task.id.clone()),
            });
        }
        Ok(task)
    }

    /// Replaces the assignees of a task.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when an assignee is not a member of
    /// the organization, plus the task lookup errors.
    pub async fn update_task_assignees(
        &self,
        ctx: &OrgContext,
        task_id: &TaskId,
        assignee_ids: &[UserId],
    ) -> Result<TaskDetail, CoreError> {
        ctx.require_role(&TASK_WORKERS)?;
        let (task, project) = self.workable_task(ctx, task_id, "No access to this task")?;
        let mut seen = BTreeSet::new();
        let mut assignees = Vec::with_capacity(assignee_ids.len());
        for user_id in assignee_ids {
            if !seen.insert(user_id.clone()) {
                continue;
            }
            if self.store.find_membership(user_id, &ctx.organization_id)?.is_none() {
                return Err(CoreError::validation("Assignee is not in this organization"));
            }
            assignees.push(user_id.clone());
        }
        self.store.replace_assignees(&task.id, &assignees)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Tasks]).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::TaskAssigneesUpdated,
            message: "updated task assignees".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(project.id.clone()),
            task_id: Some(task.id.clone()),
        });
        self.task_detail(task, project)
    }

    /// Stores an inline attachment on a task.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a missing name, a non-data URL,
    /// or an oversized payload, plus the task lookup errors.
    pub async fn add_task_attachment(
        &self,
        ctx: &OrgContext,
        task_id: &TaskId,
        request: NewAttachment,
    ) -> Result<TaskAttachment, CoreError> {
        ctx.require_role(&TASK_WORKERS)?;
        let name = non_blank(request.name).ok_or_else(|| CoreError::validation("File name is required"))?;
        let data_url = request
            .data_url
            .filter(|url| url.starts_with("data:"))
            .ok_or_else(|| CoreError::validation("File data is required"))?;
        if data_url.len() > self.settings.max_attachment_bytes {
            return Err(CoreError::validation("File is too large"));
        }
        let (task, _) = self.workable_task(ctx, task_id, "No access to this task")?;
        let attachment = TaskAttachment {
            id: AttachmentId::generate(),
            task_id: task.id.clone(),
            name,
            content_type: non_blank(request.content_type),
            data_url,
            uploaded_by: ctx.user_id().clone(),
            created_at: self.now(),
        };
        self.store.insert_attachment(&attachment)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Tasks]).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::FileUploaded,
            message: "uploaded a file".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(task.project_id.clone()),
            task_id: Some(task.id),
        });
        Ok(attachment)
    }

    /// Removes an attachment from a task.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when the attachment does not belong to
    /// the task, plus the task lookup errors.
    pub async fn remove_task_attachment(
        &self,
        ctx: &OrgContext,
        task_id: &TaskId,
        attachment_id: &AttachmentId,
    ) -> Result<(), CoreError> {
        ctx.require_role(&TASK_WORKERS)?;
        let (task, _) = self.workable_task(ctx, task_id, "No access to this task")?;
        let attachment = self
            .store
            .get_attachment(attachment_id)?
            .filter(|attachment| attachment.task_id == task.id)
            .ok_or_else(|| CoreError::not_found("Attachment not found"))?;
        self.store.delete_attachment(&attachment.id)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Tasks]).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::FileRemoved,
            message: "removed a file".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(task.project_id.clone()),
            task_id: Some(task.id),
        });
        Ok(())
    }
}
