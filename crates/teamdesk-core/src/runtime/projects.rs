// crates/teamdesk-core/src/runtime/projects.rs
// ============================================================================
// Module: Teamdesk Projects
// Description: Project mutations and per-project access grants.
// Purpose: Manage projects and the grants that scope non-owner visibility.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Project mutations require OWNER or ADMIN. Every mutation invalidates the
//! organization's project and task listings before returning; grant changes
//! also invalidate the team listing, which shows per-member project counts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ActivityType;
use crate::core::CoreError;
use crate::core::Project;
use crate::core::ProjectAccess;
use crate::core::ProjectId;
use crate::core::Role;
use crate::core::UserId;
use crate::interfaces::NewActivity;
use crate::runtime::access::OrgContext;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Project creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    /// Project name.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Private flag.
    pub is_private: bool,
    /// Optional cover image data URL.
    pub cover_image: Option<String>,
}

/// Partial project update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New private flag.
    pub is_private: Option<bool>,
    /// New cover image.
    pub cover_image: Option<String>,
}

/// Roles allowed to manage projects.
const PROJECT_MANAGERS: [Role; 2] = [Role::Owner, Role::Admin];

/// Kinds invalidated by project mutations.
const PROJECT_LISTINGS: [CacheKind; 2] = [CacheKind::Projects, CacheKind::Tasks];

/// Kinds invalidated by grant changes.
const GRANT_LISTINGS: [CacheKind; 3] = [CacheKind::Projects, CacheKind::Tasks, CacheKind::Team];

// ============================================================================
// SECTION: Operations
// ============================================================================

impl Workspace {
    /// Loads a project that must belong to the context's organization.
    fn project_in_org(&self, ctx: &OrgContext, project_id: &ProjectId) -> Result<Project, CoreError> {
        self.store
            .get_project(project_id)?
            .filter(|project| project.organization_id == ctx.organization_id)
            .ok_or_else(|| CoreError::not_found("Project not found"))
    }

    /// Creates a project and grants its creator access.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] unless the caller is OWNER or ADMIN
    /// and [`CoreError::Validation`] when the name is blank.
    pub async fn create_project(
        &self,
        ctx: &OrgContext,
        request: NewProject,
    ) -> Result<Project, CoreError> {
        ctx.require_role(&PROJECT_MANAGERS)?;
        let name = request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CoreError::validation("Project name is required"))?;
        let now = self.now();
        let project = Project {
            id: ProjectId::generate(),
            organization_id: ctx.organization_id.clone(),
            owner_id: ctx.user_id().clone(),
            name,
            description: request.description,
            is_private: request.is_private,
            cover_image: request.cover_image,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_project(&project)?;
        self.store.grant_access(&ProjectAccess {
            project_id: project.id.clone(),
            user_id: ctx.user_id().clone(),
            granted_at: now,
        })?;
        self.invalidate(ctx.organization_id.as_str(), &PROJECT_LISTINGS).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::ProjectCreated,
            message: "created a project".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(project.id.clone()),
            task_id: None,
        });
        Ok(project)
    }

    /// Applies a partial update to a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] unless the caller is OWNER or ADMIN
    /// and [`CoreError::NotFound`] when the project is outside the organization.
    pub async fn update_project(
        &self,
        ctx: &OrgContext,
        project_id: &ProjectId,
        update: ProjectUpdate,
    ) -> Result<Project, CoreError> {
        ctx.require_role(&PROJECT_MANAGERS)?;
        let mut project = self.project_in_org(ctx, project_id)?;
        if let Some(name) = update.name.map(|name| name.trim().to_string()) {
            if name.is_empty() {
                return Err(CoreError::validation("Project name is required"));
            }
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = Some(description);
        }
        if let Some(is_private) = update.is_private {
            project.is_private = is_private;
        }
        if let Some(cover_image) = update.cover_image {
            project.cover_image = Some(cover_image);
        }
        project.updated_at = self.now();
        self.store.update_project(&project)?;
        self.invalidate(ctx.organization_id.as_str(), &PROJECT_LISTINGS).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::ProjectUpdated,
            message: "updated a project".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(project.id.clone()),
            task_id: None,
        });
        Ok(project)
    }

    /// Deletes a project with its tasks and grants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] unless the caller is OWNER or ADMIN
    /// and [`CoreError::NotFound`] when the project is outside the organization.
    pub async fn delete_project(
        &self,
        ctx: &OrgContext,
        project_id: &ProjectId,
    ) -> Result<(), CoreError> {
        ctx.require_role(&PROJECT_MANAGERS)?;
        let project = self.project_in_org(ctx, project_id)?;
        self.store.delete_project(&project.id)?;
        self.invalidate(ctx.organization_id.as_str(), &GRANT_LISTINGS).await;
        self.record_best_effort(NewActivity {
            organization_id: ctx.organization_id.clone(),
            activity_type: ActivityType::ProjectDeleted,
            message: "deleted a project".to_string(),
            actor_id: ctx.user_id().clone(),
            project_id: Some(project.id),
            task_id: None,
        });
        Ok(())
    }

    /// Grants a member visibility of a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when the project is outside the
    /// organization and [`CoreError::Validation`] when the user is not a member.
    pub async fn grant_project_access(
        &self,
        ctx: &OrgContext,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<ProjectAccess, CoreError> {
        ctx.require_role(&PROJECT_MANAGERS)?;
        let project = self.project_in_org(ctx, project_id)?;
        if self.store.find_membership(user_id, &ctx.organization_id)?.is_none() {
            return Err(CoreError::validation("User is not in this organization"));
        }
        let access = self.store.grant_access(&ProjectAccess {
            project_id: project.id,
            user_id: user_id.clone(),
            granted_at: self.now(),
        })?;
        self.invalidate(ctx.organization_id.as_str(), &GRANT_LISTINGS).await;
        Ok(access)
    }

    /// Revokes a member's visibility of a project.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when the project is outside the organization.
    pub async fn revoke_project_access(
        &self,
        ctx: &OrgContext,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<(), CoreError> {
        ctx.require_role(&PROJECT_MANAGERS)?;
        let project = self.project_in_org(ctx, project_id)?;
        self.store.revoke_access(&project.id, user_id)?;
        self.invalidate(ctx.organization_id.as_str(), &GRANT_LISTINGS).await;
        Ok(())
    }
}
