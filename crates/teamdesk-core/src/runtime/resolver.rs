// crates/teamdesk-core/src/runtime/resolver.rs
// ============================================================================
// Module: Teamdesk Scoped Resource Resolver
// Description: Role-scoped, cached project and task listings.
// Purpose: Show owners every resource and everyone else only granted projects.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Listings are memoized per principal under `projects:<org>:<user>` and
//! `tasks:<org>:<user>`. On a miss the membership role picks the scope: the
//! privileged role is unscoped within the organization, every other role is
//! limited to projects with an explicit grant (and tasks under them). Any
//! mutation that could change a listing invalidates the whole organization
//! scope for that kind, dropping every principal's view at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::CoreError;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::ProjectRef;
use crate::core::TaskSummary;
use crate::core::UserId;
use crate::core::UserSummary;
use crate::interfaces::ProjectScope;
use crate::runtime::access::OrgContext;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Resolver
// ============================================================================

impl Workspace {
    /// Computes the visibility scope for the context's membership.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the grant lookup fails.
    pub fn project_scope(&self, ctx: &OrgContext) -> Result<ProjectScope, CoreError> {
        if ctx.is_privileged() {
            return Ok(ProjectScope::All);
        }
        let granted = self.store.accessible_project_ids(ctx.user_id(), &ctx.organization_id)?;
        Ok(ProjectScope::Only(granted))
    }

    /// Lists the projects visible to the context's principal.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn list_projects(&self, ctx: &OrgContext) -> Result<Vec<Project>, CoreError> {
        let key =
            CacheKey::for_principal(CacheKind::Projects, ctx.organization_id.as_str(), ctx.user_id());
        if let Some(cached) = self.cache.get::<Vec<Project>>(&key).await {
            return Ok(cached);
        }
        let scope = self.project_scope(ctx)?;
        let projects = self.store.list_projects(&ctx.organization_id, &scope)?;
        self.cache.set(&key, &projects).await;
        Ok(projects)
    }

    /// Lists the tasks visible to the context's principal.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn list_tasks(&self, ctx: &OrgContext) -> Result<Vec<TaskSummary>, CoreError> {
        let key =
            CacheKey::for_principal(CacheKind::Tasks, ctx.organization_id.as_str(), ctx.user_id());
        if let Some(cached) = self.cache.get::<Vec<TaskSummary>>(&key).await {
            return Ok(cached);
        }
        let summaries = self.resolve_tasks(ctx)?;
        self.cache.set(&key, &summaries).await;
        Ok(summaries)
    }

    /// Queries and joins the scoped task listing.
    fn resolve_tasks(&self, ctx: &OrgContext) -> Result<Vec<TaskSummary>, CoreError> {
        let scope = self.project_scope(ctx)?;
        let tasks = self.store.list_tasks(&ctx.organization_id, &scope)?;
        let projects: BTreeMap<ProjectId, ProjectRef> = self
            .store
            .list_projects(&ctx.organization_id, &scope)?
            .into_iter()
            .map(|project| {
                (project.id.clone(), ProjectRef {
                    id: project.id,
                    name: project.name,
                })
            })
            .collect();
        let mut creators: BTreeMap<UserId, UserSummary> = BTreeMap::new();
        let mut summaries = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(project) = projects.get(&task.project_id).cloned() else {
                continue;
            };
            let creator = match creators.get(&task.creator_id) {
                Some(creator) => creator.clone(),
                None => {
                    let creator = self.store.get_user(&task.creator_id)?.as_ref().map_or_else(
                        || UserSummary {
                            id: task.creator_id.clone(),
                            name: None,
                            email: String::new(),
                        },
                        UserSummary::from,
                    );
                    creators.insert(task.creator_id.clone(), creator.clone());
                    creator
                }
            };
            let assignee_ids = self.store.list_assignees(&task.id)?;
            summaries.push(TaskSummary {
                task,
                project,
                creator,
                assignee_ids,
            });
        }
        Ok(summaries)
    }
}
