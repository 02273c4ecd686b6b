// crates/teamdesk-core/src/runtime/profiles.rs
// ============================================================================
// Module: Teamdesk Profiles
// Description: Own-profile reads and updates and cross-user profile views.
// Purpose: Present a user with their organizations, projects, and progress.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! A profile record is created lazily on first read. Another user's profile
//! is visible only to principals sharing at least one organization with them,
//! and only the shared organizations (and their projects) are disclosed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::CompletedProject;
use crate::core::CoreError;
use crate::core::MyProfile;
use crate::core::OrganizationId;
use crate::core::OrganizationRef;
use crate::core::Principal;
use crate::core::Profile;
use crate::core::ProfileOrganization;
use crate::core::ProfileProject;
use crate::core::ProfileStats;
use crate::core::ProfileUser;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::UserId;
use crate::core::UserProfile;
use crate::core::is_complete_status;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Short biography.
    pub bio: Option<String>,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Job title.
    pub title: Option<String>,
    /// Display name stored on the principal.
    pub name: Option<String>,
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl Workspace {
    /// Loads a profile, creating an empty one when missing.
    fn ensure_profile(&self, user_id: &UserId) -> Result<Profile, CoreError> {
        if let Some(profile) = self.store.get_profile(user_id)? {
            return Ok(profile);
        }
        let now = self.now();
        let profile = Profile {
            user_id: user_id.clone(),
            bio: String::new(),
            avatar_url: String::new(),
            title: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.upsert_profile(&profile)?;
        Ok(profile)
    }

    /// Returns true when the project has tasks and every one is complete.
    fn project_completed(&self, project_id: &ProjectId) -> Result<bool, CoreError> {
        let tasks = self.store.list_tasks_for_project(project_id)?;
        Ok(!tasks.is_empty() && tasks.iter().all(|task| is_complete_status(&task.status)))
    }

    /// Returns the caller's own profile.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn get_my_profile(&self, principal: &Principal) -> Result<MyProfile, CoreError> {
        let key = CacheKey::scoped(CacheKind::Profile, principal.id.as_str());
        if let Some(cached) = self.cache.get::<MyProfile>(&key).await {
            return Ok(cached);
        }
        let profile = self.ensure_profile(&principal.id)?;
        let user = self.store.get_user(&principal.id)?.unwrap_or_else(|| principal.clone());
        let organizations = self.organization_roles(&principal.id)?;
        let mut completed_projects = Vec::new();
        for project in self.store.list_projects_by_owner(&principal.id)? {
            if self.project_completed(&project.id)? {
                completed_projects.push(CompletedProject {
                    id: project.id,
                    name: project.name,
                    description: project.description,
                });
            }
        }
        let view = MyProfile {
            profile,
            user: ProfileUser::from(&user),
            organizations,
            completed_projects,
        };
        self.cache.set(&key, &view).await;
        Ok(view)
    }

    /// Updates the caller's profile and optional display name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn update_my_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<MyProfile, CoreError> {
        let mut profile = self.ensure_profile(&principal.id)?;
        if let Some(bio) = update.bio {
            profile.bio = bio;
        }
        if let Some(avatar_url) = update.avatar_url {
            profile.avatar_url = avatar_url;
        }
        if let Some(title) = update.title {
            profile.title = title;
        }
        profile.updated_at = self.now();
        self.store.upsert_profile(&profile)?;

        if let Some(name) = update.name.map(|name| name.trim().to_string())
            && let Some(mut user) = self.store.get_user(&principal.id)?
        {
            user.display_name = Some(name).filter(|name| !name.is_empty());
            self.store.update_user(&user)?;
        }

        self.invalidate_principal_views(&principal.id).await?;
        self.get_my_profile(principal).await
    }

    /// Drops cached views that show a principal's name.
    pub(crate) async fn invalidate_principal_views(
        &self,
        user_id: &UserId,
    ) -> Result<(), CoreError> {
        self.invalidate(user_id.as_str(), &[CacheKind::Profile, CacheKind::Orgs]).await;
        for organization_id in self.organization_ids_of(user_id)? {
            self.invalidate(organization_id.as_str(), &[CacheKind::Team]).await;
        }
        Ok(())
    }

    /// Returns another user's profile as seen by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for an unknown user and
    /// [`CoreError::Forbidden`] when the two share no organization.
    pub fn get_user_profile(
        &self,
        principal: &Principal,
        target_id: &UserId,
    ) -> Result<UserProfile, CoreError> {
        let target =
            self.store.get_user(target_id)?.ok_or_else(|| CoreError::not_found("User not found"))?;
        let viewer_orgs: BTreeSet<OrganizationId> =
            self.organization_ids_of(&principal.id)?.into_iter().collect();
        let is_self = principal.id == target.id;
        let shared: Vec<_> = self
            .store
            .list_memberships_for_user(&target.id)?
            .into_iter()
            .filter(|membership| is_self || viewer_orgs.contains(&membership.organization_id))
            .collect();
        if shared.is_empty() && !is_self {
            return Err(CoreError::forbidden("Forbidden"));
        }

        let mut organizations = Vec::new();
        let mut org_refs: BTreeMap<OrganizationId, OrganizationRef> = BTreeMap::new();
        let mut roles = Vec::new();
        for membership in &shared {
            let Some(organization) = self.store.get_organization(&membership.organization_id)?
            else {
                continue;
            };
            org_refs.insert(organization.id.clone(), OrganizationRef {
                id: organization.id.clone(),
                name: organization.name.clone(),
            });
            if !roles.contains(&membership.role) {
                roles.push(membership.role);
            }
            organizations.push(ProfileOrganization {
                id: organization.id,
                name: organization.name,
                role: membership.role,
                joined_at: membership.created_at,
            });
        }

        let mut visible: BTreeMap<ProjectId, Project> = BTreeMap::new();
        for project in self.store.list_projects_by_owner(&target.id)? {
            if org_refs.contains_key(&project.organization_id) {
                visible.insert(project.id.clone(), project);
            }
        }
        for organization_id in org_refs.keys() {
            for access in self.store.list_access_for_organization(organization_id)? {
                if access.user_id == target.id
                    && !visible.contains_key(&access.project_id)
                    && let Some(project) = self.store.get_project(&access.project_id)?
                {
                    visible.insert(project.id.clone(), project);
                }
            }
        }

        let mut projects = Vec::with_capacity(visible.len());
        let mut stats = ProfileStats {
            projects_completed: 0,
            active_projects: 0,
            tasks_completed: 0,
            tasks_in_progress: 0,
            roles,
        };
        for project in visible.into_values() {
            let completed = self.project_completed(&project.id)?;
            if completed {
                stats.projects_completed += 1;
            } else {
                stats.active_projects += 1;
            }
            projects.push(ProfileProject {
                role: if project.owner_id == target.id { "Owner" } else { "Member" }.to_string(),
                status: if completed { "Completed" } else { "Active" }.to_string(),
                organization: org_refs.get(&project.organization_id).cloned(),
                id: project.id,
                name: project.name,
                description: project.description,
            });
        }
        let shared_ids: Vec<OrganizationId> = org_refs.into_keys().collect();
        for task in self.store.list_tasks_involving(&target.id, &shared_ids)? {
            if is_complete_status(&task.status) {
                stats.tasks_completed += 1;
            } else {
                stats.tasks_in_progress += 1;
            }
        }

        let profile = match self.store.get_profile(&target.id)? {
            Some(profile) => profile,
            None => Profile {
                user_id: target.id.clone(),
                bio: String::new(),
                avatar_url: String::new(),
                title: String::new(),
                created_at: target.created_at,
                updated_at: target.created_at,
            },
        };
        Ok(UserProfile {
            user: ProfileUser::from(&target),
            profile,
            organizations,
            projects,
            stats,
        })
    }
}
