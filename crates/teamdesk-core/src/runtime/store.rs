// crates/teamdesk-core/src/runtime/store.rs
// ============================================================================
// Module: Teamdesk In-Memory Store
// Description: Mutex-guarded in-memory implementation of every store trait.
// Purpose: Provide a deterministic store for tests and local demos.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides [`InMemoryWorkspaceStore`], an in-memory
//! implementation of [`DirectoryStore`], [`ProjectStore`], and
//! [`ActivityStore`]. Uniqueness rules match the relational store: one
//! membership per `(user, organization)`, one invite per
//! `(organization, email)`, one grant per `(project, user)`. It is not
//! intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::Activity;
use crate::core::AttachmentId;
use crate::core::Invite;
use crate::core::InviteId;
use crate::core::InviteStatus;
use crate::core::Membership;
use crate::core::MembershipId;
use crate::core::Organization;
use crate::core::OrganizationId;
use crate::core::Principal;
use crate::core::Profile;
use crate::core::Project;
use crate::core::ProjectAccess;
use crate::core::ProjectId;
use crate::core::Task;
use crate::core::TaskAttachment;
use crate::core::TaskId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::ActivityQuery;
use crate::interfaces::ActivityRecords;
use crate::interfaces::ActivityStore;
use crate::interfaces::DirectoryStore;
use crate::interfaces::ProjectScope;
use crate::interfaces::ProjectStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// In-memory tables.
#[derive(Debug, Default)]
struct Tables {
    /// Users by identifier.
    users: BTreeMap<UserId, Principal>,
    /// Organizations by identifier.
    organizations: BTreeMap<OrganizationId, Organization>,
    /// Memberships by identifier.
    memberships: BTreeMap<MembershipId, Membership>,
    /// Invites by identifier.
    invites: BTreeMap<InviteId, Invite>,
    /// Profiles by owner.
    profiles: BTreeMap<UserId, Profile>,
    /// Projects by identifier.
    projects: BTreeMap<ProjectId, Project>,
    /// Grants by `(project, user)`.
    access: BTreeMap<(ProjectId, UserId), ProjectAccess>,
    /// Tasks by identifier.
    tasks: BTreeMap<TaskId, Task>,
    /// Assignees by task.
    assignees: BTreeMap<TaskId, Vec<UserId>>,
    /// Attachments by identifier.
    attachments: BTreeMap<AttachmentId, TaskAttachment>,
    /// Activity log in insertion order.
    activities: Vec<Activity>,
}

impl Tables {
    /// Returns the organization owning a project.
    fn project_org(&self, project_id: &ProjectId) -> Option<&OrganizationId> {
        self.projects.get(project_id).map(|project| &project.organization_id)
    }

    /// Returns true when the task's project lies in one of the organizations.
    fn task_in_orgs(&self, task: &Task, organization_ids: &[OrganizationId]) -> bool {
        self.project_org(&task.project_id).is_some_and(|org| organization_ids.contains(org))
    }
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory workspace store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkspaceStore {
    /// Tables protected by a mutex.
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryWorkspaceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tables.
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Io("in-memory store mutex poisoned".to_string()))
    }
}

/// Sorts rows by the provided key.
fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl FnMut(&T) -> K) -> Vec<T> {
    rows.sort_by_key(key);
    rows
}

impl DirectoryStore for InMemoryWorkspaceStore {
    fn find_user_by_subject(&self, subject_id: &str) -> Result<Option<Principal>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|user| user.subject_id == subject_id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<Principal>, StoreError> {
        Ok(self.tables()?.users.get(user_id).cloned())
    }

    fn insert_user(&self, user: &Principal) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let taken = tables.users.values().any(|existing| {
            existing.id == user.id
                || existing.subject_id == user.subject_id
                || existing.email == user.email
        });
        if taken {
            return Err(StoreError::Conflict(format!("user {} already exists", user.email)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn update_user(&self, user: &Principal) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::Invalid(format!("user {} not found", user.id)))?;
        existing.subject_id.clone_from(&user.subject_id);
        existing.display_name.clone_from(&user.display_name);
        existing.provider.clone_from(&user.provider);
        Ok(())
    }

    fn insert_organization(
        &self,
        organization: &Organization,
        owner: &Membership,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.organizations.contains_key(&organization.id) {
            return Err(StoreError::Conflict(format!(
                "organization {} already exists",
                organization.id
            )));
        }
        tables.organizations.insert(organization.id.clone(), organization.clone());
        tables.memberships.insert(owner.id.clone(), owner.clone());
        Ok(())
    }

    fn get_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        Ok(self.tables()?.organizations.get(organization_id).cloned())
    }

    fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Option<Membership>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .memberships
            .values()
            .find(|m| &m.user_id == user_id && &m.organization_id == organization_id)
            .cloned())
    }

    fn get_membership(
        &self,
        membership_id: &MembershipId,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self.tables()?.memberships.get(membership_id).cloned())
    }

    fn list_memberships_for_user(&self, user_id: &UserId) -> Result<Vec<Membership>, StoreError> {
        let tables = self.tables()?;
        let rows = tables.memberships.values().filter(|m| &m.user_id == user_id).cloned().collect();
        Ok(sorted_by(rows, |m: &Membership| (m.created_at, m.id.clone())))
    }

    fn list_memberships_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Membership>, StoreError> {
        let tables = self.tables()?;
        let rows = tables
            .memberships
            .values()
            .filter(|m| &m.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |m: &Membership| (m.created_at, m.id.clone())))
    }

    fn insert_membership(&self, membership: &Membership) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let duplicate = tables.memberships.values().any(|m| {
            m.user_id == membership.user_id && m.organization_id == membership.organization_id
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "membership for user {} in organization {} already exists",
                membership.user_id, membership.organization_id
            )));
        }
        tables.memberships.insert(membership.id.clone(), membership.clone());
        Ok(())
    }

    fn update_membership(&self, membership: &Membership) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .memberships
            .get_mut(&membership.id)
            .ok_or_else(|| StoreError::Invalid(format!("membership {} not found", membership.id)))?;
        existing.role = membership.role;
        existing.status = membership.status;
        Ok(())
    }

    fn upsert_invite(&self, invite: &Invite) -> Result<Invite, StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .invites
            .values()
            .find(|i| i.organization_id == invite.organization_id && i.email == invite.email)
            .map(|i| (i.id.clone(), i.created_at));
        let stored = match existing {
            Some((id, created_at)) => Invite {
                id,
                created_at,
                ..invite.clone()
            },
            None => invite.clone(),
        };
        tables.invites.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn get_invite(&self, invite_id: &InviteId) -> Result<Option<Invite>, StoreError> {
        Ok(self.tables()?.invites.get(invite_id).cloned())
    }

    fn find_invite_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.invites.values().find(|invite| invite.token == token).cloned())
    }

    fn list_pending_invites(
        &self,
        organization_id: &OrganizationId,
        now: Timestamp,
    ) -> Result<Vec<Invite>, StoreError> {
        let tables = self.tables()?;
        let rows = tables
            .invites
            .values()
            .filter(|i| {
                &i.organization_id == organization_id
                    && i.status == InviteStatus::Invited
                    && i.expires_at > now
            })
            .cloned()
            .collect();
        Ok(sorted_by(rows, |i: &Invite| (i.created_at, i.id.clone())))
    }

    fn update_invite(&self, invite: &Invite) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .invites
            .get_mut(&invite.id)
            .ok_or_else(|| StoreError::Invalid(format!("invite {} not found", invite.id)))?;
        *existing = invite.clone();
        Ok(())
    }

    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.tables()?.profiles.get(user_id).cloned())
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.tables()?.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

impl ProjectStore for InMemoryWorkspaceStore {
    fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.projects.contains_key(&project.id) {
            return Err(StoreError::Conflict(format!("project {} already exists", project.id)));
        }
        tables.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.tables()?.projects.get(project_id).cloned())
    }

    fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::Invalid(format!("project {} not found", project.id)))?;
        *existing = project.clone();
        Ok(())
    }

    fn delete_project(&self, project_id: &ProjectId) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        tables.projects.remove(project_id);
        tables.access.retain(|(project, _), _| project != project_id);
        let doomed: Vec<TaskId> = tables
            .tasks
            .values()
            .filter(|task| &task.project_id == project_id)
            .map(|task| task.id.clone())
            .collect();
        for task_id in &doomed {
            tables.tasks.remove(task_id);
            tables.assignees.remove(task_id);
        }
        tables.attachments.retain(|_, attachment| !doomed.contains(&attachment.task_id));
        Ok(())
    }

    fn list_projects(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables()?;
        let rows = tables
            .projects
            .values()
            .filter(|p| &p.organization_id == organization_id && scope.contains(&p.id))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p: &Project| (p.created_at, p.id.clone())))
    }

    fn list_projects_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables()?;
        let rows = tables.projects.values().filter(|p| &p.owner_id == owner_id).cloned().collect();
        Ok(sorted_by(rows, |p: &Project| (p.created_at, p.id.clone())))
    }

    fn grant_access(&self, access: &ProjectAccess) -> Result<ProjectAccess, StoreError> {
        let mut tables = self.tables()?;
        let key = (access.project_id.clone(), access.user_id.clone());
        Ok(tables.access.entry(key).or_insert_with(|| access.clone()).clone())
    }

    fn revoke_access(&self, project_id: &ProjectId, user_id: &UserId) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        Ok(tables.access.remove(&(project_id.clone(), user_id.clone())).is_some())
    }

    fn accessible_project_ids(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<BTreeSet<ProjectId>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .access
            .keys()
            .filter(|(project, user)| {
                user == user_id && tables.project_org(project) == Some(organization_id)
            })
            .map(|(project, _)| project.clone())
            .collect())
    }

    fn has_access(&self, project_id: &ProjectId, user_id: &UserId) -> Result<bool, StoreError> {
        let tables = self.tables()?;
        Ok(tables.access.contains_key(&(project_id.clone(), user_id.clone())))
    }

    fn replace_access(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
        project_ids: &[ProjectId],
        granted_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let in_org: BTreeSet<ProjectId> = tables
            .projects
            .values()
            .filter(|p| &p.organization_id == organization_id)
            .map(|p| p.id.clone())
            .collect();
        tables.access.retain(|(project, user), _| !(user == user_id && in_org.contains(project)));
        for project_id in project_ids.iter().filter(|id| in_org.contains(*id)) {
            tables.access.insert(
                (project_id.clone(), user_id.clone()),
                ProjectAccess {
                    project_id: project_id.clone(),
                    user_id: user_id.clone(),
                    granted_at,
                },
            );
        }
        Ok(())
    }

    fn list_access_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<ProjectAccess>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .access
            .values()
            .filter(|a| tables.project_org(&a.project_id) == Some(organization_id))
            .cloned()
            .collect())
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict(format!("task {} already exists", task.id)));
        }
        tables.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tables()?.tasks.get(task_id).cloned())
    }

    fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| StoreError::Invalid(format!("task {} not found", task.id)))?;
        *existing = task.clone();
        Ok(())
    }

    fn list_tasks(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables()?;
        let rows = tables
            .tasks
            .values()
            .filter(|task| {
                tables.project_org(&task.project_id) == Some(organization_id)
                    && scope.contains(&task.project_id)
            })
            .cloned()
            .collect();
        Ok(sorted_by(rows, |t: &Task| (t.created_at, t.id.clone())))
    }

    fn list_tasks_for_project(&self, project_id: &ProjectId) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables()?;
        let rows =
            tables.tasks.values().filter(|task| &task.project_id == project_id).cloned().collect();
        Ok(sorted_by(rows, |t: &Task| (t.created_at, t.id.clone())))
    }

    fn list_tasks_involving(
        &self,
        user_id: &UserId,
        organization_ids: &[OrganizationId],
    ) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables()?;
        let rows = tables
            .tasks
            .values()
            .filter(|task| tables.task_in_orgs(task, organization_ids))
            .filter(|task| {
                &task.creator_id == user_id
                    || tables.assignees.get(&task.id).is_some_and(|users| users.contains(user_id))
            })
            .cloned()
            .collect();
        Ok(sorted_by(rows, |t: &Task| (t.created_at, t.id.clone())))
    }

    fn replace_assignees(&self, task_id: &TaskId, user_ids: &[UserId]) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let mut unique: Vec<UserId> = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if !unique.contains(user_id) {
                unique.push(user_id.clone());
            }
        }
        tables.assignees.insert(task_id.clone(), unique);
        Ok(())
    }

    fn list_assignees(&self, task_id: &TaskId) -> Result<Vec<UserId>, StoreError> {
        Ok(self.tables()?.assignees.get(task_id).cloned().unwrap_or_default())
    }

    fn insert_attachment(&self, attachment: &TaskAttachment) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        tables.attachments.insert(attachment.id.clone(), attachment.clone());
        Ok(())
    }

    fn get_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<Option<TaskAttachment>, StoreError> {
        Ok(self.tables()?.attachments.get(attachment_id).cloned())
    }

    fn delete_attachment(&self, attachment_id: &AttachmentId) -> Result<bool, StoreError> {
        Ok(self.tables()?.attachments.remove(attachment_id).is_some())
    }

    fn list_attachments(&self, task_id: &TaskId) -> Result<Vec<TaskAttachment>, StoreError> {
        let tables = self.tables()?;
        let rows =
            tables.attachments.values().filter(|a| &a.task_id == task_id).cloned().collect();
        Ok(sorted_by(rows, |a: &TaskAttachment| (a.created_at, a.id.clone())))
    }
}

impl ActivityStore for InMemoryWorkspaceStore {
    fn insert_activity(&self, activity: &Activity) -> Result<(), StoreError> {
        self.tables()?.activities.push(activity.clone());
        Ok(())
    }

    fn list_activities(&self, query: &ActivityQuery) -> Result<ActivityRecords, StoreError> {
        let tables = self.tables()?;
        let mut matching: Vec<&Activity> = tables
            .activities
            .iter()
            .rev()
            .filter(|a| query.organization_ids.contains(&a.organization_id))
            .filter(|a| query.project_id.as_ref().is_none_or(|id| a.project_id.as_ref() == Some(id)))
            .filter(|a| query.actor_id.as_ref().is_none_or(|id| &a.actor_id == id))
            .filter(|a| query.from.is_none_or(|from| a.created_at >= from))
            .filter(|a| query.to.is_none_or(|to| a.created_at <= to))
            .collect();
        matching.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).cloned().collect();
        Ok(ActivityRecords {
            items,
            total,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
