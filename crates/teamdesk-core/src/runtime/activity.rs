// crates/teamdesk-core/src/runtime/activity.rs
// ============================================================================
// Module: Teamdesk Activity
// Description: Best-effort activity recording and the paginated activity feed.
// Purpose: Keep an append-only audit trail that never fails its parent mutation.
// Dependencies: crate::core, crate::interfaces, tracing
// ============================================================================

//! ## Overview
//! Mutations record activity through [`record_best_effort`], which logs and
//! discards recorder failures. Explicit entries posted by clients go through
//! [`Workspace::create_activity_entry`] and do surface failures. The feed is
//! scoped to the caller's organizations and ordered newest first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::Activity;
use crate::core::ActivityFeedItem;
use crate::core::ActivityId;
use crate::core::ActivityPage;
use crate::core::ActivityType;
use crate::core::Clock;
use crate::core::CoreError;
use crate::core::OrganizationId;
use crate::core::Principal;
use crate::core::ProjectId;
use crate::core::ProjectRef;
use crate::core::TaskId;
use crate::core::TaskRef;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::core::UserSummary;
use crate::interfaces::ActivityQuery;
use crate::interfaces::ActivityRecorder;
use crate::interfaces::NewActivity;
use crate::interfaces::RecorderError;
use crate::interfaces::WorkspaceStore;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default feed page size.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Maximum feed page size.
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// SECTION: Recorder
// ============================================================================

/// Activity recorder writing to the workspace store.
pub struct StoreActivityRecorder {
    /// Activity log store.
    store: Arc<dyn WorkspaceStore>,
    /// Time source for record timestamps.
    clock: Arc<dyn Clock>,
}

impl StoreActivityRecorder {
    /// Creates a recorder over the store.
    #[must_use]
    pub fn new(store: Arc<dyn WorkspaceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }
}

impl ActivityRecorder for StoreActivityRecorder {
    fn record(&self, event: NewActivity) -> Result<Activity, RecorderError> {
        let activity = Activity {
            id: ActivityId::generate(),
            organization_id: event.organization_id,
            activity_type: event.activity_type,
            message: event.message,
            actor_id: event.actor_id,
            project_id: event.project_id,
            task_id: event.task_id,
            created_at: self.clock.now(),
        };
        self.store.insert_activity(&activity)?;
        Ok(activity)
    }
}

/// Records an activity, logging and discarding any failure.
pub fn record_best_effort(recorder: &dyn ActivityRecorder, event: NewActivity) {
    let activity_type = event.activity_type;
    if let Err(err) = recorder.record(event) {
        tracing::warn!(
            activity_type = activity_type.as_str(),
            error = %err,
            "activity log failed"
        );
    }
}

// ============================================================================
// SECTION: Feed Requests
// ============================================================================

/// Raw activity feed filters as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilters {
    /// Restrict to one project.
    pub project_id: Option<ProjectId>,
    /// Restrict to one actor.
    pub actor_id: Option<UserId>,
    /// RFC 3339 lower bound; unparsable values are ignored.
    pub from_date: Option<String>,
    /// RFC 3339 upper bound; unparsable values are ignored.
    pub to_date: Option<String>,
    /// One-based page; values below one become one.
    pub page: Option<i64>,
    /// Page size; clamped to `1..=100`.
    pub page_size: Option<i64>,
}

impl ActivityFilters {
    /// Returns the effective page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        let page = self.page.unwrap_or(1).max(1);
        u32::try_from(page).unwrap_or(u32::MAX)
    }

    /// Returns the effective page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        let size = self
            .page_size
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE));
        u32::try_from(size).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Activity entry posted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewActivityEntry {
    /// Activity type label.
    pub activity_type: Option<String>,
    /// Optional message (defaults to empty).
    pub message: Option<String>,
    /// Related project.
    pub project_id: Option<ProjectId>,
    /// Related task.
    pub task_id: Option<TaskId>,
}

// ============================================================================
// SECTION: Feed Operations
// ============================================================================

impl Workspace {
    /// Returns the organizations the principal holds memberships in.
    pub(crate) fn organization_ids_of(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrganizationId>, CoreError> {
        Ok(self
            .store
            .list_memberships_for_user(user_id)?
            .into_iter()
            .map(|membership| membership.organization_id)
            .collect())
    }

    /// Lists activity across the principal's organizations.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] when the project filter lies outside
    /// the principal's organizations.
    pub fn list_activity(
        &self,
        principal: &Principal,
        filters: &ActivityFilters,
    ) -> Result<ActivityPage, CoreError> {
        let page = filters.page();
        let page_size = filters.page_size();
        let organization_ids = self.organization_ids_of(&principal.id)?;
        if organization_ids.is_empty() {
            return Ok(ActivityPage {
                items: Vec::new(),
                total: 0,
                page,
                page_size,
                has_more: false,
            });
        }
        if let Some(project_id) = &filters.project_id {
            let visible = self
                .store
                .get_project(project_id)?
                .is_some_and(|project| organization_ids.contains(&project.organization_id));
            if !visible {
                return Err(CoreError::forbidden("Access denied to this project"));
            }
        }

        let offset = u64::from(page - 1).saturating_mul(u64::from(page_size));
        let records = self.store.list_activities(&ActivityQuery {
            organization_ids,
            project_id: filters.project_id.clone(),
            actor_id: filters.actor_id.clone(),
            from: filters.from_date.as_deref().and_then(Timestamp::parse_rfc3339),
            to: filters.to_date.as_deref().and_then(Timestamp::parse_rfc3339),
            offset,
            limit: page_size,
        })?;
        let returned = u64::try_from(records.items.len()).unwrap_or(u64::MAX);
        let has_more = offset.saturating_add(returned) < records.total;
        let items = self.join_activity(records.items)?;
        Ok(ActivityPage {
            items,
            total: records.total,
            page,
            page_size,
            has_more,
        })
    }

    /// Joins activity records with their actor, project, and task.
    fn join_activity(&self, records: Vec<Activity>) -> Result<Vec<ActivityFeedItem>, CoreError> {
        let mut actors: BTreeMap<UserId, Option<UserSummary>> = BTreeMap::new();
        let mut projects: BTreeMap<ProjectId, Option<ProjectRef>> = BTreeMap::new();
        let mut items = Vec::with_capacity(records.len());
        for activity in records {
            let actor = match actors.get(&activity.actor_id) {
                Some(actor) => actor.clone(),
                None => {
                    let actor =
                        self.store.get_user(&activity.actor_id)?.as_ref().map(UserSummary::from);
                    actors.insert(activity.actor_id.clone(), actor.clone());
                    actor
                }
            };
            let project = match &activity.project_id {
                None => None,
                Some(project_id) => match projects.get(project_id) {
                    Some(project) => project.clone(),
                    None => {
                        let project = self.store.get_project(project_id)?.map(|p| ProjectRef {
                            id: p.id,
                            name: p.name,
                        });
                        projects.insert(project_id.clone(), project.clone());
                        project
                    }
                },
            };
            let task = match &activity.task_id {
                None => None,
                Some(task_id) => self.store.get_task(task_id)?.map(|t| TaskRef {
                    id: t.id,
                    title: t.title,
                }),
            };
            items.push(ActivityFeedItem {
                activity,
                actor,
                project,
                task,
            });
        }
        Ok(items)
    }

    /// Records an activity entry posted by a client.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for an unknown type or when neither a
    /// project nor a task is given, [`CoreError::Forbidden`] when either lies
    /// outside the principal's organizations, and [`CoreError::Dependency`]
    /// when recording fails.
    pub fn create_activity_entry(
        &self,
        principal: &Principal,
        entry: NewActivityEntry,
    ) -> Result<Activity, CoreError> {
        let activity_type = entry
            .activity_type
            .as_deref()
            .and_then(ActivityType::parse)
            .ok_or_else(|| CoreError::validation("Invalid activity type"))?;
        if entry.project_id.is_none() && entry.task_id.is_none() {
            return Err(CoreError::validation("projectId or taskId is required"));
        }
        let organization_ids = self.organization_ids_of(&principal.id)?;
        if organization_ids.is_empty() {
            return Err(CoreError::forbidden("No organization access"));
        }

        let mut organization_id = None;
        if let Some(project_id) = &entry.project_id {
            let project = self
                .store
                .get_project(project_id)?
                .filter(|project| organization_ids.contains(&project.organization_id))
                .ok_or_else(|| CoreError::forbidden("Access denied to this project"))?;
            organization_id = Some(project.organization_id);
        }
        if let Some(task_id) = &entry.task_id {
            let task_org = match self.store.get_task(task_id)? {
                Some(task) => self
                    .store
                    .get_project(&task.project_id)?
                    .map(|project| project.organization_id)
                    .filter(|org| organization_ids.contains(org)),
                None => None,
            };
            let task_org = task_org.ok_or_else(|| CoreError::forbidden("Access denied to this task"))?;
            organization_id.get_or_insert(task_org);
        }
        let organization_id = organization_id
            .ok_or_else(|| CoreError::validation("projectId or taskId is required"))?;

        self.recorder
            .record(NewActivity {
                organization_id,
                activity_type,
                message: entry.message.unwrap_or_default(),
                actor_id: principal.id.clone(),
                project_id: entry.project_id,
                task_id: entry.task_id,
            })
            .map_err(|err| CoreError::Dependency(err.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
