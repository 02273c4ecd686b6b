// crates/teamdesk-core/src/core/views.rs
// ============================================================================
// Module: Teamdesk Read Views
// Description: Composite payloads returned by list, feed, and profile reads.
// Purpose: Give cached and HTTP-visible payloads a stable serializable shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Views join entities into the shapes the client renders. List views are
//! also what the Read-Through Cache stores, so they must round-trip through
//! JSON without loss.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::UserId;
use crate::core::model::Activity;
use crate::core::model::Invite;
use crate::core::model::MembershipStatus;
use crate::core::model::Principal;
use crate::core::model::Profile;
use crate::core::model::Role;
use crate::core::model::Task;
use crate::core::model::TaskAttachment;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: References
// ============================================================================

/// Minimal user reference embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name, when set.
    pub name: Option<String>,
    /// Email address.
    pub email: String,
}

impl From<&Principal> for UserSummary {
    fn from(user: &Principal) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Minimal project reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
}

/// Minimal task reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
}

/// Organization reference with the caller's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRole {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// Role held in the organization.
    pub role: Role,
}

// ============================================================================
// SECTION: Session and Organizations
// ============================================================================

/// Result of a sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Provisioned user.
    pub user: Principal,
    /// True when the user holds at least one membership.
    pub has_organization: bool,
    /// Organizations the user belongs to.
    pub organizations: Vec<OrganizationRole>,
}

/// Entry of the "my organizations" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// Organization creation time.
    pub created_at: Timestamp,
    /// Role held in the organization.
    pub role: Role,
}

// ============================================================================
// SECTION: Tasks
// ============================================================================

/// Task row as returned by the scoped task listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Task fields.
    #[serde(flatten)]
    pub task: Task,
    /// Owning project.
    pub project: ProjectRef,
    /// Creating user.
    pub creator: UserSummary,
    /// Assigned users.
    pub assignee_ids: Vec<UserId>,
}

/// Task with its attachments, returned by task mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    /// Task fields.
    #[serde(flatten)]
    pub task: Task,
    /// Owning project.
    pub project: ProjectRef,
    /// Assigned users.
    pub assignee_ids: Vec<UserId>,
    /// Attached files.
    pub attachments: Vec<TaskAttachment>,
}

// ============================================================================
// SECTION: Team
// ============================================================================

/// Row of the team listing: either a membership or a pending invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamItem {
    /// Membership or invite identifier.
    pub id: String,
    /// Member user; `None` for invites.
    pub user_id: Option<UserId>,
    /// Member display name (empty for invites).
    pub name: String,
    /// Member or invitee email.
    pub email: String,
    /// Role held or offered.
    pub role: Role,
    /// Membership status (`INVITED` for invites).
    pub status: MembershipStatus,
    /// Number of granted projects.
    pub project_count: usize,
    /// Granted project identifiers.
    pub project_ids: Vec<ProjectId>,
    /// True for pending invite rows.
    pub is_invite: bool,
    /// Accept link for pending invites.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub invite_link: Option<String>,
}

/// Organization-wide team listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListing {
    /// Members followed by pending invites.
    pub items: Vec<TeamItem>,
}

/// Issued (or re-issued) invite with its accept link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteIssued {
    /// Invite record.
    pub invite: Invite,
    /// Accept link carrying the token.
    pub invite_link: String,
}

/// Result of replacing a member's project grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProjects {
    /// Member user.
    pub user_id: UserId,
    /// Granted projects after replacement.
    pub project_ids: Vec<ProjectId>,
}

// ============================================================================
// SECTION: Activity
// ============================================================================

/// Activity record joined with its actor, project, and task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFeedItem {
    /// Activity fields.
    #[serde(flatten)]
    pub activity: Activity,
    /// Acting user, when still present.
    pub actor: Option<UserSummary>,
    /// Related project, when still present.
    pub project: Option<ProjectRef>,
    /// Related task, when still present.
    pub task: Option<TaskRef>,
}

/// Page of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    /// Items, newest first.
    pub items: Vec<ActivityFeedItem>,
    /// Total matching records.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Page size after clamping.
    pub page_size: u32,
    /// True when later pages exist.
    pub has_more: bool,
}

// ============================================================================
// SECTION: Profiles
// ============================================================================

/// User fields exposed on profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: String,
    /// Login provider.
    pub provider: String,
    /// Account creation time.
    pub created_at: Timestamp,
}

impl From<&Principal> for ProfileUser {
    fn from(user: &Principal) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            provider: user.provider.clone(),
            created_at: user.created_at,
        }
    }
}

/// Project whose tasks are all complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedProject {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: Option<String>,
}

/// The caller's own profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyProfile {
    /// Profile record.
    pub profile: Profile,
    /// User fields.
    pub user: ProfileUser,
    /// Organizations the caller belongs to.
    pub organizations: Vec<OrganizationRole>,
    /// Owned projects with every task complete.
    pub completed_projects: Vec<CompletedProject>,
}

/// Organization entry on another user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOrganization {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// Role held by the profile owner.
    pub role: Role,
    /// Organization creation time.
    pub joined_at: Timestamp,
}

/// Project entry on another user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileProject {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: Option<String>,
    /// `Owner` when the profile owner created the project, else `Member`.
    pub role: String,
    /// `Completed` when every task is complete, else `Active`.
    pub status: String,
    /// Owning organization.
    pub organization: Option<OrganizationRef>,
}

/// Minimal organization reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRef {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
}

/// Aggregate counters on another user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// Projects with every task complete.
    pub projects_completed: usize,
    /// Remaining projects.
    pub active_projects: usize,
    /// Completed tasks created by or assigned to the user.
    pub tasks_completed: usize,
    /// Open tasks created by or assigned to the user.
    pub tasks_in_progress: usize,
    /// Roles across the visible organizations.
    pub roles: Vec<Role>,
}

/// Another user's profile as seen by a principal sharing an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User fields.
    pub user: ProfileUser,
    /// Profile record (empty when never created).
    pub profile: Profile,
    /// Visible organizations.
    pub organizations: Vec<ProfileOrganization>,
    /// Visible projects.
    pub projects: Vec<ProfileProject>,
    /// Aggregate counters.
    pub stats: ProfileStats,
}
