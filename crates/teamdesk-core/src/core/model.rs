// crates/teamdesk-core/src/core/model.rs
// ============================================================================
// Module: Teamdesk Entity Model
// Description: Persisted entities for organizations, membership, and work items.
// Purpose: Define the records shared by stores, services, and the HTTP surface.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Entities mirror the relational tables owned by the store layer. Only the
//! columns that matter for authorization, caching, and the API payloads are
//! modeled. All entities serialize with camelCase field names, which is the
//! wire form the single-page client consumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActivityId;
use crate::core::identifiers::AttachmentId;
use crate::core::identifiers::InviteId;
use crate::core::identifiers::MembershipId;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::UserId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Roles and Statuses
// ============================================================================

/// Role granted by a membership.
///
/// # Invariants
/// - `Owner` is the only privileged role; it bypasses per-project grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Organization owner.
    Owner,
    /// Organization administrator.
    Admin,
    /// Regular member.
    Member,
}

impl Role {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OWNER" => Some(Self::Owner),
            "ADMIN" => Some(Self::Admin),
            "MEMBER" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns true for roles that see every resource in the organization.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// Membership is in good standing.
    Active,
    /// Membership was created by an invite that has not been accepted.
    Invited,
    /// Membership was deactivated by a manager.
    Deactivated,
}

impl MembershipStatus {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Invited => "INVITED",
            Self::Deactivated => "DEACTIVATED",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "INVITED" => Some(Self::Invited),
            "DEACTIVATED" => Some(Self::Deactivated),
            _ => None,
        }
    }
}

/// Lifecycle status of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    /// Invite is outstanding.
    Invited,
    /// Invite was accepted; its token is spent.
    Accepted,
    /// Invite was cancelled by a manager.
    Cancelled,
}

impl InviteStatus {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "INVITED",
            Self::Accepted => "ACCEPTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INVITED" => Some(Self::Invited),
            "ACCEPTED" => Some(Self::Accepted),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Closed set of activity event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// A task was created.
    TaskCreated,
    /// A task moved between statuses.
    TaskStatusChanged,
    /// A file was attached to a task.
    FileUploaded,
    /// A file was removed from a task.
    FileRemoved,
    /// A comment was added.
    CommentAdded,
    /// A comment was edited.
    CommentUpdated,
    /// A comment was removed.
    CommentRemoved,
    /// An objective was added.
    ObjectiveAdded,
    /// An objective was edited.
    ObjectiveUpdated,
    /// An objective was removed.
    ObjectiveRemoved,
    /// A project was created.
    ProjectCreated,
    /// A project was updated.
    ProjectUpdated,
    /// A project was deleted.
    ProjectDeleted,
    /// Task assignees were replaced.
    TaskAssigneesUpdated,
}

impl ActivityType {
    /// All activity types in declaration order.
    pub const ALL: [Self; 14] = [
        Self::TaskCreated,
        Self::TaskStatusChanged,
        Self::FileUploaded,
        Self::FileRemoved,
        Self::CommentAdded,
        Self::CommentUpdated,
        Self::CommentRemoved,
        Self::ObjectiveAdded,
        Self::ObjectiveUpdated,
        Self::ObjectiveRemoved,
        Self::ProjectCreated,
        Self::ProjectUpdated,
        Self::ProjectDeleted,
        Self::TaskAssigneesUpdated,
    ];

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskStatusChanged => "TASK_STATUS_CHANGED",
            Self::FileUploaded => "FILE_UPLOADED",
            Self::FileRemoved => "FILE_REMOVED",
            Self::CommentAdded => "COMMENT_ADDED",
            Self::CommentUpdated => "COMMENT_UPDATED",
            Self::CommentRemoved => "COMMENT_REMOVED",
            Self::ObjectiveAdded => "OBJECTIVE_ADDED",
            Self::ObjectiveUpdated => "OBJECTIVE_UPDATED",
            Self::ObjectiveRemoved => "OBJECTIVE_REMOVED",
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectUpdated => "PROJECT_UPDATED",
            Self::ProjectDeleted => "PROJECT_DELETED",
            Self::TaskAssigneesUpdated => "TASK_ASSIGNEES_UPDATED",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

// ============================================================================
// SECTION: Directory Entities
// ============================================================================

/// Authenticated user as persisted in the directory.
///
/// # Invariants
/// - `id` never changes; only `display_name` is mutable after creation.
/// - `subject_id` is the identity provider's stable subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User identifier.
    pub id: UserId,
    /// Identity-provider subject identifier.
    pub subject_id: String,
    /// Normalized (lowercase) email address.
    pub email: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Login provider label.
    pub provider: String,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Organization (tenant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Creating user.
    pub owner_id: UserId,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Role and status of a user within one organization.
///
/// # Invariants
/// - `(user_id, organization_id)` is unique across all memberships.
/// - Memberships are never deleted; status transitions instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Membership identifier.
    pub id: MembershipId,
    /// Member user.
    pub user_id: UserId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Granted role.
    pub role: Role,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Invitation to join an organization.
///
/// # Invariants
/// - `(organization_id, email)` is unique across all invites.
/// - `token` is only honored while `status` is [`InviteStatus::Invited`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    /// Invite identifier.
    pub id: InviteId,
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Normalized invitee email.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Single-use acceptance token.
    pub token: String,
    /// Lifecycle status.
    pub status: InviteStatus,
    /// User who issued (or last re-issued) the invite.
    pub invited_by: UserId,
    /// Token expiry.
    pub expires_at: Timestamp,
    /// Acceptance time, when accepted.
    pub accepted_at: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Free-form user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile owner.
    pub user_id: UserId,
    /// Short biography.
    pub bio: String,
    /// Avatar URL (may be an inline data URL).
    pub avatar_url: String,
    /// Job title.
    pub title: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

// ============================================================================
// SECTION: Work Entities
// ============================================================================

/// Project owned by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Creating user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Private flag surfaced to the client.
    pub is_private: bool,
    /// Optional cover image (inline data URL).
    pub cover_image: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

/// Explicit visibility grant of one project to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAccess {
    /// Granted project.
    pub project_id: ProjectId,
    /// Grantee.
    pub user_id: UserId,
    /// Grant time.
    pub granted_at: Timestamp,
}

/// Task scoped to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Creating user.
    pub creator_id: UserId,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Board column label (e.g. `todo`, `in-progress`, `done`).
    pub status: String,
    /// Priority label.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

/// File attached to a task, stored inline as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttachment {
    /// Attachment identifier.
    pub id: AttachmentId,
    /// Owning task.
    pub task_id: TaskId,
    /// Original file name.
    pub name: String,
    /// Optional MIME type.
    pub content_type: Option<String>,
    /// Inline data URL payload.
    pub data_url: String,
    /// Uploading user.
    pub uploaded_by: UserId,
    /// Upload time.
    pub created_at: Timestamp,
}

/// Append-only audit record of a domain event.
///
/// # Invariants
/// - Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Activity identifier.
    pub id: ActivityId,
    /// Organization the event belongs to.
    pub organization_id: OrganizationId,
    /// Event type.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Human-readable message.
    pub message: String,
    /// Acting user.
    pub actor_id: UserId,
    /// Related project, when any.
    pub project_id: Option<ProjectId>,
    /// Related task, when any.
    pub task_id: Option<TaskId>,
    /// Event time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when a task status label counts as complete.
#[must_use]
pub fn is_complete_status(status: &str) -> bool {
    matches!(status.to_ascii_lowercase().as_str(), "done" | "completed" | "complete" | "closed")
}

/// Normalizes an email address for comparison and storage.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
