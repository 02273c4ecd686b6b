// crates/teamdesk-core/src/interfaces/mod.rs
// ============================================================================
// Module: Teamdesk Interfaces
// Description: Backend-agnostic seams for persistence, caching, identity, and mail.
// Purpose: Keep the domain services independent of concrete infrastructure.
// Dependencies: async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The domain services talk to infrastructure only through the traits below.
//! Store traits are synchronous and return [`StoreError`]; the relational
//! store is the single source of truth. The cache, identity, and mailer seams
//! are asynchronous because their production backends are network services.
//!
//! Security posture: identity verification is a trust boundary; everything
//! past [`IdentityVerifier::verify`] trusts the returned identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::Activity;
use crate::core::ActivityType;
use crate::core::AttachmentId;
use crate::core::Invite;
use crate::core::InviteId;
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

// ============================================================================
// SECTION: Store Errors and Queries
// ============================================================================

/// Workspace store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("workspace store io error: {0}")]
    Io(String),
    /// A uniqueness constraint was violated.
    #[error("workspace store conflict: {0}")]
    Conflict(String),
    /// Stored data is invalid.
    #[error("workspace store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("workspace store error: {0}")]
    Store(String),
}

/// Visibility scope for project and task listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project in the organization.
    All,
    /// Only the listed projects (intersected with the organization).
    Only(BTreeSet<ProjectId>),
}

impl ProjectScope {
    /// Returns true when the project falls inside the scope.
    #[must_use]
    pub fn contains(&self, project_id: &ProjectId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(project_id),
        }
    }
}

/// Activity feed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Organizations the caller may see.
    pub organization_ids: Vec<OrganizationId>,
    /// Optional project filter.
    pub project_id: Option<ProjectId>,
    /// Optional actor filter.
    pub actor_id: Option<UserId>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<Timestamp>,
    /// Number of matching records to skip.
    pub offset: u64,
    /// Maximum number of records to return.
    pub limit: u32,
}

/// Activity records matching a query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityRecords {
    /// Records on the requested page, newest first.
    pub items: Vec<Activity>,
    /// Total matching records across all pages.
    pub total: u64,
}

// ============================================================================
// SECTION: Store Traits
// ============================================================================

/// Users, organizations, memberships, invites, and profiles.
pub trait DirectoryStore {
    /// Finds a user by identity-provider subject.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_user_by_subject(&self, subject_id: &str) -> Result<Option<Principal>, StoreError>;

    /// Finds a user by normalized email.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    /// Loads a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<Principal>, StoreError>;

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the subject or email is taken.
    fn insert_user(&self, user: &Principal) -> Result<(), StoreError>;

    /// Overwrites the mutable fields of an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_user(&self, user: &Principal) -> Result<(), StoreError>;

    /// Inserts an organization together with its owner membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails; neither row is written.
    fn insert_organization(
        &self,
        organization: &Organization,
        owner: &Membership,
    ) -> Result<(), StoreError>;

    /// Loads an organization by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError>;

    /// Finds the unique membership for a user and organization.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Option<Membership>, StoreError>;

    /// Loads a membership by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_membership(&self, membership_id: &MembershipId)
    -> Result<Option<Membership>, StoreError>;

    /// Lists every membership held by a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_memberships_for_user(&self, user_id: &UserId) -> Result<Vec<Membership>, StoreError>;

    /// Lists every membership of an organization.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_memberships_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Membership>, StoreError>;

    /// Inserts a membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when `(user, organization)` already exists.
    fn insert_membership(&self, membership: &Membership) -> Result<(), StoreError>;

    /// Overwrites the role and status of an existing membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_membership(&self, membership: &Membership) -> Result<(), StoreError>;

    /// Inserts an invite or reissues the existing one for `(organization, email)`.
    ///
    /// A reissued invite keeps its identifier and creation time and takes
    /// every other field from `invite`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_invite(&self, invite: &Invite) -> Result<Invite, StoreError>;

    /// Loads an invite by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_invite(&self, invite_id: &InviteId) -> Result<Option<Invite>, StoreError>;

    /// Finds an invite by its current token, in any status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_invite_by_token(&self, token: &str) -> Result<Option<Invite>, StoreError>;

    /// Lists outstanding invites that expire after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_pending_invites(
        &self,
        organization_id: &OrganizationId,
        now: Timestamp,
    ) -> Result<Vec<Invite>, StoreError>;

    /// Overwrites an existing invite.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_invite(&self, invite: &Invite) -> Result<(), StoreError>;

    /// Loads a user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError>;

    /// Inserts or replaces a user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
}

/// Projects, grants, tasks, assignees, and attachments.
pub trait ProjectStore {
    /// Inserts a project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Loads a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// Overwrites an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Deletes a project with its grants, tasks, assignees, and attachments.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_project(&self, project_id: &ProjectId) -> Result<(), StoreError>;

    /// Lists projects of an organization within a scope, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_projects(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> Result<Vec<Project>, StoreError>;

    /// Lists projects created by a user across all organizations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_projects_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError>;

    /// Grants project visibility; an existing grant is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn grant_access(&self, access: &ProjectAccess) -> Result<ProjectAccess, StoreError>;

    /// Revokes a grant; returns true when a grant was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn revoke_access(&self, project_id: &ProjectId, user_id: &UserId) -> Result<bool, StoreError>;

    /// Returns the projects of an organization a user holds grants for.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn accessible_project_ids(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<BTreeSet<ProjectId>, StoreError>;

    /// Returns true when the user holds a grant for the project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn has_access(&self, project_id: &ProjectId, user_id: &UserId) -> Result<bool, StoreError>;

    /// Replaces a user's grants within one organization.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails; prior grants are kept.
    fn replace_access(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
        project_ids: &[ProjectId],
        granted_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Lists every grant on the organization's projects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_access_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<ProjectAccess>, StoreError>;

    /// Inserts a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Loads a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// Overwrites an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Lists tasks whose project belongs to the organization and scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_tasks(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> Result<Vec<Task>, StoreError>;

    /// Lists tasks of one project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_tasks_for_project(&self, project_id: &ProjectId) -> Result<Vec<Task>, StoreError>;

    /// Lists tasks in the organizations created by or assigned to the user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_tasks_involving(
        &self,
        user_id: &UserId,
        organization_ids: &[OrganizationId],
    ) -> Result<Vec<Task>, StoreError>;

    /// Replaces the assignee set of a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn replace_assignees(&self, task_id: &TaskId, user_ids: &[UserId]) -> Result<(), StoreError>;

    /// Lists the assignees of a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_assignees(&self, task_id: &TaskId) -> Result<Vec<UserId>, StoreError>;

    /// Inserts an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_attachment(&self, attachment: &TaskAttachment) -> Result<(), StoreError>;

    /// Loads an attachment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<Option<TaskAttachment>, StoreError>;

    /// Deletes an attachment; returns true when a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_attachment(&self, attachment_id: &AttachmentId) -> Result<bool, StoreError>;

    /// Lists attachments of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_attachments(&self, task_id: &TaskId) -> Result<Vec<TaskAttachment>, StoreError>;
}

/// Append-only activity log.
pub trait ActivityStore {
    /// Appends an activity record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_activity(&self, activity: &Activity) -> Result<(), StoreError>;

    /// Lists activity records matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_activities(&self, query: &ActivityQuery) -> Result<ActivityRecords, StoreError>;
}

/// Complete persistence surface used by the domain services.
pub trait WorkspaceStore: DirectoryStore + ProjectStore + ActivityStore + Send + Sync {}

impl<T> WorkspaceStore for T where T: DirectoryStore + ProjectStore + ActivityStore + Send + Sync {}

// ============================================================================
// SECTION: Cache Backend
// ============================================================================

/// Cache backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Backend is unreachable.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    /// Backend rejected the command.
    #[error("cache backend error: {0}")]
    Backend(String),
    /// Cached payload could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Key/value cache with TTL and prefix deletion.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the cached value, or `None` on miss or expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores a value with a time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes one key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Deletes every key starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

// ============================================================================
// SECTION: Identity Verifier
// ============================================================================

/// Identity returned by a successful credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable identity-provider subject.
    pub subject_id: String,
    /// Email address as asserted by the provider.
    pub email: String,
    /// Display name, when asserted.
    pub display_name: Option<String>,
    /// Login provider label.
    pub provider: String,
}

/// Identity verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Credential is missing, malformed, expired, or untrusted.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    /// Verifier infrastructure failed.
    #[error("identity verifier unavailable: {0}")]
    Unavailable(String),
}

/// Verifies opaque bearer credentials.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the credential is not accepted.
    async fn verify(&self, bearer_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

// ============================================================================
// SECTION: Invite Mailer
// ============================================================================

/// Invite email contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEmail {
    /// Recipient address.
    pub to: String,
    /// Accept link carrying the invite token.
    pub invite_link: String,
    /// Organization name, when known.
    pub organization_name: Option<String>,
    /// Name or email of the inviting user.
    pub inviter_name: String,
}

/// Invite mailer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    /// Delivery failed.
    #[error("invite delivery failed: {0}")]
    Delivery(String),
}

/// Delivers invite emails.
#[async_trait]
pub trait InviteMailer: Send + Sync {
    /// Sends an invite email.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError`] when delivery fails.
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), MailerError>;
}

// ============================================================================
// SECTION: Activity Recorder
// ============================================================================

/// Domain event to append to the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    /// Organization the event belongs to.
    pub organization_id: OrganizationId,
    /// Event type.
    pub activity_type: ActivityType,
    /// Human-readable message.
    pub message: String,
    /// Acting user.
    pub actor_id: UserId,
    /// Related project.
    pub project_id: Option<ProjectId>,
    /// Related task.
    pub task_id: Option<TaskId>,
}

/// Activity recorder errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    /// Recording failed.
    #[error("activity recording failed: {0}")]
    Record(String),
}

impl From<StoreError> for RecorderError {
    fn from(err: StoreError) -> Self {
        Self::Record(err.to_string())
    }
}

/// Appends activity records.
pub trait ActivityRecorder: Send + Sync {
    /// Appends one immutable activity record.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError`] when the write fails.
    fn record(&self, event: NewActivity) -> Result<Activity, RecorderError>;
}
