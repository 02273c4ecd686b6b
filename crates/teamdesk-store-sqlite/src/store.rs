// crates/teamdesk-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Workspace Store
// Description: Durable WorkspaceStore backed by SQLite.
// Purpose: Persist tenants, memberships, work items, and the activity log.
// Dependencies: teamdesk-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements the Teamdesk store interfaces on one `SQLite`
//! connection guarded by a mutex. Multi-row writes run in a transaction, and
//! uniqueness is enforced by the schema: a constraint violation surfaces as
//! [`StoreError::Conflict`]. Security posture: database contents are
//! untrusted; stored labels are re-parsed on every read and fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use teamdesk_core::Activity;
use teamdesk_core::ActivityQuery;
use teamdesk_core::ActivityRecords;
use teamdesk_core::ActivityStore;
use teamdesk_core::AttachmentId;
use teamdesk_core::DirectoryStore;
use teamdesk_core::Invite;
use teamdesk_core::InviteId;
use teamdesk_core::Membership;
use teamdesk_core::MembershipId;
use teamdesk_core::Organization;
use teamdesk_core::OrganizationId;
use teamdesk_core::Principal;
use teamdesk_core::Profile;
use teamdesk_core::Project;
use teamdesk_core::ProjectAccess;
use teamdesk_core::ProjectId;
use teamdesk_core::ProjectScope;
use teamdesk_core::ProjectStore;
use teamdesk_core::StoreError;
use teamdesk_core::Task;
use teamdesk_core::TaskAttachment;
use teamdesk_core::TaskId;
use teamdesk_core::Timestamp;
use teamdesk_core::UserId;
use thiserror::Error;

use crate::rows;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Schema for a fresh database.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT,
    provider TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_subject
    ON users (subject_id) WHERE subject_id <> '';
CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id TEXT NOT NULL REFERENCES users(id),
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS memberships (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (user_id, organization_id)
);
CREATE TABLE IF NOT EXISTS invites (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    email TEXT NOT NULL,
    role TEXT NOT NULL,
    token TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    invited_by TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    accepted_at INTEGER,
    created_at INTEGER NOT NULL,
    UNIQUE (organization_id, email)
);
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY REFERENCES users(id),
    bio TEXT NOT NULL,
    avatar_url TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    is_private INTEGER NOT NULL,
    cover_image TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_org ON projects (organization_id);
CREATE TABLE IF NOT EXISTS project_access (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    granted_at INTEGER NOT NULL,
    PRIMARY KEY (project_id, user_id)
);
CREATE INDEX IF NOT EXISTS idx_project_access_user ON project_access (user_id);
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    creator_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    due_date INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks (project_id);
CREATE TABLE IF NOT EXISTS task_assignees (
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (task_id, user_id)
);
CREATE TABLE IF NOT EXISTS task_attachments (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    content_type TEXT,
    data_url TEXT NOT NULL,
    uploaded_by TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    type TEXT NOT NULL,
    message TEXT NOT NULL,
    actor_id TEXT NOT NULL,
    project_id TEXT,
    task_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activities_org_created
    ON activities (organization_id, created_at);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` workspace store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default pragmas for the given path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Uniqueness constraint violated.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(error.to_string())
            }
            rusqlite::Error::FromSqlConversionFailure(..) => Self::Invalid(error.to_string()),
            _ => Self::Db(error.to_string()),
        }
    }
}

/// Shorthand for store results.
type StoreResult<T> = Result<T, StoreError>;

/// Converts an engine error into a store error.
fn db(error: rusqlite::Error) -> StoreError {
    SqliteStoreError::from(error).into()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed workspace store.
#[derive(Clone)]
pub struct SqliteWorkspaceStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteWorkspaceStore {
    /// Opens (and initializes when empty) a workspace database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| StoreError::Store("mutex poisoned".to_string()))
    }

    /// Runs a single-row query.
    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        decode: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Option<T>> {
        let conn = self.conn()?;
        conn.query_row(sql, params, decode).optional().map_err(db)
    }

    /// Runs a multi-row query.
    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        decode: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Vec<T>> {
        let conn = self.conn()?;
        let mut statement = conn.prepare(sql).map_err(db)?;
        let rows = statement.query_map(params, decode).map_err(db)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db)
    }

    /// Runs a write that must touch exactly one existing row.
    fn update_one(&self, what: &str, sql: &str, params: impl rusqlite::Params) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(sql, params).map_err(db)?;
        if changed == 0 {
            return Err(StoreError::Invalid(format!("{what} not found")));
        }
        Ok(())
    }
}

/// Builds `?n` placeholders starting at `first`.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count).map(|idx| format!("?{idx}")).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Directory Store
// ============================================================================

impl DirectoryStore for SqliteWorkspaceStore {
    fn find_user_by_subject(&self, subject_id: &str) -> StoreResult<Option<Principal>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE subject_id = ?1", rows::USER_COLUMNS),
            params![subject_id],
            rows::principal,
        )
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE email = ?1", rows::USER_COLUMNS),
            params![email],
            rows::principal,
        )
    }

    fn get_user(&self, user_id: &UserId) -> StoreResult<Option<Principal>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE id = ?1", rows::USER_COLUMNS),
            params![user_id.as_str()],
            rows::principal,
        )
    }

    fn insert_user(&self, user: &Principal) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, subject_id, email, display_name, provider, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.as_str(),
                user.subject_id,
                user.email,
                user.display_name,
                user.provider,
                user.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn update_user(&self, user: &Principal) -> StoreResult<()> {
        self.update_one(
            "user",
            "UPDATE users SET subject_id = ?2, display_name = ?3, provider = ?4 WHERE id = ?1",
            params![user.id.as_str(), user.subject_id, user.display_name, user.provider],
        )
    }

    fn insert_organization(&self, organization: &Organization, owner: &Membership) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db)?;
        tx.execute(
            "INSERT INTO organizations (id, name, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                organization.id.as_str(),
                organization.name,
                organization.owner_id.as_str(),
                organization.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        tx.execute(
            "INSERT INTO memberships (id, user_id, organization_id, role, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                owner.id.as_str(),
                owner.user_id.as_str(),
                owner.organization_id.as_str(),
                owner.role.as_str(),
                owner.status.as_str(),
                owner.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        tx.commit().map_err(db)
    }

    fn get_organization(&self, organization_id: &OrganizationId) -> StoreResult<Option<Organization>> {
        self.query_one(
            &format!("SELECT {} FROM organizations WHERE id = ?1", rows::ORGANIZATION_COLUMNS),
            params![organization_id.as_str()],
            rows::organization,
        )
    }

    fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> StoreResult<Option<Membership>> {
        self.query_one(
            &format!(
                "SELECT {} FROM memberships WHERE user_id = ?1 AND organization_id = ?2",
                rows::MEMBERSHIP_COLUMNS
            ),
            params![user_id.as_str(), organization_id.as_str()],
            rows::membership,
        )
    }

    fn get_membership(&self, membership_id: &MembershipId) -> StoreResult<Option<Membership>> {
        self.query_one(
            &format!("SELECT {} FROM memberships WHERE id = ?1", rows::MEMBERSHIP_COLUMNS),
            params![membership_id.as_str()],
            rows::membership,
        )
    }

    fn list_memberships_for_user(&self, user_id: &UserId) -> StoreResult<Vec<Membership>> {
        self.query_all(
            &format!(
                "SELECT {} FROM memberships WHERE user_id = ?1 ORDER BY created_at, id",
                rows::MEMBERSHIP_COLUMNS
            ),
            params![user_id.as_str()],
            rows::membership,
        )
    }

    fn list_memberships_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> StoreResult<Vec<Membership>> {
        self.query_all(
            &format!(
                "SELECT {} FROM memberships WHERE organization_id = ?1 ORDER BY created_at, id",
                rows::MEMBERSHIP_COLUMNS
            ),
            params![organization_id.as_str()],
            rows::membership,
        )
    }

    fn insert_membership(&self, membership: &Membership) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO memberships (id, user_id, organization_id, role, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                membership.id.as_str(),
                membership.user_id.as_str(),
                membership.organization_id.as_str(),
                membership.role.as_str(),
                membership.status.as_str(),
                membership.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn update_membership(&self, membership: &Membership) -> StoreResult<()> {
        self.update_one(
            "membership",
            "UPDATE memberships SET role = ?2, status = ?3 WHERE id = ?1",
            params![membership.id.as_str(), membership.role.as_str(), membership.status.as_str()],
        )
    }

    fn upsert_invite(&self, invite: &Invite) -> StoreResult<Invite> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db)?;
        tx.execute(
            "INSERT INTO invites (id, organization_id, email, role, token, status, invited_by, \
             expires_at, accepted_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, \
             ?10) ON CONFLICT(organization_id, email) DO UPDATE SET role = excluded.role, token \
             = excluded.token, status = excluded.status, invited_by = excluded.invited_by, \
             expires_at = excluded.expires_at, accepted_at = excluded.accepted_at",
            params![
                invite.id.as_str(),
                invite.organization_id.as_str(),
                invite.email,
                invite.role.as_str(),
                invite.token,
                invite.status.as_str(),
                invite.invited_by.as_str(),
                invite.expires_at.as_unix_millis(),
                invite.accepted_at.map(Timestamp::as_unix_millis),
                invite.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        let stored = tx
            .query_row(
                &format!(
                    "SELECT {} FROM invites WHERE organization_id = ?1 AND email = ?2",
                    rows::INVITE_COLUMNS
                ),
                params![invite.organization_id.as_str(), invite.email],
                rows::invite,
            )
            .map_err(db)?;
        tx.commit().map_err(db)?;
        Ok(stored)
    }

    fn get_invite(&self, invite_id: &InviteId) -> StoreResult<Option<Invite>> {
        self.query_one(
            &format!("SELECT {} FROM invites WHERE id = ?1", rows::INVITE_COLUMNS),
            params![invite_id.as_str()],
            rows::invite,
        )
    }

    fn find_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>> {
        self.query_one(
            &format!("SELECT {} FROM invites WHERE token = ?1", rows::INVITE_COLUMNS),
            params![token],
            rows::invite,
        )
    }

    fn list_pending_invites(
        &self,
        organization_id: &OrganizationId,
        now: Timestamp,
    ) -> StoreResult<Vec<Invite>> {
        self.query_all(
            &format!(
                "SELECT {} FROM invites WHERE organization_id = ?1 AND status = 'INVITED' AND \
                 expires_at > ?2 ORDER BY created_at, id",
                rows::INVITE_COLUMNS
            ),
            params![organization_id.as_str(), now.as_unix_millis()],
            rows::invite,
        )
    }

    fn update_invite(&self, invite: &Invite) -> StoreResult<()> {
        self.update_one(
            "invite",
            "UPDATE invites SET role = ?2, token = ?3, status = ?4, invited_by = ?5, expires_at = \
             ?6, accepted_at = ?7 WHERE id = ?1",
            params![
                invite.id.as_str(),
                invite.role.as_str(),
                invite.token,
                invite.status.as_str(),
                invite.invited_by.as_str(),
                invite.expires_at.as_unix_millis(),
                invite.accepted_at.map(Timestamp::as_unix_millis)
            ],
        )
    }

    fn get_profile(&self, user_id: &UserId) -> StoreResult<Option<Profile>> {
        self.query_one(
            &format!("SELECT {} FROM profiles WHERE user_id = ?1", rows::PROFILE_COLUMNS),
            params![user_id.as_str()],
            rows::profile,
        )
    }

    fn upsert_profile(&self, profile: &Profile) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profiles (user_id, bio, avatar_url, title, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(user_id) DO UPDATE SET bio = \
             excluded.bio, avatar_url = excluded.avatar_url, title = excluded.title, updated_at \
             = excluded.updated_at",
            params![
                profile.user_id.as_str(),
                profile.bio,
                profile.avatar_url,
                profile.title,
                profile.created_at.as_unix_millis(),
                profile.updated_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Project Store
// ============================================================================

impl ProjectStore for SqliteWorkspaceStore {
    fn insert_project(&self, project: &Project) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO projects (id, organization_id, owner_id, name, description, is_private, \
             cover_image, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                project.id.as_str(),
                project.organization_id.as_str(),
                project.owner_id.as_str(),
                project.name,
                project.description,
                project.is_private,
                project.cover_image,
                project.created_at.as_unix_millis(),
                project.updated_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn get_project(&self, project_id: &ProjectId) -> StoreResult<Option<Project>> {
        self.query_one(
            &format!("SELECT {} FROM projects WHERE id = ?1", rows::PROJECT_COLUMNS),
            params![project_id.as_str()],
            rows::project,
        )
    }

    fn update_project(&self, project: &Project) -> StoreResult<()> {
        self.update_one(
            "project",
            "UPDATE projects SET name = ?2, description = ?3, is_private = ?4, cover_image = ?5, \
             updated_at = ?6 WHERE id = ?1",
            params![
                project.id.as_str(),
                project.name,
                project.description,
                project.is_private,
                project.cover_image,
                project.updated_at.as_unix_millis()
            ],
        )
    }

    fn delete_project(&self, project_id: &ProjectId) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id.as_str()])
            .map_err(db)?;
        Ok(())
    }

    fn list_projects(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> StoreResult<Vec<Project>> {
        let projects = self.query_all(
            &format!(
                "SELECT {} FROM projects WHERE organization_id = ?1 ORDER BY created_at, id",
                rows::PROJECT_COLUMNS
            ),
            params![organization_id.as_str()],
            rows::project,
        )?;
        Ok(projects.into_iter().filter(|project| scope.contains(&project.id)).collect())
    }

    fn list_projects_by_owner(&self, owner_id: &UserId) -> StoreResult<Vec<Project>> {
        self.query_all(
            &format!(
                "SELECT {} FROM projects WHERE owner_id = ?1 ORDER BY created_at, id",
                rows::PROJECT_COLUMNS
            ),
            params![owner_id.as_str()],
            rows::project,
        )
    }

    fn grant_access(&self, access: &ProjectAccess) -> StoreResult<ProjectAccess> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db)?;
        tx.execute(
            "INSERT INTO project_access (project_id, user_id, granted_at) VALUES (?1, ?2, ?3) ON \
             CONFLICT(project_id, user_id) DO NOTHING",
            params![
                access.project_id.as_str(),
                access.user_id.as_str(),
                access.granted_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        let stored = tx
            .query_row(
                "SELECT project_id, user_id, granted_at FROM project_access WHERE project_id = ?1 \
                 AND user_id = ?2",
                params![access.project_id.as_str(), access.user_id.as_str()],
                rows::access,
            )
            .map_err(db)?;
        tx.commit().map_err(db)?;
        Ok(stored)
    }

    fn revoke_access(&self, project_id: &ProjectId, user_id: &UserId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM project_access WHERE project_id = ?1 AND user_id = ?2",
                params![project_id.as_str(), user_id.as_str()],
            )
            .map_err(db)?;
        Ok(removed > 0)
    }

    fn accessible_project_ids(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> StoreResult<BTreeSet<ProjectId>> {
        let conn = self.conn()?;
        let mut statement = conn
            .prepare(
                "SELECT a.project_id FROM project_access a JOIN projects p ON p.id = a.project_id \
                 WHERE a.user_id = ?1 AND p.organization_id = ?2",
            )
            .map_err(db)?;
        let ids = statement
            .query_map(params![user_id.as_str(), organization_id.as_str()], |row| {
                row.get::<_, String>(0)
            })
            .map_err(db)?;
        ids.map(|id| id.map(ProjectId::from).map_err(db)).collect()
    }

    fn has_access(&self, project_id: &ProjectId, user_id: &UserId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM project_access WHERE project_id = ?1 AND user_id = ?2",
                params![project_id.as_str(), user_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db)?;
        Ok(found.is_some())
    }

    fn replace_access(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
        project_ids: &[ProjectId],
        granted_at: Timestamp,
    ) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db)?;
        tx.execute(
            "DELETE FROM project_access WHERE user_id = ?1 AND project_id IN (SELECT id FROM \
             projects WHERE organization_id = ?2)",
            params![user_id.as_str(), organization_id.as_str()],
        )
        .map_err(db)?;
        for project_id in project_ids {
            tx.execute(
                "INSERT INTO project_access (project_id, user_id, granted_at) SELECT id, ?2, ?3 \
                 FROM projects WHERE id = ?1 AND organization_id = ?4 ON CONFLICT(project_id, \
                 user_id) DO NOTHING",
                params![
                    project_id.as_str(),
                    user_id.as_str(),
                    granted_at.as_unix_millis(),
                    organization_id.as_str()
                ],
            )
            .map_err(db)?;
        }
        tx.commit().map_err(db)
    }

    fn list_access_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> StoreResult<Vec<ProjectAccess>> {
        self.query_all(
            "SELECT a.project_id, a.user_id, a.granted_at FROM project_access a JOIN projects p \
             ON p.id = a.project_id WHERE p.organization_id = ?1 ORDER BY a.granted_at, \
             a.project_id, a.user_id",
            params![organization_id.as_str()],
            rows::access,
        )
    }

    fn insert_task(&self, task: &Task) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (id, project_id, creator_id, title, description, status, priority, \
             due_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id.as_str(),
                task.project_id.as_str(),
                task.creator_id.as_str(),
                task.title,
                task.description,
                task.status,
                task.priority,
                task.due_date.map(Timestamp::as_unix_millis),
                task.created_at.as_unix_millis(),
                task.updated_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn get_task(&self, task_id: &TaskId) -> StoreResult<Option<Task>> {
        self.query_one(
            &format!("SELECT {} FROM tasks WHERE id = ?1", rows::TASK_COLUMNS),
            params![task_id.as_str()],
            rows::task,
        )
    }

    fn update_task(&self, task: &Task) -> StoreResult<()> {
        self.update_one(
            "task",
            "UPDATE tasks SET title = ?2, description = ?3, status = ?4, priority = ?5, due_date \
             = ?6, updated_at = ?7 WHERE id = ?1",
            params![
                task.id.as_str(),
                task.title,
                task.description,
                task.status,
                task.priority,
                task.due_date.map(Timestamp::as_unix_millis),
                task.updated_at.as_unix_millis()
            ],
        )
    }

    fn list_tasks(
        &self,
        organization_id: &OrganizationId,
        scope: &ProjectScope,
    ) -> StoreResult<Vec<Task>> {
        let tasks = self.query_all(
            "SELECT t.id, t.project_id, t.creator_id, t.title, t.description, t.status, \
             t.priority, t.due_date, t.created_at, t.updated_at FROM tasks t JOIN projects p ON \
             p.id = t.project_id WHERE p.organization_id = ?1 ORDER BY t.created_at, t.id",
            params![organization_id.as_str()],
            rows::task,
        )?;
        Ok(tasks.into_iter().filter(|task| scope.contains(&task.project_id)).collect())
    }

    fn list_tasks_for_project(&self, project_id: &ProjectId) -> StoreResult<Vec<Task>> {
        self.query_all(
            &format!(
                "SELECT {} FROM tasks WHERE project_id = ?1 ORDER BY created_at, id",
                rows::TASK_COLUMNS
            ),
            params![project_id.as_str()],
            rows::task,
        )
    }

    fn list_tasks_involving(
        &self,
        user_id: &UserId,
        organization_ids: &[OrganizationId],
    ) -> StoreResult<Vec<Task>> {
        if organization_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT t.id, t.project_id, t.creator_id, t.title, t.description, t.status, \
             t.priority, t.due_date, t.created_at, t.updated_at FROM tasks t JOIN projects p ON \
             p.id = t.project_id WHERE p.organization_id IN ({}) AND (t.creator_id = ?1 OR \
             EXISTS (SELECT 1 FROM task_assignees a WHERE a.task_id = t.id AND a.user_id = ?1)) \
             ORDER BY t.created_at, t.id",
            placeholders(2, organization_ids.len())
        );
        let mut values = vec![Value::Text(user_id.to_string())];
        values.extend(organization_ids.iter().map(|id| Value::Text(id.to_string())));
        self.query_all(&sql, params_from_iter(values), rows::task)
    }

    fn replace_assignees(&self, task_id: &TaskId, user_ids: &[UserId]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db)?;
        tx.execute("DELETE FROM task_assignees WHERE task_id = ?1", params![task_id.as_str()])
            .map_err(db)?;
        for (position, user_id) in user_ids.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StoreError::Invalid("too many assignees".to_string()))?;
            tx.execute(
                "INSERT INTO task_assignees (task_id, user_id, position) VALUES (?1, ?2, ?3) ON \
                 CONFLICT(task_id, user_id) DO NOTHING",
                params![task_id.as_str(), user_id.as_str(), position],
            )
            .map_err(db)?;
        }
        tx.commit().map_err(db)
    }

    fn list_assignees(&self, task_id: &TaskId) -> StoreResult<Vec<UserId>> {
        let conn = self.conn()?;
        let mut statement = conn
            .prepare("SELECT user_id FROM task_assignees WHERE task_id = ?1 ORDER BY position")
            .map_err(db)?;
        let ids = statement
            .query_map(params![task_id.as_str()], |row| row.get::<_, String>(0))
            .map_err(db)?;
        ids.map(|id| id.map(UserId::from).map_err(db)).collect()
    }

    fn insert_attachment(&self, attachment: &TaskAttachment) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO task_attachments (id, task_id, name, content_type, data_url, \
             uploaded_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                attachment.id.as_str(),
                attachment.task_id.as_str(),
                attachment.name,
                attachment.content_type,
                attachment.data_url,
                attachment.uploaded_by.as_str(),
                attachment.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn get_attachment(&self, attachment_id: &AttachmentId) -> StoreResult<Option<TaskAttachment>> {
        self.query_one(
            &format!("SELECT {} FROM task_attachments WHERE id = ?1", rows::ATTACHMENT_COLUMNS),
            params![attachment_id.as_str()],
            rows::attachment,
        )
    }

    fn delete_attachment(&self, attachment_id: &AttachmentId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM task_attachments WHERE id = ?1", params![attachment_id.as_str()])
            .map_err(db)?;
        Ok(removed > 0)
    }

    fn list_attachments(&self, task_id: &TaskId) -> StoreResult<Vec<TaskAttachment>> {
        self.query_all(
            &format!(
                "SELECT {} FROM task_attachments WHERE task_id = ?1 ORDER BY created_at, id",
                rows::ATTACHMENT_COLUMNS
            ),
            params![task_id.as_str()],
            rows::attachment,
        )
    }
}

// ============================================================================
// SECTION: Activity Store
// ============================================================================

impl ActivityStore for SqliteWorkspaceStore {
    fn insert_activity(&self, activity: &Activity) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO activities (id, organization_id, type, message, actor_id, project_id, \
             task_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                activity.id.as_str(),
                activity.organization_id.as_str(),
                activity.activity_type.as_str(),
                activity.message,
                activity.actor_id.as_str(),
                activity.project_id.as_ref().map(ProjectId::as_str),
                activity.task_id.as_ref().map(TaskId::as_str),
                activity.created_at.as_unix_millis()
            ],
        )
        .map_err(db)?;
        Ok(())
    }

    fn list_activities(&self, query: &ActivityQuery) -> StoreResult<ActivityRecords> {
        if query.organization_ids.is_empty() {
            return Ok(ActivityRecords::default());
        }
        let mut clauses =
            vec![format!("organization_id IN ({})", placeholders(1, query.organization_ids.len()))];
        let mut values: Vec<Value> =
            query.organization_ids.iter().map(|id| Value::Text(id.to_string())).collect();
        if let Some(project_id) = &query.project_id {
            values.push(Value::Text(project_id.to_string()));
            clauses.push(format!("project_id = ?{}", values.len()));
        }
        if let Some(actor_id) = &query.actor_id {
            values.push(Value::Text(actor_id.to_string()));
            clauses.push(format!("actor_id = ?{}", values.len()));
        }
        if let Some(from) = query.from {
            values.push(Value::Integer(from.as_unix_millis()));
            clauses.push(format!("created_at >= ?{}", values.len()));
        }
        if let Some(to) = query.to {
            values.push(Value::Integer(to.as_unix_millis()));
            clauses.push(format!("created_at <= ?{}", values.len()));
        }
        let filter = clauses.join(" AND ");

        let conn = self.conn()?;
        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM activities WHERE {filter}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
            .map_err(db)?;
        let limit = i64::from(query.limit);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));
        let sql = format!(
            "SELECT {} FROM activities WHERE {filter} ORDER BY created_at DESC, rowid DESC LIMIT \
             ?{} OFFSET ?{}",
            rows::ACTIVITY_COLUMNS,
            values.len() - 1,
            values.len()
        );
        let mut statement = conn.prepare(&sql).map_err(db)?;
        let items = statement
            .query_map(params_from_iter(values.iter()), rows::activity)
            .map_err(db)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;
        Ok(ActivityRecords {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(SCHEMA)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}
