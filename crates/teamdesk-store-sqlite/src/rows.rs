// crates/teamdesk-store-sqlite/src/rows.rs
// ============================================================================
// Module: SQLite Row Decoding
// Description: Column lists and row-to-entity decoders.
// Purpose: Keep SELECT column order and decoding in one place.
// Dependencies: teamdesk-core, rusqlite, thiserror
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Row;
use rusqlite::types::Type;
use teamdesk_core::Activity;
use teamdesk_core::ActivityType;
use teamdesk_core::Invite;
use teamdesk_core::InviteStatus;
use teamdesk_core::Membership;
use teamdesk_core::MembershipStatus;
use teamdesk_core::Organization;
use teamdesk_core::Principal;
use teamdesk_core::Profile;
use teamdesk_core::Project;
use teamdesk_core::ProjectAccess;
use teamdesk_core::Role;
use teamdesk_core::Task;
use teamdesk_core::TaskAttachment;
use teamdesk_core::Timestamp;
use thiserror::Error;

// ============================================================================
// SECTION: Column Lists
// ============================================================================

/// Columns decoded by [`principal`].
pub const USER_COLUMNS: &str = "id, subject_id, email, display_name, provider, created_at";
pub const ORGANIZATION_COLUMNS: &str = "id, name, owner_id, created_at";
pub const MEMBERSHIP_COLUMNS: &str = "id, user_id, organization_id, role, status, created_at";
pub const INVITE_COLUMNS: &str = "id, organization_id, email, role, token, status, invited_by, \
                                  expires_at, accepted_at, created_at";
pub const PROFILE_COLUMNS: &str = "user_id, bio, avatar_url, title, created_at, updated_at";
pub const PROJECT_COLUMNS: &str = "id, organization_id, owner_id, name, description, is_private, \
                                   cover_image, created_at, updated_at";
pub const TASK_COLUMNS: &str = "id, project_id, creator_id, title, description, status, priority, \
                                due_date, created_at, updated_at";
pub const ATTACHMENT_COLUMNS: &str =
    "id, task_id, name, content_type, data_url, uploaded_by, created_at";
pub const ACTIVITY_COLUMNS: &str =
    "id, organization_id, type, message, actor_id, project_id, task_id, created_at";

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Stored label that no longer parses.
#[derive(Debug, Error)]
#[error("invalid {column} label: {value}")]
struct InvalidLabel {
    /// Column holding the label.
    column: &'static str,
    /// Raw stored value.
    value: String,
}

/// Reads and parses a text label column.
fn label<T>(
    row: &Row<'_>,
    idx: usize,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let value: String = row.get(idx)?;
    parse(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(InvalidLabel {
                column,
                value,
            }),
        )
    })
}

/// Reads a unix-millis column.
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    Ok(Timestamp::from_unix_millis(row.get(idx)?))
}

/// Reads a nullable unix-millis column.
fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(Timestamp::from_unix_millis))
}

// ============================================================================
// SECTION: Decoders
// ============================================================================

/// Decodes a user row.
pub fn principal(row: &Row<'_>) -> rusqlite::Result<Principal> {
    Ok(Principal {
        id: row.get::<_, String>(0)?.into(),
        subject_id: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        provider: row.get(4)?,
        created_at: timestamp(row, 5)?,
    })
}

/// Decodes an organization row.
pub fn organization(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get::<_, String>(0)?.into(),
        name: row.get(1)?,
        owner_id: row.get::<_, String>(2)?.into(),
        created_at: timestamp(row, 3)?,
    })
}

/// Decodes a membership row.
pub fn membership(row: &Row<'_>) -> rusqlite::Result<Membership> {
    Ok(Membership {
        id: row.get::<_, String>(0)?.into(),
        user_id: row.get::<_, String>(1)?.into(),
        organization_id: row.get::<_, String>(2)?.into(),
        role: label(row, 3, "role", Role::parse)?,
        status: label(row, 4, "membership status", MembershipStatus::parse)?,
        created_at: timestamp(row, 5)?,
    })
}

/// Decodes an invite row.
pub fn invite(row: &Row<'_>) -> rusqlite::Result<Invite> {
    Ok(Invite {
        id: row.get::<_, String>(0)?.into(),
        organization_id: row.get::<_, String>(1)?.into(),
        email: row.get(2)?,
        role: label(row, 3, "role", Role::parse)?,
        token: row.get(4)?,
        status: label(row, 5, "invite status", InviteStatus::parse)?,
        invited_by: row.get::<_, String>(6)?.into(),
        expires_at: timestamp(row, 7)?,
        accepted_at: optional_timestamp(row, 8)?,
        created_at: timestamp(row, 9)?,
    })
}

/// Decodes a profile row.
pub fn profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get::<_, String>(0)?.into(),
        bio: row.get(1)?,
        avatar_url: row.get(2)?,
        title: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

/// Decodes a project row.
pub fn project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get::<_, String>(0)?.into(),
        organization_id: row.get::<_, String>(1)?.into(),
        owner_id: row.get::<_, String>(2)?.into(),
        name: row.get(3)?,
        description: row.get(4)?,
        is_private: row.get(5)?,
        cover_image: row.get(6)?,
        created_at: timestamp(row, 7)?,
        updated_at: timestamp(row, 8)?,
    })
}

/// Decodes a project access row.
pub fn access(row: &Row<'_>) -> rusqlite::Result<ProjectAccess> {
    Ok(ProjectAccess {
        project_id: row.get::<_, String>(0)?.into(),
        user_id: row.get::<_, String>(1)?.into(),
        granted_at: timestamp(row, 2)?,
    })
}

/// Decodes a task row.
pub fn task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get::<_, String>(0)?.into(),
        project_id: row.get::<_, String>(1)?.into(),
        creator_id: row.get::<_, String>(2)?.into(),
        title: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        due_date: optional_timestamp(row, 7)?,
        created_at: timestamp(row, 8)?,
        updated_at: timestamp(row, 9)?,
    })
}

/// Decodes an attachment row.
pub fn attachment(row: &Row<'_>) -> rusqlite::Result<TaskAttachment> {
    Ok(TaskAttachment {
        id: row.get::<_, String>(0)?.into(),
        task_id: row.get::<_, String>(1)?.into(),
        name: row.get(2)?,
        content_type: row.get(3)?,
        data_url: row.get(4)?,
        uploaded_by: row.get::<_, String>(5)?.into(),
        created_at: timestamp(row, 6)?,
    })
}

/// Decodes an activity row.
pub fn activity(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get::<_, String>(0)?.into(),
        organization_id: row.get::<_, String>(1)?.into(),
        activity_type: label(row, 2, "activity type", ActivityType::parse)?,
        message: row.get(3)?,
        actor_id: row.get::<_, String>(4)?.into(),
        project_id: row.get::<_, Option<String>>(5)?.map(Into::into),
        task_id: row.get::<_, Option<String>>(6)?.map(Into::into),
        created_at: timestamp(row, 7)?,
    })
}
