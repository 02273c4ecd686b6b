// crates/teamdesk-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Workspace Store
// Description: Durable WorkspaceStore backend using SQLite.
// Purpose: Persist directory, project, task, and activity records.
// Dependencies: teamdesk-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`SqliteWorkspaceStore`] implementing
//! every Teamdesk store interface on a single guarded connection. Deletes
//! cascade through foreign keys; the activity log has none so it survives
//! project deletion. Security posture: database contents are untrusted and
//! every stored label is re-validated on read.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod rows;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::SqliteWorkspaceStore;
