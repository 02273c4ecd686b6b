// crates/teamdesk-core/src/runtime/mod.rs
// ============================================================================
// Module: Teamdesk Runtime
// Description: Authorization components, cache, stores, and domain services.
// Purpose: Execute tenant-scoped operations against the injected collaborators.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the guard, the scoped resolver, the read-through
//! cache, and the activity recorder, plus the resource services that hang off
//! [`Workspace`]. Every outer surface must call into these services so that
//! authorization and cache invalidation stay in one place.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access;
pub mod activity;
pub mod cache;
pub mod directory;
pub mod mailer;
pub mod organizations;
pub mod profiles;
pub mod projects;
pub mod resolver;
pub mod store;
pub mod tasks;
pub mod team;
pub mod workspace;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::AccessGuard;
pub use access::OrgContext;
pub use access::assert_role;
pub use access::select_organization_id;
pub use activity::ActivityFilters;
pub use activity::DEFAULT_PAGE_SIZE;
pub use activity::MAX_PAGE_SIZE;
pub use activity::NewActivityEntry;
pub use activity::StoreActivityRecorder;
pub use activity::record_best_effort;
pub use cache::CacheKey;
pub use cache::CacheKind;
pub use cache::CacheState;
pub use cache::DEFAULT_CACHE_TTL;
pub use cache::MemoryCache;
pub use cache::ReadThroughCache;
pub use mailer::LoggingInviteMailer;
pub use organizations::MemberAddition;
pub use profiles::ProfileUpdate;
pub use projects::NewProject;
pub use projects::ProjectUpdate;
pub use store::InMemoryWorkspaceStore;
pub use tasks::DEFAULT_TASK_PRIORITY;
pub use tasks::DEFAULT_TASK_STATUS;
pub use tasks::NewAttachment;
pub use tasks::NewTask;
pub use team::InviteOutcome;
pub use workspace::DEFAULT_CLIENT_URL;
pub use workspace::DEFAULT_INVITE_EXPIRY_DAYS;
pub use workspace::DEFAULT_MAX_ATTACHMENT_BYTES;
pub use workspace::Workspace;
pub use workspace::WorkspaceSettings;
