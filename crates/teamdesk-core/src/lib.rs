// crates/teamdesk-core/src/lib.rs
// ============================================================================
// Module: Teamdesk Core Library
// Description: Public API surface for the Teamdesk core.
// Purpose: Expose core types, interfaces, and the authorization-scoped runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Teamdesk core implements multi-tenant authorization for organizations,
//! projects, and tasks: the Access Control Guard, Role Assertion, the Scoped
//! Resource Resolver, a Read-Through Cache with prefix invalidation, and a
//! best-effort Activity Recorder. Domain services built on top of them are
//! exposed through [`Workspace`]. Infrastructure plugs in through the traits
//! in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ActivityQuery;
pub use interfaces::ActivityRecorder;
pub use interfaces::ActivityRecords;
pub use interfaces::ActivityStore;
pub use interfaces::CacheBackend;
pub use interfaces::CacheError;
pub use interfaces::DirectoryStore;
pub use interfaces::IdentityError;
pub use interfaces::IdentityVerifier;
pub use interfaces::InviteEmail;
pub use interfaces::InviteMailer;
pub use interfaces::MailerError;
pub use interfaces::NewActivity;
pub use interfaces::ProjectScope;
pub use interfaces::ProjectStore;
pub use interfaces::RecorderError;
pub use interfaces::StoreError;
pub use interfaces::VerifiedIdentity;
pub use interfaces::WorkspaceStore;
pub use runtime::AccessGuard;
pub use runtime::ActivityFilters;
pub use runtime::CacheKey;
pub use runtime::CacheKind;
pub use runtime::CacheState;
pub use runtime::DEFAULT_CACHE_TTL;
pub use runtime::DEFAULT_CLIENT_URL;
pub use runtime::DEFAULT_INVITE_EXPIRY_DAYS;
pub use runtime::DEFAULT_MAX_ATTACHMENT_BYTES;
pub use runtime::DEFAULT_TASK_PRIORITY;
pub use runtime::DEFAULT_TASK_STATUS;
pub use runtime::InMemoryWorkspaceStore;
pub use runtime::InviteOutcome;
pub use runtime::LoggingInviteMailer;
pub use runtime::MemberAddition;
pub use runtime::MemoryCache;
pub use runtime::NewActivityEntry;
pub use runtime::NewAttachment;
pub use runtime::NewProject;
pub use runtime::NewTask;
pub use runtime::OrgContext;
pub use runtime::ProfileUpdate;
pub use runtime::ProjectUpdate;
pub use runtime::ReadThroughCache;
pub use runtime::StoreActivityRecorder;
pub use runtime::Workspace;
pub use runtime::WorkspaceSettings;
pub use runtime::assert_role;
pub use runtime::select_organization_id;
