// crates/teamdesk-core/src/core/mod.rs
// ============================================================================
// Module: Teamdesk Core Types
// Description: Identifiers, entities, views, time, and error types.
// Purpose: Provide the stable, serializable vocabulary shared by every crate.
// Dependencies: serde, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! Core types describe the persisted entities, the payloads returned by list
//! and profile reads, and the caller-visible error taxonomy. They carry no
//! behavior beyond parsing and formatting helpers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod identifiers;
pub mod model;
pub mod time;
pub mod views;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::CoreError;
pub use identifiers::ActivityId;
pub use identifiers::AttachmentId;
pub use identifiers::InviteId;
pub use identifiers::MembershipId;
pub use identifiers::OrganizationId;
pub use identifiers::ProjectId;
pub use identifiers::TaskId;
pub use identifiers::UserId;
pub use model::Activity;
pub use model::ActivityType;
pub use model::Invite;
pub use model::InviteStatus;
pub use model::Membership;
pub use model::MembershipStatus;
pub use model::Organization;
pub use model::Principal;
pub use model::Profile;
pub use model::Project;
pub use model::ProjectAccess;
pub use model::Role;
pub use model::Task;
pub use model::TaskAttachment;
pub use model::is_complete_status;
pub use model::normalize_email;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
pub use time::Timestamp;
pub use views::ActivityFeedItem;
pub use views::ActivityPage;
pub use views::CompletedProject;
pub use views::InviteIssued;
pub use views::MemberProjects;
pub use views::MyProfile;
pub use views::OrganizationRef;
pub use views::OrganizationRole;
pub use views::OrganizationSummary;
pub use views::ProfileOrganization;
pub use views::ProfileProject;
pub use views::ProfileStats;
pub use views::ProfileUser;
pub use views::ProjectRef;
pub use views::SessionSummary;
pub use views::TaskDetail;
pub use views::TaskRef;
pub use views::TaskSummary;
pub use views::TeamItem;
pub use views::TeamListing;
pub use views::UserProfile;
pub use views::UserSummary;
