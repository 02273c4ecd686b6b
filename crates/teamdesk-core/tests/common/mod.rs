// crates/teamdesk-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared fixtures for Teamdesk core integration tests.
// Purpose: Build workspaces, principals, and organizations with a manual clock.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test fixtures panic on setup failure.")]

use std::sync::Arc;
use std::time::Duration;

use teamdesk_core::DirectoryStore;
use teamdesk_core::InMemoryWorkspaceStore;
use teamdesk_core::ManualClock;
use teamdesk_core::Membership;
use teamdesk_core::MembershipId;
use teamdesk_core::MembershipStatus;
use teamdesk_core::OrgContext;
use teamdesk_core::Organization;
use teamdesk_core::Principal;
use teamdesk_core::ReadThroughCache;
use teamdesk_core::Role;
use teamdesk_core::Timestamp;
use teamdesk_core::VerifiedIdentity;
use teamdesk_core::Workspace;
use teamdesk_core::WorkspaceSettings;

/// Fixed start instant for every suite.
pub const START_MILLIS: i64 = 1_700_000_000_000;

/// Workspace under test plus the handles tests poke at directly.
pub struct Harness {
    pub workspace: Workspace,
    pub store: Arc<InMemoryWorkspaceStore>,
    pub cache: Arc<ReadThroughCache>,
    pub clock: ManualClock,
}

impl Harness {
    /// Builds a workspace over an in-memory store and cache.
    pub fn new() -> Self {
        let clock = ManualClock::new(Timestamp::from_unix_millis(START_MILLIS));
        let store = Arc::new(InMemoryWorkspaceStore::new());
        let cache = Arc::new(ReadThroughCache::new(Arc::new(clock.clone()), Duration::from_secs(15)));
        let workspace = Workspace::new(
            store.clone(),
            Arc::clone(&cache),
            Arc::new(clock.clone()),
            WorkspaceSettings::default(),
        );
        Self {
            workspace,
            store,
            cache,
            clock,
        }
    }

    /// Signs in a principal with the given email.
    pub fn principal(&self, email: &str) -> Principal {
        self.workspace
            .provision_principal(&VerifiedIdentity {
                subject_id: format!("sub-{email}"),
                email: email.to_string(),
                display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
                provider: "password".to_string(),
            })
            .unwrap()
    }

    /// Creates an organization owned by the principal.
    pub async fn organization(&self, owner: &Principal, name: &str) -> Organization {
        self.workspace.create_organization(owner, Some(name)).await.unwrap()
    }

    /// Inserts an ACTIVE membership directly into the store.
    pub fn join(&self, organization: &Organization, principal: &Principal, role: Role) -> Membership {
        let membership = Membership {
            id: MembershipId::generate(),
            user_id: principal.id.clone(),
            organization_id: organization.id.clone(),
            role,
            status: MembershipStatus::Active,
            created_at: Timestamp::from_unix_millis(START_MILLIS),
        };
        self.store.insert_membership(&membership).unwrap();
        membership
    }

    /// Runs the guard for a principal in an organization.
    pub fn ctx(&self, principal: &Principal, organization: &Organization) -> OrgContext {
        self.workspace.authorize(principal, organization.id.clone()).unwrap()
    }
}
