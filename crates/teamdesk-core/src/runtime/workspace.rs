// crates/teamdesk-core/src/runtime/workspace.rs
// ============================================================================
// Module: Teamdesk Workspace
// Description: Dependency container for the domain services.
// Purpose: Thread store, cache, recorder, mailer, and clock through every operation.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`Workspace`] owns the injected collaborators and hosts every domain
//! operation. Operations live in sibling modules as additional `impl
//! Workspace` blocks, grouped by resource. Mutations invalidate the affected
//! cache scopes before returning and record activity on a best-effort basis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::Clock;
use crate::core::CoreError;
use crate::core::OrganizationId;
use crate::core::Principal;
use crate::core::Timestamp;
use crate::interfaces::ActivityRecorder;
use crate::interfaces::InviteMailer;
use crate::interfaces::NewActivity;
use crate::interfaces::WorkspaceStore;
use crate::runtime::access::AccessGuard;
use crate::runtime::access::OrgContext;
use crate::runtime::activity::StoreActivityRecorder;
use crate::runtime::activity::record_best_effort;
use crate::runtime::cache::CacheKind;
use crate::runtime::cache::ReadThroughCache;
use crate::runtime::mailer::LoggingInviteMailer;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Default invite lifetime in days.
pub const DEFAULT_INVITE_EXPIRY_DAYS: u32 = 7;
/// Default client base URL used to build invite links.
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
/// Default maximum inline attachment size (encoded data URL bytes).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Tunables for the domain services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// Invite lifetime in days.
    pub invite_expiry_days: u32,
    /// Client base URL for invite links.
    pub client_url: String,
    /// Maximum inline attachment size in bytes.
    pub max_attachment_bytes: usize,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            invite_expiry_days: DEFAULT_INVITE_EXPIRY_DAYS,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Workspace
// ============================================================================

/// Domain service host.
pub struct Workspace {
    /// Source-of-truth store.
    pub(crate) store: Arc<dyn WorkspaceStore>,
    /// List-result cache.
    pub(crate) cache: Arc<ReadThroughCache>,
    /// Membership gate.
    pub(crate) guard: AccessGuard,
    /// Activity log writer.
    pub(crate) recorder: Arc<dyn ActivityRecorder>,
    /// Invite delivery.
    pub(crate) mailer: Arc<dyn InviteMailer>,
    /// Time source.
    pub(crate) clock: Arc<dyn Clock>,
    /// Tunables.
    pub(crate) settings: WorkspaceSettings,
}

impl Workspace {
    /// Creates a workspace with the store-backed recorder and logging mailer.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        cache: Arc<ReadThroughCache>,
        clock: Arc<dyn Clock>,
        settings: WorkspaceSettings,
    ) -> Self {
        let recorder = Arc::new(StoreActivityRecorder::new(Arc::clone(&store), Arc::clone(&clock)));
        Self {
            guard: AccessGuard::new(Arc::clone(&store)),
            store,
            cache,
            recorder,
            mailer: Arc::new(LoggingInviteMailer),
            clock,
            settings,
        }
    }

    /// Replaces the activity recorder.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn ActivityRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Replaces the invite mailer.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn InviteMailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn WorkspaceStore> {
        &self.store
    }

    /// Returns the cache front.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ReadThroughCache> {
        &self.cache
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    /// Runs the Access Control Guard for a principal and organization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] when the principal has no membership.
    pub fn authorize(
        &self,
        principal: &Principal,
        organization_id: OrganizationId,
    ) -> Result<OrgContext, CoreError> {
        self.guard.authorize(principal, organization_id)
    }

    /// Returns the current time.
    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Appends an activity record, logging and discarding failures.
    pub(crate) fn record_best_effort(&self, event: NewActivity) {
        record_best_effort(self.recorder.as_ref(), event);
    }

    /// Invalidates several cache kinds for one scope.
    pub(crate) async fn invalidate(&self, scope: &str, kinds: &[CacheKind]) {
        for kind in kinds {
            self.cache.invalidate(*kind, scope).await;
        }
    }

    /// Builds the accept link for an invite token.
    pub(crate) fn invite_link(&self, token: &str) -> String {
        format!("{}/invite/accept?token={token}", self.settings.client_url.trim_end_matches('/'))
    }
}
