// crates/teamdesk-core/src/runtime/access.rs
// ============================================================================
// Module: Teamdesk Access Control
// Description: Organization membership guard and role assertion.
// Purpose: Gate every organization-scoped operation on an existing membership.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`AccessGuard::authorize`] resolves the unique membership for a principal
//! and organization and returns a typed [`OrgContext`]. The guard asserts
//! existence only; membership status is checked by the operations that care
//! about it. [`assert_role`] is the narrow allow-list check mutating
//! operations run against the context's membership.
//!
//! Security posture: membership lookups are never cached; every request
//! re-reads the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::CoreError;
use crate::core::Membership;
use crate::core::OrganizationId;
use crate::core::Principal;
use crate::core::Role;
use crate::core::UserId;
use crate::interfaces::WorkspaceStore;

// ============================================================================
// SECTION: Organization Selection
// ============================================================================

/// Picks the organization identifier from path, body, then query.
///
/// Empty values count as absent.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when no source carries an identifier.
pub fn select_organization_id(
    path: Option<&str>,
    body: Option<&str>,
    query: Option<&str>,
) -> Result<OrganizationId, CoreError> {
    [path, body, query]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(OrganizationId::from)
        .ok_or_else(|| CoreError::validation("Organization ID required"))
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Request-scoped authorization context for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext {
    /// Authenticated principal.
    pub principal: Principal,
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Principal's membership in the organization (any status).
    pub membership: Membership,
}

impl OrgContext {
    /// Returns the principal's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.principal.id
    }

    /// Returns true when the membership sees every resource in the organization.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.membership.role.is_privileged()
    }

    /// Asserts the membership role against an allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] when the role is not allowed.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), CoreError> {
        assert_role(Some(&self.membership), allowed)
    }
}

/// Membership existence gate.
#[derive(Clone)]
pub struct AccessGuard {
    /// Membership source.
    store: Arc<dyn WorkspaceStore>,
}

impl AccessGuard {
    /// Creates a guard over the store.
    #[must_use]
    pub fn new(store: Arc<dyn WorkspaceStore>) -> Self {
        Self {
            store,
        }
    }

    /// Resolves the principal's membership in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] when no membership exists and
    /// [`CoreError::Dependency`] when the store fails.
    pub fn authorize(
        &self,
        principal: &Principal,
        organization_id: OrganizationId,
    ) -> Result<OrgContext, CoreError> {
        let membership = self
            .store
            .find_membership(&principal.id, &organization_id)?
            .ok_or_else(|| CoreError::forbidden("Access denied to this organization"))?;
        Ok(OrgContext {
            principal: principal.clone(),
            organization_id,
            membership,
        })
    }
}

// ============================================================================
// SECTION: Role Assertion
// ============================================================================

/// Checks a membership role against an allow-list.
///
/// # Errors
///
/// Returns [`CoreError::Forbidden`] when the membership is absent or its role
/// is not in `allowed`.
pub fn assert_role(membership: Option<&Membership>, allowed: &[Role]) -> Result<(), CoreError> {
    match membership {
        Some(membership) if allowed.contains(&membership.role) => Ok(()),
        _ => Err(CoreError::forbidden("Insufficient role")),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
