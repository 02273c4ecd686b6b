// crates/teamdesk-core/src/runtime/directory.rs
// ============================================================================
// Module: Teamdesk Principal Directory
// Description: Principal provisioning and sign-in summaries.
// Purpose: Map verified identities onto stable principals.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A verified identity maps onto a principal by subject first, then by
//! normalized email (linking the subject when the stored user has none), and
//! otherwise creates a new principal. Principal identifiers never change once
//! created, independent of the login provider.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CoreError;
use crate::core::OrganizationRole;
use crate::core::Principal;
use crate::core::SessionSummary;
use crate::core::UserId;
use crate::core::normalize_email;
use crate::interfaces::StoreError;
use crate::interfaces::VerifiedIdentity;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Provisioning
// ============================================================================

impl Workspace {
    /// Finds or creates the principal for a verified identity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the identity carries no email and
    /// [`CoreError::Dependency`] when the store fails.
    pub fn provision_principal(&self, identity: &VerifiedIdentity) -> Result<Principal, CoreError> {
        self.provision(identity).map(|(user, _)| user)
    }

    /// Provisions a principal; the flag is set when a display name was filled in.
    fn provision(&self, identity: &VerifiedIdentity) -> Result<(Principal, bool), CoreError> {
        let email = normalize_email(&identity.email);
        if email.is_empty() {
            return Err(CoreError::validation("No email found in token"));
        }
        if let Some(user) = self.store.find_user_by_subject(&identity.subject_id)? {
            return self.backfill(user, identity);
        }
        if let Some(user) = self.store.find_user_by_email(&email)? {
            return self.backfill(user, identity);
        }

        let user = Principal {
            id: UserId::generate(),
            subject_id: identity.subject_id.clone(),
            email,
            display_name: identity.display_name.clone().filter(|name| !name.trim().is_empty()),
            provider: identity.provider.clone(),
            created_at: self.now(),
        };
        match self.store.insert_user(&user) {
            Ok(()) => {
                tracing::info!(user_id = %user.id, provider = %user.provider, "principal created");
                Ok((user, false))
            }
            Err(StoreError::Conflict(_)) => self
                .store
                .find_user_by_subject(&identity.subject_id)?
                .or(self.store.find_user_by_email(&user.email)?)
                .map(|user| (user, false))
                .ok_or_else(|| CoreError::Dependency("principal insert conflicted".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Fills a missing subject or display name on an existing principal.
    fn backfill(
        &self,
        mut user: Principal,
        identity: &VerifiedIdentity,
    ) -> Result<(Principal, bool), CoreError> {
        let mut linked = false;
        if user.subject_id.is_empty() {
            user.subject_id.clone_from(&identity.subject_id);
            linked = true;
        }
        let mut named = false;
        if user.display_name.is_none()
            && let Some(name) = identity.display_name.as_ref().filter(|name| !name.trim().is_empty())
        {
            user.display_name = Some(name.clone());
            named = true;
        }
        if linked || named {
            self.store.update_user(&user)?;
        }
        Ok((user, named))
    }

    /// Provisions the principal and summarizes its organizations.
    ///
    /// A display name filled in from the identity drops the cached team and
    /// organization views that show it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when provisioning or the membership lookup fails.
    pub async fn sign_in(&self, identity: &VerifiedIdentity) -> Result<SessionSummary, CoreError> {
        let (user, named) = self.provision(identity)?;
        if named {
            self.invalidate_principal_views(&user.id).await?;
        }
        let organizations = self.organization_roles(&user.id)?;
        Ok(SessionSummary {
            has_organization: !organizations.is_empty(),
            user,
            organizations,
        })
    }

    /// Loads the already-provisioned principal for a verified identity.
    ///
    /// Looks up by subject, then by normalized email. Unlike
    /// [`Workspace::sign_in`] this never creates or updates a user.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] when the identity has never signed in.
    pub fn resolve_principal(&self, identity: &VerifiedIdentity) -> Result<Principal, CoreError> {
        if let Some(user) = self.store.find_user_by_subject(&identity.subject_id)? {
            return Ok(user);
        }
        let email = normalize_email(&identity.email);
        if email.is_empty() {
            return Err(CoreError::not_found("User not found"));
        }
        self.store.find_user_by_email(&email)?.ok_or_else(|| CoreError::not_found("User not found"))
    }

    /// Lists `{id, name, role}` for every membership of a user.
    pub(crate) fn organization_roles(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrganizationRole>, CoreError> {
        let mut roles = Vec::new();
        for membership in self.store.list_memberships_for_user(user_id)? {
            if let Some(organization) = self.store.get_organization(&membership.organization_id)? {
                roles.push(OrganizationRole {
                    id: organization.id,
                    name: organization.name,
                    role: membership.role,
                });
            }
        }
        Ok(roles)
    }
}
