// crates/teamdesk-core/src/runtime/organizations.rs
// ============================================================================
// Module: Teamdesk Organizations
// Description: Organization creation, listing, and direct member addition.
// Purpose: Create tenants and their owner memberships.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! Creating an organization writes the organization and an ACTIVE OWNER
//! membership for its creator. The per-user organization listing is cached
//! under `orgs:<user>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CoreError;
use crate::core::Membership;
use crate::core::MembershipId;
use crate::core::MembershipStatus;
use crate::core::Organization;
use crate::core::OrganizationId;
use crate::core::OrganizationSummary;
use crate::core::Principal;
use crate::core::Role;
use crate::core::normalize_email;
use crate::runtime::access::OrgContext;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Result of a direct member addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAddition {
    /// The user already held a membership; it is returned unchanged.
    Existing(Membership),
    /// A new ACTIVE membership was created.
    Created(Membership),
}

impl Workspace {
    /// Creates an organization owned by the principal.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the name is blank.
    pub async fn create_organization(
        &self,
        principal: &Principal,
        name: Option<&str>,
    ) -> Result<Organization, CoreError> {
        let name = name.map(str::trim).filter(|name| !name.is_empty());
        let Some(name) = name else {
            return Err(CoreError::validation("Organization name is required"));
        };
        let now = self.now();
        let organization = Organization {
            id: OrganizationId::generate(),
            name: name.to_string(),
            owner_id: principal.id.clone(),
            created_at: now,
        };
        let owner = Membership {
            id: MembershipId::generate(),
            user_id: principal.id.clone(),
            organization_id: organization.id.clone(),
            role: Role::Owner,
            status: MembershipStatus::Active,
            created_at: now,
        };
        self.store.insert_organization(&organization, &owner)?;
        self.invalidate(principal.id.as_str(), &[CacheKind::Orgs]).await;
        tracing::info!(organization_id = %organization.id, "organization created");
        Ok(organization)
    }

    /// Lists the principal's organizations with their roles.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn list_my_organizations(
        &self,
        principal: &Principal,
    ) -> Result<Vec<OrganizationSummary>, CoreError> {
        let key = CacheKey::scoped(CacheKind::Orgs, principal.id.as_str());
        if let Some(cached) = self.cache.get::<Vec<OrganizationSummary>>(&key).await {
            return Ok(cached);
        }
        let mut summaries = Vec::new();
        for membership in self.store.list_memberships_for_user(&principal.id)? {
            if let Some(organization) = self.store.get_organization(&membership.organization_id)? {
                summaries.push(OrganizationSummary {
                    id: organization.id,
                    name: organization.name,
                    created_at: organization.created_at,
                    role: membership.role,
                });
            }
        }
        self.cache.set(&key, &summaries).await;
        Ok(summaries)
    }

    /// Adds an existing user to the organization directly, without an invite.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] unless the caller is OWNER or ADMIN,
    /// [`CoreError::Validation`] for the OWNER role, and
    /// [`CoreError::NotFound`] when no user has the email.
    pub async fn add_existing_user(
        &self,
        ctx: &OrgContext,
        email: &str,
        role: Option<Role>,
    ) -> Result<MemberAddition, CoreError> {
        ctx.require_role(&[Role::Owner, Role::Admin])?;
        let role = role.unwrap_or(Role::Member);
        if role == Role::Owner {
            return Err(CoreError::validation("Invalid role"));
        }
        let user = self
            .store
            .find_user_by_email(&normalize_email(email))?
            .ok_or_else(|| CoreError::not_found("User not found"))?;
        if let Some(existing) = self.store.find_membership(&user.id, &ctx.organization_id)? {
            return Ok(MemberAddition::Existing(existing));
        }
        let membership = Membership {
            id: MembershipId::generate(),
            user_id: user.id.clone(),
            organization_id: ctx.organization_id.clone(),
            role,
            status: MembershipStatus::Active,
            created_at: self.now(),
        };
        self.store.insert_membership(&membership)?;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Team]).await;
        self.invalidate(user.id.as_str(), &[CacheKind::Orgs]).await;
        Ok(MemberAddition::Created(membership))
    }
}
