// crates/teamdesk-core/src/runtime/team.rs
// ============================================================================
// Module: Teamdesk Team Management
// Description: Team listing, invites, and membership administration.
// Purpose: Let organization managers grow and shape their team.
// Dependencies: crate::core, crate::interfaces, crate::runtime, base64, rand
// ============================================================================

//! ## Overview
//! Managers are ACTIVE members holding OWNER or ADMIN. Invites carry a
//! single-use random token and expire after the configured number of days;
//! issuing an invite for an email that already has one reuses the record with
//! a fresh token. Invite delivery is best-effort: a mailer failure is logged
//! and the invite is still returned with its accept link.
//!
//! Security posture: tokens are secrets and never appear in logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::core::CoreError;
use crate::core::Invite;
use crate::core::InviteId;
use crate::core::InviteIssued;
use crate::core::InviteStatus;
use crate::core::MemberProjects;
use crate::core::Membership;
use crate::core::MembershipId;
use crate::core::MembershipStatus;
use crate::core::Principal;
use crate::core::ProjectId;
use crate::core::Role;
use crate::core::TeamItem;
use crate::core::TeamListing;
use crate::core::UserId;
use crate::core::normalize_email;
use crate::interfaces::InviteEmail;
use crate::interfaces::ProjectScope;
use crate::runtime::access::OrgContext;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CacheKind;
use crate::runtime::workspace::Workspace;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Number of random bytes in an invite token.
const INVITE_TOKEN_BYTES: usize = 24;

/// Result of inviting an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// The email already belongs to an active member; nothing was issued.
    AlreadyMember(Membership),
    /// An invite was issued (or re-issued).
    Issued(InviteIssued),
}

/// Kinds invalidated when a member's access changes.
const MEMBER_LISTINGS: [CacheKind; 3] = [CacheKind::Team, CacheKind::Projects, CacheKind::Tasks];

/// Generates a URL-safe invite token.
fn generate_invite_token() -> String {
    let mut bytes = [0_u8; INVITE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Requires an ACTIVE OWNER or ADMIN membership.
fn ensure_can_manage(membership: Option<&Membership>) -> Result<&Membership, CoreError> {
    let membership = membership.ok_or_else(|| CoreError::forbidden("Membership not found"))?;
    if membership.status != MembershipStatus::Active {
        return Err(CoreError::forbidden("Inactive membership"));
    }
    if !matches!(membership.role, Role::Owner | Role::Admin) {
        return Err(CoreError::forbidden("Insufficient role"));
    }
    Ok(membership)
}

// ============================================================================
// SECTION: Listing
// ============================================================================

impl Workspace {
    /// Lists members and pending invites of the organization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dependency`] when the store fails.
    pub async fn list_team(&self, ctx: &OrgContext) -> Result<TeamListing, CoreError> {
        let key = CacheKey::scoped(CacheKind::Team, ctx.organization_id.as_str());
        if let Some(cached) = self.cache.get::<TeamListing>(&key).await {
            return Ok(cached);
        }
        let mut grants: BTreeMap<UserId, Vec<ProjectId>> = BTreeMap::new();
        for access in self.store.list_access_for_organization(&ctx.organization_id)? {
            grants.entry(access.user_id).or_default().push(access.project_id);
        }

        let mut items = Vec::new();
        let mut member_emails = BTreeSet::new();
        for membership in self.store.list_memberships_for_organization(&ctx.organization_id)? {
            let user = self.store.get_user(&membership.user_id)?;
            let email = user.as_ref().map(|user| user.email.clone()).unwrap_or_default();
            let name = user
                .as_ref()
                .and_then(|user| user.display_name.clone())
                .unwrap_or_else(|| email.clone());
            let project_ids = grants.get(&membership.user_id).cloned().unwrap_or_default();
            member_emails.insert(email.clone());
            items.push(TeamItem {
                id: membership.id.to_string(),
                user_id: Some(membership.user_id),
                name,
                email,
                role: membership.role,
                status: membership.status,
                project_count: project_ids.len(),
                project_ids,
                is_invite: false,
                invite_link: None,
            });
        }
        for invite in self.store.list_pending_invites(&ctx.organization_id, self.now())? {
            if member_emails.contains(&invite.email) {
                continue;
            }
            items.push(TeamItem {
                id: invite.id.to_string(),
                user_id: None,
                name: String::new(),
                invite_link: Some(self.invite_link(&invite.token)),
                email: invite.email,
                role: invite.role,
                status: MembershipStatus::Invited,
                project_count: 0,
                project_ids: Vec::new(),
                is_invite: true,
            });
        }

        let listing = TeamListing {
            items,
        };
        self.cache.set(&key, &listing).await;
        Ok(listing)
    }

    // ========================================================================
    // SECTION: Invites
    // ========================================================================

    /// Sends the invite email, logging delivery failures.
    async fn deliver_invite(&self, invite: &Invite, inviter: &Principal, invite_link: &str) {
        let organization_name = match self.store.get_organization(&invite.organization_id) {
            Ok(organization) => organization.map(|organization| organization.name),
            Err(err) => {
                tracing::warn!(error = %err, "organization lookup for invite email failed");
                None
            }
        };
        let email = InviteEmail {
            to: invite.email.clone(),
            invite_link: invite_link.to_string(),
            organization_name,
            inviter_name: inviter.display_name.clone().unwrap_or_else(|| inviter.email.clone()),
        };
        if let Err(err) = self.mailer.send_invite(&email).await {
            tracing::warn!(
                invite_id = %invite.id,
                error = %err,
                "invite email delivery failed"
            );
        }
    }

    /// Invites an email address into the organization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Forbidden`] unless the caller is an active manager
    /// or when the invitee is deactivated, and [`CoreError::Validation`] for a
    /// blank email or the OWNER role.
    pub async fn invite_member(
        &self,
        ctx: &OrgContext,
        email: Option<&str>,
        role: Option<Role>,
    ) -> Result<InviteOutcome, CoreError> {
        ensure_can_manage(Some(&ctx.membership))?;
        let email = normalize_email(email.unwrap_or_default());
        if email.is_empty() {
            return Err(CoreError::validation("Email is required"));
        }
        let role = role.unwrap_or(Role::Member);
        if role == Role::Owner {
            return Err(CoreError::validation("Cannot invite an owner role"));
        }

        if let Some(user) = self.store.find_user_by_email(&email)? {
            match self.store.find_membership(&user.id, &ctx.organization_id)? {
                Some(membership) if membership.status == MembershipStatus::Active => {
                    return Ok(InviteOutcome::AlreadyMember(membership));
                }
                Some(membership) if membership.status == MembershipStatus::Deactivated => {
                    return Err(CoreError::forbidden("User is deactivated"));
                }
                Some(mut membership) => {
                    membership.role = role;
                    self.store.update_membership(&membership)?;
                }
                None => {
                    self.store.insert_membership(&Membership {
                        id: MembershipId::generate(),
                        user_id: user.id,
                        organization_id: ctx.organization_id.clone(),
                        role,
                        status: MembershipStatus::Invited,
                        created_at: self.now(),
                    })?;
                }
            }
        }

        let now = self.now();
        let invite = self.store.upsert_invite(&Invite {
            id: InviteId::generate(),
            organization_id: ctx.organization_id.clone(),
            email,
            role,
            token: generate_invite_token(),
            status: InviteStatus::Invited,
            invited_by: ctx.user_id().clone(),
            expires_at: now.plus_days(self.settings.invite_expiry_days),
            accepted_at: None,
            created_at: now,
        })?;
        let invite_link = self.invite_link(&invite.token);
        self.deliver_invite(&invite, &ctx.principal, &invite_link).await;
        self.invalidate(ctx.organization_id.as_str(), &[CacheKind::Team]).await;
        tracing::info!(invite_id = %invite.id, organization_id = %invite.organization_id, "invite issued");
        Ok(InviteOutcome::Issued(InviteIssued {
            invite,
            invite_link,
        }))
    }

    /// Loads a pending invite and checks the principal may manage it.
    fn managed_invite(&self, principal: &Principal, invite_id: &InviteId) -> Result<Invite, CoreError> {
        let invite = self
            .store
            .get_invite(invite_id)?
            .filter(|invite| invite.status == InviteStatus::Invited)
            .ok_or_else(|| CoreError::not_found("Invite not found"))?;
        let requester = self.store.find_membership(&principal.id, &invite.organization_id)?;
        ensure_can_manage(requester.as_ref())?;
        Ok(invite)
    }

    /// Re-issues a pending invite with a fresh token and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] unless the invite is pending and
    /// [`CoreError::Forbidden`] unless the caller manages its organization.
    pub async fn resend_invite(
        &self,
        principal: &Principal,
        invite_id: &InviteId,
    ) -> Result<InviteIssued, CoreError> {
        let mut invite = self.managed_invite(principal, invite_id)?;
        invite.token = generate_invite_token();
        invite.expires_at = self.now().plus_days(self.settings.invite_expiry_days);
        invite.invited_by = principal.id.clone();
        self.store.update_invite(&invite)?;
        let invite_link = self.invite_link(&invite.token);
        self.deliver_invite(&invite, principal, &invite_link).await;
        self.invalidate(invite.organization_id.as_str(), &[CacheKind::Team]).await;
        Ok(InviteIssued {
            invite,
            invite_link,
        })
    }

    /// Cancels a pending invite.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] unless the invite is pending and
    /// [`CoreError::Forbidden`] unless the caller manages its organization.
    pub async fn cancel_invite(
        &self,
        principal: &Principal,
        invite_id: &InviteId,
    ) -> Result<Invite, CoreError> {
        let mut invite = self.managed_invite(principal, invite_id)?;
        invite.status = InviteStatus::Cancelled;
        self.store.update_invite(&invite)?;
        self.invalidate(invite.organization_id.as_str(), &[CacheKind::Team]).await;
        Ok(invite)
    }

    /// Accepts an invite on behalf of the signed-in principal.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a blank token,
    /// [`CoreError::NotFound`] unless the invite is pending, [`CoreError::Gone`]
    /// once it has expired, and [`CoreError::Forbidden`] for an email mismatch
    /// or a deactivated membership.
    pub async fn accept_invite(
        &self,
        principal: &Principal,
        token: Option<&str>,
    ) -> Result<Membership, CoreError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CoreError::validation("Invite token required"))?;
        let mut invite = self
            .store
            .find_invite_by_token(token)?
            .filter(|invite| invite.status == InviteStatus::Invited)
            .ok_or_else(|| CoreError::not_found("Invite not found"))?;
        let now = self.now();
        if invite.expires_at < now {
            return Err(CoreError::Gone("Invite has expired".to_string()));
        }
        if normalize_email(&principal.email) != invite.email {
            return Err(CoreError::forbidden("Invite email does not match account"));
        }

        let membership = match self.store.find_membership(&principal.id, &invite.organization_id)? {
            Some(membership) if membership.status == MembershipStatus::Deactivated => {
                return Err(CoreError::forbidden("Membership is deactivated"));
            }
            Some(mut membership) => {
                membership.status = MembershipStatus::Active;
                self.store.update_membership(&membership)?;
                membership
            }
            None => {
                let membership = Membership {
                    id: MembershipId::generate(),
                    user_id: principal.id.clone(),
                    organization_id: invite.organization_id.clone(),
                    role: invite.role,
                    status: MembershipStatus::Active,
                    created_at: now,
                };
                self.store.insert_membership(&membership)?;
                membership
            }
        };
        invite.status = InviteStatus::Accepted;
        invite.accepted_at = Some(now);
        self.store.update_invite(&invite)?;
        self.invalidate(invite.organization_id.as_str(), &MEMBER_LISTINGS).await;
        self.invalidate(principal.id.as_str(), &[CacheKind::Orgs]).await;
        tracing::info!(invite_id = %invite.id, user_id = %principal.id, "invite accepted");
        Ok(membership)
    }

    // ========================================================================
    // SECTION: Membership Administration
    // ========================================================================

    /// Loads a target membership and the requester's membership in its org.
    fn target_and_requester(
        &self,
        principal: &Principal,
        membership_id: &MembershipId,
    ) -> Result<(Membership, Option<Membership>), CoreError> {
        let target = self
            .store
            .get_membership(membership_id)?
            .ok_or_else(|| CoreError::not_found("Member not found"))?;
        let requester = self.store.find_membership(&principal.id, &target.organization_id)?;
        Ok((target, requester))
    }

    /// Deactivates a member and clears their project grants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for an unknown membership,
    /// [`CoreError::Validation`] when targeting the owner or oneself, and
    /// [`CoreError::Forbidden`] when an admin targets a non-member role.
    pub async fn deactivate_member(
        &self,
        principal: &Principal,
        membership_id: &MembershipId,
    ) -> Result<Membership, CoreError> {
        let (mut target, requester) = self.target_and_requester(principal, membership_id)?;
        let requester = ensure_can_manage(requester.as_ref())?;
        if target.role == Role::Owner {
            return Err(CoreError::validation("Owner cannot be deactivated"));
        }
        if target.user_id == principal.id {
            return Err(CoreError::validation("You cannot deactivate yourself"));
        }
        if requester.role == Role::Admin && target.role != Role::Member {
            return Err(CoreError::forbidden("Admins can only deactivate members"));
        }
        target.status = MembershipStatus::Deactivated;
        self.store.update_membership(&target)?;
        self.store.replace_access(&target.user_id, &target.organization_id, &[], self.now())?;
        self.invalidate(target.organization_id.as_str(), &MEMBER_LISTINGS).await;
        tracing::info!(membership_id = %target.id, "member deactivated");
        Ok(target)
    }

    /// Changes a member's role between ADMIN and MEMBER.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for an invalid role, self-changes, or
    /// owner targets, [`CoreError::NotFound`] for an unknown membership, and
    /// [`CoreError::Forbidden`] unless the caller is an active manager.
    pub async fn update_member_role(
        &self,
        principal: &Principal,
        membership_id: &MembershipId,
        role: Option<&str>,
    ) -> Result<Membership, CoreError> {
        let role = role
            .and_then(Role::parse)
            .filter(|role| *role != Role::Owner)
            .ok_or_else(|| CoreError::validation("Invalid role"))?;
        let (mut target, requester) = self.target_and_requester(principal, membership_id)?;
        let Some(requester) =
            requester.filter(|requester| requester.status == MembershipStatus::Active)
        else {
            return Err(CoreError::forbidden("Membership is inactive"));
        };
        if !matches!(requester.role, Role::Owner | Role::Admin) {
            return Err(CoreError::forbidden("Insufficient role to change roles"));
        }
        if target.user_id == principal.id {
            return Err(CoreError::validation("You cannot change your own role"));
        }
        if target.role == Role::Owner {
            if requester.role == Role::Admin {
                return Err(CoreError::forbidden("Admins cannot change owner role"));
            }
            return Err(CoreError::validation("Owner role cannot be changed"));
        }
        target.role = role;
        self.store.update_membership(&target)?;
        self.invalidate(target.organization_id.as_str(), &MEMBER_LISTINGS).await;
        self.invalidate(target.user_id.as_str(), &[CacheKind::Orgs]).await;
        Ok(target)
    }

    /// Replaces a member's project grants within the organization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for an unknown membership,
    /// [`CoreError::Validation`] for the owner, and [`CoreError::Forbidden`]
    /// unless the caller is an active manager.
    pub async fn update_member_projects(
        &self,
        principal: &Principal,
        membership_id: &MembershipId,
        project_ids: &[ProjectId],
    ) -> Result<MemberProjects, CoreError> {
        let (target, requester) = self.target_and_requester(principal, membership_id)?;
        ensure_can_manage(requester.as_ref())?;
        if target.role == Role::Owner {
            return Err(CoreError::validation("Owner access cannot be changed here"));
        }
        let in_org: BTreeSet<ProjectId> = self
            .store
            .list_projects(&target.organization_id, &ProjectScope::All)?
            .into_iter()
            .map(|project| project.id)
            .collect();
        let mut seen = BTreeSet::new();
        let filtered: Vec<ProjectId> = project_ids
            .iter()
            .filter(|id| in_org.contains(*id) && seen.insert((*id).clone()))
            .cloned()
            .collect();
        self.store.replace_access(&target.user_id, &target.organization_id, &filtered, self.now())?;
        self.invalidate(target.organization_id.as_str(), &MEMBER_LISTINGS).await;
        Ok(MemberProjects {
            user_id: target.user_id,
            project_ids: filtered,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
