// crates/teamdesk-core/tests/team_lifecycle.rs
// ============================================================================
// Module: Team Lifecycle Tests
// Description: Invites, acceptance, role changes, deactivation, and grants.
// Purpose: Ensure owner memberships are immutable and invite tokens single-use.
// ============================================================================

//! ## Overview
//! Exercises team management end to end with a recording mailer and a manual
//! clock driving invite expiry.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use common::Harness;
use teamdesk_core::CoreError;
use teamdesk_core::DirectoryStore;
use teamdesk_core::InviteEmail;
use teamdesk_core::InviteIssued;
use teamdesk_core::InviteMailer;
use teamdesk_core::InviteOutcome;
use teamdesk_core::InviteStatus;
use teamdesk_core::MailerError;
use teamdesk_core::MembershipStatus;
use teamdesk_core::NewProject;
use teamdesk_core::Organization;
use teamdesk_core::Principal;
use teamdesk_core::ProjectId;
use teamdesk_core::Role;
use teamdesk_core::Workspace;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<InviteEmail>>,
}

#[async_trait]
impl InviteMailer for RecordingMailer {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct RefusingMailer;

#[async_trait]
impl InviteMailer for RefusingMailer {
    async fn send_invite(&self, _email: &InviteEmail) -> Result<(), MailerError> {
        Err(MailerError::Delivery("smtp down".to_string()))
    }
}

async fn issue(harness: &Harness, org: &Organization, inviter: &Principal, email: &str) -> InviteIssued {
    let ctx = harness.ctx(inviter, org);
    match harness.workspace.invite_member(&ctx, Some(email), Some(Role::Member)).await.unwrap() {
        InviteOutcome::Issued(issued) => issued,
        InviteOutcome::AlreadyMember(_) => panic!("expected a fresh invite"),
    }
}

fn with_mailer(harness: Harness, mailer: Arc<dyn InviteMailer>) -> Harness {
    let Harness {
        workspace,
        store,
        cache,
        clock,
    } = harness;
    let workspace: Workspace = workspace.with_mailer(mailer);
    Harness {
        workspace,
        store,
        cache,
        clock,
    }
}

#[tokio::test]
async fn invite_accept_flow_creates_an_active_membership() {
    let mailer = Arc::new(RecordingMailer::default());
    let harness = with_mailer(Harness::new(), mailer.clone());
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;

    let issued = issue(&harness, &org, &owner, "  New.Hire@Example.com ").await;
    assert_eq!(issued.invite.email, "new.hire@example.com");
    assert!(issued.invite_link.starts_with("http://localhost:5173/invite/accept?token="));
    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].organization_name.as_deref(), Some("Acme"));

    let ctx = harness.ctx(&owner, &org);
    let team = harness.workspace.list_team(&ctx).await.unwrap();
    assert_eq!(team.items.len(), 2);
    assert!(team.items[1].is_invite);

    let hire = harness.principal("new.hire@example.com");
    let membership =
        harness.workspace.accept_invite(&hire, Some(&issued.invite.token)).await.unwrap();
    assert_eq!(membership.role, Role::Member);
    assert_eq!(membership.status, MembershipStatus::Active);

    let team = harness.workspace.list_team(&ctx).await.unwrap();
    assert_eq!(team.items.len(), 2);
    assert!(team.items.iter().all(|item| !item.is_invite));
}

#[tokio::test]
async fn mailer_failures_do_not_fail_the_invite() {
    let harness = with_mailer(Harness::new(), Arc::new(RefusingMailer));
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let issued = issue(&harness, &org, &owner, "x@example.com").await;
    assert_eq!(issued.invite.status, InviteStatus::Invited);
}

#[tokio::test]
async fn accepted_and_resent_tokens_are_single_use() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let first = issue(&harness, &org, &owner, "hire@example.com").await;

    let resent = harness.workspace.resend_invite(&owner, &first.invite.id).await.unwrap();
    assert_eq!(resent.invite.id, first.invite.id);
    assert_ne!(resent.invite.token, first.invite.token);

    let hire = harness.principal("hire@example.com");
    let err = harness.workspace.accept_invite(&hire, Some(&first.invite.token)).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("Invite not found"));

    harness.workspace.accept_invite(&hire, Some(&resent.invite.token)).await.unwrap();
    let err = harness.workspace.accept_invite(&hire, Some(&resent.invite.token)).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("Invite not found"));
}

#[tokio::test]
async fn cancelled_invites_cannot_be_accepted() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let issued = issue(&harness, &org, &owner, "hire@example.com").await;
    harness.workspace.cancel_invite(&owner, &issued.invite.id).await.unwrap();

    let hire = harness.principal("hire@example.com");
    let err = harness.workspace.accept_invite(&hire, Some(&issued.invite.token)).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("Invite not found"));
    let err = harness.workspace.resend_invite(&owner, &issued.invite.id).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("Invite not found"));
}

#[tokio::test]
async fn acceptance_checks_expiry_and_email() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let issued = issue(&harness, &org, &owner, "hire@example.com").await;

    let imposter = harness.principal("imposter@example.com");
    let err =
        harness.workspace.accept_invite(&imposter, Some(&issued.invite.token)).await.unwrap_err();
    assert_eq!(err, CoreError::forbidden("Invite email does not match account"));

    let err = harness.workspace.accept_invite(&imposter, Some("   ")).await.unwrap_err();
    assert_eq!(err, CoreError::validation("Invite token required"));

    harness.clock.advance(Duration::from_secs(8 * 24 * 60 * 60));
    let hire = harness.principal("hire@example.com");
    let err = harness.workspace.accept_invite(&hire, Some(&issued.invite.token)).await.unwrap_err();
    assert_eq!(err, CoreError::Gone("Invite has expired".to_string()));
}

#[tokio::test]
async fn invites_reject_owner_role_and_report_existing_members() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &member, Role::Member);
    let ctx = harness.ctx(&owner, &org);

    let err = harness
        .workspace
        .invite_member(&ctx, Some("boss@example.com"), Some(Role::Owner))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::validation("Cannot invite an owner role"));
    let err = harness.workspace.invite_member(&ctx, Some("  "), None).await.unwrap_err();
    assert_eq!(err, CoreError::validation("Email is required"));

    let outcome =
        harness.workspace.invite_member(&ctx, Some("member@example.com"), None).await.unwrap();
    assert!(matches!(outcome, InviteOutcome::AlreadyMember(_)));

    let member_ctx = harness.ctx(&member, &org);
    let err = harness
        .workspace
        .invite_member(&member_ctx, Some("friend@example.com"), None)
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("Insufficient role"));
}

#[tokio::test]
async fn owner_membership_is_immutable_for_every_requester() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let admin = harness.principal("admin@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &admin, Role::Admin);
    let owner_membership = harness.ctx(&owner, &org).membership;

    let err = harness.workspace.deactivate_member(&admin, &owner_membership.id).await.unwrap_err();
    assert_eq!(err, CoreError::validation("Owner cannot be deactivated"));
    let err = harness.workspace.deactivate_member(&owner, &owner_membership.id).await.unwrap_err();
    assert_eq!(err, CoreError::validation("Owner cannot be deactivated"));
    let admin_membership = harness.ctx(&admin, &org).membership;
    let err = harness.workspace.deactivate_member(&admin, &admin_membership.id).await.unwrap_err();
    assert_eq!(err, CoreError::validation("You cannot deactivate yourself"));

    let err = harness
        .workspace
        .update_member_role(&admin, &owner_membership.id, Some("MEMBER"))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("Admins cannot change owner role"));
    let err = harness
        .workspace
        .update_member_role(&owner, &owner_membership.id, Some("ADMIN"))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::validation("You cannot change your own role"));
    let err = harness
        .workspace
        .update_member_role(&owner, &owner_membership.id, Some("OWNER"))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::validation("Invalid role"));

    let outsider = harness.principal("outsider@example.com");
    let admin_membership = harness.ctx(&admin, &org).membership;
    let err = harness
        .workspace
        .update_member_role(&outsider, &admin_membership.id, Some("MEMBER"))
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("Membership is inactive"));
}

#[tokio::test]
async fn admins_only_deactivate_members_and_deactivation_blocks_reinvite() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let admin = harness.principal("admin@example.com");
    let other_admin = harness.principal("admin2@example.com");
    let member = harness.principal("member@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &admin, Role::Admin);
    let other = harness.join(&org, &other_admin, Role::Admin);
    let target = harness.join(&org, &member, Role::Member);

    let err = harness.workspace.deactivate_member(&admin, &other.id).await.unwrap_err();
    assert_eq!(err, CoreError::forbidden("Admins can only deactivate members"));

    let deactivated = harness.workspace.deactivate_member(&admin, &target.id).await.unwrap();
    assert_eq!(deactivated.status, MembershipStatus::Deactivated);

    let ctx = harness.ctx(&owner, &org);
    let err = harness
        .workspace
        .invite_member(&ctx, Some("member@example.com"), None)
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("User is deactivated"));
}

#[tokio::test]
async fn role_changes_apply_between_admin_and_member() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let target = harness.join(&org, &member, Role::Member);

    let promoted =
        harness.workspace.update_member_role(&owner, &target.id, Some("ADMIN")).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);
    let stored = harness.store.get_membership(&target.id).unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);

    let err = harness.workspace.update_member_role(&member, &target.id, Some("MEMBER")).await;
    assert_eq!(err.unwrap_err(), CoreError::validation("You cannot change your own role"));
}

#[tokio::test]
async fn member_project_replacement_filters_to_the_organization() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let other_org = harness.organization(&owner, "Globex").await;
    let target = harness.join(&org, &member, Role::Member);

    let ctx = harness.ctx(&owner, &org);
    let project = harness
        .workspace
        .create_project(&ctx, NewProject {
            name: Some("Mine".to_string()),
            ..NewProject::default()
        })
        .await
        .unwrap();
    let foreign = harness
        .workspace
        .create_project(&harness.ctx(&owner, &other_org), NewProject {
            name: Some("Theirs".to_string()),
            ..NewProject::default()
        })
        .await
        .unwrap();

    let replaced = harness
        .workspace
        .update_member_projects(&owner, &target.id, &[
            project.id.clone(),
            foreign.id.clone(),
            project.id.clone(),
            ProjectId::new("missing"),
        ])
        .await
        .unwrap();
    assert_eq!(replaced.project_ids, vec![project.id.clone()]);

    let team = harness.workspace.list_team(&ctx).await.unwrap();
    let row = team.items.iter().find(|item| item.user_id.as_ref() == Some(&member.id)).unwrap();
    assert_eq!(row.project_count, 1);

    let owner_membership = ctx.membership.clone();
    let err = harness
        .workspace
        .update_member_projects(&owner, &owner_membership.id, &[project.id])
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::validation("Owner access cannot be changed here"));
}
