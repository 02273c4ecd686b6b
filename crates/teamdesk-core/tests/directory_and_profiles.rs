// crates/teamdesk-core/tests/directory_and_profiles.rs
// ============================================================================
// Module: Directory and Profile Tests
// Description: Sign-in provisioning, organizations, and profile views.
// Purpose: Ensure principals stay stable across providers and profiles stay tenant-scoped.
// ============================================================================

//! ## Overview
//! Covers principal provisioning, organization listings, and own/other profile
//! views including completion statistics.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::Harness;
use teamdesk_core::CoreError;
use teamdesk_core::MemberAddition;
use teamdesk_core::NewProject;
use teamdesk_core::NewTask;
use teamdesk_core::ProfileUpdate;
use teamdesk_core::Role;
use teamdesk_core::VerifiedIdentity;

fn identity(subject: &str, email: &str, name: Option<&str>) -> VerifiedIdentity {
    VerifiedIdentity {
        subject_id: subject.to_string(),
        email: email.to_string(),
        display_name: name.map(str::to_string),
        provider: "google".to_string(),
    }
}

#[tokio::test]
async fn sign_in_links_by_email_and_keeps_the_principal_id() {
    let harness = Harness::new();
    let first =
        harness.workspace.sign_in(&identity("sub-a", "Ada@Example.com", None)).await.unwrap();
    assert!(!first.has_organization);
    assert_eq!(first.user.email, "ada@example.com");
    assert_eq!(first.user.display_name, None);

    let second =
        harness.workspace.sign_in(&identity("sub-b", "ada@example.com", Some("Ada"))).await.unwrap();
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(second.user.display_name.as_deref(), Some("Ada"));

    let third =
        harness.workspace.sign_in(&identity("sub-a", "ada@example.com", Some("Other"))).await.unwrap();
    assert_eq!(third.user.display_name.as_deref(), Some("Ada"));

    let err = harness.workspace.sign_in(&identity("sub-c", "  ", None)).await.unwrap_err();
    assert_eq!(err, CoreError::validation("No email found in token"));
}

#[tokio::test]
async fn resolve_principal_never_provisions() {
    let harness = Harness::new();
    let err = harness.workspace.resolve_principal(&identity("sub-x", "x@example.com", None)).unwrap_err();
    assert_eq!(err, CoreError::not_found("User not found"));
    assert!(harness.workspace.sign_in(&identity("sub-x", "x@example.com", None)).await.is_ok());

    let by_subject =
        harness.workspace.resolve_principal(&identity("sub-x", "other@example.com", None)).unwrap();
    let by_email =
        harness.workspace.resolve_principal(&identity("sub-y", " X@Example.com ", Some("X"))).unwrap();
    assert_eq!(by_subject.id, by_email.id);
    assert_eq!(by_email.display_name, None);
}

#[tokio::test]
async fn sign_in_backfilled_name_reaches_cached_team_listing() {
    let harness = Harness::new();
    let session =
        harness.workspace.sign_in(&identity("sub-ada", "ada@example.com", None)).await.unwrap();
    let org = harness.organization(&session.user, "Acme").await;
    let ctx = harness.ctx(&session.user, &org);
    let team = harness.workspace.list_team(&ctx).await.unwrap();
    assert_eq!(team.items[0].name, "ada@example.com");
    assert_eq!(harness.workspace.list_my_organizations(&session.user).await.unwrap().len(), 1);

    let renamed =
        harness.workspace.sign_in(&identity("sub-ada", "ada@example.com", Some("Ada"))).await.unwrap();
    assert_eq!(renamed.user.display_name.as_deref(), Some("Ada"));
    let team = harness.workspace.list_team(&ctx).await.unwrap();
    assert_eq!(team.items[0].name, "Ada");
}

#[tokio::test]
async fn organizations_are_listed_with_roles() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    assert!(harness.workspace.list_my_organizations(&owner).await.unwrap().is_empty());

    let org = harness.organization(&owner, "Acme").await;
    let listed = harness.workspace.list_my_organizations(&owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].role, Role::Owner);

    let err = harness.workspace.create_organization(&owner, Some("   ")).await.unwrap_err();
    assert_eq!(err, CoreError::validation("Organization name is required"));

    let ctx = harness.ctx(&owner, &org);
    let added = harness
        .workspace
        .add_existing_user(&ctx, "MEMBER@example.com", Some(Role::Admin))
        .await
        .unwrap();
    assert!(matches!(added, MemberAddition::Created(ref m) if m.role == Role::Admin));
    let again = harness.workspace.add_existing_user(&ctx, "member@example.com", None).await.unwrap();
    assert!(matches!(again, MemberAddition::Existing(_)));
    let err = harness.workspace.add_existing_user(&ctx, "ghost@example.com", None).await.unwrap_err();
    assert_eq!(err, CoreError::not_found("User not found"));

    let session = harness
        .workspace
        .sign_in(&identity("sub-member@example.com", "member@example.com", None))
        .await
        .unwrap();
    assert!(session.has_organization);
    assert_eq!(session.organizations[0].role, Role::Admin);
    assert_eq!(harness.workspace.list_my_organizations(&member).await.unwrap().len(), 1);
}

#[tokio::test]
async fn my_profile_reports_completed_projects_and_updates() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let ctx = harness.ctx(&owner, &org);
    let done = harness
        .workspace
        .create_project(&ctx, NewProject {
            name: Some("Done".to_string()),
            ..NewProject::default()
        })
        .await
        .unwrap();
    harness
        .workspace
        .create_project(&ctx, NewProject {
            name: Some("Empty".to_string()),
            ..NewProject::default()
        })
        .await
        .unwrap();
    harness
        .workspace
        .create_task(&ctx, NewTask {
            project_id: Some(done.id.clone()),
            title: Some("finish".to_string()),
            status: Some("Completed".to_string()),
            ..NewTask::default()
        })
        .await
        .unwrap();

    let profile = harness.workspace.get_my_profile(&owner).await.unwrap();
    assert_eq!(profile.profile.bio, "");
    assert_eq!(profile.completed_projects.len(), 1);
    assert_eq!(profile.completed_projects[0].id, done.id);
    assert_eq!(profile.organizations.len(), 1);

    let updated = harness
        .workspace
        .update_my_profile(&owner, ProfileUpdate {
            bio: Some("Builds things".to_string()),
            name: Some("The Owner".to_string()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.profile.bio, "Builds things");
    assert_eq!(updated.user.name.as_deref(), Some("The Owner"));
}

#[tokio::test]
async fn user_profiles_require_a_shared_organization() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    let stranger = harness.principal("stranger@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &member, Role::Member);
    let ctx = harness.ctx(&owner, &org);
    let project = harness
        .workspace
        .create_project(&ctx, NewProject {
            name: Some("Shared".to_string()),
            ..NewProject::default()
        })
        .await
        .unwrap();
    harness.workspace.grant_project_access(&ctx, &project.id, &member.id).await.unwrap();
    let task = harness
        .workspace
        .create_task(&ctx, NewTask {
            project_id: Some(project.id.clone()),
            title: Some("pair".to_string()),
            ..NewTask::default()
        })
        .await
        .unwrap();
    harness.workspace.update_task_assignees(&ctx, &task.id, &[member.id.clone()]).await.unwrap();

    let view = harness.workspace.get_user_profile(&owner, &member.id).unwrap();
    assert_eq!(view.organizations.len(), 1);
    assert_eq!(view.organizations[0].role, Role::Member);
    assert_eq!(view.projects.len(), 1);
    assert_eq!(view.projects[0].role, "Member");
    assert_eq!(view.projects[0].status, "Active");
    assert_eq!(view.stats.tasks_in_progress, 1);
    assert_eq!(view.stats.roles, vec![Role::Member]);

    let err = harness.workspace.get_user_profile(&stranger, &member.id).unwrap_err();
    assert_eq!(err, CoreError::forbidden("Forbidden"));
    let err = harness
        .workspace
        .get_user_profile(&owner, &teamdesk_core::UserId::new("ghost"))
        .unwrap_err();
    assert_eq!(err, CoreError::not_found("User not found"));
    assert!(harness.workspace.get_user_profile(&stranger, &stranger.id).is_ok());
}
