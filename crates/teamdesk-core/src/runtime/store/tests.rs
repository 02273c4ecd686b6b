// crates/teamdesk-core/src/runtime/store/tests.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Unit tests for uniqueness, cascades, and scoped queries.
// Purpose: Keep the in-memory store aligned with the relational store rules.
// Dependencies: teamdesk-core
// ============================================================================

//! ## Overview
//! Exercises the in-memory store directly, without the domain services.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use super::InMemoryWorkspaceStore;
use crate::core::Activity;
use crate::core::ActivityId;
use crate::core::ActivityType;
use crate::core::AttachmentId;
use crate::core::Invite;
use crate::core::InviteId;
use crate::core::InviteStatus;
use crate::core::Membership;
use crate::core::MembershipId;
use crate::core::MembershipStatus;
use crate::core::Organization;
use crate::core::OrganizationId;
use crate::core::Project;
use crate::core::ProjectAccess;
use crate::core::ProjectId;
use crate::core::Role;
use crate::core::Task;
use crate::core::TaskAttachment;
use crate::core::TaskId;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::ActivityQuery;
use crate::interfaces::ActivityStore;
use crate::interfaces::DirectoryStore;
use crate::interfaces::ProjectScope;
use crate::interfaces::ProjectStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn at(millis: i64) -> Timestamp {
    Timestamp::from_unix_millis(millis)
}

fn membership(id: &str, user: &str, org: &str, role: Role) -> Membership {
    Membership {
        id: MembershipId::new(id),
        user_id: UserId::new(user),
        organization_id: OrganizationId::new(org),
        role,
        status: MembershipStatus::Active,
        created_at: at(0),
    }
}

fn project(id: &str, org: &str, created: i64) -> Project {
    Project {
        id: ProjectId::new(id),
        organization_id: OrganizationId::new(org),
        owner_id: UserId::new("owner"),
        name: id.to_string(),
        description: None,
        is_private: false,
        cover_image: None,
        created_at: at(created),
        updated_at: at(created),
    }
}

fn task(id: &str, project: &str, creator: &str) -> Task {
    Task {
        id: TaskId::new(id),
        project_id: ProjectId::new(project),
        creator_id: UserId::new(creator),
        title: id.to_string(),
        description: None,
        status: "todo".to_string(),
        priority: "medium".to_string(),
        due_date: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

fn activity(id: &str, org: &str, project: Option<&str>, created: i64) -> Activity {
    Activity {
        id: ActivityId::new(id),
        organization_id: OrganizationId::new(org),
        activity_type: ActivityType::TaskCreated,
        message: "created a task".to_string(),
        actor_id: UserId::new("actor"),
        project_id: project.map(ProjectId::new),
        task_id: None,
        created_at: at(created),
    }
}

// ============================================================================
// SECTION: Directory
// ============================================================================

#[test]
fn membership_pair_is_unique() {
    let store = InMemoryWorkspaceStore::new();
    store.insert_membership(&membership("m1", "u1", "o1", Role::Member)).unwrap();
    let err = store.insert_membership(&membership("m2", "u1", "o1", Role::Admin)).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    store.insert_membership(&membership("m3", "u1", "o2", Role::Admin)).unwrap();
    assert_eq!(store.list_memberships_for_user(&UserId::new("u1")).unwrap().len(), 2);
}

#[test]
fn organization_insert_writes_owner_membership() {
    let store = InMemoryWorkspaceStore::new();
    let org = Organization {
        id: OrganizationId::new("o1"),
        name: "Acme".to_string(),
        owner_id: UserId::new("u1"),
        created_at: at(0),
    };
    store.insert_organization(&org, &membership("m1", "u1", "o1", Role::Owner)).unwrap();
    let found = store.find_membership(&UserId::new("u1"), &OrganizationId::new("o1")).unwrap();
    assert_eq!(found.unwrap().role, Role::Owner);
}

#[test]
fn invite_upsert_reuses_row_for_same_email() {
    let store = InMemoryWorkspaceStore::new();
    let first = Invite {
        id: InviteId::new("i1"),
        organization_id: OrganizationId::new("o1"),
        email: "a@example.com".to_string(),
        role: Role::Member,
        token: "t1".to_string(),
        status: InviteStatus::Cancelled,
        invited_by: UserId::new("u1"),
        expires_at: at(100),
        accepted_at: None,
        created_at: at(1),
    };
    store.upsert_invite(&first).unwrap();
    let second = Invite {
        id: InviteId::new("i2"),
        token: "t2".to_string(),
        status: InviteStatus::Invited,
        created_at: at(50),
        ..first.clone()
    };
    let stored = store.upsert_invite(&second).unwrap();
    assert_eq!(stored.id, InviteId::new("i1"));
    assert_eq!(stored.created_at, at(1));
    assert_eq!(stored.token, "t2");
    assert!(store.find_invite_by_token("t1").unwrap().is_none());
    assert_eq!(store.list_pending_invites(&OrganizationId::new("o1"), at(99)).unwrap().len(), 1);
    assert!(store.list_pending_invites(&OrganizationId::new("o1"), at(100)).unwrap().is_empty());
}

// ============================================================================
// SECTION: Projects and Tasks
// ============================================================================

#[test]
fn scoped_listing_filters_by_org_and_grants() {
    let store = InMemoryWorkspaceStore::new();
    store.insert_project(&project("p2", "o1", 2)).unwrap();
    store.insert_project(&project("p1", "o1", 1)).unwrap();
    store.insert_project(&project("p3", "o2", 3)).unwrap();
    store.insert_task(&task("t1", "p1", "u1")).unwrap();
    store.insert_task(&task("t2", "p2", "u1")).unwrap();
    store.insert_task(&task("t3", "p3", "u1")).unwrap();

    let org = OrganizationId::new("o1");
    let all = store.list_projects(&org, &ProjectScope::All).unwrap();
    assert_eq!(all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["p1", "p2"]);

    let only = ProjectScope::Only(BTreeSet::from([ProjectId::new("p2"), ProjectId::new("p3")]));
    let scoped = store.list_projects(&org, &only).unwrap();
    assert_eq!(scoped.len(), 1);
    let tasks = store.list_tasks(&org, &only).unwrap();
    assert_eq!(tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["t2"]);
}

#[test]
fn grants_are_idempotent_and_replaceable_per_org() {
    let store = InMemoryWorkspaceStore::new();
    store.insert_project(&project("p1", "o1", 1)).unwrap();
    store.insert_project(&project("p2", "o1", 2)).unwrap();
    store.insert_project(&project("p3", "o2", 3)).unwrap();
    let user = UserId::new("u1");
    let grant = ProjectAccess {
        project_id: ProjectId::new("p1"),
        user_id: user.clone(),
        granted_at: at(5),
    };
    store.grant_access(&grant).unwrap();
    let again = store.grant_access(&ProjectAccess {
        granted_at: at(9),
        ..grant.clone()
    });
    assert_eq!(again.unwrap().granted_at, at(5));
    store
        .grant_access(&ProjectAccess {
            project_id: ProjectId::new("p3"),
            user_id: user.clone(),
            granted_at: at(5),
        })
        .unwrap();

    store
        .replace_access(
            &user,
            &OrganizationId::new("o1"),
            &[ProjectId::new("p2"), ProjectId::new("p3")],
            at(10),
        )
        .unwrap();
    let o1 = store.accessible_project_ids(&user, &OrganizationId::new("o1")).unwrap();
    assert_eq!(o1, BTreeSet::from([ProjectId::new("p2")]));
    assert!(store.has_access(&ProjectId::new("p3"), &user).unwrap());
    assert!(store.revoke_access(&ProjectId::new("p2"), &user).unwrap());
    assert!(!store.revoke_access(&ProjectId::new("p2"), &user).unwrap());
}

#[test]
fn project_delete_cascades_to_tasks_and_children() {
    let store = InMemoryWorkspaceStore::new();
    store.insert_project(&project("p1", "o1", 1)).unwrap();
    store.insert_task(&task("t1", "p1", "u1")).unwrap();
    store.replace_assignees(&TaskId::new("t1"), &[UserId::new("u2")]).unwrap();
    store
        .insert_attachment(&TaskAttachment {
            id: AttachmentId::new("a1"),
            task_id: TaskId::new("t1"),
            name: "spec.pdf".to_string(),
            content_type: None,
            data_url: "data:,".to_string(),
            uploaded_by: UserId::new("u1"),
            created_at: at(0),
        })
        .unwrap();
    store
        .grant_access(&ProjectAccess {
            project_id: ProjectId::new("p1"),
            user_id: UserId::new("u2"),
            granted_at: at(0),
        })
        .unwrap();

    store.delete_project(&ProjectId::new("p1")).unwrap();
    assert!(store.get_task(&TaskId::new("t1")).unwrap().is_none());
    assert!(store.list_assignees(&TaskId::new("t1")).unwrap().is_empty());
    assert!(store.get_attachment(&AttachmentId::new("a1")).unwrap().is_none());
    assert!(!store.has_access(&ProjectId::new("p1"), &UserId::new("u2")).unwrap());
}

#[test]
fn tasks_involving_include_created_and_assigned() {
    let store = InMemoryWorkspaceStore::new();
    store.insert_project(&project("p1", "o1", 1)).unwrap();
    store.insert_task(&task("t1", "p1", "u1")).unwrap();
    store.insert_task(&task("t2", "p1", "u2")).unwrap();
    store.insert_task(&task("t3", "p1", "u2")).unwrap();
    store.replace_assignees(&TaskId::new("t2"), &[UserId::new("u1"), UserId::new("u1")]).unwrap();
    assert_eq!(store.list_assignees(&TaskId::new("t2")).unwrap().len(), 1);

    let tasks =
        store.list_tasks_involving(&UserId::new("u1"), &[OrganizationId::new("o1")]).unwrap();
    assert_eq!(tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["t1", "t2"]);
    assert!(
        store.list_tasks_involving(&UserId::new("u1"), &[OrganizationId::new("o2")]).unwrap().is_empty()
    );
}

// ============================================================================
// SECTION: Activity
// ============================================================================

#[test]
fn activity_query_filters_orders_and_pages() {
    let store = InMemoryWorkspaceStore::new();
    for (index, created) in [10, 30, 20, 40].into_iter().enumerate() {
        store.insert_activity(&activity(&format!("a{index}"), "o1", Some("p1"), created)).unwrap();
    }
    store.insert_activity(&activity("other", "o2", Some("p9"), 50)).unwrap();
    store.insert_activity(&activity("noproj", "o1", None, 60)).unwrap();

    let query = ActivityQuery {
        organization_ids: vec![OrganizationId::new("o1")],
        project_id: Some(ProjectId::new("p1")),
        actor_id: None,
        from: Some(at(15)),
        to: None,
        offset: 1,
        limit: 2,
    };
    let page = store.list_activities(&query).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(
        page.items.iter().map(|a| a.created_at.as_unix_millis()).collect::<Vec<_>>(),
        vec![30, 20]
    );

    let everything = store
        .list_activities(&ActivityQuery {
            project_id: None,
            from: None,
            offset: 0,
            limit: 100,
            ..query
        })
        .unwrap();
    assert_eq!(everything.total, 5);
    assert_eq!(everything.items[0].id, ActivityId::new("noproj"));
}
