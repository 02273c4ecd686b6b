// crates/teamdesk-core/tests/activity_feed.rs
// ============================================================================
// Module: Activity Feed Tests
// Description: Best-effort recording, feed scoping, and explicit entries.
// Purpose: Ensure recorder failures never fail mutations and feeds stay tenant-scoped.
// ============================================================================

//! ## Overview
//! Uses a recorder that always fails to prove mutation isolation, then the
//! store-backed recorder to check feed ordering, filters, and paging.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::Harness;
use teamdesk_core::Activity;
use teamdesk_core::ActivityFilters;
use teamdesk_core::ActivityRecorder;
use teamdesk_core::ActivityType;
use teamdesk_core::CoreError;
use teamdesk_core::NewActivity;
use teamdesk_core::NewActivityEntry;
use teamdesk_core::NewProject;
use teamdesk_core::NewTask;
use teamdesk_core::Project;
use teamdesk_core::RecorderError;

#[derive(Default)]
struct FailingRecorder {
    attempts: AtomicUsize,
}

impl ActivityRecorder for FailingRecorder {
    fn record(&self, _event: NewActivity) -> Result<Activity, RecorderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(RecorderError::Record("activity table locked".to_string()))
    }
}

fn named(name: &str) -> NewProject {
    NewProject {
        name: Some(name.to_string()),
        ..NewProject::default()
    }
}

fn titled(project: &Project, title: &str) -> NewTask {
    NewTask {
        project_id: Some(project.id.clone()),
        title: Some(title.to_string()),
        ..NewTask::default()
    }
}

#[tokio::test]
async fn recorder_failures_never_fail_the_mutation() {
    let recorder = Arc::new(FailingRecorder::default());
    let Harness {
        workspace,
        store,
        cache,
        clock,
    } = Harness::new();
    let harness = Harness {
        workspace: workspace.with_recorder(recorder.clone()),
        store,
        cache,
        clock,
    };
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let ctx = harness.ctx(&owner, &org);

    let project = harness.workspace.create_project(&ctx, named("P")).await.unwrap();
    let task = harness.workspace.create_task(&ctx, titled(&project, "T")).await.unwrap();
    harness.workspace.update_task_status(&ctx, &task.id, Some("done")).await.unwrap();
    assert_eq!(recorder.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(harness.workspace.list_tasks(&ctx).await.unwrap().len(), 1);

    // Explicit entries surface the failure.
    let err = harness
        .workspace
        .create_activity_entry(&owner, NewActivityEntry {
            activity_type: Some("COMMENT_ADDED".to_string()),
            message: Some("hi".to_string()),
            project_id: Some(project.id),
            task_id: None,
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::Dependency(_)));
}

#[tokio::test]
async fn feed_is_newest_first_scoped_and_paged() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let outsider = harness.principal("outsider@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let other = harness.organization(&outsider, "Elsewhere").await;
    let ctx = harness.ctx(&owner, &org);

    let project = harness.workspace.create_project(&ctx, named("P")).await.unwrap();
    harness.clock.advance(Duration::from_secs(1));
    let task = harness.workspace.create_task(&ctx, titled(&project, "T")).await.unwrap();
    harness.clock.advance(Duration::from_secs(1));
    harness.workspace.update_task_status(&ctx, &task.id, Some("todo")).await.unwrap();
    harness.workspace.update_task_status(&ctx, &task.id, Some("doing")).await.unwrap();
    let foreign_ctx = harness.ctx(&outsider, &other);
    let foreign = harness.workspace.create_project(&foreign_ctx, named("F")).await.unwrap();

    let page = harness.workspace.list_activity(&owner, &ActivityFilters::default()).unwrap();
    assert_eq!(page.total, 3);
    assert!(!page.has_more);
    let kinds: Vec<_> = page.items.iter().map(|item| item.activity.activity_type).collect();
    assert_eq!(kinds, vec![
        ActivityType::TaskStatusChanged,
        ActivityType::TaskCreated,
        ActivityType::ProjectCreated,
    ]);
    assert_eq!(page.items[0].activity.message, "moved task from todo to doing");
    assert_eq!(page.items[0].task.as_ref().unwrap().title, "T");
    assert_eq!(page.items[0].actor.as_ref().unwrap().email, "owner@example.com");

    let first = harness
        .workspace
        .list_activity(&owner, &ActivityFilters {
            page_size: Some(2),
            ..ActivityFilters::default()
        })
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.has_more);

    let err = harness
        .workspace
        .list_activity(&owner, &ActivityFilters {
            project_id: Some(foreign.id.clone()),
            ..ActivityFilters::default()
        })
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("Access denied to this project"));

    let nobody = harness.principal("nobody@example.com");
    let empty = harness.workspace.list_activity(&nobody, &ActivityFilters::default()).unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn explicit_entries_validate_type_and_targets() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let outsider = harness.principal("outsider@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let ctx = harness.ctx(&owner, &org);
    let project = harness.workspace.create_project(&ctx, named("P")).await.unwrap();

    let err = harness
        .workspace
        .create_activity_entry(&owner, NewActivityEntry {
            activity_type: Some("PARTY".to_string()),
            project_id: Some(project.id.clone()),
            ..NewActivityEntry::default()
        })
        .unwrap_err();
    assert_eq!(err, CoreError::validation("Invalid activity type"));

    let err = harness
        .workspace
        .create_activity_entry(&owner, NewActivityEntry {
            activity_type: Some("COMMENT_ADDED".to_string()),
            ..NewActivityEntry::default()
        })
        .unwrap_err();
    assert_eq!(err, CoreError::validation("projectId or taskId is required"));

    let err = harness
        .workspace
        .create_activity_entry(&outsider, NewActivityEntry {
            activity_type: Some("COMMENT_ADDED".to_string()),
            project_id: Some(project.id.clone()),
            ..NewActivityEntry::default()
        })
        .unwrap_err();
    assert_eq!(err, CoreError::forbidden("No organization access"));

    let recorded = harness
        .workspace
        .create_activity_entry(&owner, NewActivityEntry {
            activity_type: Some("OBJECTIVE_ADDED".to_string()),
            message: Some("added an objective".to_string()),
            project_id: Some(project.id),
            task_id: None,
        })
        .unwrap();
    assert_eq!(recorded.organization_id, org.id);
    assert_eq!(recorded.activity_type, ActivityType::ObjectiveAdded);
}
