// crates/teamdesk-core/tests/cache_consistency.rs
// ============================================================================
// Module: Cache Consistency Tests
// Description: Read-your-writes through the resolver cache and backend outages.
// Purpose: Ensure stale listings are never served after invalidating mutations.
// ============================================================================

//! ## Overview
//! Listings are cached per principal; mutations must drop every principal's
//! view for the organization, and a broken networked backend must not change
//! any result.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::Harness;
use serde_json::Value;
use teamdesk_core::CacheBackend;
use teamdesk_core::CacheError;
use teamdesk_core::CacheState;
use teamdesk_core::NewProject;
use teamdesk_core::NewTask;
use teamdesk_core::Project;
use teamdesk_core::ProjectId;
use teamdesk_core::ProjectStore;
use teamdesk_core::Role;
use teamdesk_core::Timestamp;

struct DownBackend;

#[async_trait]
impl CacheBackend for DownBackend {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete_by_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

fn named(name: &str) -> NewProject {
    NewProject {
        name: Some(name.to_string()),
        ..NewProject::default()
    }
}

#[tokio::test]
async fn mutations_drop_every_principals_cached_view() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let admin = harness.principal("admin@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &admin, Role::Admin);
    let owner_ctx = harness.ctx(&owner, &org);
    let admin_ctx = harness.ctx(&admin, &org);

    assert!(harness.workspace.list_projects(&owner_ctx).await.unwrap().is_empty());
    assert!(harness.workspace.list_projects(&admin_ctx).await.unwrap().is_empty());

    // Admin-created projects grant the admin; both cached views must refresh.
    harness.workspace.create_project(&admin_ctx, named("Fresh")).await.unwrap();
    assert_eq!(harness.workspace.list_projects(&owner_ctx).await.unwrap().len(), 1);
    assert_eq!(harness.workspace.list_projects(&admin_ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn status_moves_are_visible_on_the_next_read() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let ctx = harness.ctx(&owner, &org);
    let project = harness.workspace.create_project(&ctx, named("P")).await.unwrap();
    let task = harness
        .workspace
        .create_task(&ctx, NewTask {
            project_id: Some(project.id.clone()),
            title: Some("ship".to_string()),
            ..NewTask::default()
        })
        .await
        .unwrap();
    assert_eq!(harness.workspace.list_tasks(&ctx).await.unwrap()[0].task.status, "todo");

    harness.workspace.update_task_status(&ctx, &task.id, Some("done")).await.unwrap();
    assert_eq!(harness.workspace.list_tasks(&ctx).await.unwrap()[0].task.status, "done");
}

#[tokio::test]
async fn writes_that_bypass_invalidation_stay_hidden_until_ttl() {
    let harness = Harness::new();
    let owner = harness.principal("owner@example.com");
    let org = harness.organization(&owner, "Acme").await;
    let ctx = harness.ctx(&owner, &org);
    assert!(harness.workspace.list_projects(&ctx).await.unwrap().is_empty());

    let now = Timestamp::from_unix_millis(common::START_MILLIS);
    harness
        .store
        .insert_project(&Project {
            id: ProjectId::new("out-of-band"),
            organization_id: org.id.clone(),
            owner_id: owner.id.clone(),
            name: "Out of band".to_string(),
            description: None,
            is_private: false,
            cover_image: None,
            created_at: now,
            updated_at: now,
        })
        .unwrap();
    assert!(harness.workspace.list_projects(&ctx).await.unwrap().is_empty());

    harness.clock.advance(Duration::from_secs(16));
    assert_eq!(harness.workspace.list_projects(&ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn broken_networked_backend_changes_no_result() {
    let harness = Harness::new();
    assert!(harness.cache.begin_connect());
    harness.cache.mark_ready(Arc::new(DownBackend));
    assert_eq!(harness.cache.state(), CacheState::Ready);

    let owner = harness.principal("owner@example.com");
    let member = harness.principal("member@example.com");
    let org = harness.organization(&owner, "Acme").await;
    harness.join(&org, &member, Role::Member);
    let owner_ctx = harness.ctx(&owner, &org);
    let member_ctx = harness.ctx(&member, &org);

    let project = harness.workspace.create_project(&owner_ctx, named("P")).await.unwrap();
    assert_eq!(harness.workspace.list_projects(&owner_ctx).await.unwrap().len(), 1);
    assert!(harness.workspace.list_projects(&member_ctx).await.unwrap().is_empty());

    harness.workspace.grant_project_access(&owner_ctx, &project.id, &member.id).await.unwrap();
    assert_eq!(harness.workspace.list_projects(&member_ctx).await.unwrap().len(), 1);
}
