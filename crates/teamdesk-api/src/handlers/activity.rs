// crates/teamdesk-api/src/handlers/activity.rs
// ============================================================================
// Module: Activity Handlers
// Description: Activity feed listing and client-posted entries.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use teamdesk_core::Activity;
use teamdesk_core::ActivityFilters;
use teamdesk_core::ActivityPage;
use teamdesk_core::NewActivityEntry;
use teamdesk_core::ProjectId;
use teamdesk_core::TaskId;
use teamdesk_core::UserId;

use super::parse_body;
use super::present;
use crate::auth::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Feed query string; numbers stay strings so bad values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Restrict to one project.
    project_id: Option<String>,
    /// Restrict to one actor.
    user_id: Option<String>,
    /// RFC 3339 lower bound.
    from_date: Option<String>,
    /// RFC 3339 upper bound.
    to_date: Option<String>,
    /// One-based page.
    page: Option<String>,
    /// Page size.
    page_size: Option<String>,
}

/// Parses an integer query value, ignoring garbage.
fn number(value: Option<&str>) -> Option<i64> {
    value.and_then(|value| value.trim().parse().ok())
}

impl FeedQuery {
    /// Converts the query string into feed filters.
    fn into_filters(self) -> ActivityFilters {
        ActivityFilters {
            page: number(self.page.as_deref()),
            page_size: number(self.page_size.as_deref()),
            project_id: present(self.project_id).map(ProjectId::new),
            actor_id: present(self.user_id).map(UserId::new),
            from_date: present(self.from_date),
            to_date: present(self.to_date),
        }
    }
}

/// Posted activity body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRequest {
    /// Activity type label.
    #[serde(rename = "type")]
    activity_type: Option<String>,
    /// Message.
    message: Option<String>,
    /// Related project.
    project_id: Option<String>,
    /// Related task.
    task_id: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/activity`
pub async fn list(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ActivityPage>, ApiError> {
    let filters = query.into_filters();
    let page =
        state.blocking(move |workspace| workspace.list_activity(&principal, &filters)).await?;
    Ok(Json(page))
}

/// `POST /api/activity`
pub async fn create(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Bytes,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let request: EntryRequest = parse_body(&body)?;
    let entry = NewActivityEntry {
        activity_type: request.activity_type,
        message: request.message,
        project_id: present(request.project_id).map(ProjectId::new),
        task_id: present(request.task_id).map(TaskId::new),
    };
    let activity =
        state.blocking(move |workspace| workspace.create_activity_entry(&principal, entry)).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
