// crates/teamdesk-api/src/handlers/profiles.rs
// ============================================================================
// Module: Profile Handlers
// Description: Own-profile read/update and cross-user profile views.
// Dependencies: teamdesk-core, axum, serde
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use serde::Deserialize;
use teamdesk_core::MyProfile;
use teamdesk_core::ProfileUpdate;
use teamdesk_core::UserId;
use teamdesk_core::UserProfile;

use super::parse_body;
use crate::auth::AppState;
use crate::auth::Authenticated;
use crate::error::ApiError;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Profile update body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    /// Biography.
    bio: Option<String>,
    /// Avatar URL.
    avatar_url: Option<String>,
    /// Job title.
    title: Option<String>,
    /// Display name.
    name: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /api/profile/me`
pub async fn get_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<MyProfile>, ApiError> {
    let profile =
        state.run(move |workspace| async move { workspace.get_my_profile(&principal).await }).await?;
    Ok(Json(profile))
}

/// `PUT /api/profile/me`
pub async fn update_mine(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    body: Bytes,
) -> Result<Json<MyProfile>, ApiError> {
    let request: ProfileRequest = parse_body(&body)?;
    let update = ProfileUpdate {
        bio: request.bio,
        avatar_url: request.avatar_url,
        title: request.title,
        name: request.name,
    };
    let profile = state
        .run(move |workspace| async move { workspace.update_my_profile(&principal, update).await })
        .await?;
    Ok(Json(profile))
}

/// `GET /api/users/{id}/profile`
pub async fn get_user(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let target = UserId::new(user_id);
    let profile =
        state.blocking(move |workspace| workspace.get_user_profile(&principal, &target)).await?;
    Ok(Json(profile))
}
