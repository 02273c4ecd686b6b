// crates/teamdesk-api/src/routes.rs
// ============================================================================
// Module: API Routes
// Description: Route table for the Teamdesk HTTP surface.
// Dependencies: axum
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;

use crate::auth::AppState;
use crate::handlers::activity;
use crate::handlers::organizations;
use crate::handlers::profiles;
use crate::handlers::projects;
use crate::handlers::session;
use crate::handlers::tasks;
use crate::handlers::team;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the full router with a request body ceiling.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(session::health))
        .route("/api/auth/session", post(session::create_session))
        .route("/api/auth/logout", post(session::logout))
        .route("/api/orgs", get(organizations::list_mine).post(organizations::create))
        .route("/api/orgs/{org_id}/invite", post(organizations::add_member))
        .route("/api/projects/org/{org_id}", get(projects::list).post(projects::create))
        .route(
            "/api/projects/org/{org_id}/projects/{project_id}",
            put(projects::update).delete(projects::delete),
        )
        .route(
            "/api/projects/org/{org_id}/projects/{project_id}/access",
            post(projects::grant_access),
        )
        .route(
            "/api/projects/org/{org_id}/projects/{project_id}/access/{user_id}",
            delete(projects::revoke_access),
        )
        .route("/api/tasks/org/{org_id}", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/org/{org_id}/{task_id}",
            get(tasks::detail).patch(tasks::update_status),
        )
        .route("/api/tasks/org/{org_id}/{task_id}/assignees", patch(tasks::update_assignees))
        .route("/api/tasks/org/{org_id}/{task_id}/attachments", post(tasks::add_attachment))
        .route(
            "/api/tasks/org/{org_id}/{task_id}/attachments/{attachment_id}",
            delete(tasks::remove_attachment),
        )
        .route("/api/team/members", get(team::list_members))
        .route("/api/team/invite", post(team::invite))
        .route("/api/team/accept-invite", post(team::accept))
        .route("/api/team/invites/{id}/resend", post(team::resend))
        .route("/api/team/invites/{id}/cancel", patch(team::cancel))
        .route("/api/team/{id}/deactivate", patch(team::deactivate))
        .route("/api/team/{id}/role", patch(team::update_role))
        .route("/api/team/{id}/projects", patch(team::update_projects))
        .route("/api/activity", get(activity::list).post(activity::create))
        .route("/api/profile/me", get(profiles::get_mine).put(profiles::update_mine))
        .route("/api/users/{id}/profile", get(profiles::get_user))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
