// crates/teamdesk-api/tests/http_surface.rs
// ============================================================================
// Module: HTTP Surface Tests
// Description: End-to-end requests against a loopback server.
// Purpose: Ensure authentication, organization scoping, and status mapping hold over HTTP.
// ============================================================================

//! ## Overview
//! Each test starts its own memory-backed server with static bearer tokens
//! and talks to it with `reqwest`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::ADMIN;
use common::INVITEE;
use common::MEMBER;
use common::OUTSIDER;
use common::OWNER;
use common::TestServer;
use common::text;
use reqwest::Method;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Authentication
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn health_needs_no_credentials() {
    let server = TestServer::start().await;
    let (status, body) = server.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn protected_routes_reject_missing_and_unknown_tokens() {
    let server = TestServer::start().await;
    let (status, body) = server.send(Method::GET, "/api/orgs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(text(&body, "message"), "Missing or invalid token");

    let (status, body) = server.get("/api/orgs", "tok-nobody").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(text(&body, "message"), "Unauthorized");

    let (status, body) = server.get("/api/orgs", OWNER).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text(&body, "message"), "User not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn session_accepts_body_header_or_fallback_token() {
    let server = TestServer::start().await;
    let (status, body) = server
        .send(Method::POST, "/api/auth/session", None, Some(json!({ "idToken": OWNER })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasOrganization"], json!(false));
    assert_eq!(body["user"]["email"], json!("ada@example.com"));

    let by_header = server.sign_in(OWNER).await;
    assert_eq!(body["user"]["id"], json!(by_header));

    let (status, body) = server.send(Method::POST, "/api/auth/session", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "idToken is required");

    let (status, body) = server.send(Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body, "message"), "Logged out");
}

// ============================================================================
// SECTION: Organization Scoping
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn outsiders_are_denied_and_missing_org_is_a_validation_error() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    server.sign_in(OUTSIDER).await;
    let org = server.organization(OWNER, "Acme").await;

    let (status, body) = server.get(&format!("/api/projects/org/{org}"), OUTSIDER).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "Access denied to this organization");

    let (status, body) = server.get("/api/team/members", OWNER).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "Organization ID required");

    let (status, body) = server.get(&format!("/api/team/members?orgId={org}"), OWNER).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn members_see_only_granted_projects_and_tasks() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    let member_id = server.sign_in(MEMBER).await;
    let org = server.organization(OWNER, "Acme").await;

    let (status, added) = server
        .post(&format!("/api/orgs/{org}/invite"), OWNER, json!({ "email": "linus@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["role"], json!("MEMBER"));

    let mut project_ids = Vec::new();
    for name in ["Alpha", "Beta"] {
        let (status, project) =
            server.post(&format!("/api/projects/org/{org}"), OWNER, json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED);
        project_ids.push(text(&project, "id").to_string());
    }
    let (alpha, beta) = (&project_ids[0], &project_ids[1]);
    let (status, _) = server
        .post(
            &format!("/api/projects/org/{org}/projects/{alpha}/access"),
            OWNER,
            json!({ "userId": member_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, owner_view) = server.get(&format!("/api/projects/org/{org}"), OWNER).await;
    assert_eq!(owner_view.as_array().unwrap().len(), 2);
    let (_, member_view) = server.get(&format!("/api/projects/org/{org}"), MEMBER).await;
    let names: Vec<&str> =
        member_view.as_array().unwrap().iter().map(|project| text(project, "name")).collect();
    assert_eq!(names, vec!["Alpha"]);

    let (status, task) = server
        .post(&format!("/api/tasks/org/{org}"), MEMBER, json!({ "projectId": alpha, "title": "Ship" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(text(&task, "status"), "todo");
    let (status, body) = server
        .post(&format!("/api/tasks/org/{org}"), MEMBER, json!({ "projectId": beta, "title": "Sneak" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "No access to this project");
    server
        .post(&format!("/api/tasks/org/{org}"), OWNER, json!({ "projectId": beta, "title": "Hidden" }))
        .await;

    let (_, member_tasks) = server.get(&format!("/api/tasks/org/{org}"), MEMBER).await;
    let titles: Vec<&str> =
        member_tasks.as_array().unwrap().iter().map(|task| text(task, "title")).collect();
    assert_eq!(titles, vec!["Ship"]);
    let (_, owner_tasks) = server.get(&format!("/api/tasks/org/{org}"), OWNER).await;
    assert_eq!(owner_tasks.as_array().unwrap().len(), 2);

    let (status, body) =
        server.post(&format!("/api/projects/org/{org}"), MEMBER, json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "Insufficient role");
}

#[tokio::test(flavor = "multi_thread")]
async fn revoking_access_hides_the_project_immediately() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    let member_id = server.sign_in(MEMBER).await;
    let org = server.organization(OWNER, "Acme").await;
    server
        .post(&format!("/api/orgs/{org}/invite"), OWNER, json!({ "email": "linus@example.com" }))
        .await;
    let (_, project) =
        server.post(&format!("/api/projects/org/{org}"), OWNER, json!({ "name": "Alpha" })).await;
    let project_id = text(&project, "id").to_string();
    server
        .post(
            &format!("/api/projects/org/{org}/projects/{project_id}/access"),
            OWNER,
            json!({ "userId": member_id }),
        )
        .await;
    let (_, before) = server.get(&format!("/api/projects/org/{org}"), MEMBER).await;
    assert_eq!(before.as_array().unwrap().len(), 1);

    let (status, body) = server
        .delete(&format!("/api/projects/org/{org}/projects/{project_id}/access/{member_id}"), OWNER)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body, "message"), "Access revoked");
    let (_, after) = server.get(&format!("/api/projects/org/{org}"), MEMBER).await;
    assert_eq!(after, json!([]));
}

// ============================================================================
// SECTION: Tasks
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn task_status_assignees_and_attachments_round_trip() {
    let server = TestServer::start().await;
    let owner_id = server.sign_in(OWNER).await;
    let org = server.organization(OWNER, "Acme").await;
    let (_, project) =
        server.post(&format!("/api/projects/org/{org}"), OWNER, json!({ "name": "Alpha" })).await;
    let (_, task) = server
        .post(
            &format!("/api/tasks/org/{org}"),
            OWNER,
            json!({ "projectId": text(&project, "id"), "title": "Ship", "dueDate": "2030-01-31" }),
        )
        .await;
    let task_id = text(&task, "id").to_string();
    let base = format!("/api/tasks/org/{org}/{task_id}");

    let (status, moved) = server.patch(&base, OWNER, json!({ "status": "done" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&moved, "status"), "done");
    let (status, body) = server.patch(&base, OWNER, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "Status is required");

    let (status, detail) =
        server.patch(&format!("{base}/assignees"), OWNER, json!({ "assigneeIds": [owner_id] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["assigneeIds"], json!([owner_id]));

    let (status, attachment) = server
        .post(
            &format!("{base}/attachments"),
            OWNER,
            json!({ "name": "notes.txt", "type": "text/plain", "dataUrl": "data:text/plain;base64,aGk=" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let attachment_id = text(&attachment, "id").to_string();
    let (status, body) = server
        .post(&format!("{base}/attachments"), OWNER, json!({ "name": "x", "dataUrl": "https://x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "File data is required");

    let (_, detail) = server.get(&base, OWNER).await;
    assert_eq!(detail["attachments"].as_array().unwrap().len(), 1);
    let (status, _) = server.delete(&format!("{base}/attachments/{attachment_id}"), OWNER).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.delete(&format!("{base}/attachments/{attachment_id}"), OWNER).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_json_is_a_validation_error() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    let (status, body) = server.send_raw(Method::POST, "/api/orgs", OWNER, "{\"name\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "Invalid JSON body");
}

// ============================================================================
// SECTION: Team
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn invite_accept_and_administer_a_member() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    let org = server.organization(OWNER, "Acme").await;

    let (status, issued) = server
        .post("/api/team/invite", OWNER, json!({ "orgId": org, "email": " KEN@example.com " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issued["invite"]["email"], json!("ken@example.com"));
    let link = text(&issued, "inviteLink").to_string();
    let token = link.rsplit("token=").next().unwrap().to_string();
    assert_eq!(issued["invite"]["token"], json!(token));

    let (status, body) =
        server.post("/api/team/invite", OWNER, json!({ "orgId": org, "email": "x@example.com", "role": "OWNER" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "Cannot invite an owner role");

    server.sign_in(INVITEE).await;
    let (status, body) = server.post("/api/team/accept-invite", OWNER, json!({ "token": token })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "Invite email does not match account");
    let (status, membership) =
        server.post(&format!("/api/team/accept-invite?token={token}"), INVITEE, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(membership["status"], json!("ACTIVE"));
    let membership_id = text(&membership, "id").to_string();

    let (_, orgs) = server.get("/api/orgs", INVITEE).await;
    assert_eq!(orgs[0]["id"], json!(org));

    let (status, promoted) =
        server.patch(&format!("/api/team/{membership_id}/role"), OWNER, json!({ "role": "ADMIN" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], json!("ADMIN"));

    let (status, body) = server.patch(&format!("/api/team/{membership_id}/deactivate"), INVITEE, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "You cannot deactivate yourself");
    let (status, deactivated) =
        server.patch(&format!("/api/team/{membership_id}/deactivate"), OWNER, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deactivated["status"], json!("DEACTIVATED"));
}

#[tokio::test(flavor = "multi_thread")]
async fn resend_and_cancel_are_limited_to_managers() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    server.sign_in(ADMIN).await;
    server.sign_in(OUTSIDER).await;
    let org = server.organization(OWNER, "Acme").await;
    let (_, issued) =
        server.post("/api/team/invite", OWNER, json!({ "orgId": org, "email": "new@example.com" })).await;
    let invite_id = issued["invite"]["id"].as_str().unwrap().to_string();
    let first_token = issued["invite"]["token"].clone();

    let (status, _) = server.post(&format!("/api/team/invites/{invite_id}/resend"), OUTSIDER, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, resent) = server.post(&format!("/api/team/invites/{invite_id}/resend"), OWNER, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(resent["invite"]["token"], first_token);

    let (status, cancelled) =
        server.patch(&format!("/api/team/invites/{invite_id}/cancel"), OWNER, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], json!("CANCELLED"));
}

// ============================================================================
// SECTION: Activity and Profiles
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn activity_feed_lists_recorded_events_newest_first() {
    let server = TestServer::start().await;
    server.sign_in(OWNER).await;
    server.sign_in(OUTSIDER).await;
    let org = server.organization(OWNER, "Acme").await;
    let (_, project) =
        server.post(&format!("/api/projects/org/{org}"), OWNER, json!({ "name": "Alpha" })).await;
    let project_id = text(&project, "id").to_string();
    let (status, posted) = server
        .post(
            "/api/activity",
            OWNER,
            json!({ "type": "COMMENT_ADDED", "message": "hello", "projectId": project_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["type"], json!("COMMENT_ADDED"));

    let (status, page) = server.get("/api/activity?pageSize=1", OWNER).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], json!(2));
    assert_eq!(page["hasMore"], json!(true));
    assert_eq!(page["items"][0]["type"], json!("COMMENT_ADDED"));
    assert_eq!(page["items"][0]["project"]["name"], json!("Alpha"));

    let (status, body) = server.get(&format!("/api/activity?projectId={project_id}"), OUTSIDER).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(0));
    let (status, body) = server
        .post("/api/activity", OUTSIDER, json!({ "type": "COMMENT_ADDED", "projectId": project_id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "No organization access");
    let (status, body) =
        server.post("/api/activity", OWNER, json!({ "type": "NOPE", "projectId": project_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body, "message"), "Invalid activity type");
}

#[tokio::test(flavor = "multi_thread")]
async fn profiles_update_and_stay_tenant_scoped() {
    let server = TestServer::start().await;
    let owner_id = server.sign_in(OWNER).await;
    server.sign_in(OUTSIDER).await;
    server.organization(OWNER, "Acme").await;

    let (status, mine) = server.get("/api/profile/me", OWNER).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["user"]["name"], json!("Ada"));
    let (status, updated) = server
        .put("/api/profile/me", OWNER, json!({ "bio": "Engines", "name": "Ada L." }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["profile"]["bio"], json!("Engines"));
    assert_eq!(updated["user"]["name"], json!("Ada L."));

    let (status, own) = server.get(&format!("/api/users/{owner_id}/profile"), OWNER).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["organizations"].as_array().unwrap().len(), 1);
    let (status, body) = server.get(&format!("/api/users/{owner_id}/profile"), OUTSIDER).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text(&body, "message"), "Forbidden");
    let (status, _) = server.get("/api/users/missing/profile", OWNER).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn sqlite_backed_server_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teamdesk.db");
    let toml = format!(
        "[store]\ntype = \"sqlite\"\npath = {path:?}\n{}",
        common::IDENTITY_TOML
    );

    let first = TestServer::start_with(&toml).await;
    first.sign_in(OWNER).await;
    let org = first.organization(OWNER, "Durable").await;
    first.stop().await;

    let second = TestServer::start_with(&toml).await;
    let (status, orgs) = second.get("/api/orgs", OWNER).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = orgs.as_array().unwrap().iter().map(|org| &org["id"]).collect();
    assert_eq!(ids, vec![&json!(org)]);
    second.stop().await;
}
