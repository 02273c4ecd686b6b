// crates/teamdesk-api/tests/common/mod.rs
// =============================================================================
// Module: API Test Harness
// Description: Loopback server fixture and a small JSON client.
// Purpose: Drive the HTTP surface end to end with static bearer tokens.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test fixtures panic on setup failure.")]

use reqwest::Method;
use reqwest::StatusCode;
use serde_json::Value;
use teamdesk_api::ApiServer;
use teamdesk_config::TeamdeskConfig;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Bearer token of the organization owner.
pub const OWNER: &str = "tok-ada";
/// Bearer token of a second user, usually made an admin.
pub const ADMIN: &str = "tok-grace";
/// Bearer token of a plain member.
pub const MEMBER: &str = "tok-linus";
/// Bearer token of a user outside every organization.
pub const OUTSIDER: &str = "tok-eve";
/// Bearer token of a user who has not signed in yet.
pub const INVITEE: &str = "tok-ken";

/// Static identity table shared by every suite.
pub const IDENTITY_TOML: &str = r#"
[identity]
mode = "static_tokens"

[[identity.tokens]]
token = "tok-ada"
subject = "sub-ada"
email = "ada@example.com"
display_name = "Ada"

[[identity.tokens]]
token = "tok-grace"
subject = "sub-grace"
email = "grace@example.com"
display_name = "Grace"

[[identity.tokens]]
token = "tok-linus"
subject = "sub-linus"
email = "linus@example.com"

[[identity.tokens]]
token = "tok-eve"
subject = "sub-eve"
email = "eve@example.com"

[[identity.tokens]]
token = "tok-ken"
subject = "sub-ken"
email = "Ken@Example.com"
"#;

/// Running loopback server.
pub struct TestServer {
    /// Base URL without a trailing slash.
    pub base: String,
    /// HTTP client.
    client: reqwest::Client,
    /// Graceful shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Serve loop task.
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Starts a memory-backed server with the shared identity table.
    pub async fn start() -> Self {
        Self::start_with(IDENTITY_TOML).await
    }

    /// Starts a server from a full config document.
    pub async fn start_with(toml: &str) -> Self {
        let config = TeamdeskConfig::from_toml_str(toml).unwrap();
        let server = ApiServer::from_config(config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve_on(listener, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });
        Self {
            base,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, format!("{}{path}", self.base));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let text = response.text().await.unwrap();
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap() };
        (status, value)
    }

    /// Sends a request with a raw body.
    pub async fn send_raw(&self, method: Method, path: &str, token: &str, body: &'static str) -> (StatusCode, Value) {
        let response = self
            .client
            .request(method, format!("{}{path}", self.base))
            .bearer_auth(token)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    /// `GET` with a bearer token.
    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, Some(token), None).await
    }

    /// `POST` with a bearer token and JSON body.
    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    /// `PATCH` with a bearer token and JSON body.
    pub async fn patch(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(token), Some(body)).await
    }

    /// `PUT` with a bearer token and JSON body.
    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    /// `DELETE` with a bearer token.
    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    /// Signs a token's identity in and returns the user id.
    pub async fn sign_in(&self, token: &str) -> String {
        let (status, body) = self.send(Method::POST, "/api/auth/session", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    /// Creates an organization owned by the token's user and returns its id.
    pub async fn organization(&self, token: &str, name: &str) -> String {
        let (status, body) = self.post("/api/orgs", token, serde_json::json!({ "name": name })).await;
        assert_eq!(status, StatusCode::OK, "org creation failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Stops the server and waits for the serve loop to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

/// Returns the string at a JSON path.
pub fn text<'a>(value: &'a Value, field: &str) -> &'a str {
    value[field].as_str().unwrap_or_default()
}
