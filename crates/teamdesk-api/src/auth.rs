// crates/teamdesk-api/src/auth.rs
// ============================================================================
// Module: Request Authentication
// Description: Bearer header parsing and the authenticated-principal extractor.
// Purpose: Resolve every protected request to a provisioned principal.
// Dependencies: teamdesk-core, axum, tracing
// ============================================================================

//! ## Overview
//! Protected handlers take an [`Authenticated`] argument. The extractor parses
//! the `Authorization: Bearer` header, asks the configured verifier for an
//! identity, and loads the principal that identity signed in as. All failures
//! are fail-closed; only the token fingerprint reaches the logs.
//!
//! Store calls are synchronous, so every workspace operation goes through
//! [`AppState::blocking`] or [`AppState::run`] and executes on the blocking
//! pool rather than a runtime worker thread.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use teamdesk_core::CoreError;
use teamdesk_core::IdentityVerifier;
use teamdesk_core::Principal;
use teamdesk_core::VerifiedIdentity;
use teamdesk_core::Workspace;
use tokio::runtime::Handle;

use crate::error::ApiError;
use crate::identity::token_fingerprint;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest accepted `Authorization` header.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Rejection message for a missing or malformed header.
const MISSING_TOKEN: &str = "Missing or invalid token";

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Domain services.
    pub workspace: Arc<Workspace>,
    /// Bearer credential verifier.
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub fn new(workspace: Arc<Workspace>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            workspace,
            verifier,
        }
    }

    /// Runs a synchronous workspace operation on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a dependency failure when the
    /// blocking task does not complete.
    pub async fn blocking<T, F>(&self, operation: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Workspace) -> Result<T, CoreError> + Send + 'static,
        T: Send + 'static,
    {
        let workspace = Arc::clone(&self.workspace);
        let result = tokio::task::spawn_blocking(move || operation(&workspace))
            .await
            .map_err(|err| CoreError::Dependency(format!("workspace task join failed: {err}")))?;
        Ok(result?)
    }

    /// Runs an async workspace operation to completion on the blocking pool.
    ///
    /// The future is driven by the runtime handle from the blocking thread, so
    /// the synchronous store calls inside it never occupy a worker.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a dependency failure when the
    /// blocking task does not complete.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, ApiError>
    where
        F: FnOnce(Arc<Workspace>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CoreError>>,
        T: Send + 'static,
    {
        let workspace = Arc::clone(&self.workspace);
        let runtime = Handle::current();
        let result = tokio::task::spawn_blocking(move || runtime.block_on(operation(workspace)))
            .await
            .map_err(|err| CoreError::Dependency(format!("workspace task join failed: {err}")))?;
        Ok(result?)
    }

    /// Verifies a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when the verifier rejects it.
    pub async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, ApiError> {
        match self.verifier.verify(token).await {
            Ok(identity) => {
                tracing::debug!(subject = %identity.subject_id, "bearer token verified");
                Ok(identity)
            }
            Err(err) => {
                tracing::warn!(
                    token_fingerprint = %token_fingerprint(token),
                    error = %err,
                    "bearer token rejected"
                );
                Err(err.into())
            }
        }
    }
}

// ============================================================================
// SECTION: Header Parsing
// ============================================================================

/// Extracts the bearer token from request headers.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] when the header is absent, oversized,
/// not UTF-8, or not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthenticated(MISSING_TOKEN.to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(ApiError::Unauthenticated(MISSING_TOKEN.to_string()));
    }
    let header =
        header.to_str().map_err(|_| ApiError::Unauthenticated(MISSING_TOKEN.to_string()))?;
    parse_bearer(header).ok_or_else(|| ApiError::Unauthenticated(MISSING_TOKEN.to_string()))
}

/// Splits `Bearer <token>` into its token.
fn parse_bearer(header: &str) -> Option<String> {
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

// ============================================================================
// SECTION: Extractor
// ============================================================================

/// Principal behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let identity = state.verify_token(&token).await?;
        let principal =
            state.blocking(move |workspace| workspace.resolve_principal(&identity)).await?;
        Ok(Self(principal))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
