// crates/teamdesk-api/src/lib.rs
// ============================================================================
// Module: Teamdesk API Library
// Description: HTTP surface over the Teamdesk workspace services.
// Purpose: Authenticate requests and route them to authorization-scoped operations.
// Dependencies: teamdesk-core, teamdesk-config, axum, jsonwebtoken, tokio
// ============================================================================

//! ## Overview
//! `teamdesk-api` is the thin transport layer: bearer-token verification,
//! organization selection, error-to-status mapping, and server bootstrap.
//! Every authorization decision is made by `teamdesk-core`.
//!
//! Security posture: all request inputs are untrusted; credentials are never
//! logged or echoed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::AppState;
pub use auth::Authenticated;
pub use error::ApiError;
pub use identity::JwtIdentityVerifier;
pub use identity::StaticTokenVerifier;
pub use identity::token_fingerprint;
pub use identity::verifier_from_config;
pub use routes::router;
pub use server::ApiServer;
pub use server::ApiServerError;
