// crates/teamdesk-config/src/lib.rs
// ============================================================================
// Module: Teamdesk Config Library
// Description: Canonical config model and fail-closed validation.
// Purpose: Single source of truth for teamdesk.toml semantics.
// Dependencies: teamdesk-core, teamdesk-store-sqlite, teamdesk-cache-redis, serde, toml
// ============================================================================

//! ## Overview
//! `teamdesk-config` defines the configuration model for the Teamdesk
//! server. Every section has defaults, so an empty file yields a runnable
//! local setup; anything present is validated strictly before use.
//!
//! Security posture: config inputs are untrusted and may carry secrets;
//! validation errors never echo secret values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
