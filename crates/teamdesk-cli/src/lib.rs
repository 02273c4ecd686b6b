// crates/teamdesk-cli/src/lib.rs
// ============================================================================
// Module: Teamdesk CLI Library
// Description: Shared helpers for the Teamdesk command-line interface.
// Purpose: Keep logging setup testable outside the binary entry point.
// Dependencies: teamdesk-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) imports these helpers so subscriber
//! setup and filter precedence can be unit tested.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Tracing subscriber setup.
pub mod logging;
