// crates/teamdesk-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Tracing subscriber initialization for the Teamdesk binary.
// Purpose: Resolve the active log filter and install a stderr formatter.
// Dependencies: teamdesk-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! The `[logging] filter` directive from configuration is the default;
//! a non-empty `RUST_LOG` overrides it. Logs go to stderr so stdout stays
//! reserved for command output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use teamdesk_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable that overrides the configured filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive did not parse.
    #[error("invalid log filter `{directive}`: {error}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        error: String,
    },
    /// A global subscriber was already installed.
    #[error("logging init failed: {0}")]
    Init(String),
}

// ============================================================================
// SECTION: Filter Resolution
// ============================================================================

/// Picks the effective directive: a non-blank override wins over the config.
#[must_use]
pub fn effective_directive<'a>(configured: &'a str, env_override: Option<&'a str>) -> &'a str {
    env_override.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(configured)
}

/// Builds the env filter for a directive.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] when the directive does not parse.
pub fn build_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|err| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        error: err.to_string(),
    })
}

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Installs the global fmt subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_override = std::env::var(LOG_FILTER_ENV).ok();
    let directive = effective_directive(&config.filter, env_override.as_deref());
    let filter = build_filter(directive)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
