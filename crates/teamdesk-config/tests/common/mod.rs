// crates/teamdesk-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for teamdesk-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use teamdesk_config::ConfigError;
use teamdesk_config::StaticTokenConfig;
use teamdesk_config::TeamdeskConfig;

/// Result type used by config suites.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `TeamdeskConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<TeamdeskConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<TeamdeskConfig, String> {
    config_from_toml("").map_err(|err| err.to_string())
}

/// Builds a static token entry.
pub fn static_token(token: &str, email: &str) -> StaticTokenConfig {
    StaticTokenConfig {
        token: token.to_string(),
        subject: format!("sub-{email}"),
        email: email.to_string(),
        display_name: None,
        provider: "static".to_string(),
    }
}

/// Asserts that a result failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
