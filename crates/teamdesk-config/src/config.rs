// crates/teamdesk-config/src/config.rs
// ============================================================================
// Module: Teamdesk Configuration
// Description: Configuration loading and validation for the Teamdesk server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: teamdesk-core, teamdesk-store-sqlite, teamdesk-cache-redis, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing sections fall back to local defaults; invalid values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use teamdesk_cache_redis::DEFAULT_CONNECT_TIMEOUT_MS;
use teamdesk_cache_redis::DEFAULT_SCAN_BATCH;
use teamdesk_cache_redis::RedisCacheConfig;
use teamdesk_core::DEFAULT_CLIENT_URL;
use teamdesk_core::DEFAULT_INVITE_EXPIRY_DAYS;
use teamdesk_core::DEFAULT_MAX_ATTACHMENT_BYTES;
use teamdesk_core::WorkspaceSettings;
use teamdesk_store_sqlite::SqliteStoreConfig;
use teamdesk_store_sqlite::SqliteStoreMode;
use teamdesk_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "teamdesk.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TEAMDESK_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";
/// Default maximum request body size; leaves room for base64 attachments.
const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
/// Default cache TTL in milliseconds.
const DEFAULT_CACHE_TTL_MS: u64 = 15_000;
/// Maximum cache TTL in milliseconds.
const MAX_CACHE_TTL_MS: u64 = 3_600_000;
/// Maximum `SCAN` batch size.
const MAX_SCAN_BATCH: u32 = 10_000;
/// Maximum invite lifetime in days.
const MAX_INVITE_EXPIRY_DAYS: u32 = 90;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum number of static tokens.
const MAX_STATIC_TOKENS: usize = 64;
/// Maximum length of a static token.
const MAX_STATIC_TOKEN_LENGTH: usize = 256;
/// Minimum length of an HS256 secret.
const MIN_HS256_SECRET_LENGTH: usize = 32;
/// Default JWT clock-skew leeway in seconds.
const DEFAULT_JWT_LEEWAY_SECS: u64 = 30;
/// Maximum JWT clock-skew leeway in seconds.
const MAX_JWT_LEEWAY_SECS: u64 = 300;

// ============================================================================
// SECTION: Config Root
// ============================================================================

/// Teamdesk configuration loaded from `teamdesk.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamdeskConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Workspace store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Read-through cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Bearer credential verification.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Invite lifecycle configuration.
    #[serde(default)]
    pub invites: InviteConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TeamdeskConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `TEAMDESK_CONFIG`, then
    /// `./teamdesk.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate(&self.identity)?;
        self.store.validate()?;
        self.cache.validate()?;
        self.identity.validate()?;
        self.invites.validate()?;
        self.logging.validate()?;
        if self.server.max_attachment_bytes > self.server.max_body_bytes {
            return Err(ConfigError::Invalid(
                "server.max_attachment_bytes must not exceed server.max_body_bytes".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the domain service tunables.
    #[must_use]
    pub fn workspace_settings(&self) -> WorkspaceSettings {
        WorkspaceSettings {
            invite_expiry_days: self.invites.expiry_days,
            client_url: self.server.client_url.clone(),
            max_attachment_bytes: self.server.max_attachment_bytes,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Maximum inline attachment size in bytes.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
    /// Client base URL used in invite links.
    #[serde(default = "default_client_url")]
    pub client_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            max_attachment_bytes: default_max_attachment_bytes(),
            client_url: default_client_url(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self, identity: &IdentityConfig) -> Result<(), ConfigError> {
        let addr = self.bind_addr()?;
        if !addr.ip().is_loopback() && !identity.accepts_credentials() {
            return Err(ConfigError::Invalid(
                "non-loopback bind disallowed without an identity provider".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_attachment_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_attachment_bytes must be greater than zero".to_string(),
            ));
        }
        let client_url = self.client_url.trim();
        if !(client_url.starts_with("http://") || client_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "server.client_url must be an http or https url".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default attachment limit.
const fn default_max_attachment_bytes() -> usize {
    DEFAULT_MAX_ATTACHMENT_BYTES
}

/// Returns the default client URL.
fn default_client_url() -> String {
    DEFAULT_CLIENT_URL.to_string()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Workspace store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local store; contents are lost on restart.
    #[default]
    Memory,
    /// Durable `SQLite` database.
    Sqlite,
}

/// Workspace store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend.
    #[serde(default, rename = "type")]
    pub store_type: StoreType,
    /// Database path (sqlite only).
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds (sqlite only).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode (sqlite only).
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// Sync mode (sqlite only).
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set store.path".to_string(),
                    ));
                }
            }
            StoreType::Sqlite => {
                let Some(path) = &self.path else {
                    return Err(ConfigError::Invalid("sqlite store requires store.path".to_string()));
                };
                validate_path_string("store.path", &path.to_string_lossy())?;
            }
        }
        Ok(())
    }

    /// Returns the `SQLite` settings when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }
}

/// Returns the default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Read-through cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Optional Redis URL; absent means in-process cache only.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Entry time-to-live in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// `COUNT` hint for `SCAN` during prefix invalidation.
    #[serde(default = "default_scan_batch")]
    pub scan_batch: u32,
    /// Time allowed for the initial Redis connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_ms: default_cache_ttl_ms(),
            scan_batch: default_scan_batch(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Validates cache configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_ms == 0 || self.ttl_ms > MAX_CACHE_TTL_MS {
            return Err(ConfigError::Invalid(format!(
                "cache.ttl_ms must be between 1 and {MAX_CACHE_TTL_MS}"
            )));
        }
        if self.scan_batch == 0 || self.scan_batch > MAX_SCAN_BATCH {
            return Err(ConfigError::Invalid(format!(
                "cache.scan_batch must be between 1 and {MAX_SCAN_BATCH}"
            )));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "cache.connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.redis_url
            && !(url.starts_with("redis://") || url.starts_with("rediss://"))
        {
            return Err(ConfigError::Invalid(
                "cache.redis_url must use the redis:// or rediss:// scheme".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the cache entry time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Returns the Redis settings when a URL is configured.
    #[must_use]
    pub fn redis_config(&self) -> Option<RedisCacheConfig> {
        self.redis_url.as_ref().map(|url| RedisCacheConfig {
            url: url.clone(),
            scan_batch: self.scan_batch,
            connect_timeout_ms: self.connect_timeout_ms,
        })
    }
}

/// Returns the default cache TTL.
const fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

/// Returns the default `SCAN` batch.
const fn default_scan_batch() -> u32 {
    DEFAULT_SCAN_BATCH
}

/// Returns the default Redis connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Bearer credential verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Signed JWTs from an external identity provider.
    Jwt,
    /// Fixed tokens mapped to identities (local and test setups).
    #[default]
    StaticTokens,
}

/// Accepted JWT signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256 and a shared secret.
    #[serde(rename = "HS256")]
    Hs256,
    /// RSA PKCS#1 v1.5 with SHA-256 and a public key.
    #[serde(rename = "RS256")]
    Rs256,
}

/// JWT verification settings.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// Signature algorithm.
    pub algorithm: JwtAlgorithm,
    /// Shared secret (HS256).
    #[serde(default)]
    pub secret: Option<String>,
    /// PEM-encoded public key (RS256).
    #[serde(default)]
    pub public_key_pem: Option<String>,
    /// Required `iss` claim.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Required `aud` claim.
    #[serde(default)]
    pub audience: Option<String>,
    /// Allowed clock skew in seconds.
    #[serde(default = "default_jwt_leeway_secs")]
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtConfig {
    /// Validates JWT settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.algorithm {
            JwtAlgorithm::Hs256 => {
                let secret = self.secret.as_deref().unwrap_or_default();
                if secret.len() < MIN_HS256_SECRET_LENGTH {
                    return Err(ConfigError::Invalid(format!(
                        "identity.jwt.secret must be at least {MIN_HS256_SECRET_LENGTH} bytes"
                    )));
                }
            }
            JwtAlgorithm::Rs256 => {
                let pem = self.public_key_pem.as_deref().unwrap_or_default();
                if !pem.contains("-----BEGIN") {
                    return Err(ConfigError::Invalid(
                        "identity.jwt.public_key_pem must be a PEM public key".to_string(),
                    ));
                }
            }
        }
        if self.leeway_secs > MAX_JWT_LEEWAY_SECS {
            return Err(ConfigError::Invalid(format!(
                "identity.jwt.leeway_secs must not exceed {MAX_JWT_LEEWAY_SECS}"
            )));
        }
        for (field, value) in [("issuer", &self.issuer), ("audience", &self.audience)] {
            if value.as_deref().is_some_and(|value| value.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "identity.jwt.{field} must be non-empty when set"
                )));
            }
        }
        Ok(())
    }
}

/// Returns the default JWT leeway.
const fn default_jwt_leeway_secs() -> u64 {
    DEFAULT_JWT_LEEWAY_SECS
}

/// Static bearer token mapped to an identity.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticTokenConfig {
    /// Bearer token value.
    pub token: String,
    /// Identity-provider subject.
    pub subject: String,
    /// Email address.
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Login provider label.
    #[serde(default = "default_static_provider")]
    pub provider: String,
}

impl std::fmt::Debug for StaticTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenConfig")
            .field("token", &"<redacted>")
            .field("subject", &self.subject)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("provider", &self.provider)
            .finish()
    }
}

/// Returns the default provider label for static tokens.
fn default_static_provider() -> String {
    "static".to_string()
}

/// Bearer credential verification configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Verification mode.
    #[serde(default)]
    pub mode: IdentityMode,
    /// JWT settings (jwt mode).
    #[serde(default)]
    pub jwt: Option<JwtConfig>,
    /// Static tokens (`static_tokens` mode).
    #[serde(default)]
    pub tokens: Vec<StaticTokenConfig>,
}

impl IdentityConfig {
    /// Returns true when at least one credential can ever verify.
    #[must_use]
    pub fn accepts_credentials(&self) -> bool {
        match self.mode {
            IdentityMode::Jwt => self.jwt.is_some(),
            IdentityMode::StaticTokens => !self.tokens.is_empty(),
        }
    }

    /// Validates identity configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            IdentityMode::Jwt => {
                let Some(jwt) = &self.jwt else {
                    return Err(ConfigError::Invalid(
                        "jwt identity mode requires [identity.jwt]".to_string(),
                    ));
                };
                jwt.validate()?;
                if !self.tokens.is_empty() {
                    return Err(ConfigError::Invalid(
                        "identity.tokens is only valid in static_tokens mode".to_string(),
                    ));
                }
            }
            IdentityMode::StaticTokens => {
                if self.jwt.is_some() {
                    return Err(ConfigError::Invalid(
                        "[identity.jwt] is only valid in jwt mode".to_string(),
                    ));
                }
                self.validate_tokens()?;
            }
        }
        Ok(())
    }

    /// Validates the static token table.
    fn validate_tokens(&self) -> Result<(), ConfigError> {
        if self.tokens.len() > MAX_STATIC_TOKENS {
            return Err(ConfigError::Invalid("too many identity tokens".to_string()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.tokens {
            if entry.token.trim().is_empty() {
                return Err(ConfigError::Invalid("identity token must be non-empty".to_string()));
            }
            if entry.token.len() > MAX_STATIC_TOKEN_LENGTH {
                return Err(ConfigError::Invalid("identity token too long".to_string()));
            }
            if entry.token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(
                    "identity token must not contain whitespace".to_string(),
                ));
            }
            if !seen.insert(entry.token.as_str()) {
                return Err(ConfigError::Invalid("duplicate identity token".to_string()));
            }
            if entry.subject.trim().is_empty() {
                return Err(ConfigError::Invalid("identity subject must be non-empty".to_string()));
            }
            if !entry.email.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "identity email is invalid for subject {}",
                    entry.subject
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Invites and Logging
// ============================================================================

/// Invite lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InviteConfig {
    /// Invite lifetime in days.
    #[serde(default = "default_invite_expiry_days")]
    pub expiry_days: u32,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            expiry_days: default_invite_expiry_days(),
        }
    }
}

impl InviteConfig {
    /// Validates invite configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.expiry_days == 0 || self.expiry_days > MAX_INVITE_EXPIRY_DAYS {
            return Err(ConfigError::Invalid(format!(
                "invites.expiry_days must be between 1 and {MAX_INVITE_EXPIRY_DAYS}"
            )));
        }
        Ok(())
    }
}

/// Returns the default invite lifetime.
const fn default_invite_expiry_days() -> u32 {
    DEFAULT_INVITE_EXPIRY_DAYS
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Returns the default log filter.
fn default_log_filter() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(value).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}
