// crates/teamdesk-cache-redis/src/backend.rs
// ============================================================================
// Module: Redis Cache Backend
// Description: GET/SET PX/SCAN+DEL cache backend over a managed connection.
// Purpose: Provide the networked tier of the read-through cache.
// Dependencies: teamdesk-core, redis, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! Payloads are stored as JSON strings with a millisecond TTL. The backend
//! never retries: a failed command surfaces as a [`CacheError`] and the
//! read-through cache treats it as a miss.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::RedisError;
use redis::aio::ConnectionManager;
use serde::Deserialize;
use serde_json::Value;
use teamdesk_core::CacheBackend;
use teamdesk_core::CacheError;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default `COUNT` hint for `SCAN` batches.
pub const DEFAULT_SCAN_BATCH: u32 = 50;
/// Default time allowed for the initial connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// SECTION: Config and Errors
// ============================================================================

/// Redis backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedisCacheConfig {
    /// Connection URL (`redis://` or `rediss://`).
    pub url: String,
    /// `COUNT` hint for each `SCAN` batch.
    #[serde(default = "default_scan_batch")]
    pub scan_batch: u32,
    /// Time allowed for the initial connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl RedisCacheConfig {
    /// Creates a config with default batch and timeout for the URL.
    #[must_use]
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scan_batch: DEFAULT_SCAN_BATCH,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

/// Default `SCAN` batch size.
const fn default_scan_batch() -> u32 {
    DEFAULT_SCAN_BATCH
}

/// Default connection timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Redis backend errors.
#[derive(Debug, Error)]
pub enum RedisCacheError {
    /// The connection URL did not parse.
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),
    /// The server could not be reached in time.
    #[error("redis unreachable: {0}")]
    Unreachable(String),
    /// The server rejected a command.
    #[error("redis command failed: {0}")]
    Command(String),
}

impl From<RedisCacheError> for CacheError {
    fn from(error: RedisCacheError) -> Self {
        match error {
            RedisCacheError::InvalidUrl(_) | RedisCacheError::Unreachable(_) => {
                Self::Unavailable(error.to_string())
            }
            RedisCacheError::Command(_) => Self::Backend(error.to_string()),
        }
    }
}

impl From<RedisError> for RedisCacheError {
    fn from(error: RedisError) -> Self {
        if error.is_io_error() || error.is_connection_dropped() || error.is_timeout() {
            Self::Unreachable(error.to_string())
        } else {
            Self::Command(error.to_string())
        }
    }
}

/// Converts a client error into the cache seam's error.
fn cache_error(error: RedisError) -> CacheError {
    RedisCacheError::from(error).into()
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Cache backend over a multiplexed, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisCacheBackend {
    /// Managed connection; clones share one multiplexed socket.
    connection: ConnectionManager,
    /// `COUNT` hint for `SCAN`.
    scan_batch: u32,
}

impl RedisCacheBackend {
    /// Opens a connection and returns a ready backend.
    ///
    /// # Errors
    ///
    /// Returns [`RedisCacheError`] when the URL is invalid or the server does
    /// not answer within the configured timeout.
    pub async fn connect(config: &RedisCacheConfig) -> Result<Self, RedisCacheError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|err| RedisCacheError::InvalidUrl(err.to_string()))?;
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let connection = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| RedisCacheError::Unreachable("connection timed out".to_string()))??;
        Ok(Self {
            connection,
            scan_batch: config.scan_batch.max(1),
        })
    }
}

impl std::fmt::Debug for RedisCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheBackend").field("scan_batch", &self.scan_batch).finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(key).await.map_err(cache_error)?;
        raw.map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(|err| CacheError::Serialization(err.to_string()))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(value).map_err(|err| CacheError::Serialization(err.to_string()))?;
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: u64 = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(self.scan_batch)
                .query_async(&mut conn)
                .await
                .map_err(cache_error)?;
            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await.map_err(cache_error)?;
                removed += deleted;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        tracing::debug!(prefix = %prefix, removed, "redis prefix invalidation");
        Ok(())
    }
}

/// Connects a backend for `ReadThroughCache::connect_in_background`.
///
/// # Errors
///
/// Returns [`CacheError::Unavailable`] when the server cannot be reached.
pub async fn connect(config: RedisCacheConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
    let backend = RedisCacheBackend::connect(&config).await?;
    Ok(Arc::new(backend))
}

/// Escapes Redis glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_glob_leaves_plain_keys_alone() {
        assert_eq!(escape_glob("tasks:org-1:"), "tasks:org-1:");
        assert_eq!(escape_glob("team:abc:"), "team:abc:");
    }

    #[test]
    fn escape_glob_escapes_metacharacters() {
        assert_eq!(escape_glob("a*b?c[d]"), "a\\*b\\?c\\[d\\]");
        assert_eq!(escape_glob("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn unreachable_errors_map_to_unavailable() {
        let err: CacheError = RedisCacheError::Unreachable("refused".to_string()).into();
        assert!(matches!(err, CacheError::Unavailable(_)));
        let err: CacheError = RedisCacheError::Command("WRONGTYPE".to_string()).into();
        assert!(matches!(err, CacheError::Backend(_)));
    }
}
