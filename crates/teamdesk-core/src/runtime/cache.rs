// crates/teamdesk-core/src/runtime/cache.rs
// ============================================================================
// Module: Teamdesk Read-Through Cache
// Description: Structured cache keys, in-process TTL cache, and degradable front.
// Purpose: Memoize scoped list reads without ever making cache failures visible.
// Dependencies: crate::interfaces, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! [`ReadThroughCache`] fronts an optional networked [`CacheBackend`] with an
//! in-process [`MemoryCache`]. The networked backend is connected in the
//! background; until it reports ready (and forever after a failed connect)
//! every operation uses the in-process map. Backend errors are logged and
//! absorbed: reads degrade to misses and writes are dropped.
//!
//! Keys are structured ([`CacheKey`]) and render as `kind:scope[:principal]`.
//! Scope invalidation removes the exact `kind:scope` key and every key under
//! `kind:scope:`, so a scope never matches a longer scope sharing its prefix.
//! Invalidation always clears the in-process map as well as the networked
//! backend. A networked backend that fails an invalidation is retired
//! (`Failed`) so it can never serve the entries it did not delete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::core::Clock;
use crate::core::Timestamp;
use crate::core::UserId;
use crate::interfaces::CacheBackend;
use crate::interfaces::CacheError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default time-to-live for cached list payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15);

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

/// Resource kind a cache entry memoizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKind {
    /// Scoped project listing (`projects:<org>:<user>`).
    Projects,
    /// Scoped task listing (`tasks:<org>:<user>`).
    Tasks,
    /// Organization-wide team listing (`team:<org>`).
    Team,
    /// A user's organization listing (`orgs:<user>`).
    Orgs,
    /// A user's own profile page (`profile:<user>`).
    Profile,
}

impl CacheKind {
    /// Returns the key segment for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Team => "team",
            Self::Orgs => "orgs",
            Self::Profile => "profile",
        }
    }
}

/// Structured cache key.
///
/// # Invariants
/// - Renders as `kind:scope` or `kind:scope:principal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Resource kind.
    pub kind: CacheKind,
    /// Invalidation scope (organization or user identifier).
    pub scope: String,
    /// Principal qualifier for per-principal views.
    pub principal: Option<UserId>,
}

impl CacheKey {
    /// Builds a key shared by every principal in the scope.
    #[must_use]
    pub fn scoped(kind: CacheKind, scope: impl Into<String>) -> Self {
        Self {
            kind,
            scope: scope.into(),
            principal: None,
        }
    }

    /// Builds a principal-qualified key.
    #[must_use]
    pub fn for_principal(kind: CacheKind, scope: impl Into<String>, principal: &UserId) -> Self {
        Self {
            kind,
            scope: scope.into(),
            principal: Some(principal.clone()),
        }
    }

    /// Renders the key string stored in the backend.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.principal {
            Some(principal) => format!("{}:{}:{}", self.kind.as_str(), self.scope, principal),
            None => format!("{}:{}", self.kind.as_str(), self.scope),
        }
    }

    /// Returns the exact key and child prefix removed by scope invalidation.
    #[must_use]
    pub fn scope_patterns(kind: CacheKind, scope: &str) -> (String, String) {
        let exact = format!("{}:{scope}", kind.as_str());
        let children = format!("{exact}:");
        (exact, children)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// SECTION: In-Process Cache
// ============================================================================

/// Stored entry of the in-process cache.
#[derive(Debug, Clone)]
struct MemoryEntry {
    /// Cached payload.
    value: Value,
    /// Expiry instant; `None` never expires.
    expires_at: Option<Timestamp>,
}

/// In-process TTL cache.
///
/// # Invariants
/// - Expiry is checked lazily on read; there is no background sweep.
#[derive(Clone)]
pub struct MemoryCache {
    /// Entries keyed by rendered cache key.
    entries: Arc<Mutex<BTreeMap<String, MemoryEntry>>>,
    /// Clock used for expiry checks.
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            clock,
        }
    }

    /// Returns the number of stored entries, including expired ones not yet read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the entry map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, MemoryEntry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory cache mutex poisoned".to_string()))
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache").field("entries", &self.len()).finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.expires_at.is_some_and(|expires_at| expires_at <= now),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = (!ttl.is_zero()).then(|| self.clock.now().saturating_add(ttl));
        self.lock()?.insert(
            key.to_string(),
            MemoryEntry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut entries = self.lock()?;
        let doomed: Vec<String> = entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in doomed {
            entries.remove(&key);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Read-Through Cache
// ============================================================================

/// Connection state of the networked backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No connection was attempted.
    Uninitialized,
    /// A background connection attempt is running.
    Connecting,
    /// The networked backend serves every operation.
    Ready,
    /// The connection failed, or the backend failed an invalidation; the
    /// in-process cache is used permanently.
    Failed,
}

/// Networked backend slot guarded by the cache front.
struct RemoteSlot {
    /// Connection state.
    state: CacheState,
    /// Connected backend (present only when ready).
    backend: Option<Arc<dyn CacheBackend>>,
}

/// Cache front that never surfaces backend failures.
pub struct ReadThroughCache {
    /// In-process fallback.
    fallback: MemoryCache,
    /// Networked backend slot.
    remote: RwLock<RemoteSlot>,
    /// Time-to-live for stored payloads.
    ttl: Duration,
}

impl ReadThroughCache {
    /// Creates a cache that uses only the in-process map until connected.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            fallback: MemoryCache::new(clock),
            remote: RwLock::new(RemoteSlot {
                state: CacheState::Uninitialized,
                backend: None,
            }),
            ttl,
        }
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the networked backend connection state.
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.remote.read().map_or(CacheState::Failed, |slot| slot.state)
    }

    /// Returns the in-process fallback.
    #[must_use]
    pub const fn fallback(&self) -> &MemoryCache {
        &self.fallback
    }

    /// Moves `Uninitialized` to `Connecting`; returns false in any other state.
    pub fn begin_connect(&self) -> bool {
        let Ok(mut slot) = self.remote.write() else {
            return false;
        };
        if slot.state != CacheState::Uninitialized {
            return false;
        }
        slot.state = CacheState::Connecting;
        true
    }

    /// Completes a connection attempt with a ready backend.
    pub fn mark_ready(&self, backend: Arc<dyn CacheBackend>) {
        if let Ok(mut slot) = self.remote.write()
            && slot.state == CacheState::Connecting
        {
            slot.state = CacheState::Ready;
            slot.backend = Some(backend);
            tracing::info!("networked cache ready");
        }
    }

    /// Completes a connection attempt with a failure.
    pub fn mark_failed(&self, err: &CacheError) {
        if let Ok(mut slot) = self.remote.write()
            && slot.state == CacheState::Connecting
        {
            slot.state = CacheState::Failed;
            slot.backend = None;
        }
        tracing::warn!(error = %err, "networked cache connection failed; using in-process cache");
    }

    /// Connects the networked backend in the background.
    ///
    /// Returns `None` when a connection was already attempted. Operations keep
    /// using the in-process cache until the spawned attempt reports ready.
    pub fn connect_in_background<F, Fut>(self: &Arc<Self>, connect: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Arc<dyn CacheBackend>, CacheError>> + Send + 'static,
    {
        if !self.begin_connect() {
            return None;
        }
        let cache = Arc::clone(self);
        Some(tokio::spawn(async move {
            match connect().await {
                Ok(backend) => cache.mark_ready(backend),
                Err(err) => cache.mark_failed(&err),
            }
        }))
    }

    /// Retires a ready backend that could not complete an invalidation.
    fn retire(&self, backend: &Arc<dyn CacheBackend>) {
        if let Ok(mut slot) = self.remote.write()
            && slot.state == CacheState::Ready
            && slot.backend.as_ref().is_some_and(|active| Arc::ptr_eq(active, backend))
        {
            slot.state = CacheState::Failed;
            slot.backend = None;
            tracing::error!("networked cache missed an invalidation; using in-process cache");
        }
    }

    /// Returns the networked backend when ready.
    fn active_remote(&self) -> Option<Arc<dyn CacheBackend>> {
        let slot = self.remote.read().ok()?;
        if slot.state == CacheState::Ready { slot.backend.clone() } else { None }
    }

    /// Reads and decodes a cached payload; every failure is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let rendered = key.render();
        let result = match self.active_remote() {
            Some(remote) => remote.get(&rendered).await,
            None => self.fallback.get(&rendered).await,
        };
        let value = match result {
            Ok(value) => value?,
            Err(err) => {
                tracing::warn!(key = %rendered, error = %err, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(key = %rendered, error = %err, "cached payload did not decode");
                None
            }
        }
    }

    /// Encodes and stores a payload; failures are logged and dropped.
    pub async fn set<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) {
        let rendered = key.render();
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key = %rendered, error = %err, "cache payload did not encode");
                return;
            }
        };
        let result = match self.active_remote() {
            Some(remote) => remote.set(&rendered, &encoded, self.ttl).await,
            None => self.fallback.set(&rendered, &encoded, self.ttl).await,
        };
        if let Err(err) = result {
            tracing::warn!(key = %rendered, error = %err, "cache write failed");
        }
    }

    /// Drops every cached entry of a kind within a scope.
    ///
    /// Clears both the networked backend (when ready) and the in-process map
    /// before returning. When the networked delete fails the backend is
    /// retired, so later reads fall through to the purged in-process map.
    pub async fn invalidate(&self, kind: CacheKind, scope: &str) {
        let (exact, children) = CacheKey::scope_patterns(kind, scope);
        purge(&self.fallback, &exact, &children).await;
        if let Some(remote) = self.active_remote()
            && !purge(remote.as_ref(), &exact, &children).await
        {
            self.retire(&remote);
        }
    }
}

impl fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("state", &self.state())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Deletes an exact key and its child prefix from one backend.
///
/// Returns false when either delete failed.
async fn purge(backend: &dyn CacheBackend, exact: &str, children: &str) -> bool {
    let mut purged = true;
    if let Err(err) = backend.delete(exact).await {
        tracing::warn!(key = %exact, error = %err, "cache delete failed");
        purged = false;
    }
    if let Err(err) = backend.delete_by_prefix(children).await {
        tracing::warn!(prefix = %children, error = %err, "cache prefix delete failed");
        purged = false;
    }
    purged
}

// ============================================================================
// SECTION: Tests
// ============================================================================
