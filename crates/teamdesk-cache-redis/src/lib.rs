// crates/teamdesk-cache-redis/src/lib.rs
// ============================================================================
// Module: Teamdesk Redis Cache
// Description: Redis-backed implementation of the cache backend seam.
// Purpose: Share cached listings across server processes.
// Dependencies: teamdesk-core, redis, tokio
// ============================================================================

//! ## Overview
//! [`RedisCacheBackend`] implements `teamdesk_core::CacheBackend` with plain
//! `GET`, `SET PX`, and `DEL` commands. Prefix deletion walks the keyspace
//! with bounded `SCAN ... MATCH` batches so it never blocks the server with
//! `KEYS`. [`connect`] is shaped for `ReadThroughCache::connect_in_background`.

pub mod backend;

pub use backend::DEFAULT_CONNECT_TIMEOUT_MS;
pub use backend::DEFAULT_SCAN_BATCH;
pub use backend::RedisCacheBackend;
pub use backend::RedisCacheConfig;
pub use backend::RedisCacheError;
pub use backend::connect;
