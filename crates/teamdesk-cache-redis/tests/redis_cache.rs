// crates/teamdesk-cache-redis/tests/redis_cache.rs
// ============================================================================
// Module: Redis Cache Backend Tests
// Description: Connection failure handling and optional live-server checks.
// Purpose: Ensure an unreachable Redis degrades to the in-process cache.
// ============================================================================

//! ## Overview
//! The unreachable-server cases always run. The live cases run only when
//! `TEAMDESK_TEST_REDIS_URL` points at a disposable Redis instance.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use teamdesk_cache_redis::RedisCacheBackend;
use teamdesk_cache_redis::RedisCacheConfig;
use teamdesk_cache_redis::RedisCacheError;
use teamdesk_cache_redis::connect;
use teamdesk_core::CacheBackend;
use teamdesk_core::CacheError;
use teamdesk_core::CacheKey;
use teamdesk_core::CacheKind;
use teamdesk_core::CacheState;
use teamdesk_core::ManualClock;
use teamdesk_core::ReadThroughCache;
use teamdesk_core::Timestamp;
use tokio::net::TcpListener;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a loopback URL with nothing listening on it.
async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("redis://127.0.0.1:{port}/")
}

fn live_config() -> Option<RedisCacheConfig> {
    std::env::var("TEAMDESK_TEST_REDIS_URL").ok().map(RedisCacheConfig::for_url)
}

// ============================================================================
// SECTION: Unreachable Server
// ============================================================================

#[tokio::test]
async fn connect_to_closed_port_is_unreachable() {
    let mut config = RedisCacheConfig::for_url(dead_url().await);
    config.connect_timeout_ms = 500;
    let Err(err) = RedisCacheBackend::connect(&config).await else {
        panic!("expected connection to a closed port to fail");
    };
    assert!(matches!(err, RedisCacheError::Unreachable(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn malformed_url_is_rejected() {
    let Err(err) = connect(RedisCacheConfig::for_url("not a url")).await else {
        panic!("expected malformed url to fail");
    };
    assert!(matches!(err, CacheError::Unavailable(_)));
}

#[tokio::test]
async fn failed_background_connect_keeps_the_in_process_cache() {
    let clock = ManualClock::new(Timestamp::from_unix_millis(1_700_000_000_000));
    let cache = Arc::new(ReadThroughCache::new(Arc::new(clock), Duration::from_secs(15)));
    let mut config = RedisCacheConfig::for_url(dead_url().await);
    config.connect_timeout_ms = 500;

    let handle = cache.connect_in_background(move || connect(config)).unwrap();
    handle.await.unwrap();
    assert_eq!(cache.state(), CacheState::Failed);
    let retry = cache.connect_in_background(|| async {
        Err::<Arc<dyn CacheBackend>, _>(CacheError::Unavailable("again".to_string()))
    });
    assert!(retry.is_none());

    let key = CacheKey::scoped(CacheKind::Team, "org-1");
    cache.set(&key, &vec!["alice".to_string()]).await;
    assert_eq!(cache.get::<Vec<String>>(&key).await, Some(vec!["alice".to_string()]));
    cache.invalidate(CacheKind::Team, "org-1").await;
    assert_eq!(cache.get::<Vec<String>>(&key).await, None);
}

// ============================================================================
// SECTION: Live Server
// ============================================================================

#[tokio::test]
async fn live_prefix_delete_spares_sibling_scopes() {
    let Some(mut config) = live_config() else {
        return;
    };
    config.scan_batch = 2;
    let backend = RedisCacheBackend::connect(&config).await.unwrap();
    let ttl = Duration::from_secs(30);
    let run = std::process::id();
    let keys = [
        format!("tasks:live{run}:u1"),
        format!("tasks:live{run}:u2"),
        format!("tasks:live{run}:u3"),
        format!("tasks:live{run}0:u1"),
    ];
    for key in &keys {
        backend.set(key, &json!({ "key": key }), ttl).await.unwrap();
    }

    backend.delete_by_prefix(&format!("tasks:live{run}:")).await.unwrap();

    for key in &keys[..3] {
        assert_eq!(backend.get(key).await.unwrap(), None);
    }
    assert_eq!(backend.get(&keys[3]).await.unwrap(), Some(json!({ "key": keys[3] })));
    backend.delete(&keys[3]).await.unwrap();
}

#[tokio::test]
async fn live_entries_expire_after_ttl() {
    let Some(config) = live_config() else {
        return;
    };
    let backend = RedisCacheBackend::connect(&config).await.unwrap();
    let key = format!("profile:ttl{}", std::process::id());
    backend.set(&key, &json!([1, 2, 3]), Duration::from_millis(50)).await.unwrap();
    assert_eq!(backend.get(&key).await.unwrap(), Some(json!([1, 2, 3])));
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(backend.get(&key).await.unwrap(), None);
}
