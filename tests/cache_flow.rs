//! End-to-end store/get flow against a running cache.

use std::sync::Arc;
use std::time::Duration;

use cachevisor::{Cache, Config, GetError, Passthrough, StoreError};

/// Config with a short refresh cadence suitable for tests.
fn test_config(refresh_ms: u64) -> Config {
    let mut cfg = Config::default();
    cfg.refresh_interval = Duration::from_millis(refresh_ms);
    cfg.grace = Duration::from_secs(5);
    cfg
}

fn start(refresh_ms: u64) -> Arc<Cache<String>> {
    Cache::start(test_config(refresh_ms), Arc::new(Passthrough), Vec::new()).unwrap()
}

/// Polls `get` until it returns the expected value or the deadline passes.
async fn wait_for_value(cache: &Cache<String>, key: &str, expected: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(v) = cache.get(key) {
            if v == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {key} to become {expected:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fresh_key_is_busy_then_ready() {
    let cache = start(50);

    cache
        .store_ttl("HEL", "-4°C, snow".to_string(), 1.0)
        .await
        .unwrap();

    // The recipe has not run yet; the entry exists but holds no value.
    match cache.get("HEL") {
        Err(GetError::NotReady) => {}
        other => panic!("expected NotReady right after store, got {other:?}"),
    }

    wait_for_value(&cache, "HEL", "-4°C, snow").await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn ttl_at_or_below_refresh_interval_is_rejected() {
    // Default refresh interval is 4 seconds.
    let cache: Arc<Cache<String>> =
        Cache::start(Config::default(), Arc::new(Passthrough), Vec::new()).unwrap();

    let err = cache
        .store_ttl("HEL", "snow".to_string(), 3.99)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "TTL too low. Should be greater than refresh_interval: 4000ms"
    );

    // Exactly equal is still too low; the comparison is strict.
    let err = cache
        .store_ttl("HEL", "snow".to_string(), 4.0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TtlTooLow { refresh_ms: 4000 }));

    // Nothing was installed.
    assert!(matches!(
        cache.get("HEL"),
        Err(GetError::Unavailable { .. })
    ));
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn non_positive_ttl_is_rejected() {
    let cache = start(50);
    for bad in [0.0, -1.0, f64::NAN, 0.00015] {
        let err = cache
            .store_ttl("HEL", "x".to_string(), bad)
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidTtl | StoreError::TtlTooLow { .. }),
            "ttl={bad} produced {err:?}"
        );
    }
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn fractional_ttl_is_accepted() {
    let cache = start(50);
    cache
        .store_ttl("HEL", "snow".to_string(), 12.00)
        .await
        .unwrap();
    wait_for_value(&cache, "HEL", "snow").await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn store_without_ttl_uses_the_default() {
    let cache = start(50);
    cache.store("HEL", "snow".to_string()).await.unwrap();
    wait_for_value(&cache, "HEL", "snow").await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn get_on_unknown_key_names_it() {
    let cache = start(50);
    let err = cache.get("NYC").unwrap_err();
    assert_eq!(
        err.to_string(),
        "data with the given key NYC is not yet available"
    );
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn integer_keys_work_end_to_end() {
    let cache = start(50);
    cache.store_ttl(7, "seven".to_string(), 2.0).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(v) = cache.get(7) {
            assert_eq!(v, "seven");
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for integer key"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_identical_stores_stabilize() {
    let cache = start(50);
    for _ in 0..5 {
        cache
            .store_ttl("HEL", "snow".to_string(), 2.0)
            .await
            .unwrap();
    }
    wait_for_value(&cache, "HEL", "snow").await;

    // Steady state: further identical stores do not disturb the value.
    cache
        .store_ttl("HEL", "snow".to_string(), 2.0)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.get("HEL").unwrap(), "snow");
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn rapid_stores_coalesce_to_the_latest_value() {
    let cache = start(50);
    for i in 0..20 {
        cache
            .store_ttl("tick", format!("v{i}"), 5.0)
            .await
            .unwrap();
    }
    wait_for_value(&cache, "tick", "v19").await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn one_worker_per_key_no_matter_how_often_stored() {
    let cache = start(50);
    for _ in 0..10 {
        cache
            .store_ttl("HEL", "snow".to_string(), 5.0)
            .await
            .unwrap();
    }
    cache.store_ttl("NYC", "sun".to_string(), 5.0).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        let live = cache.live_keys().await;
        if live == vec!["HEL".to_string(), "NYC".to_string()] {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "workers never settled, live = {live:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(cache.len(), 2);
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_within_grace_is_clean() {
    let cache = start(50);
    cache.store_ttl("a", "1".to_string(), 5.0).await.unwrap();
    cache.store_ttl("b", "2".to_string(), 5.0).await.unwrap();
    cache.shutdown().await.unwrap();

    // Workers are gone; further stores are rejected.
    let err = cache
        .store_ttl("c", "3".to_string(), 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Closed));
}
