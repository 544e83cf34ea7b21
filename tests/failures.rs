//! Failure isolation: panicking recipes crash only their own worker, and
//! recoverable failures never destroy previously computed values.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cachevisor::{
    BackoffPolicy, Cache, Config, GetError, JitterPolicy, Produce, RecipeError, RecipeFn,
    RecipeRef,
};

fn test_config(refresh_ms: u64) -> Config {
    let mut cfg = Config::default();
    cfg.refresh_interval = Duration::from_millis(refresh_ms);
    cfg.grace = Duration::from_secs(5);
    cfg.restart_backoff = BackoffPolicy {
        first: Duration::from_millis(10),
        max: Duration::from_millis(50),
        factor: 1.0,
        jitter: JitterPolicy::None,
    };
    cfg
}

/// Adapter whose recipes panic on their first invocation and succeed on
/// every retry.
struct PanicOnce;

impl Produce<u32> for PanicOnce {
    fn wrap(&self, value: u32) -> RecipeRef<u32> {
        let attempts = Arc::new(AtomicU32::new(0));
        RecipeFn::arc(move || {
            let attempts = attempts.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first invocation blows up");
                }
                Ok(value)
            }
        })
    }
}

/// Adapter whose recipes always fail recoverably.
struct AlwaysFailing;

impl Produce<u32> for AlwaysFailing {
    fn wrap(&self, _value: u32) -> RecipeRef<u32> {
        RecipeFn::arc(|| async { Err(RecipeError::new("upstream down")) })
    }
}

/// Adapter whose recipes panic forever for one poisoned value and succeed
/// for everything else.
struct PoisonValue;

impl Produce<u32> for PoisonValue {
    fn wrap(&self, value: u32) -> RecipeRef<u32> {
        RecipeFn::arc(move || async move {
            if value == 13 {
                panic!("poisoned input");
            }
            Ok(value)
        })
    }
}

async fn wait_for(cache: &Cache<u32>, key: &str, expected: u32) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(4);
    loop {
        if let Ok(v) = cache.get(key) {
            if v == expected {
                return;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {key} = {expected}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn crashed_worker_is_restarted_and_retries() {
    let cache: Arc<Cache<u32>> =
        Cache::start(test_config(50), Arc::new(PanicOnce), Vec::new()).unwrap();

    cache.store_ttl("flaky", 7, 10.0).await.unwrap();

    // First tick panics, the supervisor restarts the worker, the retry
    // succeeds.
    wait_for(&cache, "flaky", 7).await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn crash_on_one_key_leaves_other_keys_alone() {
    let cache: Arc<Cache<u32>> =
        Cache::start(test_config(50), Arc::new(PanicOnce), Vec::new()).unwrap();

    cache.store_ttl("a", 1, 10.0).await.unwrap();
    cache.store_ttl("b", 2, 10.0).await.unwrap();
    cache.store_ttl("c", 3, 10.0).await.unwrap();

    wait_for(&cache, "a", 1).await;
    wait_for(&cache, "b", 2).await;
    wait_for(&cache, "c", 3).await;
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn recoverable_failure_skips_the_tick_and_keeps_busy() {
    let cache: Arc<Cache<u32>> =
        Cache::start(test_config(40), Arc::new(AlwaysFailing), Vec::new()).unwrap();

    cache.store_ttl("down", 1, 5.0).await.unwrap();

    // Several ticks pass; every recipe invocation fails recoverably, so no
    // value ever materializes, but the entry stays live.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(cache.get("down"), Err(GetError::NotReady)));
    assert_eq!(cache.live_keys().await, vec!["down".to_string()]);
    cache.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn crash_preserves_the_previous_value() {
    let cache: Arc<Cache<u32>> =
        Cache::start(test_config(40), Arc::new(PoisonValue), Vec::new()).unwrap();

    cache.store_ttl("k", 7, 10.0).await.unwrap();
    wait_for(&cache, "k", 7).await;

    // Install a poisoned input: every tick now crashes the worker, the
    // supervisor keeps restarting it, and the record keeps its last good
    // value throughout.
    cache.store_ttl("k", 13, 10.0).await.unwrap();
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").unwrap(), 7);
    }
    cache.shutdown().await.unwrap();
}
