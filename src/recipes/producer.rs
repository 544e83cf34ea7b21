//! # Producer adapters.
//!
//! [`Produce`] is the seam between callers and the scheduler: `store` hands
//! the caller's value to the cache's adapter, and the adapter returns the
//! recipe that workers will invoke on refresh ticks.
//!
//! The wrap step captures the value **by value**: mutations the caller makes
//! after `store` returns are never visible to the recipe.
//!
//! Two adapters ship with the crate:
//! - [`Passthrough`] — the production default when no transformation is
//!   needed; the recipe returns the snapshot as-is.
//! - [`Simulated`] — a load-testing adapter that sleeps a bounded random
//!   latency and then succeeds, fails recoverably, or panics according to
//!   configured ratios.
//!
//! Real deployments substitute their own adapter whose recipes run the
//! expensive transformation against the snapshotted input.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

use crate::error::RecipeError;
use crate::recipes::{RecipeFn, RecipeRef};

/// Producer adapter: wraps a stored value into the recipe a worker runs.
pub trait Produce<V>: Send + Sync + 'static {
    /// Wraps `value` into a deferred computation, snapshotting it.
    fn wrap(&self, value: V) -> RecipeRef<V>;
}

/// Identity adapter: the recipe returns the snapshotted value unchanged.
pub struct Passthrough;

impl<V> Produce<V> for Passthrough
where
    V: Clone + Send + Sync + 'static,
{
    fn wrap(&self, value: V) -> RecipeRef<V> {
        RecipeFn::arc(move || {
            let snapshot = value.clone();
            async move { Ok(snapshot) }
        })
    }
}

/// Load-testing adapter with bounded latency and a failure policy.
///
/// Each invocation sleeps a random duration drawn from `latency_ms`, then
/// rolls one outcome:
/// - with probability `panic_ratio` the recipe panics (worker crashes and
///   is restarted by its supervisor),
/// - with probability `fail_ratio` it returns a recoverable
///   [`RecipeError`] (the tick is skipped),
/// - otherwise it returns the snapshot.
///
/// ## Example
/// ```rust
/// use cachevisor::Simulated;
///
/// // 5..=50ms latency, 10% recoverable failures, no panics
/// let adapter = Simulated::new(5..=50, 0.1, 0.0);
/// ```
pub struct Simulated {
    latency_ms: RangeInclusive<u64>,
    fail_ratio: f64,
    panic_ratio: f64,
}

impl Simulated {
    /// Creates a simulated adapter.
    ///
    /// Ratios are clamped to `[0.0, 1.0]`; they are rolled independently,
    /// panic first.
    pub fn new(latency_ms: RangeInclusive<u64>, fail_ratio: f64, panic_ratio: f64) -> Self {
        Self {
            latency_ms,
            fail_ratio: fail_ratio.clamp(0.0, 1.0),
            panic_ratio: panic_ratio.clamp(0.0, 1.0),
        }
    }
}

impl<V> Produce<V> for Simulated
where
    V: Clone + Send + Sync + 'static,
{
    fn wrap(&self, value: V) -> RecipeRef<V> {
        let latency_ms = self.latency_ms.clone();
        let fail_ratio = self.fail_ratio;
        let panic_ratio = self.panic_ratio;

        RecipeFn::arc(move || {
            let snapshot = value.clone();
            let latency_ms = latency_ms.clone();
            async move {
                let (sleep_ms, panic_roll, fail_roll) = {
                    let mut rng = rand::rng();
                    (
                        rng.random_range(latency_ms),
                        rng.random_range(0.0..1.0),
                        rng.random_range(0.0..1.0),
                    )
                };
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
                if panic_roll < panic_ratio {
                    panic!("simulated producer crash");
                }
                if fail_roll < fail_ratio {
                    return Err(RecipeError::new("simulated producer failure"));
                }
                Ok(snapshot)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_snapshots_at_wrap_time() {
        let mut value = vec![1, 2, 3];
        let recipe = Produce::wrap(&Passthrough, value.clone());

        // Caller-side mutation after store() must not leak into the recipe.
        value.push(4);

        assert_eq!(recipe.invoke().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn simulated_with_zero_ratios_always_succeeds() {
        let adapter = Simulated::new(0..=1, 0.0, 0.0);
        let recipe = Produce::wrap(&adapter, 9u32);
        for _ in 0..8 {
            assert_eq!(recipe.invoke().await.unwrap(), 9);
        }
    }

    #[tokio::test]
    async fn simulated_with_full_fail_ratio_always_fails() {
        let adapter = Simulated::new(0..=1, 1.0, 0.0);
        let recipe = Produce::wrap(&adapter, 9u32);
        assert!(recipe.invoke().await.is_err());
    }
}
