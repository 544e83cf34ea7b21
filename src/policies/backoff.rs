//! # Backoff policy for worker crash restarts.
//!
//! [`BackoffPolicy`] controls how the restart delay grows while a worker
//! keeps crashing. It is parameterized by:
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use cachevisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // First crash - uses 'first' (clamped to max)
//! assert_eq!(backoff.next(None), Duration::from_millis(100));
//!
//! // Second crash - multiplied by factor
//! assert_eq!(backoff.next(Some(Duration::from_millis(100))), Duration::from_millis(200));
//!
//! // When the previous delay exceeds max, the result is capped at max
//! assert_eq!(backoff.next(Some(Duration::from_secs(20))), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::JitterPolicy;

/// Crash-restart backoff policy.
///
/// Encapsulates the parameters that determine how restart delays grow while
/// a worker keeps crashing.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Initial delay before the first restart.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 100ms`
    /// - `max = 30s`
    /// - `factor = 1.0` (constant delay)
    /// - `jitter = JitterPolicy::None`
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the next restart delay based on the previous one.
    ///
    /// - If `prev` is `None` (first crash), returns `first` clamped to `max`.
    /// - Otherwise multiplies the previous delay by `factor` and caps it at
    ///   `max`.
    pub fn next(&self, prev: Option<Duration>) -> Duration {
        let unclamped = match prev {
            None => self.first,
            Some(d) => {
                let grown = d.as_secs_f64() * self.factor;
                if !grown.is_finite() {
                    self.max
                } else {
                    d.mul_f64(self.factor)
                }
            }
        };

        let base = if unclamped > self.max {
            self.max
        } else {
            unclamped
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_factor_keeps_delay_flat() {
        let b = BackoffPolicy::default();
        let d1 = b.next(None);
        let d2 = b.next(Some(d1));
        assert_eq!(d1, d2);
    }

    #[test]
    fn growth_is_capped_at_max() {
        let b = BackoffPolicy {
            first: Duration::from_millis(10),
            max: Duration::from_millis(40),
            factor: 4.0,
            jitter: JitterPolicy::None,
        };
        let d1 = b.next(None);
        let d2 = b.next(Some(d1));
        let d3 = b.next(Some(d2));
        assert_eq!(d1, Duration::from_millis(10));
        assert_eq!(d2, Duration::from_millis(40));
        assert_eq!(d3, Duration::from_millis(40));
    }
}
