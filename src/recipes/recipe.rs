//! # Recipe abstraction.
//!
//! Defines the core [`Recipe`] trait for deferred computations.
//!
//! - **[`Recipe`]** — trait for zero-argument async computations
//! - **[`RecipeRef`]** — shared handle (`Arc<dyn Recipe<V>>`) stored in a record
//! - **[`BoxRecipeFuture`]** — type alias for boxed recipe futures
//!
//! ## Rules
//! - [`Recipe::invoke`] takes `&self` and returns a **fresh** future per
//!   call; a recipe may be invoked many times over its record's life
//! - A recipe resolves to `Ok(value)`, a recoverable
//!   [`RecipeError`](crate::RecipeError), or panics; a panic crashes the
//!   worker and triggers a supervised restart
//! - The crate provides [`RecipeFn`], a closure-backed implementation

use std::{future::Future, pin::Pin, sync::Arc};

use crate::error::RecipeError;

/// Boxed future returned by [`Recipe::invoke`].
pub type BoxRecipeFuture<V> =
    Pin<Box<dyn Future<Output = Result<V, RecipeError>> + Send + 'static>>;

/// Shared handle to a recipe, stored by value in a record.
pub type RecipeRef<V> = Arc<dyn Recipe<V>>;

/// Deferred, zero-argument computation producing the served value.
///
/// ## Example
/// ```rust
/// use cachevisor::{BoxRecipeFuture, Recipe};
///
/// struct QuoteFetch {
///     symbol: String,
/// }
///
/// impl Recipe<String> for QuoteFetch {
///     fn invoke(&self) -> BoxRecipeFuture<String> {
///         let symbol = self.symbol.clone();
///         Box::pin(async move {
///             // fetch, transform...
///             Ok(format!("{symbol}: 1.00"))
///         })
///     }
/// }
/// ```
pub trait Recipe<V>: Send + Sync + 'static {
    /// Creates a new future computing the value once.
    fn invoke(&self) -> BoxRecipeFuture<V>;
}

/// Closure-backed recipe implementation.
///
/// Wraps a closure that *creates* a new future per invocation. The closure
/// is `Fn`, so there is no shared mutable state between invocations; state
/// that must persist across invocations goes behind an explicit `Arc`.
///
/// ## Example
/// ```rust
/// use cachevisor::{RecipeFn, RecipeRef};
///
/// let r: RecipeRef<u64> = RecipeFn::arc(|| async { Ok(42) });
/// ```
pub struct RecipeFn<F> {
    f: F,
}

impl<F> RecipeFn<F> {
    /// Creates a new closure-backed recipe.
    ///
    /// Prefer [`RecipeFn::arc`] when you immediately need a [`RecipeRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the recipe and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut, V> Recipe<V> for RecipeFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, RecipeError>> + Send + 'static,
{
    fn invoke(&self) -> BoxRecipeFuture<V> {
        Box::pin((self.f)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recipe_fn_yields_a_fresh_future_per_invoke() {
        let r: RecipeRef<u32> = RecipeFn::arc(|| async { Ok(5) });
        assert_eq!(r.invoke().await.unwrap(), 5);
        assert_eq!(r.invoke().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn recipe_fn_propagates_recoverable_errors() {
        let r: RecipeRef<u32> =
            RecipeFn::arc(|| async { Err(crate::RecipeError::new("upstream down")) });
        let err = r.invoke().await.unwrap_err();
        assert_eq!(err.to_string(), "recipe failed: upstream down");
    }
}
