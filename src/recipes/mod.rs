//! # Recipes and producer adapters.
//!
//! A *recipe* is the unit of scheduled work: a deferred, zero-argument
//! computation installed by `store` and invoked by the key's worker on each
//! refresh tick. A *producer adapter* turns a caller-supplied value into a
//! recipe, snapshotting the value at store time.

mod producer;
mod recipe;

pub use producer::{Passthrough, Produce, Simulated};
pub use recipe::{BoxRecipeFuture, Recipe, RecipeFn, RecipeRef};
