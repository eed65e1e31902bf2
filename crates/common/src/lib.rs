
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical error type shared across the query-planning and execution
/// subsystems.
#[derive(Error, Debug)]
pub enum BqlError {
    #[error("input: {0}")]
    Input(String),
    #[error("store: {0}")]
    Store(String),
    #[error("evaluation: {0}")]
    Evaluation(String),
    #[error("aggregation: {0}")]
    Aggregation(String),
    #[error("cancelled")]
    Cancelled,
}

/// Result alias that carries a [`BqlError`].
pub type BqlResult<T> = Result<T, BqlError>;

/// Runtime configuration shared by the clause executor and query plan
/// driver.
///
/// # Example
/// ```
/// use common::Config;
///
/// let config = Config::builder()
///     .chan_size(16)
///     .max_concurrent_fetches(8)
///     .build();
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Buffer size for the channels used to multiplex per-graph fetches
    /// and mutations.
    #[builder(default = 16)]
    pub chan_size: usize,
    /// Upper bound on the number of graphs fetched or mutated concurrently.
    #[builder(default = 8)]
    pub max_concurrent_fetches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chan_size: 16,
            max_concurrent_fetches: 8,
        }
    }
}

/// A cooperative cancellation signal shared between a query plan driver
/// and the tasks it spawns to fetch or mutate graphs.
///
/// Cloning a token shares the same underlying flag; cancelling any clone
/// cancels all of them.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }

    /// Returns `Err(BqlError::Cancelled)` if the token has been cancelled,
    /// otherwise `Ok(())`. Intended to be called at clause and row
    /// boundaries inside long-running loops.
    pub fn check(&self) -> BqlResult<()> {
        if self.is_cancelled() {
            Err(BqlError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Per-query constraints passed through to the store on fetch, notably
/// temporal lower/upper bounds on a predicate's timestamp. `None` on
/// either side means unbounded in that direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub lower_bound: Option<i64>,
    pub upper_bound: Option<i64>,
}

impl LookupOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Narrows these bounds against another set, taking the max of the
    /// lower bounds and the min of the upper bounds. Used by
    /// `updateTimeBoundsForRow` (§4.3) when a row's anchor further
    /// constrains a temporal predicate.
    pub fn tighten(&self, lower: Option<i64>, upper: Option<i64>) -> Self {
        let lower_bound = match (self.lower_bound, lower) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        let upper_bound = match (self.upper_bound, upper) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        Self {
            lower_bound,
            upper_bound,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{BqlError, BqlResult, CancellationToken, Config, LookupOptions};
}
