//! The write seam between the pipeline and a store.

use crate::batch::Batch;

/// Row counts written by one [`BatchSink::write_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Categories inserted or refreshed.
    pub categories: usize,
    /// Points of interest inserted or updated.
    pub points_of_interest: usize,
    /// Ratings inserted after replacing the previous sets.
    pub ratings: usize,
}

impl BatchOutcome {
    /// Sum two outcomes.
    #[must_use]
    pub const fn combine(mut self, other: Self) -> Self {
        self.categories += other.categories;
        self.points_of_interest += other.points_of_interest;
        self.ratings += other.ratings;
        self
    }
}

/// Destination that applies batches atomically.
///
/// Implementations must:
/// - upsert categories by name and points of interest by external id,
///   overwriting every mutable field of an existing point of interest;
/// - replace, not merge, the rating set of each point of interest in the
///   batch;
/// - apply all of this in one transaction so a failure leaves no partial
///   writes from the batch.
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use poiload_core::{Batch, BatchOutcome, BatchSink};
///
/// #[derive(Default)]
/// struct CountingSink {
///     written: usize,
/// }
///
/// impl BatchSink for CountingSink {
///     type Error = Infallible;
///
///     fn write_batch(&mut self, batch: &Batch) -> Result<BatchOutcome, Self::Error> {
///         self.written += batch.len();
///         Ok(BatchOutcome {
///             categories: batch.categories.len(),
///             points_of_interest: batch.len(),
///             ratings: batch.ratings.len(),
///         })
///     }
/// }
///
/// let mut sink = CountingSink::default();
/// let outcome = sink.write_batch(&Batch::default())?;
/// assert_eq!(outcome, BatchOutcome::default());
/// # Ok::<(), Infallible>(())
/// ```
pub trait BatchSink {
    /// Error raised when a batch cannot be written.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write one batch in a single transaction.
    fn write_batch(&mut self, batch: &Batch) -> Result<BatchOutcome, Self::Error>;
}
