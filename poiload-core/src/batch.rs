//! Chunking of projected records into bounded write batches.
//!
//! A [`BatchAccumulator`] collects projections until it holds
//! [`BatchSize`] points of interest, then hands back a [`Batch`] whose rating
//! lists are flattened into one batch-wide list. [`Batches`] adapts a
//! fallible stream of projections into a fallible stream of batches.

use std::collections::{HashMap, HashSet};

use log::warn;
use thiserror::Error;

use crate::model::{Category, PointOfInterest, Projection, Rating};
use crate::record::ExternalId;

/// Maximum number of points of interest per batch.
///
/// # Examples
/// ```
/// use poiload_core::BatchSize;
///
/// assert_eq!(BatchSize::default().get(), 1000);
/// assert!(BatchSize::new(0).is_err());
/// assert_eq!(BatchSize::new(25).map(BatchSize::get), Ok(25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(usize);

impl BatchSize {
    /// Default threshold applied when none is configured.
    pub const DEFAULT: Self = Self(1000);

    /// Validate and construct a batch size.
    pub const fn new(size: usize) -> Result<Self, BatchSizeError> {
        if size == 0 {
            return Err(BatchSizeError::Zero);
        }
        Ok(Self(size))
    }

    /// Number of points of interest per batch.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Errors returned by [`BatchSize::new`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BatchSizeError {
    /// A batch must hold at least one point of interest.
    #[error("batch size must be at least 1")]
    Zero,
}

/// Entities written together in a single transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Distinct categories referenced by the batch.
    pub categories: Vec<Category>,
    /// Points of interest, unique by external id.
    pub points_of_interest: Vec<PointOfInterest>,
    /// Ratings of every point of interest in the batch.
    pub ratings: Vec<Rating>,
}

impl Batch {
    /// Number of points of interest in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points_of_interest.len()
    }

    /// Whether the batch holds no points of interest.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points_of_interest.is_empty()
    }
}

/// Explicit accumulator for batch construction.
///
/// Within one batch a later projection with an external id already present
/// replaces the earlier point of interest and its ratings.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use poiload_core::{BatchAccumulator, BatchSize, PoiRecord, Projection};
///
/// let mut accumulator = BatchAccumulator::new(BatchSize::new(2)?);
/// let project = |id| Projection::from(PoiRecord::new(id, "poi", Coord { x: 0.0, y: 0.0 }, "park"));
///
/// assert!(accumulator.push(project(1)).is_none());
/// let full = accumulator.push(project(2)).expect("second POI fills the batch");
/// assert_eq!(full.len(), 2);
/// assert_eq!(full.categories.len(), 1);
///
/// accumulator.push(project(3));
/// assert_eq!(accumulator.finish().map(|batch| batch.len()), Some(1));
/// assert!(accumulator.finish().is_none());
/// # Ok::<(), poiload_core::BatchSizeError>(())
/// ```
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    size: BatchSize,
    pending: Batch,
    categories: HashSet<String>,
    slots: HashMap<ExternalId, usize>,
}

impl BatchAccumulator {
    /// Create an accumulator that emits batches of at most `size` POIs.
    #[must_use]
    pub fn new(size: BatchSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Add a projection, returning a full batch once the threshold is reached.
    pub fn push(&mut self, projection: Projection) -> Option<Batch> {
        let Projection {
            category,
            point_of_interest,
            ratings,
        } = projection;

        if self.categories.insert(category.name.clone()) {
            self.pending.categories.push(category);
        }

        let external_id = point_of_interest.external_id;
        match self.slots.get(&external_id).copied() {
            Some(slot) => {
                warn!(
                    "Point of interest {external_id} appears more than once in a batch; keeping the later record"
                );
                if let Some(existing) = self.pending.points_of_interest.get_mut(slot) {
                    let replaced = std::mem::replace(existing, point_of_interest);
                    self.release_category(&replaced.category);
                }
                self.pending
                    .ratings
                    .retain(|rating| rating.point_of_interest != external_id);
            }
            None => {
                self.slots
                    .insert(external_id, self.pending.points_of_interest.len());
                self.pending.points_of_interest.push(point_of_interest);
            }
        }
        self.pending.ratings.extend(ratings);

        (self.pending.len() >= self.size.get()).then(|| self.take())
    }

    /// Flush the pending partial batch, if it holds anything.
    pub fn finish(&mut self) -> Option<Batch> {
        (!self.pending.is_empty()).then(|| self.take())
    }

    /// Drop the pending batch without emitting it.
    pub fn discard(&mut self) {
        drop(self.take());
    }

    /// Number of points of interest waiting in the pending batch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Forget a category once no pending point of interest refers to it.
    fn release_category(&mut self, name: &str) {
        let in_use = self
            .pending
            .points_of_interest
            .iter()
            .any(|poi| poi.category == name);
        if !in_use && self.categories.remove(name) {
            self.pending.categories.retain(|category| category.name != name);
        }
    }

    fn take(&mut self) -> Batch {
        self.categories.clear();
        self.slots.clear();
        std::mem::take(&mut self.pending)
    }
}

/// Iterator adaptor grouping fallible projections into fallible batches.
///
/// The first error is yielded in place of the batch being built, which is
/// discarded; iteration stops afterwards. Batches emitted earlier are
/// unaffected.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use poiload_core::{BatchSize, Batches, PoiRecord, Projection};
///
/// let projections = (1..=5).map(|id| {
///     Ok::<_, std::convert::Infallible>(Projection::from(PoiRecord::new(
///         id,
///         "poi",
///         Coord { x: 0.0, y: 0.0 },
///         "park",
///     )))
/// });
/// let sizes: Vec<_> = Batches::new(projections, BatchSize::new(2)?)
///     .map(|batch| batch.map(|b| b.len()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(sizes, vec![2, 2, 1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Batches<I> {
    projections: I,
    accumulator: BatchAccumulator,
    exhausted: bool,
}

impl<I> Batches<I> {
    /// Wrap a stream of projections.
    pub fn new<T>(projections: T, size: BatchSize) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            projections: projections.into_iter(),
            accumulator: BatchAccumulator::new(size),
            exhausted: false,
        }
    }
}

impl<I, E> Iterator for Batches<I>
where
    I: Iterator<Item = Result<Projection, E>>,
{
    type Item = Result<Batch, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.projections.next() {
                Some(Ok(projection)) => {
                    if let Some(batch) = self.accumulator.push(projection) {
                        return Some(Ok(batch));
                    }
                }
                Some(Err(error)) => {
                    self.exhausted = true;
                    self.accumulator.discard();
                    return Some(Err(error));
                }
                None => {
                    self.exhausted = true;
                    return self.accumulator.finish().map(Ok);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
