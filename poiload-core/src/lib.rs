//! Core domain types for the POI import pipeline.
//!
//! Responsibilities:
//! - Define the format-independent [`PoiRecord`] produced by every reader.
//! - Project records into persistence-ready entities linked by natural keys.
//! - Group projections into bounded [`Batch`]es and describe the
//!   [`BatchSink`] seam that stores implement.
//!
//! Boundaries:
//! - No I/O. Parsing lives in `poiload-data`, as does the SQLite store.
//!
//! Invariants:
//! - No global mutable state; batch accumulation is an explicit object.
#![forbid(unsafe_code)]

pub mod batch;
pub mod model;
pub mod record;
pub mod sink;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use batch::{Batch, BatchAccumulator, BatchSize, BatchSizeError, Batches};
pub use model::{Category, PointOfInterest, Projection, Rating};
pub use record::{ExternalId, PoiRecord};
pub use sink::{BatchOutcome, BatchSink};
