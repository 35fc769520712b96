//! Facade crate for the poiload importer.
//!
//! This crate re-exports the core record and batching types and exposes the
//! readers, SQLite store and import driver behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use poiload_core::{
    Batch, BatchAccumulator, BatchOutcome, BatchSink, BatchSize, BatchSizeError, Batches,
    Category, ExternalId, PoiRecord, PointOfInterest, Projection, Rating,
};

#[cfg(feature = "store-sqlite")]
pub use poiload_data::{
    Format, ImportError, ImportReport, ReaderRegistry, RecordParseError, RecordStream,
    SqliteImportStore, StoreCounts, StoreError, UnsupportedFormatError, import_file,
    import_records,
};
