//! Input readers, SQLite persistence and the import driver for poiload.
//!
//! Responsibilities:
//! - Decode JSON, CSV and XML exports into [`poiload_core::PoiRecord`]
//!   streams ([`readers`]).
//! - Persist batches into SQLite with natural-key upserts ([`store`]).
//! - Drive a file through reader, batcher and sink ([`import_file`]).
//!
//! Boundaries:
//! - Projection and batching rules live in `poiload-core`.
//! - Filesystem access goes through `poiload-fs`.
//!
//! Invariants:
//! - Readers hold at most one record in memory.
//! - Each batch commits or rolls back as a unit.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod import;
pub mod readers;
pub mod store;

pub use import::{ImportError, ImportReport, import_file, import_records};
pub use readers::{Format, ReaderRegistry, RecordParseError, RecordStream, UnsupportedFormatError};
pub use store::{SqliteImportStore, StoreCounts, StoreError};
