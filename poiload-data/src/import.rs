//! File-level import driver.
//!
//! Wires the pieces together: select a reader by extension, stream records,
//! project and batch them, and hand each batch to a [`BatchSink`]. Batches
//! commit independently, so a failure part-way through a file leaves every
//! earlier batch in place and nothing from the failing one.

use std::error::Error as StdError;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use poiload_core::{BatchOutcome, BatchSink, BatchSize, Batches, PoiRecord, Projection};
use thiserror::Error;

use crate::readers::{ReaderRegistry, RecordParseError, UnsupportedFormatError};

/// Errors raised while importing a file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No reader handles the file's extension.
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
    /// The input file could not be opened.
    #[error("failed to open input file {path}")]
    Open {
        /// File being imported.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be decoded; the batch holding it was discarded.
    #[error(transparent)]
    Parse(#[from] RecordParseError),
    /// The sink rejected a batch; that batch was rolled back.
    #[error("failed to write batch {batch}")]
    Write {
        /// 1-based number of the failing batch within the file.
        batch: usize,
        /// Error returned by the sink.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Totals for one imported file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Batches committed.
    pub batches: usize,
    /// Rows written across those batches.
    pub written: BatchOutcome,
}

/// Import a single file into `sink`.
///
/// The reader is chosen from `registry` before the file is opened, so an
/// unsupported extension fails without touching the sink.
///
/// # Errors
/// Returns [`ImportError`] for unsupported formats, unreadable files,
/// undecodable records and sink failures.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use poiload_core::BatchSize;
/// use poiload_data::{import_file, readers::ReaderRegistry, store::SqliteImportStore};
///
/// let mut store = SqliteImportStore::open(Utf8Path::new("pois.db"))?;
/// let report = import_file(
///     Utf8Path::new("pois_1.json"),
///     &ReaderRegistry::default(),
///     &mut store,
///     BatchSize::default(),
/// )?;
/// println!("{} batches", report.batches);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn import_file<S>(
    path: &Utf8Path,
    registry: &ReaderRegistry,
    sink: &mut S,
    batch_size: BatchSize,
) -> Result<ImportReport, ImportError>
where
    S: BatchSink + ?Sized,
{
    let factory = registry.select(path)?;
    let file = poiload_fs::open_utf8_file(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let report = import_records(factory(Box::new(file)), sink, batch_size)?;
    info!(
        "Imported {path}: {} points of interest and {} ratings in {} batches",
        report.written.points_of_interest, report.written.ratings, report.batches
    );
    Ok(report)
}

/// Batch an already decoded record stream into `sink`.
///
/// # Errors
/// Returns [`ImportError::Parse`] for the first failing record and
/// [`ImportError::Write`] when the sink rejects a batch. Batches committed
/// before the failure stay committed.
pub fn import_records<I, S>(
    records: I,
    sink: &mut S,
    batch_size: BatchSize,
) -> Result<ImportReport, ImportError>
where
    I: IntoIterator<Item = Result<PoiRecord, RecordParseError>>,
    S: BatchSink + ?Sized,
{
    let projections = records
        .into_iter()
        .map(|outcome| outcome.map(Projection::from));
    let mut report = ImportReport::default();

    for (index, pending) in Batches::new(projections, batch_size).enumerate() {
        let batch = pending?;
        let number = index + 1;
        let outcome = sink
            .write_batch(&batch)
            .map_err(|source| ImportError::Write {
                batch: number,
                source: Box::new(source),
            })?;
        info!(
            "Committed batch {number}: {} points of interest, {} ratings",
            outcome.points_of_interest, outcome.ratings
        );
        report.batches = number;
        report.written = report.written.combine(outcome);
    }

    Ok(report)
}
