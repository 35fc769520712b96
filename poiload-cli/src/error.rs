//! Error types emitted by the poiload CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use poiload_core::BatchSizeError;
use poiload_data::{ImportError, StoreError};
use thiserror::Error;

/// Errors emitted by the poiload CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass at least one {field} or set {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The configured batch size cannot be used.
    #[error("invalid batch size {value}: {source}")]
    InvalidBatchSize {
        value: usize,
        #[source]
        source: BatchSizeError,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or initialising the SQLite database failed.
    #[error("failed to open database {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: Box<StoreError>,
    },
    /// Importing a file failed part-way; earlier batches stay committed.
    #[error("failed to import {path:?}: {source}")]
    Import {
        path: Utf8PathBuf,
        #[source]
        source: Box<ImportError>,
    },
    /// Writing progress output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
