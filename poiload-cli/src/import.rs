//! Import command implementation for the poiload CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use poiload_core::BatchSize;
use poiload_data::{ReaderRegistry, SqliteImportStore, import_file};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{ARG_BATCH_SIZE, ARG_DATABASE, ARG_FILE, CliError, ENV_FILES};

const DEFAULT_DATABASE: &str = "pois.db";

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import point-of-interest exports into a SQLite database. \
                 The reader is chosen by file extension (.json, .csv, .xml). \
                 Records are upserted by their external id, so importing \
                 the same file twice leaves the database unchanged.",
    about = "Import POI export files"
)]
#[ortho_config(prefix = "POILOAD")]
pub(crate) struct ImportArgs {
    /// Export files to import, in order.
    #[arg(value_name = ARG_FILE)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) files: Vec<Utf8PathBuf>,
    /// Path to the SQLite database; created when missing.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Number of points of interest written per transaction.
    #[arg(long = ARG_BATCH_SIZE, value_name = "n")]
    #[serde(default)]
    pub(crate) batch_size: Option<usize>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    /// Export files in processing order.
    pub(crate) files: Vec<Utf8PathBuf>,
    /// Target SQLite database.
    pub(crate) database: Utf8PathBuf,
    /// Points of interest per transaction.
    pub(crate) batch_size: BatchSize,
}

impl ImportConfig {
    pub(crate) fn require_existing(path: &Utf8Path) -> Result<(), CliError> {
        match poiload_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_FILE,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_FILE,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_FILE,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        if args.files.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_FILE,
                env: ENV_FILES,
            });
        }
        let batch_size = match args.batch_size {
            Some(size) => BatchSize::new(size).map_err(|source| CliError::InvalidBatchSize {
                value: size,
                source,
            })?,
            None => BatchSize::default(),
        };
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));

        Ok(Self {
            files: args.files,
            database,
            batch_size,
        })
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(crate) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_import(&config, writer)
}

/// Import every configured file in order, stopping at the first failure.
///
/// Files and batches committed before the failure stay in the database.
pub(crate) fn execute_import(
    config: &ImportConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut store =
        SqliteImportStore::open(&config.database).map_err(|source| CliError::OpenStore {
            path: config.database.clone(),
            source: Box::new(source),
        })?;
    let registry = ReaderRegistry::default();

    for path in &config.files {
        writeln!(writer, "Processing file: {path}").map_err(CliError::WriteOutput)?;
        ImportConfig::require_existing(path)?;
        import_file(path, &registry, &mut store, config.batch_size).map_err(|source| {
            CliError::Import {
                path: path.clone(),
                source: Box::new(source),
            }
        })?;
    }

    writeln!(writer, "Done").map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
