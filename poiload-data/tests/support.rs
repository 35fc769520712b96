//! Shared helpers for the import integration tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use poiload_core::BatchSize;
use poiload_data::{ImportError, ImportReport, ReaderRegistry, SqliteImportStore, import_file};
use tempfile::TempDir;

/// Directory containing the sample exports.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path of a named sample export.
pub fn sample(name: &str) -> Utf8PathBuf {
    fixtures_dir().join(name)
}

/// UTF-8 view of a temporary directory.
pub fn utf8_dir(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).expect("temporary directory path is UTF-8")
}

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_input(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
    let path = utf8_dir(dir).join(name);
    fs::write(&path, contents).unwrap_or_else(|err| {
        panic!("failed to write input file {path}: {err}");
    });
    path
}

/// Open a fresh on-disk store inside `dir`.
pub fn open_store(dir: &TempDir) -> SqliteImportStore {
    let path = utf8_dir(dir).join("pois.db");
    SqliteImportStore::open(&path).unwrap_or_else(|err| {
        panic!("failed to open store at {path}: {err}");
    })
}

/// Import `path` with the default registry.
pub fn import(
    store: &mut SqliteImportStore,
    path: &Utf8Path,
    batch_size: usize,
) -> Result<ImportReport, ImportError> {
    let size = BatchSize::new(batch_size).expect("non-zero batch size");
    import_file(path, &ReaderRegistry::default(), store, size)
}

/// JSON array of `count` valid records with ids `1..=count`.
pub fn json_records(count: i64) -> String {
    let records: Vec<String> = (1..=count)
        .map(|id| {
            format!(
                r#"{{"id": {id}, "name": "poi {id}", "coordinates": {{"latitude": 51.5, "longitude": -0.1}}, "category": "park", "ratings": [{id}, 1]}}"#
            )
        })
        .collect();
    format!("[{}]", records.join(",\n"))
}
