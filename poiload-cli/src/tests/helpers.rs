//! Test helpers for staging export files and inspecting the database.

use crate::import::ImportArgs;
use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

pub(super) const MUSEUM_JSON: &str = r#"[
  {
    "id": 42,
    "name": "Natural History Museum",
    "description": "Dinosaurs and minerals.",
    "coordinates": {"latitude": 51.4967, "longitude": -0.1764},
    "category": "museum",
    "ratings": [4.5, 5, 3]
  }
]"#;

pub(super) const PARKS_CSV: &str = "\
poi_id,poi_name,poi_description,poi_latitude,poi_longitude,poi_category,poi_ratings
7,Hyde Park,,51.5073,-0.1657,park,\"[4,5]\"
8,Regent's Park,Rose garden.,51.5313,-0.1570,park,[]
";

/// Scratch directory holding export files and the target database.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Database path inside a directory that does not exist yet.
    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("artefacts/pois.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write export file");
        path
    }
}

pub(super) fn count_rows(database: &Utf8Path, table: &str) -> i64 {
    let conn = Connection::open(database.as_std_path()).expect("open database");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .expect("count rows")
}

pub(super) fn import_args(files: Vec<Utf8PathBuf>, database: Utf8PathBuf) -> ImportArgs {
    ImportArgs {
        files,
        database: Some(database),
        batch_size: None,
    }
}
