//! SQLite store for imported points of interest.
//!
//! The module is split into two focused submodules:
//! - `schema` creates the tables and indexes when they are missing.
//! - `upsert` applies batches transactionally through [`BatchSink`].
//!
//! Rows are matched on natural keys: categories on `name` and points of
//! interest on `external_id`. Ratings have no natural key and are replaced as
//! a set whenever their point of interest is written.
#![forbid(unsafe_code)]

mod schema;
mod upsert;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use poiload_core::{Batch, BatchOutcome, BatchSink, ExternalId};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

pub use schema::{SchemaError, initialise_schema};

/// Errors raised by [`SqliteImportStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Schema initialisation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A point of interest names a category missing from its batch.
    #[error("point of interest {external_id} references category {category:?} outside its batch")]
    UnknownCategory {
        /// Category name.
        category: String,
        /// Owning point of interest.
        external_id: ExternalId,
    },
    /// A rating belongs to a point of interest missing from its batch.
    #[error("rating references point of interest {external_id} outside its batch")]
    UnknownPointOfInterest {
        /// External id named by the rating.
        external_id: ExternalId,
    },
    /// A rating position does not fit an SQLite integer.
    #[error("rating position {index} of point of interest {external_id} exceeds SQLite i64 range")]
    PositionOutOfRange {
        /// Owning point of interest.
        external_id: ExternalId,
        /// Offending position.
        index: usize,
    },
    /// A statement or transaction failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Operation being performed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Row counts across the three import tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    /// Rows in `categories`.
    pub categories: usize,
    /// Rows in `points_of_interest`.
    pub points_of_interest: usize,
    /// Rows in `ratings`.
    pub ratings: usize,
}

/// A persisted point of interest with its category resolved to a name.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPointOfInterest {
    /// Surrogate row id.
    pub id: i64,
    /// Natural key.
    pub external_id: ExternalId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Category name.
    pub category: String,
}

/// [`BatchSink`] backed by an SQLite database.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use poiload_core::{BatchAccumulator, BatchSink, BatchSize, PoiRecord, Projection};
/// use poiload_data::store::SqliteImportStore;
///
/// let mut store = SqliteImportStore::open_in_memory()?;
/// let mut accumulator = BatchAccumulator::new(BatchSize::default());
/// let record = PoiRecord::new(42, "Tower", Coord { x: -0.07, y: 51.5 }, "museum")
///     .with_ratings(vec![4.0, 5.0]);
/// accumulator.push(Projection::from(record));
/// let batch = accumulator.finish().expect("one pending record");
///
/// store.write_batch(&batch)?;
/// store.write_batch(&batch)?;
///
/// let counts = store.counts()?;
/// assert_eq!((counts.categories, counts.points_of_interest, counts.ratings), (1, 1, 2));
/// # Ok::<(), poiload_data::store::StoreError>(())
/// ```
#[derive(Debug)]
pub struct SqliteImportStore {
    connection: Connection,
}

impl SqliteImportStore {
    /// Open or create the database at `path`, creating missing parent
    /// directories and initialising the schema.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the directory, database or schema cannot
    /// be prepared.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        poiload_fs::ensure_parent_dir(path).map_err(|source| StoreError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(connection)
    }

    /// Adopt an existing connection, initialising the schema on it.
    ///
    /// # Errors
    /// Returns [`StoreError::Schema`] when initialisation fails.
    pub fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        initialise_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Borrow the underlying connection for ad hoc queries.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Count rows in every import table.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] when a count query fails.
    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        Ok(StoreCounts {
            categories: self.count("categories")?,
            points_of_interest: self.count("points_of_interest")?,
            ratings: self.count("ratings")?,
        })
    }

    fn count(&self, table: &'static str) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        self.connection
            .query_row(&sql, [], |row| row.get::<_, usize>(0))
            .map_err(|source| StoreError::Sqlite {
                operation: "count rows",
                source,
            })
    }

    /// Fetch the point of interest stored under `external_id`.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] when the lookup fails.
    pub fn point_of_interest(
        &self,
        external_id: ExternalId,
    ) -> Result<Option<StoredPointOfInterest>, StoreError> {
        self.connection
            .prepare_cached(
                "SELECT poi.id, poi.external_id, poi.name, poi.description,
                        poi.latitude, poi.longitude, category.name
                 FROM points_of_interest AS poi
                 JOIN categories AS category ON category.id = poi.category_id
                 WHERE poi.external_id = ?1",
            )
            .and_then(|mut statement| {
                statement
                    .query_row([external_id], |row| {
                        Ok(StoredPointOfInterest {
                            id: row.get(0)?,
                            external_id: row.get(1)?,
                            name: row.get(2)?,
                            description: row.get(3)?,
                            location: Coord {
                                x: row.get(5)?,
                                y: row.get(4)?,
                            },
                            category: row.get(6)?,
                        })
                    })
                    .optional()
            })
            .map_err(|source| StoreError::Sqlite {
                operation: "look up point of interest",
                source,
            })
    }

    /// Rating values of `external_id` ordered by source position.
    ///
    /// Unknown ids yield an empty list.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] when the lookup fails.
    pub fn ratings_for(&self, external_id: ExternalId) -> Result<Vec<f64>, StoreError> {
        self.connection
            .prepare_cached(
                "SELECT rating.rating
                 FROM ratings AS rating
                 JOIN points_of_interest AS poi ON poi.id = rating.point_of_interest_id
                 WHERE poi.external_id = ?1
                 ORDER BY rating.position",
            )
            .and_then(|mut statement| {
                statement
                    .query_map([external_id], |row| row.get(0))?
                    .collect::<Result<Vec<f64>, _>>()
            })
            .map_err(|source| StoreError::Sqlite {
                operation: "read ratings",
                source,
            })
    }
}

impl BatchSink for SqliteImportStore {
    type Error = StoreError;

    fn write_batch(&mut self, batch: &Batch) -> Result<BatchOutcome, Self::Error> {
        upsert::write_batch(&mut self.connection, batch)
    }
}
