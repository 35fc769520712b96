#![forbid(unsafe_code)]

use rusqlite::{Connection, Error as SqliteError};
use thiserror::Error;

/// Tables and indexes of the import schema, in creation order.
///
/// Every statement is guarded by `IF NOT EXISTS`, so replaying the list
/// against an initialised database changes nothing.
const SCHEMA: &[(&str, &str)] = &[
    (
        "categories",
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
    ),
    (
        "points_of_interest",
        "CREATE TABLE IF NOT EXISTS points_of_interest (
            id INTEGER PRIMARY KEY,
            external_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            category_id INTEGER NOT NULL
                REFERENCES categories(id) ON DELETE CASCADE
        )",
    ),
    (
        "ratings",
        "CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY,
            point_of_interest_id INTEGER NOT NULL
                REFERENCES points_of_interest(id) ON DELETE CASCADE,
            position INTEGER NOT NULL CHECK (position >= 0),
            rating REAL NOT NULL
        )",
    ),
    (
        "idx_points_of_interest_category",
        "CREATE INDEX IF NOT EXISTS idx_points_of_interest_category
            ON points_of_interest(category_id)",
    ),
    (
        "idx_ratings_point_of_interest",
        "CREATE INDEX IF NOT EXISTS idx_ratings_point_of_interest
            ON ratings(point_of_interest_id, position)",
    ),
];

/// Create the category, point of interest and rating tables when missing.
///
/// Foreign keys are switched on for the connection so rating rows follow
/// their point of interest on delete. The call is idempotent.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use poiload_data::store::initialise_schema;
///
/// let conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&conn).expect("create import schema");
/// initialise_schema(&conn).expect("initialisation is repeatable");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master
///          WHERE type = 'table' AND name IN ('categories', 'points_of_interest', 'ratings')",
///         [],
///         |row| row.get(0),
///     )
///     .expect("list tables");
/// assert_eq!(tables, 3);
/// ```
pub fn initialise_schema(connection: &Connection) -> Result<(), SchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;

    for &(object, sql) in SCHEMA {
        connection
            .execute(sql, [])
            .map_err(|source| SchemaError::Create { object, source })?;
    }
    Ok(())
}

/// Errors raised when initialising the import schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Enabling foreign key enforcement failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A table or index could not be created.
    #[error("failed to create {object}")]
    Create {
        /// Table or index name.
        object: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}
