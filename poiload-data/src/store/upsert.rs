//! Transactional batch writes keyed by natural keys.
#![forbid(unsafe_code)]

use std::collections::HashMap;

use poiload_core::{Batch, BatchOutcome, Category, ExternalId, PointOfInterest, Rating};
use rusqlite::{Connection, Transaction, params_from_iter};

use super::StoreError;

/// SQLite's default cap on bound parameters per statement.
const SQLITE_MAX_VARIABLES: usize = 999;

/// Apply one batch in a single transaction.
///
/// Categories are upserted by name, points of interest by external id, and
/// the rating set of every touched point of interest is replaced. The
/// transaction rolls back on drop if any step fails.
pub(super) fn write_batch(
    connection: &mut Connection,
    batch: &Batch,
) -> Result<BatchOutcome, StoreError> {
    if batch.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let transaction = connection
        .transaction()
        .map_err(|source| StoreError::Sqlite {
            operation: "begin batch transaction",
            source,
        })?;

    let category_ids = upsert_categories(&transaction, &batch.categories)?;
    let poi_ids = upsert_points_of_interest(&transaction, &batch.points_of_interest, &category_ids)?;
    let row_ids: Vec<i64> = poi_ids.values().copied().collect();
    delete_ratings(&transaction, &row_ids)?;
    let ratings = insert_ratings(&transaction, &batch.ratings, &poi_ids)?;

    transaction
        .commit()
        .map_err(|source| StoreError::Sqlite {
            operation: "commit batch transaction",
            source,
        })?;

    Ok(BatchOutcome {
        categories: category_ids.len(),
        points_of_interest: poi_ids.len(),
        ratings,
    })
}

fn upsert_categories(
    transaction: &Transaction<'_>,
    categories: &[Category],
) -> Result<HashMap<String, i64>, StoreError> {
    let mut upsert = transaction
        .prepare_cached(
            "INSERT INTO categories (name) VALUES (?1)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id",
        )
        .map_err(|source| StoreError::Sqlite {
            operation: "prepare category upsert",
            source,
        })?;

    let mut ids = HashMap::with_capacity(categories.len());
    for category in categories {
        let id: i64 = upsert
            .query_row([category.name.as_str()], |row| row.get(0))
            .map_err(|source| StoreError::Sqlite {
                operation: "upsert category",
                source,
            })?;
        ids.insert(category.name.clone(), id);
    }
    Ok(ids)
}

fn upsert_points_of_interest(
    transaction: &Transaction<'_>,
    points_of_interest: &[PointOfInterest],
    category_ids: &HashMap<String, i64>,
) -> Result<HashMap<ExternalId, i64>, StoreError> {
    let mut upsert = transaction
        .prepare_cached(
            "INSERT INTO points_of_interest (
                external_id,
                name,
                description,
                latitude,
                longitude,
                category_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(external_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                category_id = excluded.category_id
            RETURNING id",
        )
        .map_err(|source| StoreError::Sqlite {
            operation: "prepare point of interest upsert",
            source,
        })?;

    let mut ids = HashMap::with_capacity(points_of_interest.len());
    for poi in points_of_interest {
        let category_id = category_ids.get(&poi.category).copied().ok_or_else(|| {
            StoreError::UnknownCategory {
                category: poi.category.clone(),
                external_id: poi.external_id,
            }
        })?;
        let id: i64 = upsert
            .query_row(
                (
                    poi.external_id,
                    poi.name.as_str(),
                    poi.description.as_str(),
                    poi.location.y,
                    poi.location.x,
                    category_id,
                ),
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Sqlite {
                operation: "upsert point of interest",
                source,
            })?;
        ids.insert(poi.external_id, id);
    }
    Ok(ids)
}

fn delete_ratings(transaction: &Transaction<'_>, row_ids: &[i64]) -> Result<(), StoreError> {
    for chunk in row_ids.chunks(SQLITE_MAX_VARIABLES) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("DELETE FROM ratings WHERE point_of_interest_id IN ({placeholders})");
        transaction
            .prepare_cached(&sql)
            .and_then(|mut statement| statement.execute(params_from_iter(chunk)))
            .map_err(|source| StoreError::Sqlite {
                operation: "delete previous ratings",
                source,
            })?;
    }
    Ok(())
}

fn insert_ratings(
    transaction: &Transaction<'_>,
    ratings: &[Rating],
    poi_ids: &HashMap<ExternalId, i64>,
) -> Result<usize, StoreError> {
    let mut insert = transaction
        .prepare_cached(
            "INSERT INTO ratings (point_of_interest_id, position, rating) VALUES (?1, ?2, ?3)",
        )
        .map_err(|source| StoreError::Sqlite {
            operation: "prepare rating insert",
            source,
        })?;

    for rating in ratings {
        let poi_id = poi_ids.get(&rating.point_of_interest).copied().ok_or(
            StoreError::UnknownPointOfInterest {
                external_id: rating.point_of_interest,
            },
        )?;
        let position =
            i64::try_from(rating.index).map_err(|_| StoreError::PositionOutOfRange {
                external_id: rating.point_of_interest,
                index: rating.index,
            })?;
        insert
            .execute((poi_id, position, rating.rating))
            .map_err(|source| StoreError::Sqlite {
                operation: "insert rating",
                source,
            })?;
    }
    Ok(ratings.len())
}
