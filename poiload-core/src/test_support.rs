//! Test-only, in-memory `BatchSink` implementation used by unit and behaviour
//! tests.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use crate::{Batch, BatchOutcome, BatchSink, ExternalId, PointOfInterest, Rating};

/// In-memory `BatchSink` mirroring the store's upsert semantics.
///
/// Categories are a set of names, points of interest are keyed by external
/// id, and each batch replaces the rating list of every point of interest it
/// contains.
#[derive(Default, Debug)]
pub struct MemorySink {
    categories: BTreeSet<String>,
    points_of_interest: BTreeMap<ExternalId, PointOfInterest>,
    ratings: BTreeMap<ExternalId, Vec<Rating>>,
    batches: Vec<BatchOutcome>,
}

impl MemorySink {
    /// Names of every stored category.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }

    /// Stored point of interest for `external_id`.
    pub fn point_of_interest(&self, external_id: ExternalId) -> Option<&PointOfInterest> {
        self.points_of_interest.get(&external_id)
    }

    /// Number of stored points of interest.
    pub fn point_of_interest_count(&self) -> usize {
        self.points_of_interest.len()
    }

    /// Rating values for `external_id` ordered by index.
    pub fn ratings_for(&self, external_id: ExternalId) -> Vec<f64> {
        let mut ratings = self.ratings.get(&external_id).cloned().unwrap_or_default();
        ratings.sort_by_key(|rating| rating.index);
        ratings.into_iter().map(|rating| rating.rating).collect()
    }

    /// Total number of stored ratings.
    pub fn rating_count(&self) -> usize {
        self.ratings.values().map(Vec::len).sum()
    }

    /// Outcomes of every batch written so far.
    pub fn batches(&self) -> &[BatchOutcome] {
        &self.batches
    }
}

impl BatchSink for MemorySink {
    type Error = Infallible;

    fn write_batch(&mut self, batch: &Batch) -> Result<BatchOutcome, Self::Error> {
        for category in &batch.categories {
            self.categories.insert(category.name.clone());
        }
        for poi in &batch.points_of_interest {
            self.points_of_interest
                .insert(poi.external_id, poi.clone());
            self.ratings.insert(poi.external_id, Vec::new());
        }
        for rating in &batch.ratings {
            self.ratings
                .entry(rating.point_of_interest)
                .or_default()
                .push(rating.clone());
        }
        let outcome = BatchOutcome {
            categories: batch.categories.len(),
            points_of_interest: batch.points_of_interest.len(),
            ratings: batch.ratings.len(),
        };
        self.batches.push(outcome);
        Ok(outcome)
    }
}
