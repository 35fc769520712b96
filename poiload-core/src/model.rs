//! Persistence-ready entities and the projection from canonical records.
//!
//! Entities reference each other through natural keys rather than surrogate
//! ids: a [`PointOfInterest`] names its category, and a [`Rating`] carries
//! the external id of its owner. Stores resolve those keys to row ids when
//! the batch is written, so an existing row is reused instead of duplicated.

use geo::Coord;

use crate::record::{ExternalId, PoiRecord};

/// A category row, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// Natural key.
    pub name: String,
}

/// A point of interest row, unique by `external_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    /// Natural key.
    pub external_id: ExternalId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// WGS84 position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Name of the owning category.
    pub category: String,
}

/// A single rating owned by a point of interest.
///
/// Ratings have no natural key of their own; `(point_of_interest, index)`
/// identifies them within one import.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    /// External id of the owning point of interest.
    pub point_of_interest: ExternalId,
    /// Zero-based position in the source rating list.
    pub index: usize,
    /// Rating value.
    pub rating: f64,
}

/// The linked entities derived from one [`PoiRecord`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use poiload_core::{PoiRecord, Projection};
///
/// let record = PoiRecord::new(7, "Tower", Coord { x: 0.0, y: 51.5 }, "landmark")
///     .with_ratings(vec![3.0, 4.0]);
/// let projection = Projection::from(record);
///
/// assert_eq!(projection.category.name, "landmark");
/// assert_eq!(projection.point_of_interest.category, "landmark");
/// let indices: Vec<_> = projection.ratings.iter().map(|r| r.index).collect();
/// assert_eq!(indices, vec![0, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Category named by the record.
    pub category: Category,
    /// The point of interest itself.
    pub point_of_interest: PointOfInterest,
    /// Ratings in source order.
    pub ratings: Vec<Rating>,
}

impl From<PoiRecord> for Projection {
    fn from(record: PoiRecord) -> Self {
        let PoiRecord {
            external_id,
            name,
            description,
            location,
            category,
            ratings,
        } = record;

        let ratings = ratings
            .into_iter()
            .enumerate()
            .map(|(index, rating)| Rating {
                point_of_interest: external_id,
                index,
                rating,
            })
            .collect();

        Self {
            category: Category {
                name: category.clone(),
            },
            point_of_interest: PointOfInterest {
                external_id,
                name,
                description,
                location,
                category,
            },
            ratings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn record() -> PoiRecord {
        PoiRecord::new(42, "Museum", Coord { x: 13.4, y: 52.5 }, "museum")
            .with_description("Old masters")
            .with_ratings(vec![1.0, 2.5, 3.0])
    }

    #[rstest]
    fn projection_links_entities_by_natural_key(record: PoiRecord) {
        let projection = Projection::from(record);

        assert_eq!(projection.category.name, "museum");
        assert_eq!(projection.point_of_interest.external_id, 42);
        assert_eq!(projection.point_of_interest.category, "museum");
        assert_eq!(projection.point_of_interest.description, "Old masters");
        assert!(
            projection
                .ratings
                .iter()
                .all(|rating| rating.point_of_interest == 42)
        );
    }

    #[rstest]
    fn projection_preserves_rating_order(record: PoiRecord) {
        let projection = Projection::from(record);
        let pairs: Vec<_> = projection
            .ratings
            .iter()
            .map(|rating| (rating.index, rating.rating))
            .collect();
        assert_eq!(pairs, vec![(0, 1.0), (1, 2.5), (2, 3.0)]);
    }

    #[rstest]
    fn projection_without_ratings_has_no_rating_rows() {
        let record = PoiRecord::new(1, "Bench", Coord { x: 0.0, y: 0.0 }, "park");
        assert!(Projection::from(record).ratings.is_empty());
    }
}
