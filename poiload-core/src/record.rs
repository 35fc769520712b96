//! The canonical record shared by every format reader.

use geo::Coord;

/// Identifier assigned to a point of interest by the source system.
///
/// It is the natural key used when upserting points of interest.
pub type ExternalId = i64;

/// Format-independent description of one imported point of interest.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Rating
/// order is significant: the position of each value becomes the persisted
/// rating index.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use poiload_core::PoiRecord;
///
/// let record = PoiRecord::new(42, "Louvre", Coord { x: 2.3376, y: 48.8606 }, "museum")
///     .with_description("Art museum")
///     .with_ratings(vec![4.5, 5.0]);
///
/// assert_eq!(record.latitude(), 48.8606);
/// assert_eq!(record.ratings.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    /// Natural key supplied by the source file.
    pub external_id: ExternalId,
    /// Display name.
    pub name: String,
    /// Free-text description; empty when the source omits it.
    pub description: String,
    /// Geographic position.
    pub location: Coord<f64>,
    /// Category label, resolved to a category row on import.
    pub category: String,
    /// Rating values in source order.
    pub ratings: Vec<f64>,
}

impl PoiRecord {
    /// Build a record with an empty description and no ratings.
    pub fn new(
        external_id: ExternalId,
        name: impl Into<String>,
        location: Coord<f64>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            external_id,
            name: name.into(),
            description: String::new(),
            location,
            category: category.into(),
            ratings: Vec::new(),
        }
    }

    /// Replace the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the rating list.
    #[must_use]
    pub fn with_ratings(mut self, ratings: Vec<f64>) -> Self {
        self.ratings = ratings;
        self
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }
}
