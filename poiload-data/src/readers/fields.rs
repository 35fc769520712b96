//! Field coercion shared by the readers.
//!
//! CSV and XML both deliver every field as text, so they share
//! [`record_from_text`]; JSON reuses the scalar parsers for values supplied
//! as strings.

use geo::Coord;
use poiload_core::{ExternalId, PoiRecord};

use super::RecordParseError;

/// Source field names for a text-based format.
#[derive(Debug, Clone, Copy)]
pub(super) struct TextFields {
    pub external_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub category: &'static str,
    pub ratings: &'static str,
    /// Whether the rating list may be wrapped in `[` and `]`.
    pub bracketed_ratings: bool,
}

/// Build a record from a field lookup over raw text values.
///
/// Name, category and description are trimmed the same way the JSON reader
/// trims them, so one export yields identical records in every format.
pub(super) fn record_from_text<'a>(
    record: usize,
    fields: &TextFields,
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Result<PoiRecord, RecordParseError> {
    let require = |field: &'static str| {
        lookup(field).ok_or(RecordParseError::MissingField { record, field })
    };

    let external_id = parse_external_id(record, fields.external_id, require(fields.external_id)?)?;
    let name = require(fields.name)?.trim();
    let latitude = parse_number(record, fields.latitude, require(fields.latitude)?)?;
    let longitude = parse_number(record, fields.longitude, require(fields.longitude)?)?;
    let category = require(fields.category)?.trim();
    let raw_ratings = require(fields.ratings)?;
    let rating_list = if fields.bracketed_ratings {
        strip_brackets(raw_ratings)
    } else {
        raw_ratings
    };
    let ratings = parse_rating_list(record, fields.ratings, rating_list)?;
    let description = lookup(fields.description).unwrap_or_default().trim();

    Ok(PoiRecord::new(
        external_id,
        name,
        Coord {
            x: longitude,
            y: latitude,
        },
        category,
    )
    .with_description(description)
    .with_ratings(ratings))
}

/// Parse a finite floating-point value, ignoring surrounding whitespace.
pub(super) fn parse_number(
    record: usize,
    field: &'static str,
    raw: &str,
) -> Result<f64, RecordParseError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RecordParseError::InvalidNumber {
            record,
            field,
            value: raw.to_owned(),
        })
}

/// Parse an integer identifier, ignoring surrounding whitespace.
pub(super) fn parse_external_id(
    record: usize,
    field: &'static str,
    raw: &str,
) -> Result<ExternalId, RecordParseError> {
    raw.trim()
        .parse::<ExternalId>()
        .map_err(|_| RecordParseError::InvalidIdentifier {
            record,
            field,
            value: raw.to_owned(),
        })
}

/// Split a comma-separated rating list. Blank input yields no ratings.
pub(super) fn parse_rating_list(
    record: usize,
    field: &'static str,
    raw: &str,
) -> Result<Vec<f64>, RecordParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(',')
        .map(|item| parse_number(record, field, item))
        .collect()
}

/// Remove one pair of enclosing square brackets if both are present.
pub(super) fn strip_brackets(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("[1,2,3]", "1,2,3")]
    #[case(" [4.5] ", "4.5")]
    #[case("[]", "")]
    #[case("1,2", "1,2")]
    #[case("[1,2", "[1,2")]
    fn strips_only_matched_brackets(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_brackets(raw), expected);
    }

    #[rstest]
    #[case("1,2,3", vec![1.0, 2.0, 3.0])]
    #[case(" 4.5 , 3 ", vec![4.5, 3.0])]
    #[case("", vec![])]
    #[case("   ", vec![])]
    fn parses_rating_lists(#[case] raw: &str, #[case] expected: Vec<f64>) {
        let ratings = parse_rating_list(1, "ratings", raw).expect("valid ratings");
        assert_eq!(ratings, expected);
    }

    #[rstest]
    #[case("1,,3")]
    #[case("1,two")]
    #[case("nan")]
    #[case("inf")]
    fn rejects_malformed_ratings(#[case] raw: &str) {
        let err = parse_rating_list(4, "pratings", raw).expect_err("invalid ratings");
        assert!(matches!(
            err,
            RecordParseError::InvalidNumber {
                record: 4,
                field: "pratings",
                ..
            }
        ));
    }

    #[rstest]
    #[case(" 42 ", 42)]
    #[case("-7", -7)]
    fn parses_identifiers(#[case] raw: &str, #[case] expected: ExternalId) {
        assert_eq!(parse_external_id(1, "id", raw).expect("valid id"), expected);
    }

    #[rstest]
    #[case("42.5")]
    #[case("forty-two")]
    #[case("")]
    fn rejects_non_integer_identifiers(#[case] raw: &str) {
        let err = parse_external_id(2, "poi_id", raw).expect_err("invalid id");
        assert!(matches!(
            err,
            RecordParseError::InvalidIdentifier { record: 2, .. }
        ));
    }

    #[rstest]
    fn trims_text_fields() {
        const FIELDS: TextFields = TextFields {
            external_id: "id",
            name: "name",
            description: "description",
            latitude: "lat",
            longitude: "lon",
            category: "category",
            ratings: "ratings",
            bracketed_ratings: false,
        };
        let lookup = |field: &str| match field {
            "id" => Some(" 7 "),
            "name" => Some("  Tower "),
            "description" => Some("\tOld fort\n"),
            "lat" | "lon" => Some(" 0 "),
            "category" => Some(" museum "),
            "ratings" => Some(""),
            _ => None,
        };

        let record = record_from_text(1, &FIELDS, lookup).expect("valid record");
        assert_eq!(record.external_id, 7);
        assert_eq!(record.name, "Tower");
        assert_eq!(record.description, "Old fort");
        assert_eq!(record.category, "museum");
    }
}
