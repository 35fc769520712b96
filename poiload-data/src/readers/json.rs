//! Streaming reader for a top-level JSON array of records.
//!
//! The array is never materialised: the reader scans the punctuation between
//! elements itself and hands each element to `serde_json`, which stops at the
//! element's closing brace.

use std::io::{BufRead, BufReader, Read};

use geo::Coord;
use poiload_core::{ExternalId, PoiRecord};
use serde::Deserialize;
use serde_json::Value;

use super::RecordParseError;
use super::fields::{parse_external_id, parse_number};

const ID: &str = "id";
const NAME: &str = "name";
const COORDINATES: &str = "coordinates";
const LATITUDE: &str = "coordinates.latitude";
const LONGITUDE: &str = "coordinates.longitude";
const CATEGORY: &str = "category";
const RATINGS: &str = "ratings";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Deserialize)]
struct JsonPoi {
    id: Option<Value>,
    name: Option<String>,
    description: Option<String>,
    coordinates: Option<JsonCoordinates>,
    category: Option<String>,
    ratings: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct JsonCoordinates {
    latitude: Option<Value>,
    longitude: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    First,
    Rest,
    Done,
}

/// Lazy reader over `[{"id": ..., "coordinates": {...}, ...}, ...]`.
///
/// # Examples
/// ```
/// use poiload_data::readers::JsonRecordReader;
///
/// let input = br#"[{"id": 1, "name": "Tower", "coordinates": {"latitude": 51.5, "longitude": -0.1},
///                   "category": "landmark", "ratings": [4, "5"]}]"#;
/// let records: Vec<_> = JsonRecordReader::new(&input[..]).collect::<Result<_, _>>()?;
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].ratings, vec![4.0, 5.0]);
/// # Ok::<(), poiload_data::readers::RecordParseError>(())
/// ```
#[derive(Debug)]
pub struct JsonRecordReader<R> {
    input: BufReader<R>,
    state: State,
    record: usize,
}

impl<R: Read> JsonRecordReader<R> {
    /// Wrap an input stream.
    #[must_use]
    pub fn new(input: R) -> Self {
        Self {
            input: BufReader::new(input),
            state: State::Start,
            record: 0,
        }
    }

    /// Skip whitespace and return the next byte without consuming it.
    fn peek_significant(&mut self) -> Result<Option<u8>, RecordParseError> {
        loop {
            let (skipped, found) = {
                let buffer = self.input.fill_buf().map_err(|source| RecordParseError::Io {
                    record: self.record + 1,
                    source,
                })?;
                if buffer.is_empty() {
                    return Ok(None);
                }
                let skipped = buffer
                    .iter()
                    .take_while(|byte| byte.is_ascii_whitespace())
                    .count();
                (skipped, buffer.get(skipped).copied())
            };
            self.input.consume(skipped);
            if found.is_some() {
                return Ok(found);
            }
        }
    }

    /// Drop a leading UTF-8 byte order mark.
    fn skip_byte_order_mark(&mut self) -> Result<(), RecordParseError> {
        let buffer = self.input.fill_buf().map_err(|source| RecordParseError::Io {
            record: self.record + 1,
            source,
        })?;
        if buffer.starts_with(UTF8_BOM) {
            self.input.consume(UTF8_BOM.len());
        }
        Ok(())
    }

    const fn structure(&self, expected: &'static str) -> RecordParseError {
        RecordParseError::Structure {
            record: self.record + 1,
            expected,
        }
    }

    /// Advance past container punctuation. Returns `false` once the array
    /// closes.
    fn advance(&mut self) -> Result<bool, RecordParseError> {
        if self.state == State::Start {
            self.skip_byte_order_mark()?;
            match self.peek_significant()? {
                Some(b'[') => {
                    self.input.consume(1);
                    self.state = State::First;
                }
                _ => return Err(self.structure("a JSON array of records")),
            }
        }

        match self.peek_significant()? {
            Some(b']') => {
                self.input.consume(1);
                Ok(false)
            }
            Some(b',') if self.state == State::Rest => {
                self.input.consume(1);
                match self.peek_significant()? {
                    Some(b']') | None => Err(self.structure("a record after `,`")),
                    Some(_) => Ok(true),
                }
            }
            Some(_) if self.state == State::First => Ok(true),
            Some(_) => Err(self.structure("`,` or `]` after a record")),
            None => Err(self.structure("`]` closing the record array")),
        }
    }

    fn read_record(&mut self) -> Result<PoiRecord, RecordParseError> {
        self.record += 1;
        self.state = State::Rest;
        let record = self.record;
        let mut deserializer = serde_json::Deserializer::from_reader(&mut self.input);
        let poi = JsonPoi::deserialize(&mut deserializer)
            .map_err(|source| RecordParseError::Json { record, source })?;
        into_record(record, poi)
    }
}

impl<R: Read> Iterator for JsonRecordReader<R> {
    type Item = Result<PoiRecord, RecordParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        let outcome = match self.advance() {
            Ok(true) => Some(self.read_record()),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        };
        if !matches!(outcome, Some(Ok(_))) {
            self.state = State::Done;
        }
        outcome
    }
}

fn into_record(record: usize, poi: JsonPoi) -> Result<PoiRecord, RecordParseError> {
    let missing = |field: &'static str| RecordParseError::MissingField { record, field };

    let external_id = external_id(record, &poi.id.ok_or_else(|| missing(ID))?)?;
    let name = poi.name.ok_or_else(|| missing(NAME))?.trim().to_owned();
    let coordinates = poi.coordinates.ok_or_else(|| missing(COORDINATES))?;
    let latitude = number(
        record,
        LATITUDE,
        &coordinates.latitude.ok_or_else(|| missing(LATITUDE))?,
    )?;
    let longitude = number(
        record,
        LONGITUDE,
        &coordinates.longitude.ok_or_else(|| missing(LONGITUDE))?,
    )?;
    let category = poi.category.ok_or_else(|| missing(CATEGORY))?.trim().to_owned();
    let ratings = poi
        .ratings
        .ok_or_else(|| missing(RATINGS))?
        .iter()
        .map(|value| number(record, RATINGS, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PoiRecord::new(
        external_id,
        name,
        Coord {
            x: longitude,
            y: latitude,
        },
        category,
    )
    .with_description(poi.description.as_deref().map(str::trim).unwrap_or_default())
    .with_ratings(ratings))
}

fn number(record: usize, field: &'static str, raw: &Value) -> Result<f64, RecordParseError> {
    match raw {
        Value::String(text) => parse_number(record, field, text),
        Value::Number(number) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .ok_or_else(|| RecordParseError::InvalidNumber {
                record,
                field,
                value: number.to_string(),
            }),
        other => Err(RecordParseError::InvalidNumber {
            record,
            field,
            value: other.to_string(),
        }),
    }
}

fn external_id(record: usize, raw: &Value) -> Result<ExternalId, RecordParseError> {
    match raw {
        Value::String(text) => parse_external_id(record, ID, text),
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| RecordParseError::InvalidIdentifier {
                record,
                field: ID,
                value: number.to_string(),
            }),
        other => Err(RecordParseError::InvalidIdentifier {
            record,
            field: ID,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn read(input: &str) -> Vec<Result<PoiRecord, RecordParseError>> {
        JsonRecordReader::new(input.as_bytes()).collect()
    }

    const TOWER: &str = r#"{
        "id": 42,
        "name": "Tower",
        "description": "Old fort",
        "coordinates": {"latitude": 51.5081, "longitude": -0.0759},
        "category": "museum",
        "ratings": [1, 2.5, "3"]
    }"#;

    #[rstest]
    fn reads_record_fields() {
        let records = read(&format!("[{TOWER}]"));
        let record = records
            .into_iter()
            .next()
            .expect("one record")
            .expect("valid record");

        assert_eq!(record.external_id, 42);
        assert_eq!(record.name, "Tower");
        assert_eq!(record.description, "Old fort");
        assert_eq!(record.latitude(), 51.5081);
        assert_eq!(record.longitude(), -0.0759);
        assert_eq!(record.category, "museum");
        assert_eq!(record.ratings, vec![1.0, 2.5, 3.0]);
    }

    #[rstest]
    #[case("[]", 0)]
    #[case("  [ \n ]  ", 0)]
    #[case("[{\"id\":1,\"name\":\"a\",\"coordinates\":{\"latitude\":0,\"longitude\":0},\"category\":\"c\",\"ratings\":[]},\n {\"id\":\"2\",\"name\":\"b\",\"coordinates\":{\"latitude\":\"1\",\"longitude\":\"2\"},\"category\":\"c\",\"ratings\":[]}]", 2)]
    fn counts_records(#[case] input: &str, #[case] expected: usize) {
        let records: Vec<_> = read(input)
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("valid input");
        assert_eq!(records.len(), expected);
    }

    #[rstest]
    fn missing_description_defaults_to_empty() {
        let records = read(
            r#"[{"id": 1, "name": "a", "coordinates": {"latitude": 0, "longitude": 0},
                 "category": "c", "ratings": []}]"#,
        );
        let record = records.into_iter().next().expect("record").expect("valid");
        assert_eq!(record.description, "");
        assert!(record.ratings.is_empty());
    }

    #[rstest]
    #[case(r#"[{"name": "a", "coordinates": {"latitude": 0, "longitude": 0}, "category": "c", "ratings": []}]"#, "id")]
    #[case(r#"[{"id": 1, "name": "a", "coordinates": {"longitude": 0}, "category": "c", "ratings": []}]"#, "coordinates.latitude")]
    #[case(r#"[{"id": 1, "name": "a", "coordinates": {"latitude": 0, "longitude": 0}, "category": "c"}]"#, "ratings")]
    fn reports_missing_fields(#[case] input: &str, #[case] expected: &str) {
        let err = read(input)
            .into_iter()
            .next()
            .expect("one outcome")
            .expect_err("missing field");
        assert!(
            matches!(err, RecordParseError::MissingField { record: 1, field } if field == expected),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    fn reports_second_record_number_for_bad_rating() {
        let input = format!(
            r#"[{TOWER}, {{"id": 2, "name": "b", "coordinates": {{"latitude": 0, "longitude": 0}},
                "category": "c", "ratings": ["x"]}}]"#
        );
        let outcomes = read(&input);
        assert_eq!(outcomes.len(), 2);
        let err = outcomes
            .into_iter()
            .nth(1)
            .expect("second outcome")
            .expect_err("bad rating");
        assert!(matches!(
            err,
            RecordParseError::InvalidNumber {
                record: 2,
                field: "ratings",
                ..
            }
        ));
    }

    #[rstest]
    #[case(r#"{"id": 1}"#)]
    #[case("")]
    fn rejects_non_array_top_level(#[case] input: &str) {
        let err = read(input)
            .into_iter()
            .next()
            .expect("one outcome")
            .expect_err("not an array");
        assert!(matches!(err, RecordParseError::Structure { record: 1, .. }));
    }

    #[rstest]
    fn stops_after_malformed_element() {
        let outcomes = read(&format!("[{TOWER}, {{\"id\": 2,, }}, {TOWER}]"));
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes.last(),
            Some(Err(RecordParseError::Json { record: 2, .. }))
        ));
    }

    #[rstest]
    fn rejects_unterminated_array() {
        let outcomes = read(&format!("[{TOWER}"));
        assert!(matches!(
            outcomes.last(),
            Some(Err(RecordParseError::Structure { record: 2, .. }))
        ));
    }

    #[rstest]
    #[case(r#"1.5"#)]
    #[case(r#"true"#)]
    fn rejects_non_integer_identifier(#[case] id: &str) {
        let input = format!(
            r#"[{{"id": {id}, "name": "a", "coordinates": {{"latitude": 0, "longitude": 0}},
                 "category": "c", "ratings": []}}]"#
        );
        let err = read(&input)
            .into_iter()
            .next()
            .expect("one outcome")
            .expect_err("bad id");
        assert!(matches!(err, RecordParseError::InvalidIdentifier { record: 1, .. }));
    }

    #[rstest]
    fn skips_leading_byte_order_mark() {
        let records = read(&format!("\u{feff}[{TOWER}]"));
        assert_eq!(records.len(), 1);
        assert!(records[0].is_ok());
    }

    #[rstest]
    fn trims_text_fields() {
        let input = r#"[{"id": 1, "name": "  Tower ", "description": "\tOld fort\n",
                       "coordinates": {"latitude": 0, "longitude": 0},
                       "category": " museum ", "ratings": []}]"#;
        let record = read(input)
            .into_iter()
            .next()
            .expect("one record")
            .expect("valid record");
        assert_eq!(record.name, "Tower");
        assert_eq!(record.description, "Old fort");
        assert_eq!(record.category, "museum");
    }
}
