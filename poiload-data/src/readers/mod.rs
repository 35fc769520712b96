//! Format readers turning input files into [`PoiRecord`] streams.
//!
//! Each reader owns its input and yields one record at a time, so memory
//! stays bounded by a single record regardless of file size. Field names
//! differ per format:
//!
//! | Record field  | JSON                    | CSV               | XML            |
//! |---------------|-------------------------|-------------------|----------------|
//! | `external_id` | `id`                    | `poi_id`          | `pid`          |
//! | `name`        | `name`                  | `poi_name`        | `pname`        |
//! | `description` | `description`           | `poi_description` | `pdescription` |
//! | latitude      | `coordinates.latitude`  | `poi_latitude`    | `platitude`    |
//! | longitude     | `coordinates.longitude` | `poi_longitude`   | `plongitude`   |
//! | `category`    | `category`              | `poi_category`    | `pcategory`    |
//! | `ratings`     | `ratings`               | `poi_ratings`     | `pratings`     |
//!
//! Descriptions are optional everywhere. Readers stop after the first error.

mod csv;
mod error;
mod fields;
mod json;
mod registry;
mod xml;

use poiload_core::PoiRecord;

pub use self::csv::CsvRecordReader;
pub use error::RecordParseError;
pub use json::JsonRecordReader;
pub use registry::{Format, ReaderRegistry, RecordReaderFactory, UnsupportedFormatError};
pub use xml::XmlRecordReader;

/// Boxed, lazily evaluated sequence of decoded records.
pub type RecordStream = Box<dyn Iterator<Item = Result<PoiRecord, RecordParseError>>>;
