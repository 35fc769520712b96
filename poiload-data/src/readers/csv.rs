//! Row-at-a-time reader for CSV files with a header line.

use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use poiload_core::PoiRecord;

use super::RecordParseError;
use super::fields::{TextFields, record_from_text};

const FIELDS: TextFields = TextFields {
    external_id: "poi_id",
    name: "poi_name",
    description: "poi_description",
    latitude: "poi_latitude",
    longitude: "poi_longitude",
    category: "poi_category",
    ratings: "poi_ratings",
    bracketed_ratings: true,
};

/// Lazy reader over `poi_*` columns.
///
/// Column order is free; extra columns are ignored. Ratings arrive as a
/// bracketed list such as `"[4,5,3]"`.
///
/// # Examples
/// ```
/// use poiload_data::readers::CsvRecordReader;
///
/// let input = "poi_id,poi_name,poi_latitude,poi_longitude,poi_category,poi_ratings\n\
///              7,Tower,51.5,-0.1,landmark,\"[4,5]\"\n";
/// let records: Vec<_> = CsvRecordReader::new(input.as_bytes()).collect::<Result<_, _>>()?;
/// assert_eq!(records[0].ratings, vec![4.0, 5.0]);
/// assert_eq!(records[0].description, "");
/// # Ok::<(), poiload_data::readers::RecordParseError>(())
/// ```
#[derive(Debug)]
pub struct CsvRecordReader<R> {
    reader: csv::Reader<R>,
    columns: Option<HashMap<String, usize>>,
    row: StringRecord,
    record: usize,
    done: bool,
}

impl<R: Read> CsvRecordReader<R> {
    /// Wrap an input stream. The header is read with the first record.
    #[must_use]
    pub fn new(input: R) -> Self {
        Self {
            reader: ReaderBuilder::new().trim(Trim::Headers).from_reader(input),
            columns: None,
            row: StringRecord::new(),
            record: 0,
            done: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<PoiRecord>, RecordParseError> {
        if self.columns.is_none() {
            let headers = self
                .reader
                .headers()
                .map_err(|source| RecordParseError::Csv {
                    record: 1,
                    source,
                })?;
            let columns = headers
                .iter()
                .enumerate()
                .map(|(position, name)| (name.to_owned(), position))
                .collect();
            self.columns = Some(columns);
        }

        let next = self.record + 1;
        let has_row = self
            .reader
            .read_record(&mut self.row)
            .map_err(|source| RecordParseError::Csv {
                record: next,
                source,
            })?;
        if !has_row {
            return Ok(None);
        }
        self.record = next;

        let row = &self.row;
        let columns = self.columns.as_ref();
        record_from_text(self.record, &FIELDS, |name| {
            columns
                .and_then(|map| map.get(name))
                .and_then(|&position| row.get(position))
        })
        .map(Some)
    }
}

impl<R: Read> Iterator for CsvRecordReader<R> {
    type Item = Result<PoiRecord, RecordParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let outcome = self.read_record().transpose();
        if !matches!(outcome, Some(Ok(_))) {
            self.done = true;
        }
        outcome
    }
}
