//! Pull reader for XML documents holding sibling record elements.
//!
//! The expected layout is one root element whose children are records and
//! whose grandchildren are fields:
//!
//! ```xml
//! <pois>
//!   <poi><pid>1</pid><pname>Tower</pname>...</poi>
//! </pois>
//! ```
//!
//! Element names at the root and record levels are not checked. Text nested
//! deeper than a field element is folded into that field.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufReader, Read};
use std::str;

use poiload_core::PoiRecord;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::RecordParseError;
use super::fields::{TextFields, record_from_text};

const FIELDS: TextFields = TextFields {
    external_id: "pid",
    name: "pname",
    description: "pdescription",
    latitude: "platitude",
    longitude: "plongitude",
    category: "pcategory",
    ratings: "pratings",
    bracketed_ratings: false,
};

const RECORD_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// Lazy reader over `<pid>`, `<pname>`, ... field elements.
///
/// # Examples
/// ```
/// use poiload_data::readers::XmlRecordReader;
///
/// let input = "<pois><poi><pid>7</pid><pname>Tower</pname><platitude>51.5</platitude>\
///              <plongitude>-0.1</plongitude><pcategory>landmark</pcategory>\
///              <pratings>4,5</pratings></poi></pois>";
/// let records: Vec<_> = XmlRecordReader::new(input.as_bytes()).collect::<Result<_, _>>()?;
/// assert_eq!(records[0].external_id, 7);
/// assert_eq!(records[0].ratings, vec![4.0, 5.0]);
/// # Ok::<(), poiload_data::readers::RecordParseError>(())
/// ```
pub struct XmlRecordReader<R> {
    reader: Reader<BufReader<R>>,
    buffer: Vec<u8>,
    depth: usize,
    record: usize,
    done: bool,
}

impl<R> fmt::Debug for XmlRecordReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlRecordReader")
            .field("depth", &self.depth)
            .field("record", &self.record)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<R: Read> XmlRecordReader<R> {
    /// Wrap an input stream.
    ///
    /// Text is kept as written; whitespace policy belongs to the field
    /// coercion shared with the other readers.
    #[must_use]
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(BufReader::new(input)),
            buffer: Vec::new(),
            depth: 0,
            record: 0,
            done: false,
        }
    }

    /// Pull events until one record element closes.
    fn next_fields(&mut self) -> Result<Option<HashMap<String, String>>, RecordParseError> {
        let mut fields: Option<HashMap<String, String>> = None;
        let mut current: Option<(String, String)> = None;
        let record = self.record + 1;
        let xml_error = |source| RecordParseError::Xml { record, source };

        loop {
            self.buffer.clear();
            match self
                .reader
                .read_event_into(&mut self.buffer)
                .map_err(xml_error)?
            {
                Event::Start(element) => {
                    self.depth += 1;
                    if self.depth == RECORD_DEPTH {
                        fields = Some(HashMap::new());
                    } else if self.depth == FIELD_DEPTH {
                        let name = element_name(&element).map_err(xml_error)?;
                        current = Some((name, String::new()));
                    }
                }
                Event::Empty(element) => {
                    if self.depth + 1 == RECORD_DEPTH {
                        self.record = record;
                        return Ok(Some(HashMap::new()));
                    }
                    if self.depth + 1 == FIELD_DEPTH {
                        if let Some(map) = fields.as_mut() {
                            let name = element_name(&element).map_err(xml_error)?;
                            map.insert(name, String::new());
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some((_, value)) = current.as_mut() {
                        value.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some((_, value)) = current.as_mut() {
                        let text = str::from_utf8(&data)
                            .map_err(|source| xml_error(quick_xml::Error::from(source)))?;
                        value.push_str(text);
                    }
                }
                Event::End(_) => {
                    let closing = self.depth;
                    self.depth = self.depth.saturating_sub(1);
                    if closing == FIELD_DEPTH {
                        if let (Some(map), Some((name, value))) = (fields.as_mut(), current.take()) {
                            map.insert(name, value);
                        }
                    } else if closing == RECORD_DEPTH {
                        self.record = record;
                        return Ok(fields);
                    }
                }
                Event::Eof => {
                    if fields.is_some() || self.depth > 0 {
                        return Err(RecordParseError::Structure {
                            record,
                            expected: "closing tags before the end of input",
                        });
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

fn element_name(element: &BytesStart<'_>) -> Result<String, quick_xml::Error> {
    let name = element.local_name();
    Ok(str::from_utf8(name.as_ref())?.to_owned())
}

impl<R: Read> Iterator for XmlRecordReader<R> {
    type Item = Result<PoiRecord, RecordParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let outcome = match self.next_fields() {
            Ok(Some(fields)) => Some(record_from_text(self.record, &FIELDS, |name| {
                fields.get(name).map(String::as_str)
            })),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        };
        if !matches!(outcome, Some(Ok(_))) {
            self.done = true;
        }
        outcome
    }
}
