//! Extension-keyed selection of record readers.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use super::{CsvRecordReader, JsonRecordReader, RecordStream, XmlRecordReader};

/// Constructor turning an input stream into a record stream.
pub type RecordReaderFactory = fn(Box<dyn Read>) -> RecordStream;

/// Built-in input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Top-level JSON array of objects.
    Json,
    /// CSV with a `poi_*` header row.
    Csv,
    /// XML with one element per record.
    Xml,
}

impl Format {
    /// Every built-in format.
    pub const ALL: [Self; 3] = [Self::Json, Self::Csv, Self::Xml];

    /// Lowercase file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }

    /// Reader constructor for this format.
    #[must_use]
    pub fn factory(self) -> RecordReaderFactory {
        match self {
            Self::Json => open_json,
            Self::Csv => open_csv,
            Self::Xml => open_xml,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// No reader is registered for a file's extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported input format for {path}: no reader for extension {extension:?}")]
pub struct UnsupportedFormatError {
    /// File that was offered for import.
    pub path: Utf8PathBuf,
    /// Lowercased extension, empty when the file has none.
    pub extension: String,
}

/// Mapping from lowercase extension to reader constructor.
///
/// Lookups ignore ASCII case, so `POIS.JSON` selects the JSON reader.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use poiload_data::readers::{Format, ReaderRegistry};
///
/// let mut registry = ReaderRegistry::default();
/// assert!(registry.select(Utf8Path::new("pois.XML")).is_ok());
/// assert!(registry.select(Utf8Path::new("pois.yaml")).is_err());
///
/// registry.register("jsonl", Format::Json.factory());
/// assert!(registry.select(Utf8Path::new("pois.jsonl")).is_ok());
/// ```
#[derive(Clone)]
pub struct ReaderRegistry {
    readers: BTreeMap<String, RecordReaderFactory>,
}

impl ReaderRegistry {
    /// A registry with no readers.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            readers: BTreeMap::new(),
        }
    }

    /// Add or replace the reader for `extension`, returning the previous one.
    ///
    /// A leading dot is ignored.
    pub fn register(
        &mut self,
        extension: &str,
        factory: RecordReaderFactory,
    ) -> Option<RecordReaderFactory> {
        self.readers.insert(normalise(extension), factory)
    }

    /// Registered extensions in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    /// Choose the reader for `path` by its extension.
    ///
    /// # Errors
    /// Returns [`UnsupportedFormatError`] when no reader is registered for
    /// the extension or the path has none.
    pub fn select(&self, path: &Utf8Path) -> Result<RecordReaderFactory, UnsupportedFormatError> {
        let extension = path.extension().map(normalise).unwrap_or_default();
        let factory = self
            .readers
            .get(&extension)
            .copied()
            .ok_or_else(|| UnsupportedFormatError {
                path: path.to_path_buf(),
                extension: extension.clone(),
            })?;
        debug!("Selected {extension} reader for {path}");
        Ok(factory)
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for format in Format::ALL {
            registry.register(format.extension(), format.factory());
        }
        registry
    }
}

impl fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.extensions()).finish()
    }
}

fn open_json(input: Box<dyn Read>) -> RecordStream {
    Box::new(JsonRecordReader::new(input))
}

fn open_csv(input: Box<dyn Read>) -> RecordStream {
    Box::new(CsvRecordReader::new(input))
}

fn open_xml(input: Box<dyn Read>) -> RecordStream {
    Box::new(XmlRecordReader::new(input))
}

fn normalise(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
