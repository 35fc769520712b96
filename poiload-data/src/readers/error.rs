use thiserror::Error;

/// Errors raised while decoding records from an input file.
///
/// `record` is the 1-based position of the record being decoded when the
/// failure was detected.
#[derive(Debug, Error)]
pub enum RecordParseError {
    /// A required field is absent.
    #[error("record {record}: missing required field `{field}`")]
    MissingField {
        /// Record position.
        record: usize,
        /// Source field name.
        field: &'static str,
    },
    /// A coordinate or rating could not be coerced to a finite number.
    #[error("record {record}: field `{field}` value {value:?} is not a finite number")]
    InvalidNumber {
        /// Record position.
        record: usize,
        /// Source field name.
        field: &'static str,
        /// Offending raw value.
        value: String,
    },
    /// The external identifier is not an integer.
    #[error("record {record}: field `{field}` value {value:?} is not an integer identifier")]
    InvalidIdentifier {
        /// Record position.
        record: usize,
        /// Source field name.
        field: &'static str,
        /// Offending raw value.
        value: String,
    },
    /// The container structure is not what the reader expects.
    #[error("record {record}: expected {expected}")]
    Structure {
        /// Record position.
        record: usize,
        /// Description of the expected token or element.
        expected: &'static str,
    },
    /// A JSON record could not be decoded.
    #[error("record {record}: malformed JSON")]
    Json {
        /// Record position.
        record: usize,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A CSV row could not be decoded.
    #[error("record {record}: malformed CSV")]
    Csv {
        /// Record position.
        record: usize,
        /// Source error produced by `csv`.
        #[source]
        source: csv::Error,
    },
    /// An XML event could not be decoded.
    #[error("record {record}: malformed XML")]
    Xml {
        /// Record position.
        record: usize,
        /// Source error produced by `quick-xml`.
        #[source]
        source: quick_xml::Error,
    },
    /// Reading the underlying input failed.
    #[error("record {record}: failed to read input")]
    Io {
        /// Record position.
        record: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RecordParseError {
    /// Position of the record that failed.
    #[must_use]
    pub const fn record(&self) -> usize {
        match self {
            Self::MissingField { record, .. }
            | Self::InvalidNumber { record, .. }
            | Self::InvalidIdentifier { record, .. }
            | Self::Structure { record, .. }
            | Self::Json { record, .. }
            | Self::Csv { record, .. }
            | Self::Xml { record, .. }
            | Self::Io { record, .. } => *record,
        }
    }
}
