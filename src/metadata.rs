use crate::column::ColumnSchema;
use crate::field_type::DataType;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;

/// Metadata about a delimited text file.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// The detected dialect.
    pub dialect: Dialect,
    /// The content looks like JSON; no further dialect fields were guessed.
    pub is_json: bool,
    /// Number of fields per record.
    pub num_fields: usize,
    /// Field names from the header row (or generated names if no header).
    pub fields: Vec<String>,
    /// Inferred column schema, merged with any caller-supplied columns.
    pub columns: ColumnSchema,
    /// Physical records scanned while collecting samples.
    pub records_sampled: u64,
}

impl Metadata {
    /// Create metadata for content that was recognised as JSON.
    pub fn json(dialect: Dialect) -> Self {
        Self {
            dialect,
            is_json: true,
            num_fields: 0,
            fields: Vec::new(),
            columns: ColumnSchema::default(),
            records_sampled: 0,
        }
    }

    /// Data type of every column, in ordinal order.
    pub fn types(&self) -> Vec<DataType> {
        self.columns
            .iter()
            .map(|column| column.format.data_type)
            .collect()
    }
}

/// Syntactic parameters needed to tokenize a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialect {
    /// Field delimiter; `None` means every line is a single field.
    pub delimiter: Option<char>,
    /// Header configuration.
    pub header: Header,
    /// Quote character configuration.
    pub quote: Quote,
    /// Escape character, honoured outside of closed quotes.
    pub escape: Option<char>,
    /// Lines starting with this prefix are skipped; empty disables comments.
    pub comment_prefix: String,
    /// Record separator style.
    pub newline: NewLine,
    /// Code page of the byte stream.
    pub encoding: &'static Encoding,
    /// Whether the stream starts with a byte-order mark.
    pub has_bom: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: Some(','),
            header: Header::new(true, 0),
            quote: Quote::Some('"'),
            escape: None,
            comment_prefix: String::new(),
            newline: NewLine::CrLf,
            encoding: UTF_8,
            has_bom: false,
        }
    }
}

impl Dialect {
    /// Create a dialect with the given delimiter and defaults for everything else.
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
            ..Self::default()
        }
    }

    /// Whether the stream is decoded as UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// Number of physical lines discarded before the header.
    pub fn skip_rows(&self) -> usize {
        self.header.num_preamble_rows
    }

    /// Whether the first row after the skipped lines holds column names.
    pub fn has_header(&self) -> bool {
        self.header.has_header_row
    }
}

/// Header configuration for a file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    /// Whether the file has a header row.
    pub has_header_row: bool,
    /// Number of rows to skip before the header (preamble/comment rows).
    pub num_preamble_rows: usize,
}

impl Header {
    /// Create a new Header configuration.
    pub const fn new(has_header_row: bool, num_preamble_rows: usize) -> Self {
        Self {
            has_header_row,
            num_preamble_rows,
        }
    }
}

/// Quote character configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// No quoting.
    None,
    /// Quote with the specified character.
    Some(char),
}

impl Default for Quote {
    fn default() -> Self {
        Quote::Some('"')
    }
}

impl Quote {
    /// Returns the quote character if set.
    pub fn char(&self) -> Option<char> {
        match self {
            Quote::None => None,
            Quote::Some(c) => Some(*c),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::None => write!(f, "none"),
            Quote::Some(c) => write!(f, "{c}"),
        }
    }
}

/// Record separator styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NewLine {
    /// Old Mac-style line ending (\r).
    Cr,
    /// Unix-style line ending (\n).
    Lf,
    /// Windows-style line ending (\r\n).
    #[default]
    CrLf,
    /// Reversed pair (\n\r).
    LfCr,
    /// ASCII record separator (0x1E).
    RecordSeparator,
    /// ASCII unit separator (0x1F).
    UnitSeparator,
    /// No record separator seen in the sample.
    None,
}

impl NewLine {
    /// The C0 separator character ending a record, for the two separator styles.
    pub const fn separator_char(&self) -> Option<char> {
        match self {
            NewLine::RecordSeparator => Some('\u{1e}'),
            NewLine::UnitSeparator => Some('\u{1f}'),
            _ => None,
        }
    }

    /// Returns the escaped string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            NewLine::Cr => "\\r",
            NewLine::Lf => "\\n",
            NewLine::CrLf => "\\r\\n",
            NewLine::LfCr => "\\n\\r",
            NewLine::RecordSeparator => "RS",
            NewLine::UnitSeparator => "US",
            NewLine::None => "none",
        }
    }
}

impl fmt::Display for NewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied dialect fields; every `Some` field skips its guesser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialectHints {
    /// `Some(None)` fixes the file as not delimited.
    pub delimiter: Option<Option<char>>,
    pub quote: Option<Quote>,
    pub escape: Option<Option<char>>,
    pub comment_prefix: Option<String>,
    pub newline: Option<NewLine>,
    pub encoding: Option<&'static Encoding>,
    pub skip_rows: Option<usize>,
    pub has_header: Option<bool>,
}

impl DialectHints {
    /// Build a complete dialect from the hints, with defaults for unset fields.
    pub fn to_dialect(&self) -> Dialect {
        let defaults = Dialect::default();
        Dialect {
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            header: Header::new(
                self.has_header.unwrap_or(defaults.header.has_header_row),
                self.skip_rows.unwrap_or(0),
            ),
            quote: self.quote.unwrap_or(defaults.quote),
            escape: self.escape.unwrap_or(None),
            comment_prefix: self.comment_prefix.clone().unwrap_or_default(),
            newline: self.newline.unwrap_or(defaults.newline),
            encoding: self.encoding.unwrap_or(UTF_8),
            has_bom: false,
        }
    }
}
