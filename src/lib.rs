//! csv-scout: dialect detection, tolerant tokenizing and column type
//! inference for delimited text files of unknown shape
//!
//! Point a [`Sniffer`] at a file and it guesses the code page, delimiter,
//! quote character, newline style, preamble rows and header presence, then
//! samples every column and infers its type: boolean, GUID, integer,
//! decimal, floating point or date/time with the exact date pattern.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_scout::{Sniffer, SampleSize};
//!
//! let mut sniffer = Sniffer::new();
//! sniffer.sample_size(SampleSize::Records(100));
//!
//! let metadata = sniffer.sniff_path("data.csv").unwrap();
//!
//! println!("Delimiter: {:?}", metadata.dialect.delimiter);
//! println!("Has header: {}", metadata.dialect.header.has_header_row);
//! println!("Fields: {:?}", metadata.fields);
//! println!("Types: {:?}", metadata.types());
//! ```
//!
//! # Reading typed rows
//!
//! The resolved dialect and schema drive a [`CsvReader`], which repairs
//! ragged rows where it can and reports every repair as a [`Warning`], and a
//! [`TypedReader`] on top of it:
//!
//! ```no_run
//! use std::fs::File;
//! use csv_scout::{CsvReader, Sniffer, TypedReader, EN};
//!
//! let metadata = Sniffer::new().sniff_path("data.csv").unwrap();
//! let file = File::open("data.csv").unwrap();
//! let reader = CsvReader::open(file, &metadata.dialect, &Default::default()).unwrap();
//! let mut typed = TypedReader::new(reader, &metadata.columns, &EN).unwrap();
//! while let Some(row) = typed.next_row().unwrap() {
//!     println!("{:?}", row.typed_fields);
//! }
//! ```

mod cancel;
mod column;
mod cursor;
pub mod detect;
mod encoding;
mod error;
mod field_type;
pub mod infer;
mod metadata;
mod options;
pub mod reader;
mod sample;
mod sniffer;
mod value;
mod warning;

pub use cancel::CancellationToken;
pub use column::{Column, ColumnSchema, HeaderNames, MAX_HEADER_LEN, normalize_header_names};
pub use cursor::{CharCursor, MAX_PINNED_CHARS};
pub use error::{Result, ScoutError};
pub use field_type::{DataType, SERIAL_DATE_FORMAT, ValueFormat};
pub use infer::locale::{DE, EN, ES, FR, Locale};
pub use infer::{CheckResult, GuessOptions, TypeGuesser, guess};
pub use metadata::{Dialect, DialectHints, Header, Metadata, NewLine, Quote};
pub use options::{ReadOptions, TrimMode, is_null_literal};
pub use reader::realign::ColumnRealigner;
pub use reader::typed::{TimeZoneAdjuster, TypedReader, TypedRow};
pub use reader::{CsvReader, Row};
pub use sample::{DatePreference, SampleResult, SampleSize, collect as collect_samples};
pub use sniffer::Sniffer;
pub use value::{Value, convert};
pub use warning::{Warning, WarningSink};

// Re-export for advanced usage
pub use encoding::{EncodingInfo, detect_encoding, is_utf8};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api() {
        let _sniffer = Sniffer::new();
        let _sample = SampleSize::Records(100);
        let _date_pref = DatePreference::MdyFormat;
        let _quote = Quote::Some('"');
        let _type = DataType::String;
        let _options = ReadOptions::default();
    }

    #[test]
    fn test_sniff_simple_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6\n";
        let metadata = Sniffer::new().sniff_bytes(data).unwrap();

        assert_eq!(metadata.dialect.delimiter, Some(','));
        assert_eq!(metadata.num_fields, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let mut sniffer = Sniffer::new();
        sniffer
            .sample_size(SampleSize::Bytes(4096))
            .date_preference(DatePreference::DmyFormat)
            .delimiter(';')
            .quote(Quote::None)
            .randomize_samples(true);

        let metadata = sniffer.sniff_bytes(b"x;y\n1;2\n").unwrap();
        assert_eq!(metadata.dialect.delimiter, Some(';'));
        assert_eq!(metadata.dialect.quote, Quote::None);
    }
}
