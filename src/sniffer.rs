//! Main Sniffer builder and sniff methods.
//!
//! Dialect fields are guessed in a fixed order since later guessers work
//! with the settings resolved before them: code page, JSON check, comment
//! prefix, delimiter, newline and quote, skipped rows and finally the header.
//! The column schema is then inferred from samples read with that dialect.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::column::{Column, ColumnSchema};
use crate::detect::{self, guess_code_page};
use crate::error::{Result, ScoutError};
use crate::field_type::DataType;
use crate::infer::date::pattern_parts;
use crate::infer::{GuessOptions, TypeGuesser};
use crate::metadata::{Dialect, DialectHints, Header, Metadata, NewLine, Quote};
use crate::options::ReadOptions;
use crate::reader::CsvReader;
use crate::sample::{self, DatePreference, SampleSize};

/// Records skipped at most before sampling when the start is randomized.
const MAX_RANDOM_START: u64 = 100;

/// Dialect sniffer and schema guesser.
///
/// # Example
///
/// ```no_run
/// use csv_scout::{Sniffer, SampleSize};
///
/// let mut sniffer = Sniffer::new();
/// sniffer.sample_size(SampleSize::Records(100)).samples_wanted(500);
///
/// let metadata = sniffer.sniff_path("data.csv").unwrap();
/// println!("Delimiter: {:?}", metadata.dialect.delimiter);
/// println!("Has header: {}", metadata.dialect.header.has_header_row);
/// ```
#[derive(Debug, Clone)]
pub struct Sniffer {
    /// Prefix handed to the dialect guessers.
    sample_size: SampleSize,
    /// Dialect fields fixed by the caller.
    hints: DialectHints,
    guess_code_page: bool,
    guess_json: bool,
    guess_comment: bool,
    guess_delimiter: bool,
    guess_quote: bool,
    guess_newline: bool,
    guess_skip_rows: bool,
    guess_header: bool,
    guess_types: bool,
    read_options: ReadOptions,
    guess_options: GuessOptions,
    column_hints: ColumnSchema,
    samples_wanted: usize,
    max_sample_records: u64,
    randomize_samples: bool,
}

impl Default for Sniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sniffer {
    /// Create a new Sniffer with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            hints: DialectHints::default(),
            guess_code_page: true,
            guess_json: true,
            guess_comment: true,
            guess_delimiter: true,
            guess_quote: true,
            guess_newline: true,
            guess_skip_rows: true,
            guess_header: true,
            guess_types: true,
            read_options: ReadOptions::default(),
            guess_options: GuessOptions::default(),
            column_hints: ColumnSchema::new(),
            samples_wanted: 200,
            max_sample_records: 10_000,
            randomize_samples: false,
        }
    }

    /// Set the prefix size inspected by the dialect guessers.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the date preference for ambiguous date parsing.
    pub fn date_preference(&mut self, date_preference: DatePreference) -> &mut Self {
        self.guess_options.date_preference = date_preference;
        self
    }

    /// Fix every dialect field present in `hints`.
    pub fn hints(&mut self, hints: DialectHints) -> &mut Self {
        self.hints = hints;
        self
    }

    /// Force a specific delimiter (skip delimiter detection).
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.hints.delimiter = Some(Some(delimiter));
        self
    }

    /// Read every line as a single field.
    pub fn not_delimited(&mut self) -> &mut Self {
        self.hints.delimiter = Some(None);
        self
    }

    /// Force a specific quote character.
    pub fn quote(&mut self, quote: Quote) -> &mut Self {
        self.hints.quote = Some(quote);
        self
    }

    pub fn escape(&mut self, escape: Option<char>) -> &mut Self {
        self.hints.escape = Some(escape);
        self
    }

    /// Force the comment prefix; an empty prefix disables comments.
    pub fn comment_prefix(&mut self, prefix: &str) -> &mut Self {
        self.hints.comment_prefix = Some(prefix.to_string());
        self
    }

    pub fn newline(&mut self, newline: NewLine) -> &mut Self {
        self.hints.newline = Some(newline);
        self
    }

    pub fn encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.hints.encoding = Some(encoding);
        self
    }

    pub fn skip_rows(&mut self, rows: usize) -> &mut Self {
        self.hints.skip_rows = Some(rows);
        self
    }

    pub fn has_header(&mut self, has_header: bool) -> &mut Self {
        self.hints.has_header = Some(has_header);
        self
    }

    pub fn guess_code_page(&mut self, yes: bool) -> &mut Self {
        self.guess_code_page = yes;
        self
    }

    pub fn guess_json(&mut self, yes: bool) -> &mut Self {
        self.guess_json = yes;
        self
    }

    pub fn guess_comment(&mut self, yes: bool) -> &mut Self {
        self.guess_comment = yes;
        self
    }

    pub fn guess_delimiter(&mut self, yes: bool) -> &mut Self {
        self.guess_delimiter = yes;
        self
    }

    pub fn guess_quote(&mut self, yes: bool) -> &mut Self {
        self.guess_quote = yes;
        self
    }

    pub fn guess_newline(&mut self, yes: bool) -> &mut Self {
        self.guess_newline = yes;
        self
    }

    pub fn guess_skip_rows(&mut self, yes: bool) -> &mut Self {
        self.guess_skip_rows = yes;
        self
    }

    pub fn guess_header(&mut self, yes: bool) -> &mut Self {
        self.guess_header = yes;
        self
    }

    /// Infer the column schema after the dialect.
    pub fn guess_types(&mut self, yes: bool) -> &mut Self {
        self.guess_types = yes;
        self
    }

    pub fn read_options(&mut self, options: ReadOptions) -> &mut Self {
        self.read_options = options;
        self
    }

    pub fn guess_options(&mut self, options: GuessOptions) -> &mut Self {
        self.guess_options = options;
        self
    }

    /// Columns declared by the caller; inference only upgrades their formats.
    pub fn column_hints(&mut self, columns: ColumnSchema) -> &mut Self {
        self.column_hints = columns;
        self
    }

    /// Distinct values per column after which sampling stops.
    pub fn samples_wanted(&mut self, samples: usize) -> &mut Self {
        self.samples_wanted = samples;
        self
    }

    pub fn max_sample_records(&mut self, records: u64) -> &mut Self {
        self.max_sample_records = records;
        self
    }

    pub fn treat_as_null(&mut self, literals: Vec<String>) -> &mut Self {
        self.read_options.treat_as_null = literals;
        self
    }

    /// Start sampling at a random record near the top of the file.
    pub fn randomize_samples(&mut self, yes: bool) -> &mut Self {
        self.randomize_samples = yes;
        self
    }

    /// Sniff a file at the given path.
    pub fn sniff_path<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let file = File::open(path.as_ref())?;
        self.sniff_reader(BufReader::new(file))
    }

    /// Sniff data from bytes.
    pub fn sniff_bytes(&self, data: &[u8]) -> Result<Metadata> {
        self.sniff_reader(Cursor::new(data))
    }

    /// Sniff data from a seekable reader.
    pub fn sniff_reader<R: Read + Seek>(&self, mut reader: R) -> Result<Metadata> {
        let Some(dialect) = self.sniff_dialect(&mut reader)? else {
            let encoding = self.hints.encoding.unwrap_or(UTF_8);
            return Ok(Metadata::json(Dialect {
                encoding,
                ..self.hints.to_dialect()
            }));
        };

        let mut csv = CsvReader::open(reader, &dialect, &self.read_options)?;
        let fields = csv.field_names().to_vec();
        let num_fields = csv.field_count();
        if num_fields == 0 {
            return Err(ScoutError::EmptyData);
        }

        let (columns, records_sampled) = if self.guess_types {
            self.infer_schema(&mut csv)?
        } else {
            (self.column_hints.clone(), 0)
        };
        columns.validate()?;

        log::info!(
            "dialect: delimiter {:?}, quote {}, newline {}, skip {}, header {}, {} columns, {} records sampled",
            dialect.delimiter,
            dialect.quote,
            dialect.newline,
            dialect.skip_rows(),
            dialect.has_header(),
            num_fields,
            records_sampled
        );

        Ok(Metadata {
            dialect,
            is_json: false,
            num_fields,
            fields,
            columns,
            records_sampled,
        })
    }

    /// Resolve the dialect; `None` for content that looks like JSON.
    pub fn sniff_dialect<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<Dialect>> {
        let hints = &self.hints;
        let prefix = detect::read_prefix(reader, self.sample_size)?;
        if prefix.is_empty() {
            return Err(ScoutError::EmptyData);
        }

        let (encoding, has_bom) = match hints.encoding {
            Some(encoding) => (encoding, Encoding::for_bom(&prefix).is_some()),
            None if self.guess_code_page => {
                let info = guess_code_page(reader)?;
                (info.encoding, info.has_bom)
            }
            None => (UTF_8, Encoding::for_bom(&prefix).is_some()),
        };
        let text = detect::decode_prefix(&prefix, encoding);

        if self.guess_json && detect::looks_like_json(&text) {
            log::info!("content looks like JSON, dialect guessing stopped");
            return Ok(None);
        }

        let comment_prefix = match &hints.comment_prefix {
            Some(prefix) => prefix.clone(),
            None if self.guess_comment => detect::guess_comment_prefix(&text)
                .unwrap_or_default()
                .to_string(),
            None => String::new(),
        };

        // quotes are needed to find records before the quote is known
        let scan_quote = match hints.quote {
            Some(quote) => quote.char(),
            None => Some('"'),
        };
        let guess_delimiter = hints.delimiter.is_none() && self.guess_delimiter;
        let mut delimiter = match hints.delimiter {
            Some(delimiter) => delimiter,
            None if self.guess_delimiter => detect::guess_delimiter(&text, scan_quote, &comment_prefix),
            None => Dialect::default().delimiter,
        };

        let newline = match hints.newline {
            Some(newline) => newline,
            None if self.guess_newline => detect::guess_newline(&text, scan_quote),
            None => NewLine::default(),
        };
        let quote = match hints.quote {
            Some(quote) => quote,
            None if self.guess_quote => detect::guess_quote(&text, delimiter, &comment_prefix),
            None => Quote::default(),
        };

        let skip_rows = match hints.skip_rows {
            Some(rows) => rows,
            None if self.guess_skip_rows => {
                let mut rows = detect::guess_skip_rows(&text, delimiter, quote.char(), &comment_prefix);
                if rows > 0 && guess_delimiter {
                    let table = skip_lines(&text, rows);
                    let again = detect::guess_delimiter(table, quote.char(), &comment_prefix);
                    if again != delimiter {
                        log::debug!("delimiter changed to {again:?} below {rows} skipped rows");
                        delimiter = again;
                        rows = detect::guess_skip_rows(&text, delimiter, quote.char(), &comment_prefix);
                    }
                }
                rows
            }
            None => 0,
        };

        let has_header = match hints.has_header {
            Some(has_header) => has_header,
            None if self.guess_header => {
                detect::guess_has_header(&text, delimiter, quote.char(), &comment_prefix, skip_rows)
            }
            None => true,
        };

        Ok(Some(Dialect {
            delimiter,
            header: Header::new(has_header, skip_rows),
            quote,
            escape: hints.escape.unwrap_or(None),
            comment_prefix,
            newline,
            encoding,
            has_bom,
        }))
    }

    /// Sample every column and merge the guessed formats into the column hints.
    fn infer_schema<R: Read + Seek>(&self, csv: &mut CsvReader<R>) -> Result<(ColumnSchema, u64)> {
        if self.randomize_samples {
            let skip = rand::random::<u64>() % MAX_RANDOM_START;
            for _ in 0..skip {
                if csv.read_record()?.is_none() {
                    csv.reset_to_first_data_row()?;
                    break;
                }
            }
            log::debug!("sampling starts after record {}", csv.record_number());
        }

        let indices: Vec<usize> = (0..csv.field_count()).collect();
        let mut samples = sample::collect(
            csv,
            &indices,
            self.max_sample_records,
            self.samples_wanted,
            &self.read_options.treat_as_null,
        )?;
        let records_sampled = samples
            .values()
            .map(|s| s.records_read)
            .max()
            .unwrap_or(0);

        let mut guesser = TypeGuesser::new(&self.guess_options);
        let mut schema = self.column_hints.clone();
        let names = csv.field_names().to_vec();
        for (idx, name) in names.iter().enumerate() {
            let values = samples.remove(&idx).map(|s| s.values).unwrap_or_default();
            let result = guesser.guess(&values, self.guess_options.min_samples);
            match result.found {
                Some(format) => {
                    log::debug!("column '{name}': {} from {} samples", format.describe(), values.len());
                    schema.add_or_upgrade(Column::new(name.clone(), idx, format));
                }
                None => {
                    log::debug!(
                        "column '{name}': no format, {} matched, e.g. {:?}",
                        result.positive_matches,
                        result.examples
                    );
                }
            }
        }

        link_time_part(&mut schema);
        Ok((schema, records_sampled))
    }
}

/// The text after `lines` physical lines.
fn skip_lines(text: &str, lines: usize) -> &str {
    let mut rest = text;
    for _ in 0..lines {
        match rest.find(['\n', '\r']) {
            Some(idx) => {
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => return "",
        }
    }
    rest
}

/// Link a date-only column with a time-only column right after it.
///
/// Only one link is made per schema, none if the caller already declared one.
fn link_time_part(schema: &mut ColumnSchema) {
    if schema.iter().any(|c| c.time_part.is_some()) {
        return;
    }
    let parts = |column: &Column| {
        (column.format.data_type == DataType::DateTime && !column.format.is_serial_date())
            .then(|| pattern_parts(&column.format.date_format))
    };

    let mut link = None;
    for date in schema.iter() {
        if parts(date) != Some((true, false)) {
            continue;
        }
        if let Some(time) = schema.by_ordinal(date.ordinal + 1) {
            if parts(time) == Some((false, true)) {
                link = Some((
                    date.name.clone(),
                    time.name.clone(),
                    time.format.resolved_date_format(),
                ));
                break;
            }
        }
    }

    let Some((date, time, time_format)) = link else {
        return;
    };
    log::debug!("column '{time}' linked as time part of '{date}'");
    if let Some(column) = schema.get_mut(&date) {
        column.time_part = Some(time.clone());
        column.time_part_format = time_format;
    }
    if let Some(column) = schema.get_mut(&time) {
        column.ignore = true;
    }
}
