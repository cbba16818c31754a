//! Row reader on top of the tokenizer.
//!
//! [`CsvReader`] knows the expected column count and repairs what it can:
//! duplicate header rows are dropped, a short marker row at the end of the
//! file is ignored, short rows can be combined with the next one and long rows
//! are either trimmed or realigned. Every repair is reported as a [`Warning`].

pub mod realign;
pub mod tokenizer;
pub mod typed;

use std::io::{Read, Seek};

use crate::cancel::CancellationToken;
use crate::column::normalize_header_names;
use crate::cursor::CharCursor;
use crate::error::{Result, ScoutError};
use crate::metadata::Dialect;
use crate::options::ReadOptions;
use crate::warning::{Warning, WarningSink};
use realign::{ColumnRealigner, MAX_LEARNED_ROWS};
use tokenizer::{RawRow, Tokenizer};

/// A single field shorter than this at the end of the file is a footer marker.
const FOOTER_MAX_LEN: usize = 10;

/// Combined rows may exceed the expected column count by this much.
const COMBINE_TOLERANCE: usize = 4;

/// One logical record.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub fields: Vec<String>,
    /// 1-based, counting data rows only.
    pub record_number: u64,
    pub start_line: usize,
    pub end_line: usize,
    /// Problems found while reading this row.
    pub warnings: Vec<Warning>,
}

enum State {
    NeedRow,
    HaveShortRow(RawRow),
    HaveLongRow(RawRow),
    Done(Option<RawRow>),
}

/// Reads rows of a delimited file with a fixed dialect.
pub struct CsvReader<R> {
    cursor: CharCursor<R>,
    tokenizer: Tokenizer,
    dialect: Dialect,
    options: ReadOptions,
    header: Option<Vec<String>>,
    field_names: Vec<String>,
    field_count: usize,
    record_number: u64,
    start_line: usize,
    end_line: usize,
    end_of_file: bool,
    realigner: Option<ColumnRealigner>,
    sink: Option<Box<dyn WarningSink>>,
    cancel: Option<CancellationToken>,
}

impl<R: Read + Seek> CsvReader<R> {
    /// Open a reader and position it on the first data row.
    pub fn open(stream: R, dialect: &Dialect, options: &ReadOptions) -> Result<Self> {
        let cursor = CharCursor::new(stream, dialect.encoding)?;
        let mut reader = Self {
            cursor,
            tokenizer: Tokenizer::new(dialect, options),
            dialect: dialect.clone(),
            options: options.clone(),
            header: None,
            field_names: Vec::new(),
            field_count: 0,
            record_number: 0,
            start_line: 0,
            end_line: 0,
            end_of_file: false,
            realigner: None,
            sink: None,
            cancel: None,
        };
        reader.read_header()?;
        if options.realign_columns && reader.field_count > 1 {
            reader.learn_columns()?;
        }
        reader.reset_to_first_data_row()?;
        Ok(reader)
    }

    /// Register the receiver of warnings.
    pub fn with_warning_sink(mut self, sink: Box<dyn WarningSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Poll `token` before every record.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Number of columns every row is expected to have.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Column names from the header, or `Column1`.. without one.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of the last record returned.
    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn end_of_file(&self) -> bool {
        self.end_of_file
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }

    /// Seek back to the start and skip the preamble and header again.
    pub fn reset_to_first_data_row(&mut self) -> Result<()> {
        self.cursor.rewind()?;
        self.tokenizer.set_line(1);
        self.record_number = 0;
        self.start_line = 0;
        self.end_line = 0;
        self.end_of_file = false;
        self.skip_preamble()?;
        if self.dialect.has_header() {
            self.tokenizer.read_row(&mut self.cursor)?;
        }
        Ok(())
    }

    /// Read the next record; `None` at the end of the file.
    ///
    /// Fails with [`ScoutError::Cancelled`] once the cancellation token fires.
    pub fn read_record(&mut self) -> Result<Option<Row>> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(ScoutError::Cancelled {
                    record: self.record_number,
                });
            }
        }
        if self.end_of_file {
            return Ok(None);
        }

        let mut state = State::NeedRow;
        let raw = loop {
            state = match state {
                State::NeedRow => self.next_raw_row()?,
                State::HaveShortRow(raw) => self.handle_short_row(raw)?,
                State::HaveLongRow(raw) => self.handle_long_row(raw),
                State::Done(raw) => break raw,
            };
        };

        let Some(raw) = raw else {
            self.end_of_file = true;
            return Ok(None);
        };
        self.record_number += 1;
        self.start_line = raw.start_line;
        self.end_line = raw.end_line;

        let mut warnings = raw.warnings;
        for warning in &mut warnings {
            warning.record_number = self.record_number;
            warning.line = raw.start_line;
        }
        for warning in &warnings {
            self.publish(warning);
        }

        Ok(Some(Row {
            fields: raw.fields,
            record_number: self.record_number,
            start_line: raw.start_line,
            end_line: raw.end_line,
            warnings,
        }))
    }

    /// Report a warning raised outside of the tokenizer, e.g. by type conversion.
    pub(crate) fn publish(&mut self, warning: &Warning) {
        log::debug!("{warning}");
        if let Some(sink) = self.sink.as_mut() {
            sink.warn(warning);
        }
    }

    fn skip_preamble(&mut self) -> Result<()> {
        for _ in 0..self.dialect.skip_rows() {
            if !self.tokenizer.skip_line(&mut self.cursor)? {
                break;
            }
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        self.cursor.rewind()?;
        self.tokenizer.set_line(1);
        self.skip_preamble()?;
        let first = self.tokenizer.read_row(&mut self.cursor)?;
        let Some(first) = first else {
            return Ok(());
        };
        self.field_count = first.len();
        if self.dialect.has_header() {
            let names = normalize_header_names(&first.fields);
            if names.issues() > 0 {
                log::debug!(
                    "header fixed: {} empty, {} duplicate, {} overlong names",
                    names.empty,
                    names.duplicate,
                    names.overlong
                );
            }
            self.field_names = names.names;
            self.header = Some(first.fields);
        } else {
            let blank = vec![String::new(); self.field_count];
            self.field_names = normalize_header_names(&blank).names;
        }
        Ok(())
    }

    fn learn_columns(&mut self) -> Result<()> {
        let mut realigner = ColumnRealigner::new(self.field_count);
        self.reset_to_first_data_row()?;
        let mut scanned = 0;
        while scanned < MAX_LEARNED_ROWS * 2 && realigner.rows_learned() < MAX_LEARNED_ROWS {
            let Some(raw) = self.tokenizer.read_row(&mut self.cursor)? else {
                break;
            };
            if !self.is_duplicate_header(&raw) {
                realigner.learn(&raw.fields);
            }
            scanned += 1;
        }
        log::debug!("realigner learned {} of {scanned} rows", realigner.rows_learned());
        self.realigner = Some(realigner);
        Ok(())
    }

    fn is_duplicate_header(&self, raw: &RawRow) -> bool {
        match &self.header {
            Some(header) => {
                header.len() == raw.len()
                    && header
                        .iter()
                        .zip(&raw.fields)
                        .all(|(h, f)| h.trim().eq_ignore_ascii_case(f.trim()))
            }
            None => false,
        }
    }

    fn next_raw_row(&mut self) -> Result<State> {
        loop {
            let Some(raw) = self.tokenizer.read_row(&mut self.cursor)? else {
                return Ok(State::Done(None));
            };
            if self.is_duplicate_header(&raw) {
                if self.options.skip_duplicate_header {
                    log::debug!("duplicate header on line {} skipped", raw.start_line);
                    continue;
                }
                if let Some(realigner) = self.realigner.as_mut() {
                    realigner.learn(&raw.fields);
                }
            }
            if self.field_count == 0 {
                self.field_count = raw.len();
            }
            return Ok(self.classify(raw));
        }
    }

    fn classify(&self, raw: RawRow) -> State {
        match raw.len().cmp(&self.field_count) {
            std::cmp::Ordering::Equal => State::Done(Some(raw)),
            std::cmp::Ordering::Less => State::HaveShortRow(raw),
            std::cmp::Ordering::Greater => State::HaveLongRow(raw),
        }
    }

    fn handle_short_row(&mut self, mut raw: RawRow) -> Result<State> {
        if raw.len() == 1 && raw.fields[0].chars().count() < FOOTER_MAX_LEN && self.at_end_of_data()? {
            log::debug!("footer '{}' on line {} dropped", raw.fields[0], raw.start_line);
            return Ok(State::Done(None));
        }

        if self.options.allow_row_combining {
            let mark = self.cursor.pin();
            let line = self.tokenizer.line();
            if let Some(next) = self.tokenizer.read_row(&mut self.cursor)? {
                let combined = raw.len() + next.len() - 1;
                if next.len() < self.field_count && combined <= self.field_count + COMBINE_TOLERANCE {
                    self.cursor.unpin();
                    let column = raw.len() - 1;
                    combine(&mut raw, next);
                    raw.warnings.push(Warning::new(
                        Some(column),
                        format!(
                            "Row combined with the following line, {} of {} columns",
                            raw.len(),
                            self.field_count
                        ),
                    ));
                    return Ok(match raw.len().cmp(&self.field_count) {
                        std::cmp::Ordering::Less => State::Done(Some(raw)),
                        _ => self.classify(raw),
                    });
                }
            }
            if !self.cursor.restore(mark) {
                return Err(ScoutError::BufferInconsistency {
                    line,
                    record: self.record_number + 1,
                });
            }
            self.tokenizer.set_line(line);
        }

        let message = self.column_count_message("fewer", &raw);
        raw.warnings.push(Warning::new(None, message));
        Ok(State::Done(Some(raw)))
    }

    fn handle_long_row(&mut self, mut raw: RawRow) -> State {
        let expected = self.field_count;
        if raw.fields[expected..].iter().all(|f| f.is_empty()) {
            raw.truncate(expected);
            return State::Done(Some(raw));
        }

        if let (Some(realigner), Some(delimiter)) = (&self.realigner, self.dialect.delimiter) {
            match realigner.joins(&raw.fields, delimiter) {
                Some(joins) => {
                    for idx in joins {
                        raw.join_fields(idx, delimiter, self.options.trim);
                    }
                    raw.warnings.push(Warning::new(None, "Columns realigned"));
                }
                None => {
                    let message = self.column_count_message("more", &raw);
                    raw.warnings
                        .push(Warning::new(None, format!("{message}, row left unchanged")));
                }
            }
            return State::Done(Some(raw));
        }

        let extra = raw.fields[expected..].join(", ");
        let message = self.column_count_message("more", &raw);
        raw.warnings.push(Warning::new(
            Some(expected),
            format!("{message}, extra data ignored: {extra}"),
        ));
        raw.truncate(expected);
        State::Done(Some(raw))
    }

    /// True when nothing but blank lines (or comments) is left to read.
    fn at_end_of_data(&mut self) -> Result<bool> {
        if self.cursor.is_eof()? {
            return Ok(true);
        }
        if !self.options.skip_empty_lines {
            return Ok(false);
        }
        let mark = self.cursor.pin();
        let line = self.tokenizer.line();
        if self.tokenizer.read_row(&mut self.cursor)?.is_none() {
            self.cursor.unpin();
            return Ok(true);
        }
        if !self.cursor.restore(mark) {
            return Err(ScoutError::BufferInconsistency {
                line,
                record: self.record_number + 1,
            });
        }
        self.tokenizer.set_line(line);
        Ok(false)
    }

    fn column_count_message(&self, relation: &str, raw: &RawRow) -> String {
        let mut message = format!(
            "Row has {relation} columns than expected ({}/{})",
            raw.len(),
            self.field_count
        );
        if self.options.warn_delimiter_in_value && raw.delimiter_in_quotes.iter().any(|&d| d) {
            message.push_str(", a quoted value contains the delimiter");
        }
        message
    }
}

/// Join the last field of `row` and the first field of `next` with a space.
fn combine(row: &mut RawRow, next: RawRow) {
    let mut fields = next.fields.into_iter();
    let mut untrimmed = next.untrimmed.into_iter();
    let mut quoted = next.quoted.into_iter();
    let mut delimiter_in_quotes = next.delimiter_in_quotes.into_iter();
    if let (Some(last), Some(first), Some(first_text)) =
        (row.fields.len().checked_sub(1), fields.next(), untrimmed.next())
    {
        if row.untrimmed[last].is_some() || first_text.is_some() {
            let mut text = row.untrimmed[last].take().unwrap_or_else(|| row.fields[last].clone());
            text.push(' ');
            text.push_str(first_text.as_deref().unwrap_or(&first));
            row.untrimmed[last] = Some(text);
        }
        row.fields[last].push(' ');
        row.fields[last].push_str(&first);
        row.quoted[last] |= quoted.next().unwrap_or(false);
        row.delimiter_in_quotes[last] |= delimiter_in_quotes.next().unwrap_or(false);
    }
    row.fields.extend(fields);
    row.untrimmed.extend(untrimmed);
    row.quoted.extend(quoted);
    row.delimiter_in_quotes.extend(delimiter_in_quotes);
    row.end_line = next.end_line;
    row.warnings.extend(next.warnings);
}
