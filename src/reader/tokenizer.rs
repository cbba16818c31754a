//! Field and row state machine over a [`CharCursor`].
//!
//! The tokenizer only splits characters into fields and rows. Column counts,
//! header handling and row repair live in [`super::CsvReader`].

use std::io::{Read, Seek};

use crate::cursor::CharCursor;
use crate::error::Result;
use crate::metadata::{Dialect, NewLine};
use crate::options::{ReadOptions, TrimMode};
use crate::warning::Warning;

const NBSP: char = '\u{a0}';
const UNKNOWN_CHAR: char = '\u{fffd}';

/// One physical record split into raw fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub fields: Vec<String>,
    /// Per field: the value was enclosed in quotes.
    pub quoted: Vec<bool>,
    /// Per field: a delimiter occurred inside the quoted value.
    pub delimiter_in_quotes: Vec<bool>,
    /// Per field: the text as read, when trimming changed it.
    pub untrimmed: Vec<Option<String>>,
    pub start_line: usize,
    pub end_line: usize,
    pub warnings: Vec<Warning>,
}

impl RawRow {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A line without any content.
    fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].is_empty() && !self.quoted[0]
    }

    fn push(&mut self, field: Field) {
        self.fields.push(field.value);
        self.quoted.push(field.quoted);
        self.delimiter_in_quotes.push(field.delimiter_in_quotes);
        self.untrimmed.push(field.untrimmed);
    }

    /// Merge field `idx + 1` into field `idx`, restoring the delimiter between them.
    ///
    /// The merged value is rebuilt from the untrimmed text of both fields, so
    /// whitespace next to the delimiter survives. Only the outer ends are
    /// trimmed again.
    pub fn join_fields(&mut self, idx: usize, delimiter: char, trim: TrimMode) {
        let right = self.fields.remove(idx + 1);
        let right = self.untrimmed.remove(idx + 1).unwrap_or(right);
        let right_quoted = self.quoted.remove(idx + 1);
        let right_delimiter = self.delimiter_in_quotes.remove(idx + 1);

        let left = match self.untrimmed[idx].take() {
            Some(text) => text,
            None => std::mem::take(&mut self.fields[idx]),
        };
        let left_quoted = self.quoted[idx];
        let text = format!("{left}{delimiter}{right}");

        let mut value = text.as_str();
        if trim == TrimMode::All || (trim == TrimMode::Unquoted && !left_quoted) {
            value = value.trim_start();
        }
        if trim == TrimMode::All || (trim == TrimMode::Unquoted && !right_quoted) {
            value = value.trim_end();
        }
        let value = value.to_string();

        self.quoted[idx] = left_quoted || right_quoted;
        self.delimiter_in_quotes[idx] |= right_delimiter;
        self.untrimmed[idx] = (value.len() != text.len()).then_some(text);
        self.fields[idx] = value;
    }

    pub fn truncate(&mut self, len: usize) {
        self.fields.truncate(len);
        self.quoted.truncate(len);
        self.delimiter_in_quotes.truncate(len);
        self.untrimmed.truncate(len);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Delimiter,
    /// CR, LF or a pair of them.
    LineBreak,
    /// Record or unit separator.
    Separator,
    Eof,
}

struct Field {
    value: String,
    quoted: bool,
    delimiter_in_quotes: bool,
    untrimmed: Option<String>,
}

/// Splits characters into fields and rows for one dialect.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiter: Option<char>,
    quote: Option<char>,
    escape: Option<char>,
    comment_prefix: String,
    separator: Option<char>,
    lf_cr_pair: bool,
    options: ReadOptions,
    /// 1-based physical line of the next character.
    line: usize,
}

impl Tokenizer {
    pub fn new(dialect: &Dialect, options: &ReadOptions) -> Self {
        Self {
            delimiter: dialect.delimiter,
            quote: dialect.quote.char(),
            escape: dialect.escape,
            comment_prefix: dialect.comment_prefix.clone(),
            separator: dialect.newline.separator_char(),
            lf_cr_pair: dialect.newline == NewLine::LfCr,
            options: options.clone(),
            line: 1,
        }
    }

    /// Line number of the next character.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Set the line counter, used after the cursor was moved back.
    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Skip one physical line, returns false at the end of the stream.
    pub fn skip_line<R: Read + Seek>(&mut self, cursor: &mut CharCursor<R>) -> Result<bool> {
        let skipped = cursor.skip_line()?;
        if skipped {
            self.line += 1;
        }
        Ok(skipped)
    }

    /// Read the next record, skipping comment lines and, if configured, empty lines.
    pub fn read_row<R: Read + Seek>(&mut self, cursor: &mut CharCursor<R>) -> Result<Option<RawRow>> {
        loop {
            if cursor.is_eof()? {
                return Ok(None);
            }
            if !self.comment_prefix.is_empty() && cursor.starts_with(&self.comment_prefix)? {
                self.skip_line(cursor)?;
                continue;
            }

            let mut row = RawRow {
                start_line: self.line,
                ..RawRow::default()
            };
            let end = loop {
                let (field, end) = self.read_field(cursor, &mut row)?;
                row.push(field);
                if end != FieldEnd::Delimiter {
                    break end;
                }
            };
            // the terminating line break is already counted
            row.end_line = if end == FieldEnd::LineBreak {
                self.line - 1
            } else {
                self.line
            };

            if self.options.skip_empty_lines && row.is_blank() {
                continue;
            }
            return Ok(Some(row));
        }
    }

    fn read_field<R: Read + Seek>(
        &mut self,
        cursor: &mut CharCursor<R>,
        row: &mut RawRow,
    ) -> Result<(Field, FieldEnd)> {
        let column = row.fields.len();
        let mut value = String::new();
        let mut pre_data = true;
        let mut quoted = false;
        let mut post_data = false;
        let mut delimiter_in_quotes = false;
        let mut nbsp_warned = false;
        let mut unknown_warned = false;

        let end = loop {
            let Some(mut ch) = cursor.next_char()? else {
                if quoted && !post_data {
                    row.warnings.push(Warning::new(
                        Some(column),
                        "Unterminated quoted value at end of file",
                    ));
                }
                break FieldEnd::Eof;
            };

            if self.escape == Some(ch) && !post_data {
                match cursor.next_char()? {
                    Some(next @ ('\r' | '\n')) => {
                        pre_data = false;
                        value.push(next);
                        if let Some(second) = self.consume_pair(cursor, next)? {
                            value.push(second);
                        }
                        self.line += 1;
                        continue;
                    }
                    Some(next) => {
                        pre_data = false;
                        value.push(unescape(next));
                        continue;
                    }
                    None => {
                        row.warnings
                            .push(Warning::new(Some(column), "Escape character at end of file"));
                        break FieldEnd::Eof;
                    }
                }
            }

            if ch == NBSP {
                if self.options.warn_nbsp && !nbsp_warned {
                    nbsp_warned = true;
                    row.warnings.push(Warning::new(Some(column), "Non-breaking space in value"));
                }
                if self.options.treat_nbsp_as_space {
                    ch = ' ';
                }
            } else if ch == UNKNOWN_CHAR {
                if self.options.warn_unknown_char && !unknown_warned {
                    unknown_warned = true;
                    row.warnings.push(Warning::new(
                        Some(column),
                        "Unknown character, the code page may be wrong",
                    ));
                }
                if self.options.treat_unknown_char_as_space {
                    ch = ' ';
                }
            }

            let in_quotes = quoted && !post_data;

            if self.separator == Some(ch) && !in_quotes {
                break FieldEnd::Separator;
            }

            if ch == '\r' || ch == '\n' {
                let pair = self.consume_pair(cursor, ch)?;
                self.line += 1;
                if !in_quotes {
                    break FieldEnd::LineBreak;
                }
                if self.options.treat_lf_as_space {
                    value.push(' ');
                    if self.options.warn_line_feed {
                        row.warnings.push(Warning::new(
                            Some(column),
                            "Line break in quoted value replaced by a space",
                        ));
                    }
                } else {
                    value.push(ch);
                    if let Some(second) = pair {
                        value.push(second);
                    }
                }
                continue;
            }

            if self.delimiter == Some(ch) {
                if !in_quotes {
                    break FieldEnd::Delimiter;
                }
                delimiter_in_quotes = true;
                value.push(ch);
                continue;
            }

            if pre_data {
                if ch == ' ' || ch == '\t' {
                    value.push(ch);
                    continue;
                }
                pre_data = false;
                if self.quote == Some(ch) {
                    quoted = true;
                    if self.options.trim != TrimMode::None {
                        value.clear();
                    }
                    continue;
                }
                value.push(ch);
                continue;
            }

            if in_quotes && self.quote == Some(ch) {
                let next = cursor.peek()?;
                if next == Some(ch) {
                    cursor.next_char()?;
                    value.push(ch);
                    if self.options.duplicate_quote_closes && self.is_terminator(cursor.peek()?) {
                        post_data = true;
                    }
                    continue;
                }
                if !self.options.context_sensitive_quoting || self.is_terminator(next) {
                    post_data = true;
                } else {
                    if self.options.warn_quotes {
                        row.warnings
                            .push(Warning::new(Some(column), "Quote inside quoted value treated as data"));
                    }
                    value.push(ch);
                }
                continue;
            }

            if post_data {
                if ch.is_whitespace() {
                    continue;
                }
                if self.options.warn_quotes {
                    row.warnings
                        .push(Warning::new(Some(column), "Text after the closing quote"));
                }
            } else if !quoted && self.quote == Some(ch) && self.options.warn_quotes {
                row.warnings.push(Warning::new(Some(column), "Quote inside unquoted value"));
            }
            value.push(ch);
        };

        let trim = match self.options.trim {
            TrimMode::All => true,
            TrimMode::Unquoted => !quoted,
            TrimMode::None => false,
        };
        let (value, untrimmed) = if trim && value.trim().len() != value.len() {
            (value.trim().to_string(), Some(value))
        } else {
            (value, None)
        };
        Ok((
            Field {
                value,
                quoted,
                delimiter_in_quotes,
                untrimmed,
            },
            end,
        ))
    }

    /// Consume the second character of a CRLF (or, for that dialect, LFCR) pair.
    fn consume_pair<R: Read + Seek>(&self, cursor: &mut CharCursor<R>, first: char) -> Result<Option<char>> {
        let partner = match first {
            '\r' => '\n',
            '\n' if self.lf_cr_pair => '\r',
            _ => return Ok(None),
        };
        if cursor.peek()? == Some(partner) {
            cursor.next_char()?;
            return Ok(Some(partner));
        }
        Ok(None)
    }

    fn is_terminator(&self, ch: Option<char>) -> bool {
        match ch {
            None | Some('\r') | Some('\n') => true,
            Some(c) => self.delimiter == Some(c) || self.separator == Some(c),
        }
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'b' => '\u{8}',
        'a' => '\u{7}',
        other => other,
    }
}
