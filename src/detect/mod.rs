//! Dialect guessers.
//!
//! Every guesser looks at a decoded prefix of the file and decides one
//! dialect field. They share a minimal quote-aware record scanner instead
//! of the full tokenizer, since most of them run before the dialect is known.

pub mod code_page;
pub mod comment;
pub mod delimiter;
pub mod header;
pub mod json;
pub mod newline;
pub mod quote;
pub mod skip_rows;

use std::io::{Read, Seek, SeekFrom};

use encoding_rs::Encoding;

use crate::error::Result;
use crate::sample::SampleSize;

pub use code_page::guess_code_page;
pub use comment::guess_comment_prefix;
pub use delimiter::{DelimiterCounter, guess_delimiter};
pub use header::guess_has_header;
pub use json::looks_like_json;
pub use newline::guess_newline;
pub use quote::guess_quote;
pub use skip_rows::guess_skip_rows;

/// One record found by [`scan_records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScannedRecord<'a> {
    /// Record text without its terminator.
    pub text: &'a str,
    /// 0-based physical line the record starts on.
    pub line: usize,
}

impl ScannedRecord<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_comment(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.text.starts_with(prefix)
    }
}

/// Split text into records at CR, LF or CRLF outside of quotes.
pub(crate) fn scan_records(text: &str, quote: Option<char>, max_records: usize) -> Vec<ScannedRecord<'_>> {
    let mut records = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut in_quotes = false;
    let mut start = 0;
    let mut start_line = 0;
    let mut line = 0;

    while let Some((idx, ch)) = chars.next() {
        if records.len() >= max_records {
            return records;
        }
        if Some(ch) == quote {
            in_quotes = !in_quotes;
            continue;
        }
        if ch != '\r' && ch != '\n' {
            continue;
        }
        let mut end = idx + 1;
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                end = next + 1;
                chars.next();
            }
        }
        line += 1;
        if !in_quotes {
            records.push(ScannedRecord {
                text: &text[start..idx],
                line: start_line,
            });
            start = end;
            start_line = line;
        }
    }
    if start < text.len() && records.len() < max_records {
        records.push(ScannedRecord {
            text: &text[start..],
            line: start_line,
        });
    }
    records
}

/// Split a record at delimiters outside of quotes; quotes are removed.
pub(crate) fn split_fields(record: &str, delimiter: Option<char>, quote: Option<char>) -> Vec<String> {
    let Some(delimiter) = delimiter else {
        return vec![record.trim().to_string()];
    };
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        if Some(c) == quote {
            if in_quotes && chars.peek() == Some(&c) {
                current.push(c);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
            continue;
        }
        if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Read the prefix of the stream the guessers work on, then seek back to the start.
pub fn read_prefix<R: Read + Seek>(reader: &mut R, size: SampleSize) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(0))?;
    let mut buffer = Vec::new();
    match size {
        SampleSize::Bytes(n) => {
            reader.by_ref().take(n as u64).read_to_end(&mut buffer)?;
        }
        SampleSize::All => {
            reader.read_to_end(&mut buffer)?;
        }
        SampleSize::Records(n) => {
            let mut chunk = vec![0u8; 64 * 1024];
            let mut newlines = 0;
            while newlines <= n {
                let read = reader.read(&mut chunk)?;
                if read == 0 {
                    break;
                }
                newlines += bytecount::count(&chunk[..read], b'\n');
                buffer.extend_from_slice(&chunk[..read]);
            }
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    Ok(buffer)
}

/// Decode a prefix, dropping a byte-order mark.
pub fn decode_prefix(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        log::debug!("prefix has characters not valid in {}", encoding.name());
    }
    text.into_owned()
}
