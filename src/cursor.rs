//! Re-windable character cursor over a seekable byte stream.
//!
//! Bytes are decoded chunk by chunk with an `encoding_rs` decoder. Characters
//! that have been consumed are dropped on the next refill unless a position
//! is pinned, in which case they are retained (up to a bound) so the cursor
//! can be restored to the pinned position.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use encoding_rs::{CoderResult, Decoder, Encoding};

use crate::error::{Result, ScoutError};

/// Bytes read from the underlying stream per refill.
const READ_CHUNK: usize = 64 * 1024;

/// Upper bound of characters retained behind a pinned position.
pub const MAX_PINNED_CHARS: usize = 4 * 1024 * 1024;

/// Decodes a byte stream into a seekable sequence of characters.
pub struct CharCursor<R> {
    inner: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    bytes: Vec<u8>,
    decoded: String,
    chars: Vec<char>,
    /// Index of the next character in `chars`.
    pos: usize,
    /// Absolute position of `chars[0]`.
    base: u64,
    pinned: Option<u64>,
    input_done: bool,
}

impl<R: Read + Seek> CharCursor<R> {
    /// Create a cursor positioned at the first character after any BOM.
    pub fn new(inner: R, encoding: &'static Encoding) -> Result<Self> {
        let mut cursor = Self {
            inner,
            encoding,
            decoder: encoding.new_decoder_with_bom_removal(),
            bytes: vec![0; READ_CHUNK],
            decoded: String::new(),
            chars: Vec::new(),
            pos: 0,
            base: 0,
            pinned: None,
            input_done: false,
        };
        cursor.rewind()?;
        Ok(cursor)
    }

    /// The encoding used to decode the stream.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Seek the underlying stream back to its start and reset decoding.
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.decoder = self.encoding.new_decoder_with_bom_removal();
        self.chars.clear();
        self.pos = 0;
        self.base = 0;
        self.pinned = None;
        self.input_done = false;
        Ok(())
    }

    /// Absolute character position of the next character.
    #[inline]
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Look at the next character without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Result<Option<char>> {
        self.peek_nth(0)
    }

    /// Look `n` characters ahead without consuming anything.
    pub fn peek_nth(&mut self, n: usize) -> Result<Option<char>> {
        if self.ensure(n + 1)? {
            Ok(Some(self.chars[self.pos + n]))
        } else {
            Ok(None)
        }
    }

    /// Consume and return the next character.
    pub fn next_char(&mut self) -> Result<Option<char>> {
        let next = self.peek()?;
        if next.is_some() {
            self.pos += 1;
        }
        Ok(next)
    }

    /// True if the upcoming characters equal `prefix`.
    pub fn starts_with(&mut self, prefix: &str) -> Result<bool> {
        for (idx, expected) in prefix.chars().enumerate() {
            if self.peek_nth(idx)? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True once every character has been consumed.
    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }

    /// Consume one physical line including its CR, LF or CRLF terminator.
    ///
    /// Returns false if the cursor was already at the end of the stream.
    pub fn skip_line(&mut self) -> Result<bool> {
        if self.is_eof()? {
            return Ok(false);
        }
        while let Some(ch) = self.next_char()? {
            match ch {
                '\n' => break,
                '\r' => {
                    if self.peek()? == Some('\n') {
                        self.pos += 1;
                    }
                    break;
                }
                _ => {}
            }
        }
        Ok(true)
    }

    /// Retain everything from the current position so it can be restored.
    pub fn pin(&mut self) -> u64 {
        let position = self.position();
        self.pinned = Some(position);
        position
    }

    /// Release a pinned position.
    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    /// Move back to `position`; returns false if it is no longer buffered.
    pub fn restore(&mut self, position: u64) -> bool {
        self.pinned = None;
        let end = self.base + self.chars.len() as u64;
        if position < self.base || position > end {
            return false;
        }
        self.pos = (position - self.base) as usize;
        true
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure(&mut self, wanted: usize) -> Result<bool> {
        while self.chars.len() - self.pos < wanted {
            if !self.fill()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn compact(&mut self) {
        let mut keep_from = self.pos;
        if let Some(pinned) = self.pinned {
            if pinned >= self.base {
                keep_from = ((pinned - self.base) as usize).min(self.pos);
            }
            if self.chars.len() - keep_from > MAX_PINNED_CHARS {
                log::debug!("pinned position {pinned} dropped, look-ahead exceeded buffer bound");
                self.pinned = None;
                keep_from = self.pos;
            }
        }
        if keep_from > 0 {
            self.chars.drain(..keep_from);
            self.pos -= keep_from;
            self.base += keep_from as u64;
        }
    }

    /// Decode another chunk; returns false at the end of the stream.
    fn fill(&mut self) -> Result<bool> {
        self.compact();
        while !self.input_done {
            let read = loop {
                match self.inner.read(&mut self.bytes) {
                    Ok(n) => break n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err.into()),
                }
            };
            let last = read == 0;
            let needed = self.decoder.max_utf8_buffer_length(read).ok_or_else(|| {
                ScoutError::Encoding(format!("{} decoder buffer overflow", self.encoding.name()))
            })?;
            self.decoded.clear();
            self.decoded.reserve(needed);
            let (result, _consumed, _had_errors) =
                self.decoder
                    .decode_to_string(&self.bytes[..read], &mut self.decoded, last);
            if result == CoderResult::OutputFull {
                return Err(ScoutError::Encoding(format!(
                    "{} decoder ran out of output space",
                    self.encoding.name()
                )));
            }
            self.input_done = last;
            if !self.decoded.is_empty() {
                self.chars.extend(self.decoded.chars());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};
    use std::io::Cursor;

    fn cursor(text: &str) -> CharCursor<Cursor<Vec<u8>>> {
        CharCursor::new(Cursor::new(text.as_bytes().to_vec()), UTF_8).unwrap()
    }

    #[test]
    fn test_peek_and_advance() {
        let mut c = cursor("ab");
        assert_eq!(c.peek().unwrap(), Some('a'));
        assert_eq!(c.peek_nth(1).unwrap(), Some('b'));
        assert_eq!(c.next_char().unwrap(), Some('a'));
        assert_eq!(c.next_char().unwrap(), Some('b'));
        assert_eq!(c.next_char().unwrap(), None);
        assert!(c.is_eof().unwrap());
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_bom_is_removed() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice(b"x");
        let mut c = CharCursor::new(Cursor::new(data), UTF_8).unwrap();
        assert_eq!(c.next_char().unwrap(), Some('x'));
    }

    #[test]
    fn test_legacy_code_page() {
        // 0xE9 is 'é' in Windows-1252
        let mut c = CharCursor::new(Cursor::new(vec![b'c', b'a', b'f', 0xE9]), WINDOWS_1252)
            .unwrap();
        let mut text = String::new();
        while let Some(ch) = c.next_char().unwrap() {
            text.push(ch);
        }
        assert_eq!(text, "café");
    }

    #[test]
    fn test_rewind() {
        let mut c = cursor("xyz");
        c.next_char().unwrap();
        c.next_char().unwrap();
        c.rewind().unwrap();
        assert_eq!(c.position(), 0);
        assert_eq!(c.next_char().unwrap(), Some('x'));
    }

    #[test]
    fn test_skip_line_and_starts_with() {
        let mut c = cursor("# note\r\nabc\nlast");
        assert!(c.starts_with("# ").unwrap());
        assert!(c.skip_line().unwrap());
        assert!(c.starts_with("abc").unwrap());
        assert!(!c.starts_with("abd").unwrap());
        assert!(c.skip_line().unwrap());
        assert!(c.skip_line().unwrap());
        assert!(!c.skip_line().unwrap());
    }

    #[test]
    fn test_restore_pinned_across_refills() {
        let text = "a".repeat(READ_CHUNK * 3);
        let mut c = cursor(&text);
        for _ in 0..10 {
            c.next_char().unwrap();
        }
        let mark = c.pin();
        for _ in 0..(READ_CHUNK * 2) {
            c.next_char().unwrap();
        }
        assert!(c.restore(mark));
        assert_eq!(c.position(), 10);
    }

    #[test]
    fn test_restore_unpinned_fails_after_refill() {
        let text = "b".repeat(READ_CHUNK * 3);
        let mut c = cursor(&text);
        let mark = c.position();
        for _ in 0..(READ_CHUNK * 2) {
            c.next_char().unwrap();
        }
        assert!(!c.restore(mark));
    }
}
