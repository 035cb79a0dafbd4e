//! Character-level input for the SION decoder.
//!
//! [`Scanner`] decodes UTF-8 from any [`io::Read`] one character at a time and
//! keeps two small buffers: a one-character lookahead slot filled by
//! [`Scanner::peek`] and a one-character pushback slot filled by
//! [`Scanner::unread`]. Together they let the decoder look past a `/` to decide
//! whether it starts a line comment, and put the `/` back when it does not.

use crate::{Error, Result};
use std::io::{self, BufReader, Read};

/// A buffered UTF-8 character reader with line/column tracking.
pub struct Scanner<R> {
    bytes: io::Bytes<BufReader<R>>,
    peeked: Option<char>,
    pushback: Option<char>,
    line: usize,
    col: usize,
    prev: (usize, usize),
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Scanner {
            bytes: BufReader::new(reader).bytes(),
            peeked: None,
            pushback: None,
            line: 1,
            col: 1,
            prev: (1, 1),
        }
    }

    /// Position `(line, column)` of the next character to be consumed.
    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> Result<Option<char>> {
        if let Some(ch) = self.pushback {
            return Ok(Some(ch));
        }
        if self.peeked.is_none() {
            self.peeked = self.read_char()?;
        }
        Ok(self.peeked)
    }

    /// Consumes and returns the next character.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<char>> {
        let ch = match self.pushback.take() {
            Some(ch) => Some(ch),
            None => match self.peeked.take() {
                Some(ch) => Some(ch),
                None => self.read_char()?,
            },
        };
        if let Some(ch) = ch {
            self.prev = (self.line, self.col);
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        Ok(ch)
    }

    /// Pushes back the character most recently returned by [`Scanner::next`].
    ///
    /// Only one character can be pending at a time.
    pub fn unread(&mut self, ch: char) {
        debug_assert!(self.pushback.is_none(), "only one character of pushback");
        self.pushback = Some(ch);
        (self.line, self.col) = self.prev;
    }

    /// Discards characters up to and including the next `\n`.
    pub fn skip_line(&mut self) -> Result<()> {
        while let Some(ch) = self.next()? {
            if ch == '\n' {
                break;
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.bytes.next() {
            Some(Ok(b)) => Ok(Some(b)),
            Some(Err(e)) => Err(Error::from(e)),
            None => Ok(None),
        }
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        let first = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        if first.is_ascii() {
            return Ok(Some(first as char));
        }

        let width = match first {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(self.invalid_utf8()),
        };
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = match self.read_byte()? {
                Some(b) => b,
                None => return Err(self.invalid_utf8()),
            };
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_utf8())
    }

    fn invalid_utf8(&self) -> Error {
        Error::InvalidUtf8 {
            line: self.line,
            col: self.col,
        }
    }
}
