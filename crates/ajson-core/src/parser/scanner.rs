//! Lexer primitives: cursor, position bookkeeping and single-character
//! matching over a borrowed input buffer

use crate::error::{ErrorKind, ParseError, Result};

/// Byte-level cursor over one input buffer with line/column tracking.
pub struct Scanner<'a> {
    input: &'a [u8],
    cursor: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    /// Start scanning at line 1, column 1
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current byte, `None` at end of input
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    /// True once the cursor passed the last byte
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.input.len()
    }

    /// Consume the current byte, treating `\n` as a line break
    pub fn advance(&mut self) -> Option<u8> {
        let consumed = self.peek()?;
        self.cursor += 1;
        if consumed == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(consumed)
    }

    /// Skip a run of whitespace and return the next significant byte,
    /// `None` at end of input
    pub fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(c) = self.peek() {
            if !is_whitespace(c) {
                return Some(c);
            }
            self.advance();
        }
        None
    }

    /// Consume exactly one matching byte or fail with `Unmatch`
    pub fn expect(&mut self, expected: u8) -> Result<()> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(
                ErrorKind::Unmatch,
                format!("expected '{}'", expected as char),
            ))
        }
    }

    /// Byte offset of the cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 1-based current line
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based current column
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Input bytes from `start` up to the cursor
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start..self.cursor]
    }

    /// Build an error carrying the current position
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, message).at(self.line, self.column)
    }
}

/// Whitespace per the C locale's `isspace`
pub(crate) fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
