//! Recursive-descent grammar
//!
//! One function per nonterminal, each returning a newly pooled value
//! handle or an error that unwinds through `?` back to the top-level
//! entry. No function cleans up on the error path: everything already
//! allocated stays arena-owned and is reclaimed on the next state reset
//! or release.

use super::scanner::{Scanner, is_whitespace};
use crate::error::{ErrorKind, Result};
use crate::memory::BucketRef;
use crate::state::JsonState;
use crate::value::{ElemsRef, ObjectRef, Value, ValueId};
use smallvec::SmallVec;

/// Escape staging buffer; short strings never touch the heap
type Staging = SmallVec<[u8; 64]>;

pub(crate) struct Parser<'i, 's> {
    scanner: Scanner<'i>,
    state: &'s mut JsonState,
    depth: usize,
    max_depth: usize,
}

impl<'i, 's> Parser<'i, 's> {
    pub fn new(scanner: Scanner<'i>, state: &'s mut JsonState) -> Self {
        let max_depth = state.config().max_depth;
        Self {
            scanner,
            state,
            depth: 0,
            max_depth,
        }
    }

    /// Parse the document root. The caller has already verified the
    /// next significant byte is `{`.
    pub fn parse_document(&mut self) -> Result<ValueId> {
        self.parse_value()
    }

    fn parse_value(&mut self) -> Result<ValueId> {
        if self.depth >= self.max_depth {
            return Err(self
                .scanner
                .error(ErrorKind::Memory, "recursion depth limit exceeded"));
        }
        self.depth += 1;
        let result = self.dispatch();
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self) -> Result<ValueId> {
        match self.scanner.skip_whitespace() {
            None => Err(self
                .scanner
                .error(ErrorKind::Unexpected, "unexpected end of input")),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string(),
            Some(c) if c == b'+' || c == b'-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(),
            Some(c) => Err(self.scanner.error(
                ErrorKind::Unexpected,
                format!("unexpected token '{}'", c as char),
            )),
        }
    }

    fn parse_object(&mut self) -> Result<ValueId> {
        self.scanner.expect(b'{')?;

        let mut run: Option<BucketRef> = None;
        let mut len: usize = 0;
        loop {
            match self.scanner.skip_whitespace() {
                None | Some(b'}') => break,
                _ => {}
            }
            if len > 0 {
                self.scanner.expect(b',')?;
            }

            match self.scanner.skip_whitespace() {
                Some(b'"') => {}
                _ => {
                    return Err(self.scanner.error(
                        ErrorKind::Unexpected,
                        "expected string for name of field of object",
                    ));
                }
            }
            let name = self.parse_string()?;
            self.scanner.skip_whitespace();
            self.scanner.expect(b':')?;
            let value = self.parse_value()?;

            let grown = self.grow_backing(run, 2 * len, 2 * len + 2)?;
            let slots = self.state.backing.slice_mut(grown, 2 * len + 2);
            slots[2 * len] = name.0;
            slots[2 * len + 1] = value.0;
            run = Some(grown);
            len += 1;
        }

        self.scanner.skip_whitespace();
        self.scanner.expect(b'}')?;

        let len = u32::try_from(len)
            .map_err(|_| self.scanner.error(ErrorKind::Internal, "object length overflow"))?;
        self.alloc(Value::Object(ObjectRef {
            len,
            entries: run.map(ElemsRef),
        }))
    }

    fn parse_array(&mut self) -> Result<ValueId> {
        self.scanner.expect(b'[')?;

        let mut run: Option<BucketRef> = None;
        let mut len: usize = 0;
        loop {
            match self.scanner.skip_whitespace() {
                None | Some(b']') => break,
                _ => {}
            }
            if len > 0 {
                self.scanner.expect(b',')?;
            }

            let element = self.parse_value()?;
            // One slot for the length prefix, then the elements
            let grown = self.grow_backing(run, 1 + len, 2 + len)?;
            self.state.backing.slice_mut(grown, 2 + len)[1 + len] = element.0;
            run = Some(grown);
            len += 1;
        }

        self.scanner.skip_whitespace();
        self.scanner.expect(b']')?;

        if let Some(r) = run {
            let len = u32::try_from(len)
                .map_err(|_| self.scanner.error(ErrorKind::Internal, "array length overflow"))?;
            self.state.backing.slice_mut(r, 1)[0] = len;
        }
        self.alloc(Value::Array(run.map(ElemsRef)))
    }

    fn parse_string(&mut self) -> Result<ValueId> {
        self.scanner.expect(b'"')?;

        let mut staging: Staging = SmallVec::new();
        loop {
            match self.scanner.peek() {
                None => {
                    return Err(self.scanner.error(ErrorKind::Unmatch, "expected '\"'"));
                }
                Some(b'"') => {
                    self.scanner.advance();
                    break;
                }
                Some(b'\\') => {
                    self.scanner.advance();
                    self.read_escape(&mut staging)?;
                }
                Some(c) => {
                    staging.push(c);
                    self.scanner.advance();
                }
            }
        }

        let line = self.scanner.line();
        let column = self.scanner.column();
        let record = self
            .state
            .alloc_string(&staging)
            .map_err(|e| e.at(line, column))?;
        self.alloc(Value::String(record))
    }

    fn read_escape(&mut self, staging: &mut Staging) -> Result<()> {
        let Some(c) = self.scanner.peek() else {
            return Err(self
                .scanner
                .error(ErrorKind::Unknown, "unterminated escape sequence"));
        };
        self.scanner.advance();
        match c {
            b'n' => staging.push(b'\n'),
            b't' => staging.push(b'\t'),
            b'r' => staging.push(b'\r'),
            b'b' => staging.push(0x08),
            b'f' => staging.push(0x0c),
            b'/' => staging.push(b'/'),
            b'\\' => staging.push(b'\\'),
            b'"' => staging.push(b'"'),
            b'u' => {
                let code = self.read_hex4()?;
                let Some(decoded) = char::from_u32(code) else {
                    return Err(self.scanner.error(
                        ErrorKind::Unknown,
                        format!("\\u{code:04x} is not a valid scalar value"),
                    ));
                };
                let mut utf8 = [0u8; 4];
                staging.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
            }
            other => {
                return Err(self.scanner.error(
                    ErrorKind::Unknown,
                    format!("unknown escape sequence '\\{}'", other as char),
                ));
            }
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(c) = self.scanner.peek() else {
                return Err(self
                    .scanner
                    .error(ErrorKind::Unknown, "expected 4 hex digits after \\u"));
            };
            let digit = match c {
                b'0'..=b'9' => u32::from(c - b'0'),
                b'a'..=b'f' => u32::from(c - b'a') + 10,
                b'A'..=b'F' => u32::from(c - b'A') + 10,
                _ => {
                    return Err(self.scanner.error(
                        ErrorKind::Unknown,
                        format!("invalid hex digit '{}' in \\u escape", c as char),
                    ));
                }
            };
            self.scanner.advance();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<ValueId> {
        let mut sign = 1.0;
        match self.scanner.peek() {
            Some(b'+') => {
                return Err(self.scanner.error(
                    ErrorKind::Unexpected,
                    "JSON does not support number start with '+'",
                ));
            }
            Some(b'-') => {
                sign = -1.0;
                self.scanner.advance();
            }
            _ => {}
        }

        match self.scanner.peek() {
            Some(b'0') => {
                self.scanner.advance();
                // Only a standalone zero: "01" is rejected, "0.5" passes
                // because '.' counts as punctuation.
                if let Some(next) = self.scanner.peek() {
                    if !is_whitespace(next) && !next.is_ascii_punctuation() {
                        return Err(self.scanner.error(
                            ErrorKind::Unexpected,
                            "JSON does not support number start with '0' \
                             (only standalone '0' is accepted)",
                        ));
                    }
                }
            }
            Some(c) if c.is_ascii_digit() => {}
            Some(c) => {
                return Err(self
                    .scanner
                    .error(ErrorKind::Unexpected, format!("unexpected '{}'", c as char)));
            }
            None => {
                return Err(self
                    .scanner
                    .error(ErrorKind::Unexpected, "unexpected end of input in number"));
            }
        }

        let mut dot = false;
        let mut digit_seen = true;
        let mut power = 1.0;
        let mut number = 0.0;
        while let Some(c) = self.scanner.peek() {
            if c == b'.' {
                if dot {
                    return Err(self
                        .scanner
                        .error(ErrorKind::Unexpected, "too many '.' are presented"));
                }
                dot = true;
                digit_seen = false;
                power = 1.0;
            } else if !c.is_ascii_digit() {
                break;
            } else {
                digit_seen = true;
                let digit = f64::from(c - b'0');
                if dot {
                    power *= 10.0;
                    number += digit / power;
                } else {
                    number = number * 10.0 + digit;
                }
            }
            self.scanner.advance();
        }

        if dot && !digit_seen {
            return Err(self.scanner.error(
                ErrorKind::Unexpected,
                "'.' is presented in number token, but require a digit after '.'",
            ));
        }
        self.alloc(Value::Number(sign * number))
    }

    fn parse_keyword(&mut self) -> Result<ValueId> {
        let start = self.scanner.cursor();
        while matches!(self.scanner.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.scanner.advance();
        }
        let token = self.scanner.slice_from(start);
        match token {
            b"true" => self.alloc(Value::Bool(true)),
            b"false" => self.alloc(Value::Bool(false)),
            b"null" => self.alloc(Value::Null),
            _ => Err(self.scanner.error(
                ErrorKind::Unexpected,
                format!("unexpected token '{}'", String::from_utf8_lossy(token)),
            )),
        }
    }

    fn grow_backing(
        &mut self,
        run: Option<BucketRef>,
        old: usize,
        new: usize,
    ) -> Result<BucketRef> {
        let line = self.scanner.line();
        let column = self.scanner.column();
        self.state
            .backing
            .grow_run(run, old, new)
            .map_err(|e| e.at(line, column))
    }

    fn alloc(&mut self, value: Value) -> Result<ValueId> {
        let line = self.scanner.line();
        let column = self.scanner.column();
        self.state.alloc_value(value).map_err(|e| e.at(line, column))
    }
}
