//! Byte scanner over a blocking reader.
//!
//! [`Scanner`] advances byte-by-byte through the input, tracking the
//! absolute offset of every byte it hands out, and consumes whole string,
//! number, and literal tokens on behalf of the decoder. It owns a pull
//! buffer refilled from the reader in fixed chunks, with a one-byte
//! lookback so a number terminator can be pushed back for
//! reclassification.
//!
//! The scanner never closes the reader; reads of kind
//! [`std::io::ErrorKind::Interrupted`] are retried, `Ok(0)` means
//! end-of-input, and any other reader fault is surfaced as [`Error::Io`]
//! with the original fault preserved.
use std::io::{ErrorKind, Read};

use crate::{
    error::{Error, SyntaxError},
    escape::{Step, UnicodeEscape},
    value::Value,
};

/// Refill size for the pull buffer.
const CHUNK: usize = 4096;

/// Progress through the JSON number grammar
/// `-? (0 | [1-9][0-9]*) ( . [0-9]+ )? ( [eE][+-]? [0-9]+ )?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Sign,
    Zero,
    Integer,
    Point,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentInteger,
}

impl NumberState {
    /// States at which the consumed text forms a complete number.
    fn accepting(self) -> bool {
        matches!(
            self,
            NumberState::Zero
                | NumberState::Integer
                | NumberState::Fraction
                | NumberState::ExponentInteger
        )
    }
}

pub(crate) struct Scanner<R> {
    reader: R,
    buf: Vec<u8>,
    /// Cursor into `buf`; `buf[head]` is the next unread byte.
    head: usize,
    /// Absolute offset of the next unread byte.
    offset: u64,
    eof: bool,
    /// Reused accumulator for string and number lexemes.
    scratch: Vec<u8>,
}

impl<R: Read> Scanner<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(CHUNK + 1),
            head: 0,
            offset: 0,
            eof: false,
            scratch: Vec::new(),
        }
    }

    /// Absolute offset of the next unread byte.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Refills the buffer, keeping one byte of lookback for [`back`].
    ///
    /// Returns `false` once the reader is exhausted.
    ///
    /// [`back`]: Scanner::back
    fn fill(&mut self) -> Result<bool, Error> {
        if self.eof {
            return Ok(false);
        }
        if self.head > 1 {
            self.buf.drain(..self.head - 1);
            self.head = 1;
        }
        let start = self.buf.len();
        self.buf.resize(start + CHUNK, 0);
        loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.buf.truncate(start + n);
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buf.truncate(start);
                    self.eof = true;
                    return Err(Error::Io(e));
                }
            }
        }
    }

    /// Consumes and returns the next byte, or `None` at end-of-input.
    pub(crate) fn next(&mut self) -> Result<Option<u8>, Error> {
        if self.head == self.buf.len() && !self.fill()? {
            return Ok(None);
        }
        let byte = self.buf[self.head];
        self.head += 1;
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Consumes and returns the next byte, faulting at end-of-input.
    fn must_next(&mut self) -> Result<u8, Error> {
        self.next()?
            .ok_or_else(|| self.syntax_here(SyntaxError::UnexpectedEndOfInput))
    }

    /// Rewinds the last consumed byte so it is read again.
    ///
    /// At most one byte of lookback is available between reads.
    pub(crate) fn back(&mut self) {
        debug_assert!(self.head > 0, "back() without a consumed byte");
        self.head -= 1;
        self.offset -= 1;
    }

    /// Consumes and returns the next non-whitespace byte, or `None` at
    /// end-of-input.
    pub(crate) fn skip_spaces(&mut self) -> Result<Option<u8>, Error> {
        loop {
            match self.next()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => {}
                other => return Ok(other),
            }
        }
    }

    /// A syntax fault at the byte just consumed.
    pub(crate) fn syntax(&self, source: SyntaxError) -> Error {
        Error::Syntax {
            offset: self.offset.saturating_sub(1),
            source,
        }
    }

    /// A syntax fault at the read head (used at end-of-input).
    pub(crate) fn syntax_here(&self, source: SyntaxError) -> Error {
        Error::Syntax {
            offset: self.offset,
            source,
        }
    }

    /// Consumes a string body through its closing quote; the opening quote
    /// has already been consumed.
    ///
    /// Escape sequences are resolved into the returned string. Raw bytes,
    /// including control bytes and bytes that are not valid UTF-8, are
    /// passed through undisturbed; a non-UTF-8 body decodes lossily rather
    /// than faulting.
    pub(crate) fn scan_string(&mut self) -> Result<String, Error> {
        self.scratch.clear();
        loop {
            let byte = self.must_next()?;
            match byte {
                b'"' => break,
                b'\\' => self.scan_escape()?,
                _ => self.scratch.push(byte),
            }
        }
        Ok(String::from_utf8_lossy(&self.scratch).into_owned())
    }

    /// Consumes one escape sequence; the backslash has already been
    /// consumed. The decoded bytes land in the scratch buffer.
    fn scan_escape(&mut self) -> Result<(), Error> {
        let byte = self.must_next()?;
        let decoded = match byte {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let mut escape = UnicodeEscape::new();
                loop {
                    let byte = self.must_next()?;
                    match escape.feed(byte) {
                        Ok(Step::NeedMore) => {}
                        Ok(Step::Done(ch)) => {
                            let mut utf8 = [0u8; 4];
                            self.scratch.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                            return Ok(());
                        }
                        Err(source) => return Err(self.syntax(source)),
                    }
                }
            }
            other => return Err(self.syntax(SyntaxError::InvalidEscapeCharacter(other as char))),
        };
        self.scratch.push(decoded);
        Ok(())
    }

    /// Consumes the longest prefix matching the JSON number grammar,
    /// starting from the already-consumed `first` byte, and parses it as an
    /// IEEE-754 double. The terminator byte is pushed back for
    /// reclassification.
    pub(crate) fn scan_number(&mut self, first: u8) -> Result<f64, Error> {
        self.scratch.clear();
        self.scratch.push(first);
        let mut state = match first {
            b'-' => NumberState::Sign,
            b'0' => NumberState::Zero,
            _ => NumberState::Integer,
        };

        loop {
            let Some(byte) = self.next()? else {
                if state.accepting() {
                    break;
                }
                return Err(self.syntax_here(SyntaxError::UnexpectedEndOfInput));
            };
            let next = match (state, byte) {
                (NumberState::Sign, b'0') => Some(NumberState::Zero),
                (NumberState::Sign, b'1'..=b'9') => Some(NumberState::Integer),
                (NumberState::Zero | NumberState::Integer, b'.') => Some(NumberState::Point),
                (NumberState::Integer, b'0'..=b'9') => Some(NumberState::Integer),
                (NumberState::Point | NumberState::Fraction, b'0'..=b'9') => {
                    Some(NumberState::Fraction)
                }
                (
                    NumberState::Zero | NumberState::Integer | NumberState::Fraction,
                    b'e' | b'E',
                ) => Some(NumberState::Exponent),
                (NumberState::Exponent, b'+' | b'-') => Some(NumberState::ExponentSign),
                (
                    NumberState::Exponent | NumberState::ExponentSign | NumberState::ExponentInteger,
                    b'0'..=b'9',
                ) => Some(NumberState::ExponentInteger),
                _ => None,
            };
            match next {
                Some(next) => {
                    self.scratch.push(byte);
                    state = next;
                }
                None if state.accepting() => {
                    self.back();
                    break;
                }
                None => return Err(self.syntax(SyntaxError::InvalidNumber)),
            }
        }

        std::str::from_utf8(&self.scratch)
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(|| self.syntax(SyntaxError::InvalidNumber))
    }

    /// Consumes the remainder of a `true`, `false`, or `null` literal;
    /// `first` is the already-consumed first byte.
    pub(crate) fn scan_literal(&mut self, first: u8) -> Result<Value, Error> {
        let (rest, value): (&[u8], Value) = match first {
            b't' => (b"rue", Value::Boolean(true)),
            b'f' => (b"alse", Value::Boolean(false)),
            b'n' => (b"ull", Value::Null),
            other => return Err(self.syntax(SyntaxError::UnexpectedCharacter(other as char))),
        };
        for &want in rest {
            match self.next()? {
                Some(byte) if byte == want => {}
                Some(_) => return Err(self.syntax(SyntaxError::InvalidLiteral)),
                None => return Err(self.syntax_here(SyntaxError::UnexpectedEndOfInput)),
            }
        }
        Ok(value)
    }
}
