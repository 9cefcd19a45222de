//! The streaming JSON decoder.
//!
//! [`Decoder`] walks a byte stream with an explicit frame stack (one frame
//! per open container), assembling values only as deep as the configured
//! emit depth requires and handing each completed value to the consumer as
//! a [`MetaValue`] carrying its depth and byte span.
//!
//! # Examples
//!
//! Pull each element of a top-level array:
//!
//! ```
//! use jsonflume::{Decoder, ValueKind};
//!
//! let data = br#"[{"id": 1}, {"id": 2}]"#;
//! let mut decoder = Decoder::new(&data[..], 1);
//! let kinds: Vec<ValueKind> = decoder.stream().map(|mv| mv.kind).collect();
//! assert_eq!(kinds, [ValueKind::Object, ValueKind::Object]);
//! assert!(decoder.err().is_none());
//! ```
use std::io::Read;

use crate::{
    error::{Error, SyntaxError},
    scanner::Scanner,
    value::{KeyValue, Map, Value, ValueKind},
};

/// A decoded value together with its position in the stream.
///
/// `offset` is the absolute byte offset of the value's first significant
/// byte; `length` runs through its last byte inclusive, so the value's
/// textual form is `input[offset..offset + length]`. In key-value mode the
/// span starts at the key's opening quote instead.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaValue {
    /// The decoded value.
    pub value: Value,
    /// Tag identifying which variant `value` holds.
    pub kind: ValueKind,
    /// 1-based structural depth at which the value lived; `1` for
    /// top-level values.
    pub depth: usize,
    /// Absolute byte offset of the value's first byte.
    pub offset: u64,
    /// Byte length of the value's textual form.
    pub length: u64,
}

impl MetaValue {
    fn new(value: Value, depth: usize, offset: u64, end: u64) -> Self {
        Self {
            kind: value.kind(),
            value,
            depth,
            offset,
            length: end - offset,
        }
    }
}

/// One open container.
#[derive(Debug)]
enum Frame {
    Array {
        /// Offset of the opening `[`.
        start: u64,
        /// Elements collected so far; `None` while children are emitted
        /// individually instead of assembled.
        items: Option<Vec<Value>>,
    },
    Object {
        /// Offset of the opening `{`.
        start: u64,
        /// Members collected so far; `None` while children are emitted
        /// individually instead of assembled.
        entries: Option<Map>,
        /// Key awaiting its value.
        key: Option<String>,
        /// Offset of the pending key's opening quote.
        key_start: u64,
    },
}

/// Resumption point of the structural state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// At the top level, before a value.
    Start,
    /// Just after `{`: a key or `}`.
    BeforeFirstPropertyName,
    /// After a `,` in an object: a key.
    BeforePropertyName,
    /// After a member value: `,` or `}`.
    AfterPropertyValue,
    /// Just after `[`: a value or `]`.
    BeforeFirstArrayValue,
    /// After an element: `,` or `]`.
    AfterArrayValue,
}

/// The streaming JSON decoder.
///
/// A decoder owns one reader and is driven to completion by exactly one of
/// [`stream`] (pull) or [`decode`] (push). Values are emitted at the depth
/// passed to [`new`]: `0` emits every top-level value, a positive depth
/// emits the values living at that depth, and a negative depth emits
/// nothing (the input is scanned for validity only). Concatenated
/// top-level values are accepted with any amount of whitespace between
/// them, so JSON Lines and similar multi-document streams decode without
/// an enclosing array.
///
/// After the first terminal event (end-of-input or error) the decoder is
/// spent: further driving yields nothing and [`err`] reports the stored
/// fault, if any.
///
/// [`stream`]: Decoder::stream
/// [`decode`]: Decoder::decode
/// [`new`]: Decoder::new
/// [`err`]: Decoder::err
pub struct Decoder<R: Read> {
    scanner: Scanner<R>,
    emit_depth: i32,
    emit_kv: bool,
    depth_limit: Option<usize>,
    stack: Vec<Frame>,
    state: ParseState,
    err: Option<Error>,
    started: bool,
    finished: bool,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder reading from `reader` and emitting values at
    /// `emit_depth`.
    ///
    /// The reader is taken by value; pass `&mut reader` to keep ownership.
    /// The decoder never closes it and reads no further than the first
    /// terminal event requires.
    #[must_use]
    pub fn new(reader: R, emit_depth: i32) -> Self {
        Self {
            scanner: Scanner::new(reader),
            emit_depth,
            emit_kv: false,
            depth_limit: None,
            stack: Vec::with_capacity(16),
            state: ParseState::Start,
            err: None,
            started: false,
            finished: false,
        }
    }

    /// Emits values whose parent is an object as [`KeyValue`] pairs,
    /// spanning the key's opening quote through the value's last byte.
    ///
    /// Has no effect once driving has begun.
    #[must_use]
    pub fn emit_kv(mut self) -> Self {
        if !self.started {
            self.emit_kv = true;
        }
        self
    }

    /// Fails with [`Error::MaxDepth`] when the input nests containers
    /// deeper than `limit`.
    ///
    /// Has no effect once driving has begun.
    #[must_use]
    pub fn max_depth(mut self, limit: usize) -> Self {
        if !self.started {
            self.depth_limit = Some(limit);
        }
        self
    }

    /// Returns the terminal error, if the stream ended on one.
    ///
    /// Meaningful after the sequence returned by [`stream`] is exhausted;
    /// a drained stream with no stored error terminated cleanly.
    ///
    /// [`stream`]: Decoder::stream
    #[must_use]
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Returns the lazy sequence of emitted values.
    ///
    /// The sequence is single-pass and finite: it ends at end-of-input or
    /// at the first fault. Faults are not surfaced through the iterator;
    /// check [`err`] after draining.
    ///
    /// [`err`]: Decoder::err
    pub fn stream(&mut self) -> Stream<'_, R> {
        Stream { decoder: self }
    }

    /// Drives the decoder, invoking `callback` for every emitted value.
    ///
    /// The callback returns `true` to continue; returning `false` cancels
    /// the stream and `decode` reports [`Error::Canceled`]. A clean run
    /// returns `Ok(())`; a faulted run returns the terminal error.
    pub fn decode<F>(&mut self, mut callback: F) -> Result<(), Error>
    where
        F: FnMut(MetaValue) -> bool,
    {
        while let Some(meta) = self.next_meta() {
            if !callback(meta) {
                self.finished = true;
                return Err(Error::Canceled);
            }
        }
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Advances parsing until the next emitted value, a clean end of
    /// input, or a terminal fault.
    fn next_meta(&mut self) -> Option<MetaValue> {
        if self.finished {
            return None;
        }
        self.started = true;
        match self.step() {
            Ok(Some(meta)) => Some(meta),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                self.err = Some(err);
                None
            }
        }
    }

    fn step(&mut self) -> Result<Option<MetaValue>, Error> {
        loop {
            match self.state {
                ParseState::Start => {
                    // Top-level loop: any number of whitespace-separated
                    // values until end-of-input.
                    let Some(byte) = self.scanner.skip_spaces()? else {
                        return Ok(None);
                    };
                    if let Some(meta) = self.begin_value(byte)? {
                        return Ok(Some(meta));
                    }
                }
                ParseState::BeforeFirstPropertyName | ParseState::BeforePropertyName => {
                    let byte = self.require()?;
                    match byte {
                        b'}' if self.state == ParseState::BeforeFirstPropertyName => {
                            if let Some(meta) = self.finish_container() {
                                return Ok(Some(meta));
                            }
                        }
                        b'"' => {
                            let key_start = self.scanner.offset() - 1;
                            let key = self.scanner.scan_string()?;
                            let byte = self.require()?;
                            if byte != b':' {
                                return Err(self
                                    .scanner
                                    .syntax(SyntaxError::Expected("':' after object key")));
                            }
                            if let Some(Frame::Object {
                                key: slot,
                                key_start: slot_start,
                                ..
                            }) = self.stack.last_mut()
                            {
                                *slot = Some(key);
                                *slot_start = key_start;
                            }
                            let byte = self.require()?;
                            if let Some(meta) = self.begin_value(byte)? {
                                return Ok(Some(meta));
                            }
                        }
                        _ => {
                            return Err(self.scanner.syntax(SyntaxError::Expected("object key")));
                        }
                    }
                }
                ParseState::AfterPropertyValue => match self.require()? {
                    b',' => self.state = ParseState::BeforePropertyName,
                    b'}' => {
                        if let Some(meta) = self.finish_container() {
                            return Ok(Some(meta));
                        }
                    }
                    _ => {
                        return Err(self
                            .scanner
                            .syntax(SyntaxError::Expected("',' or '}' in object")));
                    }
                },
                ParseState::BeforeFirstArrayValue => {
                    let byte = self.require()?;
                    if byte == b']' {
                        if let Some(meta) = self.finish_container() {
                            return Ok(Some(meta));
                        }
                    } else if let Some(meta) = self.begin_value(byte)? {
                        return Ok(Some(meta));
                    }
                }
                ParseState::AfterArrayValue => match self.require()? {
                    b',' => {
                        let byte = self.require()?;
                        if let Some(meta) = self.begin_value(byte)? {
                            return Ok(Some(meta));
                        }
                    }
                    b']' => {
                        if let Some(meta) = self.finish_container() {
                            return Ok(Some(meta));
                        }
                    }
                    _ => {
                        return Err(self
                            .scanner
                            .syntax(SyntaxError::Expected("',' or ']' in array")));
                    }
                },
            }
        }
    }

    /// The next non-whitespace byte; end-of-input inside a value is a
    /// syntax fault.
    fn require(&mut self) -> Result<u8, Error> {
        self.scanner
            .skip_spaces()?
            .ok_or_else(|| self.scanner.syntax_here(SyntaxError::UnexpectedEndOfInput))
    }

    /// Dispatches on a value's first byte. Containers push a frame;
    /// primitives are consumed whole and completed immediately.
    fn begin_value(&mut self, byte: u8) -> Result<Option<MetaValue>, Error> {
        let offset = self.scanner.offset() - 1;
        match byte {
            b'{' => {
                self.push_frame(true, offset)?;
                Ok(None)
            }
            b'[' => {
                self.push_frame(false, offset)?;
                Ok(None)
            }
            b'"' => {
                let s = self.scanner.scan_string()?;
                Ok(self.complete(Value::String(s), offset))
            }
            b'-' | b'0'..=b'9' => {
                let n = self.scanner.scan_number(byte)?;
                Ok(self.complete(Value::Number(n), offset))
            }
            b't' | b'f' | b'n' => {
                let v = self.scanner.scan_literal(byte)?;
                Ok(self.complete(v, offset))
            }
            other => Err(self
                .scanner
                .syntax(SyntaxError::UnexpectedCharacter(other as char))),
        }
    }

    fn push_frame(&mut self, object: bool, start: u64) -> Result<(), Error> {
        if let Some(limit) = self.depth_limit {
            if self.stack.len() >= limit {
                return Err(Error::MaxDepth(limit));
            }
        }
        // A container assembles its children only if it is itself part of
        // an emitted value; above the emit depth the children are emitted
        // (or discarded) individually and the container stays hollow.
        let assemble = usize::try_from(self.emit_depth).is_ok_and(|d| self.stack.len() >= d);
        if object {
            self.stack.push(Frame::Object {
                start,
                entries: assemble.then(Map::new),
                key: None,
                key_start: start,
            });
            self.state = ParseState::BeforeFirstPropertyName;
        } else {
            self.stack.push(Frame::Array {
                start,
                items: assemble.then(Vec::new),
            });
            self.state = ParseState::BeforeFirstArrayValue;
        }
        Ok(())
    }

    /// Pops the just-closed container and completes it as a value.
    fn finish_container(&mut self) -> Option<MetaValue> {
        let (start, value) = match self.stack.pop() {
            Some(Frame::Array { start, items }) => (start, Value::Array(items.unwrap_or_default())),
            Some(Frame::Object { start, entries, .. }) => {
                (start, Value::Object(entries.unwrap_or_default()))
            }
            // Close states are only reachable with an open frame.
            None => return None,
        };
        self.complete(value, start)
    }

    /// Handles a completed value: emit it, fold it into its parent, or
    /// drop it, and set the resumption state for the parent.
    fn complete(&mut self, value: Value, offset: u64) -> Option<MetaValue> {
        let end = self.scanner.offset();
        let containers = self.stack.len();
        let emitting = usize::try_from(self.emit_depth).is_ok_and(|d| d == containers);

        let Some(frame) = self.stack.last_mut() else {
            self.state = ParseState::Start;
            return emitting.then(|| MetaValue::new(value, 1, offset, end));
        };

        match frame {
            Frame::Object {
                entries,
                key,
                key_start,
                ..
            } => {
                self.state = ParseState::AfterPropertyValue;
                let key = key.take();
                let key_start = *key_start;
                if emitting {
                    if self.emit_kv {
                        let pair = KeyValue {
                            key: key.unwrap_or_default(),
                            value,
                        };
                        Some(MetaValue::new(
                            Value::KeyValue(Box::new(pair)),
                            containers,
                            key_start,
                            end,
                        ))
                    } else {
                        // The key is dropped outside key-value mode.
                        Some(MetaValue::new(value, containers, offset, end))
                    }
                } else {
                    if let (Some(map), Some(key)) = (entries.as_mut(), key) {
                        map.insert(key, value);
                    }
                    None
                }
            }
            Frame::Array { items, .. } => {
                self.state = ParseState::AfterArrayValue;
                if emitting {
                    Some(MetaValue::new(value, containers, offset, end))
                } else {
                    if let Some(items) = items.as_mut() {
                        items.push(value);
                    }
                    None
                }
            }
        }
    }
}

/// Lazy sequence of emitted values, returned by [`Decoder::stream`].
///
/// Single-consumer and single-pass; ends at end-of-input or at the first
/// fault. The terminal error, if any, is available from [`Decoder::err`]
/// once the sequence is drained.
pub struct Stream<'a, R: Read> {
    decoder: &'a mut Decoder<R>,
}

impl<R: Read> Iterator for Stream<'_, R> {
    type Item = MetaValue;

    fn next(&mut self) -> Option<MetaValue> {
        self.decoder.next_meta()
    }
}
