//! Streaming JSON decoder that emits values at a configurable depth.
//!
//! `jsonflume` pulls bytes from any [`std::io::Read`] source and hands
//! complete values to the consumer one at a time, without materialising
//! the enclosing document. Every emitted value carries its structural
//! depth and its exact byte span in the input, so callers can re-slice
//! the original text of any value they receive.
//!
//! The emit depth chooses what reaches the consumer. For the stream
//! `[{"a": 1}, {"b": 2}]`:
//!
//! | emit depth | emitted values |
//! |---|---|
//! | `0` | the whole top-level array |
//! | `1` | `{"a": 1}` and `{"b": 2}` |
//! | `2` | `1` and `2` |
//! | negative | nothing; the input is scanned for validity only |
//!
//! Top-level values may be concatenated with any amount of whitespace
//! between them (including none), so JSON Lines and similar
//! multi-document streams decode without an enclosing array.
//!
//! # Examples
//!
//! Pull mode exposes the values as an iterator; the terminal error is
//! checked separately once the sequence is drained:
//!
//! ```
//! use jsonflume::{Decoder, Value};
//!
//! let data = br#"[1, "two", null]"#;
//! let mut decoder = Decoder::new(&data[..], 1);
//! let values: Vec<Value> = decoder.stream().map(|mv| mv.value).collect();
//! assert_eq!(
//!     values,
//!     [Value::Number(1.0), Value::String("two".into()), Value::Null]
//! );
//! assert!(decoder.err().is_none());
//! ```
//!
//! Push mode drives a callback; returning `false` cancels the stream:
//!
//! ```
//! use jsonflume::{Decoder, Error};
//!
//! let data = br#"{"a": 1} {"a": 2} {"a": 3}"#;
//! let mut seen = 0;
//! let result = Decoder::new(&data[..], 0).decode(|_mv| {
//!     seen += 1;
//!     seen < 2
//! });
//! assert!(matches!(result, Err(Error::Canceled)));
//! assert_eq!(seen, 2);
//! ```
//!
//! In key-value mode, values whose parent is an object are emitted
//! paired with their key:
//!
//! ```
//! use jsonflume::{Decoder, Value, ValueKind};
//!
//! let data = br#"{"id": 7, "name": "Ada"}"#;
//! let mut decoder = Decoder::new(&data[..], 1).emit_kv();
//! for mv in decoder.stream() {
//!     assert_eq!(mv.kind, ValueKind::KeyValue);
//! }
//! ```

mod decoder;
mod error;
mod escape;
mod scanner;
mod value;

pub use decoder::{Decoder, MetaValue, Stream};
pub use error::{Error, SyntaxError};
pub use value::{Array, KeyValue, Map, Value, ValueKind};

#[cfg(test)]
mod tests;
