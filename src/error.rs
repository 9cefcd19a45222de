//! Decoder error types.
//!
//! Every fault is terminal: the first [`Error`] closes the stream and the
//! decoder yields nothing further. The variants keep the three failure
//! surfaces apart: ill-formed input ([`Error::Syntax`]), reader faults
//! ([`Error::Io`], with the inner [`std::io::Error`] preserved), and
//! consumer-requested cancellation ([`Error::Canceled`]).
use thiserror::Error;

/// Terminal decoder error.
#[derive(Debug, Error)]
pub enum Error {
    /// Ill-formed input, detected at an absolute byte offset.
    #[error("syntax error at offset {offset}: {source}")]
    Syntax {
        offset: u64,
        #[source]
        source: SyntaxError,
    },

    /// The underlying reader failed. The original fault is preserved and
    /// retrievable via [`Error::reader_error`].
    #[error("read error: {0}")]
    Io(#[source] std::io::Error),

    /// A push-mode callback returned `false`.
    #[error("operation canceled")]
    Canceled,

    /// The configured maximum nesting depth was exceeded.
    #[error("maximum nesting depth of {0} exceeded")]
    MaxDepth(usize),
}

impl Error {
    /// Returns the underlying reader fault, if this is an I/O error.
    #[must_use]
    pub fn reader_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Io(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the absolute byte offset at which a syntax fault was
    /// detected.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// A structural fault in the input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("invalid escape character {0:?}")]
    InvalidEscapeCharacter(char),
    #[error("invalid unicode escape character {0:?}")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unpaired utf-16 surrogate \\u{0:04X}")]
    UnpairedSurrogate(u16),
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid literal")]
    InvalidLiteral,
}
