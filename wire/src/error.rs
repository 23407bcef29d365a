//! Error types for wire format operations.

use std::io;

use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while reading frames off a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Header version byte is not [`crate::VERSION`].
    #[error("unsupported wire version: {found}")]
    WrongVersion { found: u8 },

    /// Code byte does not name a board frame.
    #[error("unknown frame type: {tag}")]
    UnknownFrameType { tag: u8 },

    /// A known frame arrived where a different one was required.
    #[error("unexpected frame: expected code {expected}, found {found}")]
    UnexpectedFrame { expected: u8, found: u8 },

    /// Stream ended before a declared length was read.
    #[error("truncated frame: need {needed} bytes, read {read}")]
    Truncated { needed: usize, read: usize },

    /// Stream ended cleanly on a frame boundary.
    #[error("stream closed")]
    Closed,

    /// The stream's read deadline passed.
    ///
    /// `read` counts the bytes of the current frame consumed so far; zero means
    /// the stream is still frame-aligned.
    #[error("read timed out after {read} frame bytes")]
    Timeout { read: usize },

    /// Any other transport failure.
    #[error("i/o error: {0}")]
    Io(io::ErrorKind),
}

impl DecodeError {
    /// Classifies an I/O error seen after `read` bytes of the current frame.
    pub(crate) fn from_io(err: &io::Error, read: usize) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout { read },
            kind => Self::Io(kind),
        }
    }
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("snapshot payload too long: {length} bytes, max {max}")]
    PayloadTooLong { length: usize, max: usize },

    #[error("too many delta patches: {count}, max {max}")]
    TooManyPatches { count: usize, max: usize },

    #[error("packed patches not a multiple of 3: {length} bytes")]
    MisalignedPatches { length: usize },

    #[error("login field too long: {length} bytes")]
    FieldTooLong { length: usize },
}
