//! Error types for frame decoding and board updates.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, ProtocolError>;

/// Every way a frame can fail to reach the board.
///
/// Wire-level failures from [`wire::DecodeError`] convert into the matching
/// variant, so callers handle a single type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Header version byte is not 1.
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
    #[error("connection closed")]
    Closed,

    /// The read deadline passed after `read` bytes of the current frame.
    #[error("read timed out after {read} frame bytes")]
    Timeout { read: usize },

    /// Any other transport failure.
    #[error("i/o error: {0}")]
    Io(io::ErrorKind),

    /// RLE text does not follow `value:count|value:count...`.
    #[error("malformed rle: {reason}")]
    MalformedRle { reason: RleReason },

    /// RLE runs do not expand to a full board.
    #[error("rle size mismatch: expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Packed patch array is not a whole number of triples.
    #[error("malformed delta: {len} bytes is not a whole number of patches")]
    MalformedDelta { len: usize },

    /// Patch names a cell outside the board.
    #[error("patch coordinate out of range: x={x}, y={y}")]
    CoordinateOutOfRange { x: u8, y: u8 },

    /// Delta arrived before any snapshot established the board.
    #[error("delta frame received before any snapshot")]
    DeltaBeforeSnapshot,

    /// Server answered the room request with a non-zero status.
    #[error("server rejected game start: status {code}")]
    StartRejected { code: u8 },
}

/// Details for malformed RLE errors. `run` is the zero-based run index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleReason {
    InvalidUtf8,
    FieldCount { run: usize, fields: usize },
    NotAnInteger { run: usize },
    ValueOutOfRange { run: usize, value: u64 },
}

impl ProtocolError {
    /// Returns `true` if the connection can no longer be trusted to be
    /// frame-aligned (or is gone).
    ///
    /// Frame-level errors leave the stream aligned; the caller may keep
    /// reading or ask for a fresh snapshot.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::WrongVersion { .. }
            | Self::UnknownFrameType { .. }
            | Self::UnexpectedFrame { .. }
            | Self::Truncated { .. }
            | Self::Closed
            | Self::Io(_)
            | Self::StartRejected { .. } => true,
            Self::Timeout { read } => *read != 0,
            Self::MalformedRle { .. }
            | Self::SizeMismatch { .. }
            | Self::MalformedDelta { .. }
            | Self::CoordinateOutOfRange { .. }
            | Self::DeltaBeforeSnapshot => false,
        }
    }

    /// Returns `true` for an idle-stream timeout that consumed nothing.
    #[must_use]
    pub const fn is_idle_timeout(&self) -> bool {
        matches!(self, Self::Timeout { read: 0 })
    }
}

impl fmt::Display for RleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "payload is not utf-8"),
            Self::FieldCount { run, fields } => {
                write!(f, "run {run} has {fields} ':' fields, expected 2")
            }
            Self::NotAnInteger { run } => {
                write!(f, "run {run} has a non-integer field")
            }
            Self::ValueOutOfRange { run, value } => {
                write!(f, "run {run} value {value} does not fit in a cell")
            }
        }
    }
}

impl From<wire::DecodeError> for ProtocolError {
    fn from(err: wire::DecodeError) -> Self {
        use wire::DecodeError as E;
        match err {
            E::WrongVersion { found } => Self::WrongVersion { found },
            E::UnknownFrameType { tag } => Self::UnknownFrameType { tag },
            E::UnexpectedFrame { expected, found } => Self::UnexpectedFrame { expected, found },
            E::Truncated { needed, read } => Self::Truncated { needed, read },
            E::Closed => Self::Closed,
            E::Timeout { read } => Self::Timeout { read },
            E::Io(kind) => Self::Io(kind),
        }
    }
}
