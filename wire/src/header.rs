//! Frame codes, header sizes, and the score pair carried by board frames.

/// Current wire format version.
///
/// Every packet in either direction starts with this byte.
pub const VERSION: u8 = 1;

/// Size of the common header: version + code.
pub const HEADER_SIZE: usize = 2;

/// Snapshot sub-header: own score, opponent score, payload length.
pub const SNAPSHOT_HEADER_SIZE: usize = 3;

/// Delta sub-header: sequence (i32), own score, opponent score, patch count (u16).
pub const DELTA_HEADER_SIZE: usize = 4 + 1 + 1 + 2;

/// Bytes per packed delta patch: x, y, value.
pub const PATCH_SIZE: usize = 3;

/// Largest RLE payload a snapshot frame can declare.
pub const MAX_SNAPSHOT_PAYLOAD: usize = u8::MAX as usize;

/// Largest patch count a delta frame can declare.
pub const MAX_PATCHES: usize = u16::MAX as usize;

/// Packet code byte, the second byte of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum FrameCode {
    Login = 0,
    RoomRequest = 2,
    StartAck = 6,
    Action = 7,
    Snapshot = 8,
    Delta = 9,
}

impl FrameCode {
    /// Parses a packet code from a raw byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Login),
            2 => Some(Self::RoomRequest),
            6 => Some(Self::StartAck),
            7 => Some(Self::Action),
            8 => Some(Self::Snapshot),
            9 => Some(Self::Delta),
            _ => None,
        }
    }

    /// Returns the raw code byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the codes the server sends as board frames.
    #[must_use]
    pub const fn is_board_frame(self) -> bool {
        matches!(self, Self::Snapshot | Self::Delta)
    }
}

/// The (own, opponent) score pair.
///
/// Both values arrive together in every board frame and are replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    pub own: u8,
    pub opponent: u8,
}

impl Score {
    /// Creates a score pair.
    #[must_use]
    pub const fn new(own: u8, opponent: u8) -> Self {
        Self { own, opponent }
    }

    /// Returns the pair as a tuple, own first.
    #[must_use]
    pub const fn as_tuple(self) -> (u8, u8) {
        (self.own, self.opponent)
    }
}

impl From<(u8, u8)> for Score {
    fn from((own, opponent): (u8, u8)) -> Self {
        Self { own, opponent }
    }
}
