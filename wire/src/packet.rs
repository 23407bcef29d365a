//! Frame types and packet encoding.

use crate::error::EncodeError;
use crate::header::{
    FrameCode, Score, DELTA_HEADER_SIZE, HEADER_SIZE, MAX_PATCHES, MAX_SNAPSHOT_PAYLOAD,
    PATCH_SIZE, SNAPSHOT_HEADER_SIZE, VERSION,
};

/// A full-board frame carrying RLE text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFrame {
    pub score: Score,
    /// RLE payload, not yet decoded.
    pub payload: Vec<u8>,
}

/// An incremental frame carrying packed `(x, y, value)` patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFrame {
    pub sequence: i32,
    pub score: Score,
    /// Packed patches, `PATCH_SIZE` bytes each.
    pub patches: Vec<u8>,
}

impl DeltaFrame {
    /// Number of whole patches in the packed array.
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.patches.len() / PATCH_SIZE
    }
}

/// A decoded board frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Snapshot(SnapshotFrame),
    Delta(DeltaFrame),
}

impl Frame {
    /// Returns the frame's score pair.
    #[must_use]
    pub const fn score(&self) -> Score {
        match self {
            Self::Snapshot(frame) => frame.score,
            Self::Delta(frame) => frame.score,
        }
    }

    /// Returns the code this frame is sent with.
    #[must_use]
    pub const fn code(&self) -> FrameCode {
        match self {
            Self::Snapshot(_) => FrameCode::Snapshot,
            Self::Delta(_) => FrameCode::Delta,
        }
    }

    /// Total size of the frame on the wire.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        match self {
            Self::Snapshot(frame) => HEADER_SIZE + SNAPSHOT_HEADER_SIZE + frame.payload.len(),
            Self::Delta(frame) => HEADER_SIZE + DELTA_HEADER_SIZE + frame.patches.len(),
        }
    }
}

/// The server's reply to a room request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartAck {
    /// Zero means the game started.
    pub success: u8,
}

impl StartAck {
    /// Returns `true` if the server started the game.
    #[must_use]
    pub const fn is_started(self) -> bool {
        self.success == 0
    }
}

/// Encodes a login packet.
///
/// Layout: version, code, u16 BE username length, username, u16 BE password
/// length, password.
pub fn encode_login(username: &str, password: &str) -> Result<Vec<u8>, EncodeError> {
    let user = username.as_bytes();
    let pass = password.as_bytes();
    let user_len =
        u16::try_from(user.len()).map_err(|_| EncodeError::FieldTooLong { length: user.len() })?;
    let pass_len =
        u16::try_from(pass.len()).map_err(|_| EncodeError::FieldTooLong { length: pass.len() })?;

    let mut out = Vec::with_capacity(HEADER_SIZE + 4 + user.len() + pass.len());
    out.push(VERSION);
    out.push(FrameCode::Login.raw());
    out.extend_from_slice(&user_len.to_be_bytes());
    out.extend_from_slice(user);
    out.extend_from_slice(&pass_len.to_be_bytes());
    out.extend_from_slice(pass);
    Ok(out)
}

/// Encodes a room request packet.
#[must_use]
pub fn encode_room_request(room_type: u8) -> [u8; 3] {
    [VERSION, FrameCode::RoomRequest.raw(), room_type]
}

/// Encodes an action packet.
#[must_use]
pub fn encode_action(action: u8) -> [u8; 3] {
    [VERSION, FrameCode::Action.raw(), action]
}

/// Encodes a start-ack packet.
#[must_use]
pub fn encode_start_ack(success: u8) -> [u8; 3] {
    [VERSION, FrameCode::StartAck.raw(), success]
}

/// Encodes a snapshot frame around an already-encoded RLE payload.
pub fn encode_snapshot_frame(score: Score, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let len = u8::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLong {
        length: payload.len(),
        max: MAX_SNAPSHOT_PAYLOAD,
    })?;

    let mut out = Vec::with_capacity(HEADER_SIZE + SNAPSHOT_HEADER_SIZE + payload.len());
    out.push(VERSION);
    out.push(FrameCode::Snapshot.raw());
    out.push(score.own);
    out.push(score.opponent);
    out.push(len);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Encodes a delta frame around packed patches.
pub fn encode_delta_frame(
    sequence: i32,
    score: Score,
    patches: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    if patches.len() % PATCH_SIZE != 0 {
        return Err(EncodeError::MisalignedPatches {
            length: patches.len(),
        });
    }
    let count = patches.len() / PATCH_SIZE;
    let count = u16::try_from(count).map_err(|_| EncodeError::TooManyPatches {
        count,
        max: MAX_PATCHES,
    })?;

    let mut out = Vec::with_capacity(HEADER_SIZE + DELTA_HEADER_SIZE + patches.len());
    out.push(VERSION);
    out.push(FrameCode::Delta.raw());
    out.extend_from_slice(&sequence.to_be_bytes());
    out.push(score.own);
    out.push(score.opponent);
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(patches);
    Ok(out)
}

/// Encodes any board frame.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, EncodeError> {
    match frame {
        Frame::Snapshot(snapshot) => encode_snapshot_frame(snapshot.score, &snapshot.payload),
        Frame::Delta(delta) => encode_delta_frame(delta.sequence, delta.score, &delta.patches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_request_layout() {
        assert_eq!(encode_room_request(0), [1, 2, 0]);
        assert_eq!(encode_room_request(3), [1, 2, 3]);
    }

    #[test]
    fn action_layout() {
        assert_eq!(encode_action(5), [1, 7, 5]);
    }

    #[test]
    fn start_ack_started_on_zero() {
        assert!(StartAck { success: 0 }.is_started());
        assert!(!StartAck { success: 1 }.is_started());
    }

    #[test]
    fn login_layout() {
        let bytes = encode_login("ab", "xyz").unwrap();
        assert_eq!(bytes, [1, 0, 0, 2, b'a', b'b', 0, 3, b'x', b'y', b'z']);
    }

    #[test]
    fn login_empty_fields() {
        let bytes = encode_login("", "").unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn login_rejects_oversized_field() {
        let long = "u".repeat(usize::from(u16::MAX) + 1);
        let err = encode_login(&long, "").unwrap_err();
        assert!(matches!(err, EncodeError::FieldTooLong { .. }));
    }

    #[test]
    fn snapshot_layout() {
        let bytes = encode_snapshot_frame(Score::new(4, 9), b"0:1000").unwrap();
        assert_eq!(&bytes[..5], &[1, 8, 4, 9, 6]);
        assert_eq!(&bytes[5..], b"0:1000");
    }

    #[test]
    fn snapshot_rejects_long_payload() {
        let payload = vec![b'0'; 256];
        let err = encode_snapshot_frame(Score::default(), &payload).unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadTooLong {
                length: 256,
                max: 255
            }
        );
    }

    #[test]
    fn delta_layout() {
        let bytes = encode_delta_frame(-2, Score::new(1, 2), &[5, 2, 4, 0, 0, 7]).unwrap();
        assert_eq!(&bytes[..2], &[1, 9]);
        assert_eq!(&bytes[2..6], &(-2i32).to_be_bytes());
        assert_eq!(&bytes[6..8], &[1, 2]);
        assert_eq!(&bytes[8..10], &[0, 2]);
        assert_eq!(&bytes[10..], &[5, 2, 4, 0, 0, 7]);
    }

    #[test]
    fn delta_rejects_partial_patch() {
        let err = encode_delta_frame(0, Score::default(), &[1, 2]).unwrap_err();
        assert!(matches!(err, EncodeError::MisalignedPatches { length: 2 }));
    }

    #[test]
    fn frame_wire_len_matches_encoding() {
        let frame = Frame::Delta(DeltaFrame {
            sequence: 1,
            score: Score::default(),
            patches: vec![1, 1, 1],
        });
        assert_eq!(frame.wire_len(), encode_frame(&frame).unwrap().len());

        let frame = Frame::Snapshot(SnapshotFrame {
            score: Score::default(),
            payload: b"0:1000".to_vec(),
        });
        assert_eq!(frame.wire_len(), encode_frame(&frame).unwrap().len());
    }

    #[test]
    fn delta_patch_count() {
        let frame = DeltaFrame {
            sequence: 0,
            score: Score::default(),
            patches: vec![0; 9],
        };
        assert_eq!(frame.patch_count(), 3);
    }
}
