//! Snapshot and delta decoding plus board state for the ctflink grid protocol.
//!
//! This crate turns the frames produced by [`wire`] into a consistent 20×50
//! board. Snapshots carry RLE text that replaces the whole grid; deltas carry
//! packed cell patches applied on top of it.
//!
//! # Features
//!
//! - RLE snapshot decoding with strict grammar and size checks
//! - Delta patch decoding with up-front bounds validation
//! - [`BoardState`], the frame-application state machine
//! - Canonical encoders for fixtures and tooling
//!
//! # Design Principles
//!
//! - **All or nothing** - A rejected frame never touches the board.
//! - **Bounded work** - Hostile run counts never allocate past one board.
//! - **Deterministic** - Same frames in the same order produce the same board.

mod board;
mod delta;
mod error;
mod snapshot;
mod types;

pub use board::{BoardState, BoardView, DeltaPolicy};
pub use delta::{decode_delta, decode_patches, delta_frame, diff_patches, encode_patches};
pub use error::{CodecResult, ProtocolError, RleReason};
pub use snapshot::{decode_rle, decode_snapshot, encode_rle, snapshot_frame};
pub use types::{Grid, Patch, CELLS, COLS, ROWS};
pub use wire::{DeltaFrame, Frame, Score, SnapshotFrame};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        // Verify all expected items are exported
        let _ = Grid::zeroed();
        let _ = Patch::new(0, 0, 0);
        let _ = BoardState::new();
        let _ = DeltaPolicy::default();

        // Error types
        let _: CodecResult<()> = Ok(());
    }

    #[test]
    fn snapshot_frame_applies_to_board() {
        let frame = Frame::Snapshot(snapshot_frame(&Grid::filled(2), Score::new(1, 0)));
        let mut board = BoardState::new();
        board.apply_frame(&frame).unwrap();
        assert_eq!(board.current_view().grid, Grid::filled(2));
    }

    #[test]
    fn diff_then_delta_reaches_target() {
        let before = Grid::zeroed();
        let after = decode_rle(b"0:500|7:1|0:499").unwrap();
        let frame = delta_frame(1, Score::new(0, 0), &diff_patches(&before, &after));

        let mut board = BoardState::new();
        board.apply_snapshot(before, Score::default());
        board.apply_frame(&Frame::Delta(frame)).unwrap();
        assert_eq!(board.grid(), &after);
    }
}
