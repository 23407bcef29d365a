//! Inspection and decoding tools for ctflink captures.
//!
//! A capture is the raw byte stream a server sent: board frames back to back,
//! exactly as the client read them. This crate provides:
//!
//! - Per-frame structure and size reports
//! - Replay of a capture through [`codec::BoardState`], with per-frame changes
//! - Human-readable grid rendering
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what each frame did to the board.

use std::fmt::Write as _;
use std::io::Cursor;

use codec::{BoardState, BoardView, DeltaPolicy, Grid, ProtocolError, Score};
use serde::Serialize;
use wire::{read_frame, Frame};

/// Structure of one frame in a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    /// Byte offset of the frame header in the capture.
    pub offset: u64,
    pub kind: FrameKind,
    /// Total encoded length including headers.
    pub byte_len: usize,
    pub score: Score,
    /// Delta sequence number.
    pub sequence: Option<i32>,
    /// Patch count for deltas, RLE byte count for snapshots.
    pub body_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Snapshot,
    Delta,
}

/// Structure report for a whole capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub frames: Vec<FrameSummary>,
    pub total_bytes: usize,
    /// Framing error that stopped the scan, if the capture did not end cleanly.
    pub stopped: Option<String>,
}

impl InspectReport {
    #[must_use]
    pub fn count(&self, kind: FrameKind) -> usize {
        self.frames.iter().filter(|frame| frame.kind == kind).count()
    }
}

/// Scans a capture frame by frame without decoding board contents.
#[must_use]
pub fn inspect_frames(bytes: &[u8]) -> InspectReport {
    let mut cursor = Cursor::new(bytes);
    let mut frames = Vec::new();
    let mut stopped = None;
    loop {
        let offset = cursor.position();
        match read_frame(&mut cursor) {
            Ok(frame) => frames.push(summarize(frames.len(), offset, &frame)),
            Err(wire::DecodeError::Closed) => break,
            Err(err) => {
                stopped = Some(format!("at byte {offset}: {err}"));
                break;
            }
        }
    }
    InspectReport {
        frames,
        total_bytes: bytes.len(),
        stopped,
    }
}

fn summarize(index: usize, offset: u64, frame: &Frame) -> FrameSummary {
    let (kind, sequence, body_len) = match frame {
        Frame::Snapshot(snapshot) => (FrameKind::Snapshot, None, snapshot.payload.len()),
        Frame::Delta(delta) => (FrameKind::Delta, Some(delta.sequence), delta.patch_count()),
    };
    FrameSummary {
        index,
        offset,
        kind,
        byte_len: frame.wire_len(),
        score: frame.score(),
        sequence,
        body_len,
    }
}

/// One frame replayed onto the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    pub index: usize,
    pub kind: FrameKind,
    pub score: Score,
    pub sequence: Option<i32>,
    /// `[row, col]` of every cell the frame changed.
    pub changed: Vec<[usize; 2]>,
    /// Why the frame was rejected; the board is unchanged when set.
    pub error: Option<String>,
}

/// Result of replaying a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeOutput {
    pub frames: Vec<DecodedFrame>,
    pub board: BoardView,
    pub sequence_gaps: u64,
    pub stopped: Option<String>,
}

/// Replays a capture through a fresh board.
///
/// Rejected frames are recorded and skipped; a framing error ends the replay.
#[must_use]
pub fn decode_capture(bytes: &[u8], policy: DeltaPolicy) -> DecodeOutput {
    let mut cursor = Cursor::new(bytes);
    let mut board = BoardState::new().with_policy(policy);
    let mut frames = Vec::new();
    let mut stopped = None;
    loop {
        let offset = cursor.position();
        let frame = match read_frame(&mut cursor) {
            Ok(frame) => frame,
            Err(wire::DecodeError::Closed) => break,
            Err(err) => {
                stopped = Some(format!("at byte {offset}: {err}"));
                break;
            }
        };
        let summary = summarize(frames.len(), offset, &frame);
        let before = board.grid().clone();
        let error = board
            .apply_frame(&frame)
            .err()
            .map(|err: ProtocolError| err.to_string());
        let changed = before
            .diff(board.grid())
            .into_iter()
            .map(|(row, col)| [row, col])
            .collect();
        frames.push(DecodedFrame {
            index: summary.index,
            kind: summary.kind,
            score: summary.score,
            sequence: summary.sequence,
            changed,
            error,
        });
    }
    DecodeOutput {
        frames,
        board: board.current_view(),
        sequence_gaps: board.sequence_gaps(),
        stopped,
    }
}

/// Renders a grid as one line per row; `.` is an empty cell.
#[must_use]
pub fn format_grid_pretty(grid: &Grid) -> String {
    let mut out = String::with_capacity(codec::ROWS * (codec::COLS + 1));
    for row in grid.rows() {
        out.extend(row.iter().map(|&cell| cell_glyph(cell)));
        out.push('\n');
    }
    out
}

fn cell_glyph(cell: u8) -> char {
    match cell {
        0 => '.',
        1..=15 => char::from_digit(u32::from(cell), 16).unwrap_or('?'),
        _ => '#',
    }
}

/// Renders a board view with its score line.
#[must_use]
pub fn format_view_pretty(view: &BoardView) -> String {
    let mut out = format!("score: {} - {}", view.score.own, view.score.opponent);
    if let Some(sequence) = view.sequence {
        let _ = write!(out, "  seq: {sequence}");
    }
    out.push('\n');
    out.push_str(&format_grid_pretty(&view.grid));
    out
}

/// Renders a replay as a per-frame log followed by the final board.
#[must_use]
pub fn format_decode_pretty(output: &DecodeOutput) -> String {
    let mut out = String::new();
    for frame in &output.frames {
        let kind = match frame.kind {
            FrameKind::Snapshot => "snapshot",
            FrameKind::Delta => "delta",
        };
        let _ = write!(
            out,
            "#{:<4} {kind:<8} score {}-{}",
            frame.index, frame.score.own, frame.score.opponent
        );
        if let Some(sequence) = frame.sequence {
            let _ = write!(out, " seq {sequence}");
        }
        match &frame.error {
            Some(error) => {
                let _ = writeln!(out, " rejected: {error}");
            }
            None => {
                let _ = writeln!(out, " changed {} cells", frame.changed.len());
            }
        }
    }
    if output.sequence_gaps > 0 {
        let _ = writeln!(out, "sequence gaps: {}", output.sequence_gaps);
    }
    if let Some(stopped) = &output.stopped {
        let _ = writeln!(out, "stopped {stopped}");
    }
    out.push_str(&format_view_pretty(&output.board));
    out
}
