//! Authoritative board state and the frame-application state machine.

use tracing::warn;
use wire::{Frame, Score};

use crate::delta::{apply_patches, decode_delta, ensure_in_bounds};
use crate::error::{CodecResult, ProtocolError};
use crate::snapshot::decode_snapshot;
use crate::types::{Grid, Patch};

/// What to do with a delta that arrives before any snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeltaPolicy {
    /// Reject with [`ProtocolError::DeltaBeforeSnapshot`].
    #[default]
    RequireSnapshot,
    /// Patch on top of the default grid.
    PatchDefault,
}

/// An owned copy of the board at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardView {
    pub grid: Grid,
    pub score: Score,
    /// Sequence number of the last applied delta, if the last frame was one.
    pub sequence: Option<i32>,
}

/// The client's grid and score pair.
///
/// Updates are all-or-nothing: a frame that fails to decode or validate leaves
/// the board exactly as it was.
#[derive(Debug, Clone)]
pub struct BoardState {
    grid: Grid,
    score: Score,
    sequence: Option<i32>,
    has_frame: bool,
    has_snapshot: bool,
    sequence_gaps: u64,
    default_grid: Grid,
    default_score: Score,
    policy: DeltaPolicy,
}

impl BoardState {
    /// Creates a board with an all-zero grid and zero scores.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default(Grid::zeroed(), Score::default())
    }

    /// Creates a board that starts from (and resets to) the given state.
    #[must_use]
    pub fn with_default(grid: Grid, score: Score) -> Self {
        Self {
            grid: grid.clone(),
            score,
            sequence: None,
            has_frame: false,
            has_snapshot: false,
            sequence_gaps: 0,
            default_grid: grid,
            default_score: score,
            policy: DeltaPolicy::default(),
        }
    }

    /// Sets the policy for deltas that precede every snapshot.
    #[must_use]
    pub const fn with_policy(mut self, policy: DeltaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the delta policy.
    #[must_use]
    pub const fn policy(&self) -> DeltaPolicy {
        self.policy
    }

    /// Replaces grid and score wholesale.
    pub fn apply_snapshot(&mut self, grid: Grid, score: Score) {
        self.grid = grid;
        self.score = score;
        self.sequence = None;
        self.has_frame = true;
        self.has_snapshot = true;
    }

    /// Writes only the named cells and replaces the score.
    ///
    /// Every coordinate is checked before any cell changes.
    pub fn apply_delta(
        &mut self,
        patches: &[Patch],
        score: Score,
        sequence: i32,
    ) -> CodecResult<()> {
        if !self.has_snapshot && self.policy == DeltaPolicy::RequireSnapshot {
            return Err(ProtocolError::DeltaBeforeSnapshot);
        }
        for patch in patches {
            ensure_in_bounds(*patch)?;
        }

        if let Some(last) = self.sequence {
            let expected = last.wrapping_add(1);
            if sequence != expected {
                self.sequence_gaps += 1;
                warn!(expected, found = sequence, "delta sequence gap");
            }
        }

        apply_patches(&mut self.grid, patches);
        self.score = score;
        self.sequence = Some(sequence);
        self.has_frame = true;
        Ok(())
    }

    /// Decodes a frame with the matching codec and applies it.
    pub fn apply_frame(&mut self, frame: &Frame) -> CodecResult<()> {
        match frame {
            Frame::Snapshot(snapshot) => {
                let (grid, score) = decode_snapshot(snapshot)?;
                self.apply_snapshot(grid, score);
                Ok(())
            }
            Frame::Delta(delta) => {
                let (patches, score, sequence) = decode_delta(delta)?;
                self.apply_delta(&patches, score, sequence)
            }
        }
    }

    /// Returns an owned copy of the current grid and score.
    #[must_use]
    pub fn current_view(&self) -> BoardView {
        BoardView {
            grid: self.grid.clone(),
            score: self.score,
            sequence: self.sequence,
        }
    }

    /// Returns the current grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the current score pair.
    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    /// Returns the sequence number of the last applied delta.
    #[must_use]
    pub const fn last_sequence(&self) -> Option<i32> {
        self.sequence
    }

    /// Returns `true` once any frame has been applied.
    #[must_use]
    pub const fn has_frame(&self) -> bool {
        self.has_frame
    }

    /// Returns `true` once a snapshot has been applied.
    #[must_use]
    pub const fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    /// Number of deltas whose sequence did not follow the previous delta.
    #[must_use]
    pub const fn sequence_gaps(&self) -> u64 {
        self.sequence_gaps
    }

    /// Returns to the default state, as at the start of a new game.
    pub fn reset(&mut self) {
        self.grid = self.default_grid.clone();
        self.score = self.default_score;
        self.sequence = None;
        self.has_frame = false;
        self.has_snapshot = false;
        self.sequence_gaps = 0;
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
