//! Delta frame decoding: packed `(x, y, value)` cell patches.

use wire::{DeltaFrame, Score, PATCH_SIZE};

use crate::error::{CodecResult, ProtocolError};
use crate::types::{Grid, Patch};

/// Unpacks and bounds-checks the patches of a delta frame.
///
/// Patch order is preserved; when a coordinate repeats, the later patch wins
/// at apply time.
pub fn decode_patches(packed: &[u8]) -> CodecResult<Vec<Patch>> {
    if packed.len() % PATCH_SIZE != 0 {
        return Err(ProtocolError::MalformedDelta { len: packed.len() });
    }
    packed
        .chunks_exact(PATCH_SIZE)
        .map(|chunk| {
            let patch = Patch::new(chunk[0], chunk[1], chunk[2]);
            ensure_in_bounds(patch)?;
            Ok(patch)
        })
        .collect()
}

/// Unpacks a delta frame into its patches and metadata.
pub fn decode_delta(frame: &DeltaFrame) -> CodecResult<(Vec<Patch>, Score, i32)> {
    let patches = decode_patches(&frame.patches)?;
    Ok((patches, frame.score, frame.sequence))
}

pub(crate) fn ensure_in_bounds(patch: Patch) -> CodecResult<()> {
    if patch.in_bounds() {
        Ok(())
    } else {
        Err(ProtocolError::CoordinateOutOfRange {
            x: patch.x,
            y: patch.y,
        })
    }
}

/// Writes patches into `grid` in order.
///
/// Callers must have bounds-checked every patch.
pub(crate) fn apply_patches(grid: &mut Grid, patches: &[Patch]) {
    for patch in patches {
        grid.set(usize::from(patch.y), usize::from(patch.x), patch.value);
    }
}

/// Packs patches into their wire form.
#[must_use]
pub fn encode_patches(patches: &[Patch]) -> Vec<u8> {
    patches.iter().flat_map(|patch| patch.to_bytes()).collect()
}

/// Returns the patches that turn `before` into `after`, in row-major order.
#[must_use]
pub fn diff_patches(before: &Grid, after: &Grid) -> Vec<Patch> {
    before
        .diff(after)
        .into_iter()
        .filter_map(|(row, col)| {
            let value = after.get(row, col)?;
            Some(Patch::new(u8::try_from(col).ok()?, u8::try_from(row).ok()?, value))
        })
        .collect()
}

/// Builds a delta frame from patches.
#[must_use]
pub fn delta_frame(sequence: i32, score: Score, patches: &[Patch]) -> DeltaFrame {
    DeltaFrame {
        sequence,
        score,
        patches: encode_patches(patches),
    }
}
