//! Full snapshot decoding: the RLE board encoding.
//!
//! A snapshot payload is UTF-8 text of `value:count` runs joined by `|`,
//! expanding row-major to exactly [`CELLS`] cells.

use wire::{Score, SnapshotFrame};

use crate::error::{CodecResult, ProtocolError, RleReason};
use crate::types::{Grid, CELLS};

const RUN_SEPARATOR: char = '|';
const FIELD_SEPARATOR: char = ':';

/// Decodes a snapshot frame into a grid and its score pair.
pub fn decode_snapshot(frame: &SnapshotFrame) -> CodecResult<(Grid, Score)> {
    let grid = decode_rle(&frame.payload)?;
    Ok((grid, frame.score))
}

/// Decodes RLE text into a grid.
///
/// Every run is checked against the grammar before the total is compared
/// with [`CELLS`]; expansion stops growing once the total passes a full board,
/// so oversized counts never allocate.
pub fn decode_rle(payload: &[u8]) -> CodecResult<Grid> {
    let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::MalformedRle {
        reason: RleReason::InvalidUtf8,
    })?;

    let mut cells = Vec::with_capacity(CELLS);
    let mut total = 0usize;
    for (run, part) in text.split(RUN_SEPARATOR).enumerate() {
        let (value, count) = parse_run(run, part)?;
        total = total.saturating_add(count);
        if total <= CELLS {
            cells.resize(total, value);
        }
    }

    if total != CELLS {
        return Err(ProtocolError::SizeMismatch {
            expected: CELLS,
            actual: total,
        });
    }
    Grid::from_cells(cells)
}

fn parse_run(run: usize, part: &str) -> CodecResult<(u8, usize)> {
    let mut fields = part.split(FIELD_SEPARATOR);
    let (Some(value), Some(count), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ProtocolError::MalformedRle {
            reason: RleReason::FieldCount {
                run,
                fields: part.split(FIELD_SEPARATOR).count(),
            },
        });
    };

    let value = parse_decimal(run, value)?;
    let value = u8::try_from(value).map_err(|_| ProtocolError::MalformedRle {
        reason: RleReason::ValueOutOfRange { run, value },
    })?;
    let count = usize::try_from(parse_decimal(run, count)?).unwrap_or(usize::MAX);
    Ok((value, count))
}

/// Parses an unsigned decimal field, saturating on overflow.
fn parse_decimal(run: usize, field: &str) -> CodecResult<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedRle {
            reason: RleReason::NotAnInteger { run },
        });
    }
    Ok(field.parse().unwrap_or(u64::MAX))
}

/// Encodes a grid as minimal RLE text.
#[must_use]
pub fn encode_rle(grid: &Grid) -> String {
    let mut out = String::new();
    let mut cells = grid.cells().iter().copied();
    let Some(mut current) = cells.next() else {
        return out;
    };
    let mut count = 1usize;
    for cell in cells {
        if cell == current {
            count += 1;
        } else {
            push_run(&mut out, current, count);
            current = cell;
            count = 1;
        }
    }
    push_run(&mut out, current, count);
    out
}

fn push_run(out: &mut String, value: u8, count: usize) {
    if !out.is_empty() {
        out.push(RUN_SEPARATOR);
    }
    out.push_str(&value.to_string());
    out.push(FIELD_SEPARATOR);
    out.push_str(&count.to_string());
}

/// Builds a snapshot frame for `grid`.
///
/// The RLE text is not length-checked here; [`wire::encode_snapshot_frame`]
/// rejects payloads longer than a snapshot can declare.
#[must_use]
pub fn snapshot_frame(grid: &Grid, score: Score) -> SnapshotFrame {
    SnapshotFrame {
        score,
        payload: encode_rle(grid).into_bytes(),
    }
}
