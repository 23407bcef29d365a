//! Core types for the codec: the board grid and cell patches.

use std::ops::Index;

use crate::error::{CodecResult, ProtocolError};

/// Board height.
pub const ROWS: usize = 20;

/// Board width.
pub const COLS: usize = 50;

/// Cells on the board.
pub const CELLS: usize = ROWS * COLS;

/// A dense 20×50 board, stored row-major.
///
/// Indexing by row yields that row's cells, so `grid[row][col]` reads one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Box<[u8; CELLS]>,
}

impl Grid {
    /// Creates an all-zero grid.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::filled(0)
    }

    /// Creates a grid with every cell set to `value`.
    #[must_use]
    pub fn filled(value: u8) -> Self {
        Self {
            cells: Box::new([value; CELLS]),
        }
    }

    /// Creates a grid from exactly [`CELLS`] row-major values.
    pub fn from_cells(cells: Vec<u8>) -> CodecResult<Self> {
        let actual = cells.len();
        let cells: Box<[u8; CELLS]> =
            cells
                .into_boxed_slice()
                .try_into()
                .map_err(|_| ProtocolError::SizeMismatch {
                    expected: CELLS,
                    actual,
                })?;
        Ok(Self { cells })
    }

    /// Returns the cell at `(row, col)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < ROWS && col < COLS {
            Some(self.cells[row * COLS + col])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * COLS + col] = value;
    }

    /// Returns one row, or `None` past the last row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        (row < ROWS).then(|| &self.cells[row * COLS..(row + 1) * COLS])
    }

    /// Returns all cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u8; CELLS] {
        &self.cells
    }

    /// Iterates rows from top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.cells.chunks_exact(COLS)
    }

    /// Returns the `(row, col)` of every cell that differs from `other`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(idx, _)| (idx / COLS, idx % COLS))
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Index<usize> for Grid {
    type Output = [u8];

    fn index(&self, row: usize) -> &[u8] {
        assert!(row < ROWS, "row {row} out of range");
        &self.cells[row * COLS..(row + 1) * COLS]
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Grid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Grid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let rows = Vec::<Vec<u8>>::deserialize(deserializer)?;
        if rows.len() != ROWS || rows.iter().any(|row| row.len() != COLS) {
            return Err(D::Error::custom(format!("grid must be {ROWS}x{COLS}")));
        }
        Self::from_cells(rows.concat()).map_err(D::Error::custom)
    }
}

/// One cell update carried by a delta frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Patch {
    /// Column, `0..COLS`.
    pub x: u8,
    /// Row, `0..ROWS`.
    pub y: u8,
    pub value: u8,
}

impl Patch {
    /// Creates a patch.
    #[must_use]
    pub const fn new(x: u8, y: u8, value: u8) -> Self {
        Self { x, y, value }
    }

    /// Returns `true` if the coordinate names a board cell.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        (self.x as usize) < COLS && (self.y as usize) < ROWS
    }

    /// Returns the packed wire form.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; wire::PATCH_SIZE] {
        [self.x, self.y, self.value]
    }
}
