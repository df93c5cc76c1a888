//! Walkability grid supplied by the snapshot provider.

use thiserror::Error;

use crate::Position;

/// Errors raised while assembling a [`CollisionGrid`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The number of cells does not match `width * height`.
    #[error("grid of {width}x{height} requires {expected} cells but {actual} were provided")]
    DimensionMismatch {
        /// Declared width in cells.
        width: u32,
        /// Declared height in cells.
        height: u32,
        /// Number of cells the dimensions require.
        expected: usize,
        /// Number of cells actually supplied.
        actual: usize,
    },
    /// A textual row contained a character other than `.` or `#`.
    #[error("unexpected cell '{symbol}' at row {row}, column {column}")]
    InvalidSymbol {
        /// Row of the offending character.
        row: usize,
        /// Column of the offending character.
        column: usize,
        /// The offending character.
        symbol: char,
    },
    /// Textual rows had different lengths.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Row with the wrong length.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
}

/// Rectangular walkability grid anchored at a world-space origin.
///
/// Cell `(column, row)` of the grid covers world position
/// `origin + (column, row)`. Positions outside the rectangle are treated as
/// blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionGrid {
    origin: Position,
    width: u32,
    height: u32,
    walkable: Vec<bool>,
}

impl CollisionGrid {
    /// Creates a grid from row-major walkability flags.
    pub fn new(
        origin: Position,
        width: u32,
        height: u32,
        walkable: Vec<bool>,
    ) -> Result<Self, GridError> {
        let expected = cell_count(width, height);
        if walkable.len() != expected {
            return Err(GridError::DimensionMismatch {
                width,
                height,
                expected,
                actual: walkable.len(),
            });
        }

        Ok(Self {
            origin,
            width,
            height,
            walkable,
        })
    }

    /// Creates a grid where every cell is walkable.
    #[must_use]
    pub fn open(origin: Position, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
            walkable: vec![true; cell_count(width, height)],
        }
    }

    /// Parses rows of `.` (walkable) and `#` (blocked) characters.
    pub fn from_rows<S: AsRef<str>>(origin: Position, rows: &[S]) -> Result<Self, GridError> {
        let mut walkable = Vec::new();
        let mut width = None;

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref().trim();
            let length = row.chars().count();
            match width {
                None => width = Some(length),
                Some(expected) if expected != length => {
                    return Err(GridError::RaggedRow {
                        row: row_index,
                        expected,
                        actual: length,
                    });
                }
                Some(_) => {}
            }

            for (column, symbol) in row.chars().enumerate() {
                match symbol {
                    '.' => walkable.push(true),
                    '#' => walkable.push(false),
                    other => {
                        return Err(GridError::InvalidSymbol {
                            row: row_index,
                            column,
                            symbol: other,
                        })
                    }
                }
            }
        }

        let width = u32::try_from(width.unwrap_or(0)).unwrap_or(u32::MAX);
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Self::new(origin, width, height, walkable)
    }

    /// Marks the provided world position as blocked. Positions outside the grid
    /// are ignored.
    pub fn block(&mut self, position: Position) {
        if let Some(index) = self.index(position) {
            self.walkable[index] = false;
        }
    }

    /// World position of the grid's upper-left cell.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.walkable.len()
    }

    /// Reports whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walkable.is_empty()
    }

    /// Reports whether the world position is walkable.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.index(position)
            .and_then(|index| self.walkable.get(index).copied())
            .unwrap_or(false)
    }

    /// Smallest distance from the position to any edge of the grid rectangle.
    /// Negative when the position lies outside the rectangle.
    #[must_use]
    pub fn distance_to_edge(&self, position: Position) -> i64 {
        let left = i64::from(position.x()) - i64::from(self.origin.x());
        let top = i64::from(position.y()) - i64::from(self.origin.y());
        let right = i64::from(self.origin.x()) + i64::from(self.width) - i64::from(position.x());
        let bottom =
            i64::from(self.origin.y()) + i64::from(self.height) - i64::from(position.y());
        left.min(right).min(top).min(bottom)
    }

    /// Row-major index of the world position, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        let column = i64::from(position.x()) - i64::from(self.origin.x());
        let row = i64::from(position.y()) - i64::from(self.origin.y());
        if column < 0 || row < 0 || column >= i64::from(self.width) || row >= i64::from(self.height)
        {
            return None;
        }

        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// World position of the cell stored at the row-major index.
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if index >= self.walkable.len() || self.width == 0 {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = i32::try_from(index % width).ok()?;
        let row = i32::try_from(index / width).ok()?;
        Some(self.origin.offset(column, row))
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    let width = usize::try_from(width).unwrap_or(0);
    let height = usize::try_from(height).unwrap_or(0);
    width.checked_mul(height).unwrap_or(0)
}
