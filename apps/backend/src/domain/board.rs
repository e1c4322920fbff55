use serde::{Deserialize, Serialize};

/// Number of cells on the board: one center plus a ring of eight.
pub const CELL_COUNT: usize = 9;

/// Index of the center cell. Every ring cell is adjacent to it.
pub const CENTER: usize = 0;

/// Cells left empty once both sides have placed their three marks.
pub const EMPTY_CELLS_IN_PLAY: usize = 3;

/// The eight lines that end the game.
///
/// The ring runs clockwise from the top (1) and is drawn on a 3x3 grid as:
///
/// ```text
/// 8 1 2
/// 7 0 3
/// 6 5 4
/// ```
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [8, 1, 2],
    [7, 0, 3],
    [6, 5, 4],
    // Columns
    [8, 7, 6],
    [1, 0, 5],
    [2, 3, 4],
    // Diagonals
    [8, 0, 4],
    [2, 0, 6],
];

/// One of the two participants' symbols. Distinct from connection identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "PLAYER_1")]
    Player1,
    #[serde(rename = "PLAYER_2")]
    Player2,
}

impl Side {
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    #[serde(rename = "EMPTY")]
    Empty,
    #[serde(rename = "PLAYER_1")]
    Player1,
    #[serde(rename = "PLAYER_2")]
    Player2,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Player1 => Some(Side::Player1),
            Cell::Player2 => Some(Side::Player2),
        }
    }
}

impl From<Side> for Cell {
    fn from(side: Side) -> Self {
        match side {
            Side::Player1 => Cell::Player1,
            Side::Player2 => Cell::Player2,
        }
    }
}

/// Fixed 9-cell board. Serialized as a plain JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Cell; CELL_COUNT]);

impl Board {
    pub fn empty() -> Self {
        Self([Cell::Empty; CELL_COUNT])
    }

    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.0
    }

    /// Returns the cell at `index`, or `None` when the index is off the board.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.0[index] = cell;
    }

    pub fn empty_count(&self) -> usize {
        self.0.iter().filter(|cell| cell.is_empty()).count()
    }

    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        CELL_COUNT - self.empty_count()
    }

    #[cfg(test)]
    pub fn count_for(&self, side: Side) -> usize {
        let mark = Cell::from(side);
        self.0.iter().filter(|cell| **cell == mark).count()
    }

    /// True when `side` occupies every cell of at least one winning line.
    pub fn has_line(&self, side: Side) -> bool {
        let mark = Cell::from(side);
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| self.0[idx] == mark))
    }
}

/// Converts a wire index into a board index, rejecting anything off the board.
pub fn board_index(raw: i32) -> Option<usize> {
    usize::try_from(raw).ok().filter(|idx| *idx < CELL_COUNT)
}

/// Movement adjacency: the center touches every ring cell, ring neighbours
/// touch each other, and the ring wraps between 1 and 8.
pub fn is_adjacent(from: usize, to: usize) -> bool {
    if from == CENTER || to == CENTER {
        return true;
    }
    if (from == 1 && to == 8) || (from == 8 && to == 1) {
        return true;
    }
    from.abs_diff(to) == 1
}
