//! Gameboard with gravity-drop placement and win detection.

use crate::error::{GameError, PlacementError};
use crate::zobrist::ZobristKeys;
use core::fmt::{self, Display, Formatter};

/// Number of coins in a row to win the game.
pub const SERIES_LEN: usize = 4;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u16 = 1000;

/// Fewest coins on the board for which a series is possible at all
/// (four of the winner and three of the opponent).
const MIN_MOVES_FOR_WIN: usize = 2 * SERIES_LEN - 1;

/// Line directions as `(d_row, d_col)`: horizontal, vertical, `\` and `/`.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Coordinate of a cell. Row 0 is the top of the board.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for CellPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The state of the board after a coin was inserted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameResult {
    /// Game continues.
    NoResult,
    /// The board is full without a winner.
    Draw,
    /// Player won with that insertion.
    Win(u8),
}

impl GameResult {
    /// Whether the game ended with this result.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::NoResult)
    }
}

/// Winner together with the cells of the winning series.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum WinResult {
    NoWin,
    /// Cells are sorted by row, then column.
    Win {
        player: u8,
        cells: Vec<CellPosition>,
    },
}

/// Gameboard of arbitrary size.
///
/// Cells are stored row-major, `0` marks an empty cell and `1..=6` the
/// players. Coins fall down, so column `c` is occupied exactly in the rows
/// `height - column_fill[c]..height`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    column_fill: Vec<usize>,
    moves_played: usize,
    max_moves: usize,
    hash: u64,
    keys: ZobristKeys,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Errors
    /// [`GameError::InvalidDimensions`] if a dimension is zero or larger
    /// than [`MAX_DIMENSION`].
    pub fn new(width: u16, height: u16) -> Result<Self, GameError> {
        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(GameError::InvalidDimensions { width, height });
        }

        let width = usize::from(width);
        let height = usize::from(height);
        let max_moves = width * height;
        Ok(Self {
            width,
            height,
            cells: vec![0; max_moves],
            column_fill: vec![0; width],
            moves_played: 0,
            max_moves,
            hash: 0,
            keys: ZobristKeys::new(max_moves),
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn moves_played(&self) -> usize {
        self.moves_played
    }

    #[must_use]
    pub const fn max_moves(&self) -> usize {
        self.max_moves
    }

    /// Zobrist hash of the current cell contents.
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// Read-only snapshot of all cells, row-major.
    #[must_use]
    pub fn view(&self) -> &[u8] {
        &self.cells
    }

    /// Owner of the cell, `0` if empty.
    ///
    /// # Panics
    /// If the coordinate is outside the board.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.height && col < self.width);
        self.cells[row * self.width + col]
    }

    /// Returns the row the next coin in the selected column lands in.
    ///
    /// Returns `None` if there are no more free slots.
    #[must_use]
    pub fn next_row(&self, col: usize) -> Option<usize> {
        self.can_place(col)
            .then(|| self.height - 1 - self.column_fill[col])
    }

    /// Owner of the topmost coin in `col`, `None` if the column is empty.
    #[must_use]
    pub fn top_player(&self, col: usize) -> Option<u8> {
        let fill = *self.column_fill.get(col)?;
        (fill > 0).then(|| self.cells[(self.height - fill) * self.width + col])
    }

    #[must_use]
    pub fn can_place(&self, col: usize) -> bool {
        col < self.width && self.column_fill[col] < self.height
    }

    /// Emits the column indices where moves are legal.
    pub fn available_columns_iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(|&col| self.can_place(col))
    }

    /// Returns the number of free slots in the given column.
    #[must_use]
    pub fn free_slots_in_column(&self, col: usize) -> usize {
        self.column_fill
            .get(col)
            .map_or(0, |&fill| self.height - fill)
    }

    /// Returns whether there are no legal moves left.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.moves_played >= self.max_moves
    }

    /// Drops a coin of `player` into `col`.
    ///
    /// # Errors
    /// [`PlacementError`] if the column does not exist or is full. The board
    /// is not modified in that case.
    pub fn place(&mut self, col: usize, player: u8) -> Result<CellPosition, PlacementError> {
        if col >= self.width {
            return Err(PlacementError::OutOfBounds {
                col,
                width: self.width,
            });
        }

        let fill = self.column_fill[col];
        if fill >= self.height {
            return Err(PlacementError::ColumnFull(col));
        }

        let row = self.height - 1 - fill;
        let index = row * self.width + col;
        self.cells[index] = player;
        self.hash ^= self.keys.key(index, player);
        self.column_fill[col] = fill + 1;
        self.moves_played += 1;
        Ok(CellPosition::new(row, col))
    }

    /// Removes the topmost coin of `col` and returns where it was.
    ///
    /// Returns `None` if the column does not exist or is empty.
    pub fn undo(&mut self, col: usize) -> Option<CellPosition> {
        let fill = *self.column_fill.get(col)?;
        if fill == 0 {
            return None;
        }

        let row = self.height - fill;
        let index = row * self.width + col;
        let player = self.cells[index];
        self.hash ^= self.keys.key(index, player);
        self.cells[index] = 0;
        self.column_fill[col] = fill - 1;
        self.moves_played -= 1;
        Some(CellPosition::new(row, col))
    }

    /// Checks whether the coin at `last_move` ended the game.
    ///
    /// Only lines through `last_move` are inspected, so this must be called
    /// after every placement to not miss a winner.
    #[must_use]
    pub fn check_win(&self, last_move: CellPosition) -> GameResult {
        // Early exit if a win is impossible
        if self.moves_played < MIN_MOVES_FOR_WIN {
            return GameResult::NoResult;
        }

        let CellPosition { row, col } = last_move;
        if row >= self.height || col >= self.width {
            return GameResult::NoResult;
        }
        let player = self.cells[row * self.width + col];
        if player == 0 {
            return GameResult::NoResult;
        }

        if self.check_horizontally(row, col, player)
            || self.check_vertically(row, col, player)
            || self.check_diagonally(row, col, player)
        {
            return GameResult::Win(player);
        }

        if self.is_full() {
            GameResult::Draw
        } else {
            GameResult::NoResult
        }
    }

    /// Scans a window of up to seven cells centered on `col`.
    fn check_horizontally(&self, row: usize, col: usize, player: u8) -> bool {
        let start = col.saturating_sub(SERIES_LEN - 1);
        let end = (col + SERIES_LEN).min(self.width);
        let row_start = row * self.width;
        self.cells[row_start + start..row_start + end]
            .windows(SERIES_LEN)
            .any(|window| window.iter().all(|&cell| cell == player))
    }

    /// Only looks down; cells above the last coin are empty.
    fn check_vertically(&self, row: usize, col: usize, player: u8) -> bool {
        row + SERIES_LEN - 1 < self.height
            && (1..SERIES_LEN).all(|i| self.cells[(row + i) * self.width + col] == player)
    }

    fn check_diagonally(&self, row: usize, col: usize, player: u8) -> bool {
        DIRECTIONS[2..].iter().any(|&(d_row, d_col)| {
            let forward = self.run_length(row, col, d_row, d_col, player);
            let backward = self.run_length(row, col, -d_row, -d_col, player);
            1 + forward + backward >= SERIES_LEN
        })
    }

    /// Cell reached by walking `steps` times along `(d_row, d_col)`, if it
    /// is still on the board.
    fn step(
        &self,
        row: usize,
        col: usize,
        d_row: isize,
        d_col: isize,
        steps: usize,
    ) -> Option<CellPosition> {
        let steps = isize::try_from(steps).ok()?;
        let row = row.checked_add_signed(d_row * steps)?;
        let col = col.checked_add_signed(d_col * steps)?;
        (row < self.height && col < self.width).then_some(CellPosition::new(row, col))
    }

    /// Cells of `player` directly following `(row, col)` in one direction,
    /// at most `SERIES_LEN - 1` of them.
    fn run(
        &self,
        row: usize,
        col: usize,
        d_row: isize,
        d_col: isize,
        player: u8,
    ) -> impl Iterator<Item = CellPosition> + '_ {
        (1..SERIES_LEN)
            .map_while(move |i| self.step(row, col, d_row, d_col, i))
            .take_while(move |pos| self.cells[pos.row * self.width + pos.col] == player)
    }

    fn run_length(&self, row: usize, col: usize, d_row: isize, d_col: isize, player: u8) -> usize {
        self.run(row, col, d_row, d_col, player).count()
    }

    /// Like [`Self::check_win`] but reports the winning cells.
    ///
    /// Directions are tested in the order horizontal, vertical, `\`, `/`;
    /// the first one with a series through `(row, col)` is reported. Up to
    /// three cells on each side of the origin are collected, so a longer
    /// series reports more than four cells.
    #[must_use]
    pub fn check_win_detailed(&self, row: usize, col: usize) -> WinResult {
        if row >= self.height || col >= self.width {
            return WinResult::NoWin;
        }
        let player = self.cells[row * self.width + col];
        if player == 0 {
            return WinResult::NoWin;
        }

        for (d_row, d_col) in DIRECTIONS {
            let mut cells = Vec::with_capacity(2 * SERIES_LEN - 1);
            cells.push(CellPosition::new(row, col));
            cells.extend(self.run(row, col, d_row, d_col, player));
            cells.extend(self.run(row, col, -d_row, -d_col, player));

            if cells.len() >= SERIES_LEN {
                cells.sort_unstable();
                return WinResult::Win { player, cells };
            }
        }

        WinResult::NoWin
    }

    /// Whether a coin of `player` at `(row, col)` would complete a
    /// horizontal series with the coins left and right of it.
    #[must_use]
    pub fn completes_horizontal(&self, row: usize, col: usize, player: u8) -> bool {
        let left = self.run_length(row, col, 0, -1, player);
        let right = self.run_length(row, col, 0, 1, player);
        left + right >= SERIES_LEN - 1
    }
}
