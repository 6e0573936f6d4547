//! Game board representation and collision detection

use crate::piece::Piece;
use ratatui::style::Color;

/// Standard Tetris board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled with a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top visible row
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Clear every locked cell
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return None;
        }
        Some(self.cells[row][col])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let row = row as usize;
        let col = col as usize;
        if row >= BOARD_HEIGHT || col >= BOARD_WIDTH {
            return false;
        }
        self.cells[row][col] = cell;
        true
    }

    /// Whether a single target cell can hold a block.
    /// Rows above the board are open as long as the column is in range.
    fn is_open(&self, row: i32, col: i32) -> bool {
        if col < 0 || col >= BOARD_WIDTH as i32 {
            return false;
        }
        if row >= BOARD_HEIGHT as i32 {
            return false;
        }
        if row < 0 {
            return true;
        }
        self.cells[row as usize][col as usize].is_empty()
    }

    /// Check whether `piece` fits after shifting it by (`d_col`, `d_row`)
    pub fn is_valid_position(&self, piece: &Piece, d_col: i32, d_row: i32) -> bool {
        piece
            .block_positions()
            .all(|(row, col)| self.is_open(row + d_row, col + d_col))
    }

    /// Lock a piece onto the board. Blocks above the top row are dropped.
    pub fn lock_piece(&mut self, piece: &Piece) {
        let color = piece.color();
        for (row, col) in piece.block_positions() {
            self.set(row, col, Cell::Filled(color));
        }
    }

    /// Clear completed lines and return the number cleared
    pub fn clear_lines(&mut self) -> u32 {
        let mut lines_cleared = 0;
        let mut row = BOARD_HEIGHT;

        while row > 0 {
            let y = row - 1;
            if self.is_line_full(y) {
                // Everything above shifts down one; y is re-checked
                self.cells.copy_within(0..y, 1);
                self.cells[0] = [Cell::Empty; BOARD_WIDTH];
                lines_cleared += 1;
            } else {
                row -= 1;
            }
        }

        lines_cleared
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::TetrominoType;

    fn fill_row(board: &mut Board, row: i32) {
        for col in 0..BOARD_WIDTH {
            board.set(row, col as i32, Cell::Filled(Color::Cyan));
        }
    }

    fn snapshot(board: &Board) -> Vec<[Cell; BOARD_WIDTH]> {
        board.rows().copied().collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), BOARD_HEIGHT);
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Cell::Filled(Color::Red)));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(Color::Red)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_HEIGHT as i32, 0), None);
        assert_eq!(board.get(0, BOARD_WIDTH as i32), None);
        assert!(!board.set(-1, 0, Cell::Filled(Color::Red)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_on_empty_board() {
        let mut board = Board::new();
        assert_eq!(board.clear_lines(), 0);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        let bottom = BOARD_HEIGHT as i32 - 1;
        fill_row(&mut board, bottom);
        // A block resting on top of the full row
        board.set(bottom - 1, 0, Cell::Filled(Color::Red));

        assert_eq!(board.clear_lines(), 1);
        // The block should have fallen into the bottom row
        assert_eq!(board.get(bottom, 0), Some(Cell::Filled(Color::Red)));
        assert!(board.get(bottom - 1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_clear_two_separated_lines() {
        let mut board = Board::new();
        fill_row(&mut board, 19);
        fill_row(&mut board, 17);
        board.set(18, 3, Cell::Filled(Color::Red));
        board.set(16, 7, Cell::Filled(Color::Green));
        board.set(10, 0, Cell::Filled(Color::Blue));

        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.rows().count(), BOARD_HEIGHT);
        assert!(board.rows().take(2).all(|r| r.iter().all(|c| c.is_empty())));
        assert_eq!(board.get(19, 3), Some(Cell::Filled(Color::Red)));
        assert_eq!(board.get(18, 7), Some(Cell::Filled(Color::Green)));
        assert_eq!(board.get(12, 0), Some(Cell::Filled(Color::Blue)));
        let filled: usize = board
            .rows()
            .map(|r| r.iter().filter(|c| c.is_filled()).count())
            .sum();
        assert_eq!(filled, 3);
    }

    #[test]
    fn test_clear_adjacent_lines() {
        let mut board = Board::new();
        for row in 16..20 {
            fill_row(&mut board, row);
        }
        board.set(15, 4, Cell::Filled(Color::Red));
        assert_eq!(board.clear_lines(), 4);
        assert_eq!(board.get(19, 4), Some(Cell::Filled(Color::Red)));
    }

    #[test]
    fn test_reset() {
        let mut board = Board::new();
        fill_row(&mut board, 3);
        board.reset();
        assert!(board.is_empty());
    }

    #[test]
    fn test_valid_position_rules() {
        let mut board = Board::new();
        // I spawns at col 3, row -2 with its bar on row -1
        let piece = Piece::new(TetrominoType::I);
        assert!(board.is_valid_position(&piece, 0, 0));
        // Above the board is traversable but walls still apply
        assert!(board.is_valid_position(&piece, -3, 0));
        assert!(!board.is_valid_position(&piece, -4, 0));
        assert!(board.is_valid_position(&piece, 3, 0));
        assert!(!board.is_valid_position(&piece, 4, 0));
        // Floor: bar reaches row 19 at d_row 20, row 20 at d_row 21
        assert!(board.is_valid_position(&piece, 0, 20));
        assert!(!board.is_valid_position(&piece, 0, 21));
        // Stack
        board.set(10, 5, Cell::Filled(Color::Red));
        assert!(!board.is_valid_position(&piece, 0, 11));
        assert!(board.is_valid_position(&piece, 0, 10));
    }

    #[test]
    fn test_lock_drops_blocks_above_board() {
        let mut board = Board::new();
        // Nub on row -1 is dropped, the bar lands on row 0
        let mut piece = Piece::new(TetrominoType::T);
        piece.row = -1;
        board.lock_piece(&piece);
        let filled: Vec<_> = (0..BOARD_WIDTH as i32)
            .filter(|&c| board.get(0, c).unwrap().is_filled())
            .collect();
        assert_eq!(filled, vec![3, 4, 5]);
        let total = snapshot(&board)
            .iter()
            .flatten()
            .filter(|c| c.is_filled())
            .count();
        assert_eq!(total, 3);
    }
}
