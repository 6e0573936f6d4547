//! Active falling piece logic

use crate::board::{Board, BOARD_WIDTH};
use crate::tetromino::{Matrix, RotationDirection, TetrominoType};
use ratatui::style::Color;

/// Row of the matrix's top edge when a piece spawns, above the visible field
pub const SPAWN_ROW: i32 = -2;

/// Column shifts tried in order after a rotation collides
const KICK_OFFSETS: [i32; 2] = [1, -1];

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current occupancy, a rotation of the type's spawn matrix
    pub matrix: Matrix,
    /// Position (row, col) of the matrix's top-left cell
    /// Row 0 is the top visible row, negative rows are above the field
    pub row: i32,
    pub col: i32,
}

impl Piece {
    /// Create a new piece at spawn position
    pub fn new(piece_type: TetrominoType) -> Self {
        let mut piece = Self {
            piece_type,
            matrix: piece_type.matrix(),
            row: 0,
            col: 0,
        };
        piece.move_to_spawn();
        piece
    }

    /// Horizontally centered, two rows above the visible top.
    /// The matrix keeps whatever rotation it has.
    pub fn move_to_spawn(&mut self) {
        self.col = (BOARD_WIDTH as i32 - self.matrix.size() as i32) / 2;
        self.row = SPAWN_ROW;
    }

    pub fn color(&self) -> Color {
        self.piece_type.color()
    }

    /// Get the absolute (row, col) positions of all occupied cells
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix
            .cells()
            .map(|(dr, dc)| (self.row + dr as i32, self.col + dc as i32))
    }

    /// Whether any occupied cell sits above the visible field
    pub fn is_above_field(&self) -> bool {
        self.block_positions().any(|(row, _)| row < 0)
    }

    /// Shift by (`d_col`, `d_row`) if the board allows it
    pub fn try_shift(&mut self, board: &Board, d_col: i32, d_row: i32) -> bool {
        if board.is_valid_position(self, d_col, d_row) {
            self.col += d_col;
            self.row += d_row;
            true
        } else {
            false
        }
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_shift(board, -1, 0)
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_shift(board, 1, 0)
    }

    /// Try to move down, returns true if successful
    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_shift(board, 0, 1)
    }

    /// Whether the piece rests on the floor or the stack
    pub fn is_grounded(&self, board: &Board) -> bool {
        !board.is_valid_position(self, 0, 1)
    }

    /// Rotate in place, then one column right, then one column left.
    /// If nothing fits the rotation is undone and false is returned.
    pub fn rotate(&mut self, direction: RotationDirection, board: &Board) -> bool {
        let original = self.matrix;
        self.matrix = original.rotated(direction);

        if board.is_valid_position(self, 0, 0) {
            return true;
        }
        for d_col in KICK_OFFSETS {
            if self.try_shift(board, d_col, 0) {
                return true;
            }
        }

        self.matrix = original;
        false
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> u32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        distance
    }

    /// Get the ghost piece row (where the piece would land)
    pub fn ghost_row(&self, board: &Board) -> i32 {
        let mut drop = 0;
        while board.is_valid_position(self, 0, drop + 1) {
            drop += 1;
        }
        self.row + drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, BOARD_HEIGHT};

    #[test]
    fn test_spawn_position() {
        let piece = Piece::new(TetrominoType::T);
        assert_eq!(piece.row, -2);
        assert_eq!(piece.col, 3);

        assert_eq!(Piece::new(TetrominoType::I).col, 3);
        assert_eq!(Piece::new(TetrominoType::O).col, 4);
    }

    #[test]
    fn test_block_positions() {
        let piece = Piece::new(TetrominoType::O);
        let positions: Vec<_> = piece.block_positions().collect();
        assert_eq!(positions, vec![(-2, 4), (-2, 5), (-1, 4), (-1, 5)]);
        assert!(piece.is_above_field());
    }

    #[test]
    fn test_move_down() {
        let board = Board::new();
        let mut piece = Piece::new(TetrominoType::T);
        let original_row = piece.row;
        assert!(piece.move_down(&board));
        assert_eq!(piece.row, original_row + 1);
    }

    #[test]
    fn test_walls_stop_horizontal_moves() {
        let board = Board::new();
        let mut piece = Piece::new(TetrominoType::O);
        let mut moves = 0;
        while piece.move_left(&board) {
            moves += 1;
        }
        assert_eq!(moves, 4);
        assert_eq!(piece.col, 0);
        assert!(!piece.move_left(&board));
        assert_eq!(piece.col, 0);
    }

    #[test]
    fn test_hard_drop() {
        let board = Board::new();
        let mut piece = Piece::new(TetrominoType::I);
        // Bar starts on row -1 and ends on row 19
        assert_eq!(piece.hard_drop(&board), 20);
        assert_eq!(piece.row, 18);
        assert!(piece.is_grounded(&board));
    }

    #[test]
    fn test_ghost_row_matches_hard_drop() {
        let mut board = Board::new();
        board.set(12, 4, Cell::Filled(Color::Red));
        let piece = Piece::new(TetrominoType::T);
        let mut dropped = piece.clone();
        dropped.hard_drop(&board);
        assert_eq!(piece.ghost_row(&board), dropped.row);
        // Ghost never moves the piece itself
        assert_eq!(piece.row, SPAWN_ROW);
    }

    #[test]
    fn test_rotate_in_open_space() {
        let board = Board::new();
        let mut piece = Piece::new(TetrominoType::T);
        piece.row = 5;
        assert!(piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece.col, 3);
        assert_eq!(piece.matrix, TetrominoType::T.matrix().rotated_cw());
    }

    #[test]
    fn test_rotate_kicks_off_left_wall() {
        let board = Board::new();
        // Clockwise I is a vertical bar in matrix column 2, here board column 1
        let mut piece = Piece::new(TetrominoType::I);
        piece.matrix = piece.matrix.rotated_cw();
        piece.row = 5;
        piece.col = -1;
        assert!(board.is_valid_position(&piece, 0, 0));

        // Back to horizontal needs cols -1..=2, so it kicks one to the right
        assert!(piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece.col, 0);
        assert_eq!(piece.matrix, TetrominoType::I.matrix());
        assert!(board.is_valid_position(&piece, 0, 0));
    }

    #[test]
    fn test_rotate_kicks_off_right_wall() {
        let board = Board::new();
        // .#.
        // ##.
        // .#.
        let mut piece = Piece::new(TetrominoType::T);
        piece.matrix = TetrominoType::T.matrix().rotated_ccw();
        piece.row = 5;
        piece.col = BOARD_WIDTH as i32 - 2;
        assert!(board.is_valid_position(&piece, 0, 0));

        // Flat side down needs three columns, so it kicks one to the left
        assert!(piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece.col, BOARD_WIDTH as i32 - 3);
    }

    #[test]
    fn test_rotate_kick_too_far_reverts() {
        let board = Board::new();
        // Vertical I flush against the left wall would need a two-column kick
        let mut piece = Piece::new(TetrominoType::I);
        piece.matrix = piece.matrix.rotated_cw();
        piece.row = 5;
        piece.col = -2;
        let before = piece.clone();
        assert!(!piece.rotate(RotationDirection::CounterClockwise, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_rotate_reverts_when_boxed_in() {
        let mut board = Board::new();
        let bottom = BOARD_HEIGHT as i32 - 1;
        // Flat I lying on the floor in a one-row-high slot
        for col in 0..BOARD_WIDTH as i32 {
            if !(3..=6).contains(&col) {
                board.set(bottom, col, Cell::Filled(Color::Red));
            }
            board.set(bottom - 1, col, Cell::Filled(Color::Red));
        }
        board.set(bottom - 1, 4, Cell::Empty);
        board.set(bottom - 1, 5, Cell::Empty);
        let mut piece = Piece::new(TetrominoType::I);
        piece.row = bottom - 1;
        assert!(board.is_valid_position(&piece, 0, 0));

        let before = piece.clone();
        assert!(!piece.rotate(RotationDirection::Clockwise, &board));
        assert_eq!(piece, before);
    }
}
