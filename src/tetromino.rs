//! Tetromino definitions and shapes
//!
//! The 7 pieces with their spawn matrices and colors. Rotation is a pure
//! transform on a square occupancy matrix; the catalog itself is never mutated.

use ratatui::style::Color;

/// Largest matrix side (the I piece)
pub const MAX_SIZE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    J, // Blue
    L, // Orange
    O, // Yellow - square
    S, // Green
    T, // Purple
    Z, // Red
}

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(0x00, 0xf0, 0xf0),
            TetrominoType::J => Color::Rgb(0x00, 0x00, 0xf0),
            TetrominoType::L => Color::Rgb(0xf0, 0xa0, 0x00),
            TetrominoType::O => Color::Rgb(0xf0, 0xf0, 0x00),
            TetrominoType::S => Color::Rgb(0x00, 0xf0, 0x00),
            TetrominoType::T => Color::Rgb(0xa0, 0x00, 0xf0),
            TetrominoType::Z => Color::Rgb(0xf0, 0x00, 0x00),
        }
    }

    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// Spawn orientation, top row first (`#` = filled)
    fn pattern(&self) -> &'static [&'static str] {
        match self {
            TetrominoType::I => &["....", "####", "....", "...."],
            TetrominoType::J => &["#..", "###", "..."],
            TetrominoType::L => &["..#", "###", "..."],
            TetrominoType::O => &["##", "##"],
            TetrominoType::S => &[".##", "##.", "..."],
            TetrominoType::T => &[".#.", "###", "..."],
            TetrominoType::Z => &["##.", ".##", "..."],
        }
    }

    /// A fresh copy of the spawn matrix
    pub fn matrix(&self) -> Matrix {
        Matrix::from_pattern(self.pattern())
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Square cell-occupancy matrix, indexed `[row][col]` with row 0 on top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    cells: [[bool; MAX_SIZE]; MAX_SIZE],
}

impl Matrix {
    fn from_pattern(rows: &[&str]) -> Self {
        let mut cells = [[false; MAX_SIZE]; MAX_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                cells[y][x] = ch == '#';
            }
        }
        Self {
            size: rows.len(),
            cells,
        }
    }

    /// Side length N of the N×N matrix
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Occupied cells as (row, col) offsets from the top-left corner
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size).filter_map(move |x| self.cells[y][x].then_some((y, x)))
        })
    }

    /// Number of occupied cells
    pub fn count(&self) -> usize {
        self.cells().count()
    }

    /// Rotate clockwise: `new[x][N-1-y] = old[y][x]`
    pub fn rotated_cw(&self) -> Matrix {
        let n = self.size;
        let mut cells = [[false; MAX_SIZE]; MAX_SIZE];
        for y in 0..n {
            for x in 0..n {
                cells[x][n - 1 - y] = self.cells[y][x];
            }
        }
        Matrix { size: n, cells }
    }

    /// Rotate counter-clockwise: `new[N-1-x][y] = old[y][x]`
    pub fn rotated_ccw(&self) -> Matrix {
        let n = self.size;
        let mut cells = [[false; MAX_SIZE]; MAX_SIZE];
        for y in 0..n {
            for x in 0..n {
                cells[n - 1 - x][y] = self.cells[y][x];
            }
        }
        Matrix { size: n, cells }
    }

    pub fn rotated(&self, direction: RotationDirection) -> Matrix {
        match direction {
            RotationDirection::Clockwise => self.rotated_cw(),
            RotationDirection::CounterClockwise => self.rotated_ccw(),
        }
    }
}
