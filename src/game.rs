//! Core game state and logic
//!
//! [`Game`] is one playthrough. The front end calls [`Game::tick`] once per
//! frame with the elapsed time and a snapshot of the player's input; every
//! mutation of the board, the pieces and the score happens inside that call.

use crate::bag::Bag;
use crate::board::Board;
use crate::input::{Action, InputSource};
use crate::piece::Piece;
use crate::score::Score;
use crate::tetromino::{RotationDirection, TetrominoType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info};

/// Grace period between touching down and locking
pub const LOCK_DELAY: Duration = Duration::from_millis(500);

/// Gravity interval while soft drop is held
pub const SOFT_DROP_INTERVAL: Duration = Duration::from_millis(50);

/// Session options chosen before play starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// How many upcoming pieces the next queue exposes
    pub preview_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { preview_count: 3 }
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Active piece is airborne
    Falling,
    /// Active piece is grounded and the lock delay is running
    Locking,
    GameOver,
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game<R = ChaCha8Rng> {
    board: Board,
    bag: Bag<R>,
    config: GameConfig,
    /// Current falling piece
    current_piece: Option<Piece>,
    /// Held piece, keeps the orientation it had when it was held
    hold_piece: Option<Piece>,
    /// Whether hold may be used before the next spawn
    can_hold: bool,
    score: Score,
    /// Current gravity interval, level based unless soft drop is held
    drop_interval: Duration,
    /// Time accumulated towards the next gravity step
    drop_timer: Duration,
    /// Time spent grounded
    lock_timer: Duration,
    game_over: bool,
}

impl Game {
    /// Create a new game with a random seed
    pub fn new(config: GameConfig) -> Self {
        Self::with_bag(Bag::new(), config)
    }

    /// Create a new game whose piece sequence is fixed by `seed`
    pub fn with_seed(seed: u64, config: GameConfig) -> Self {
        Self::with_bag(Bag::with_seed(seed), config)
    }
}

impl<R: Rng> Game<R> {
    /// Create a new game drawing pieces from `bag`
    pub fn with_bag(bag: Bag<R>, config: GameConfig) -> Self {
        let score = Score::new();
        let mut game = Self {
            board: Board::new(),
            bag,
            config,
            current_piece: None,
            hold_piece: None,
            can_hold: true,
            drop_interval: score.drop_interval(),
            score,
            drop_timer: Duration::ZERO,
            lock_timer: Duration::ZERO,
            game_over: false,
        };
        game.spawn_piece();
        game
    }

    /// Start a new playthrough, continuing the same piece sequence
    pub fn reset(&mut self) {
        self.board.reset();
        self.score = Score::new();
        self.current_piece = None;
        self.hold_piece = None;
        self.drop_interval = self.score.drop_interval();
        self.drop_timer = Duration::ZERO;
        self.game_over = false;
        self.spawn_piece();
    }

    /// Advance the simulation by `delta` with the input sampled for this tick
    pub fn tick(&mut self, delta: Duration, input: &impl InputSource) {
        if self.game_over {
            return;
        }

        self.handle_input(input);
        if self.game_over {
            return;
        }

        self.apply_gravity(delta);
        self.update_lock_timer(delta);
    }

    fn handle_input(&mut self, input: &impl InputSource) {
        if self.current_piece.is_none() {
            return;
        }

        if input.just_pressed(Action::MoveLeft) {
            self.shift(-1);
        } else if input.just_pressed(Action::MoveRight) {
            self.shift(1);
        }

        if input.just_pressed(Action::RotateLeft) {
            self.rotate(RotationDirection::CounterClockwise);
        } else if input.just_pressed(Action::RotateRight) {
            self.rotate(RotationDirection::Clockwise);
        }

        self.drop_interval = if input.held(Action::SoftDrop) {
            SOFT_DROP_INTERVAL
        } else {
            self.score.drop_interval()
        };

        if input.just_pressed(Action::HardDrop) {
            self.hard_drop();
            if self.game_over {
                return;
            }
        }

        if input.just_pressed(Action::Hold) {
            self.hold();
        }
    }

    fn shift(&mut self, d_col: i32) {
        if let Some(piece) = &mut self.current_piece {
            if piece.try_shift(&self.board, d_col, 0) {
                self.lock_timer = Duration::ZERO;
            }
        }
    }

    fn rotate(&mut self, direction: RotationDirection) {
        if let Some(piece) = &mut self.current_piece {
            if piece.rotate(direction, &self.board) {
                self.lock_timer = Duration::ZERO;
            }
        }
    }

    fn hard_drop(&mut self) {
        if let Some(piece) = &mut self.current_piece {
            let distance = piece.hard_drop(&self.board);
            self.score.add_hard_drop(distance);
            debug!("hard drop {:?} by {} rows", piece.piece_type, distance);
            self.lock_piece();
        }
    }

    fn hold(&mut self) {
        if !self.can_hold {
            return;
        }
        let Some(current) = self.current_piece.take() else {
            return;
        };

        match self.hold_piece.replace(current) {
            None => {
                debug!("hold slot filled, spawning next piece");
                self.spawn_piece();
            }
            Some(mut held) => {
                held.move_to_spawn();
                let fits = self.board.is_valid_position(&held, 0, 0);
                debug!("swapped in held {:?}", held.piece_type);
                self.current_piece = Some(held);
                if !fits {
                    self.end_game("held piece blocked at spawn");
                }
            }
        }

        self.can_hold = false;
    }

    fn apply_gravity(&mut self, delta: Duration) {
        self.drop_timer += delta;
        if self.drop_timer >= self.drop_interval {
            self.drop_timer = Duration::ZERO;
            if let Some(piece) = &mut self.current_piece {
                piece.move_down(&self.board);
            }
        }
    }

    fn update_lock_timer(&mut self, delta: Duration) {
        let grounded = match &self.current_piece {
            Some(piece) => piece.is_grounded(&self.board),
            None => return,
        };

        if grounded {
            self.lock_timer += delta;
            if self.lock_timer >= LOCK_DELAY {
                self.lock_piece();
            }
        } else {
            self.lock_timer = Duration::ZERO;
        }
    }

    /// Lock the current piece and spawn next
    fn lock_piece(&mut self) {
        let Some(piece) = &self.current_piece else {
            return;
        };

        // Lock out: any block still above the visible field
        if piece.is_above_field() {
            self.end_game("piece locked above the field");
            return;
        }

        self.board.lock_piece(piece);
        let lines = self.board.clear_lines();
        if lines > 0 {
            let level_before = self.score.level;
            let awarded = self.score.add_clear(lines);
            debug!("cleared {} lines for {} points", lines, awarded);
            if self.score.level != level_before {
                info!("level up to {}", self.score.level);
                self.drop_interval = self.score.drop_interval();
            }
        }

        self.current_piece = None;
        self.spawn_piece();
    }

    /// Bring in the next piece from the bag
    fn spawn_piece(&mut self) {
        let piece = self.bag.next();
        self.bag.ensure(self.config.preview_count);
        self.can_hold = true;
        self.lock_timer = Duration::ZERO;

        let fits = self.board.is_valid_position(&piece, 0, 0);
        debug!("spawned {:?}", piece.piece_type);
        self.current_piece = Some(piece);
        if !fits {
            self.end_game("spawn position blocked");
        }
    }

    fn end_game(&mut self, reason: &str) {
        self.game_over = true;
        info!(
            "game over ({}): score={} lines={} level={}",
            reason, self.score.points, self.score.lines, self.score.level
        );
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current_piece.as_ref()
    }

    /// Row the current piece would land on
    pub fn ghost_row(&self) -> Option<i32> {
        self.current_piece
            .as_ref()
            .map(|piece| piece.ghost_row(&self.board))
    }

    pub fn held_piece(&self) -> Option<&Piece> {
        self.hold_piece.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Upcoming piece types, next first
    pub fn next_queue(&self) -> Vec<TetrominoType> {
        self.bag.preview(self.config.preview_count).collect()
    }

    pub fn score(&self) -> u64 {
        self.score.points
    }

    pub fn level(&self) -> u32 {
        self.score.level
    }

    pub fn lines(&self) -> u32 {
        self.score.lines
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            return Phase::GameOver;
        }
        match &self.current_piece {
            Some(piece) if piece.is_grounded(&self.board) => Phase::Locking,
            _ => Phase::Falling,
        }
    }
}
