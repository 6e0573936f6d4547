//! Neotris - a deterministic falling-block puzzle engine
//!
//! The core is driven entirely through [`game::Game::tick`]: elapsed time and
//! an [`input::InputSource`] go in, and the board, pieces and score can be
//! read back out. Terminal input handling and settings persistence live next
//! to the core so the `neotris` binary only has to draw frames.

pub mod bag;
pub mod board;
pub mod game;
pub mod input;
pub mod piece;
pub mod score;
pub mod settings;
pub mod tetromino;

pub use game::{Game, GameConfig, Phase};
pub use input::{Action, ActionState, InputSnapshot, InputSource};
