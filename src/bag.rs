//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling. This
//! prevents long droughts. The random source is injected so a seed fully
//! determines the sequence.

use crate::piece::Piece;
use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag<R = ChaCha8Rng> {
    /// Upcoming pieces, front is dealt next
    queue: VecDeque<TetrominoType>,
    rng: R,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from system entropy
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag whose sequence is fully determined by `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Bag<R> {
    /// Create a bag drawing its shuffles from `rng`
    pub fn with_rng(rng: R) -> Self {
        let mut bag = Self {
            queue: VecDeque::with_capacity(14),
            rng,
        };
        bag.refill();
        bag
    }

    /// Take the next piece, placed at its spawn position
    pub fn next(&mut self) -> Piece {
        Piece::new(self.next_type())
    }

    /// Take the next piece type
    pub fn next_type(&mut self) -> TetrominoType {
        loop {
            if let Some(piece_type) = self.queue.pop_front() {
                return piece_type;
            }
            self.refill();
        }
    }

    /// The next `count` types without consuming them
    pub fn peek(&mut self, count: usize) -> Vec<TetrominoType> {
        self.ensure(count);
        self.queue.iter().take(count).copied().collect()
    }

    /// Read-only view of up to `count` already queued types
    pub fn preview(&self, count: usize) -> impl Iterator<Item = TetrominoType> + '_ {
        self.queue.iter().take(count).copied()
    }

    /// Number of types currently queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append whole bags until at least `count` types are queued
    pub fn ensure(&mut self, count: usize) {
        while self.queue.len() < count {
            self.refill();
        }
    }

    /// Refill the queue with a new shuffled bag
    fn refill(&mut self) {
        let mut new_bag = TetrominoType::all();
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}
