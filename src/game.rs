//! Round state for the shared guessing game.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of comparing a guess against the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    TooHigh,
    TooLow,
    Correct,
}

/// One guessing round: a target in [1, 100] and whether it has been
/// found. The generator is seeded once at startup, so the sequence of
/// targets across rounds is deterministic per seed.
#[derive(Debug)]
pub struct GameRound {
    target: i32,
    over: bool,
    rng: StdRng,
}

impl GameRound {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let target = rng.gen_range(1..=100);
        Self {
            target,
            over: false,
            rng,
        }
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Compares a guess against the target. A correct guess ends the
    /// round.
    pub fn evaluate(&mut self, guess: i32) -> Verdict {
        if guess > self.target {
            Verdict::TooHigh
        } else if guess < self.target {
            Verdict::TooLow
        } else {
            self.over = true;
            Verdict::Correct
        }
    }

    /// Draws a new target iff the previous round is over and every
    /// participant has disconnected. Returns true if a new round began.
    pub fn try_reset(&mut self, active_count: usize) -> bool {
        if self.over && active_count == 0 {
            self.target = self.rng.gen_range(1..=100);
            self.over = false;
            true
        } else {
            false
        }
    }
}
