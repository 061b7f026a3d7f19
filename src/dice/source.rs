//! Die sources: seeded random dice and scripted (operator-entered) rolls

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Anything that can produce a single die result in `1..=sides`
pub trait DieSource {
    fn roll_die(&mut self, sides: u32) -> u32;

    fn d20(&mut self) -> u32 {
        self.roll_die(20)
    }

    fn d6(&mut self) -> u32 {
        self.roll_die(6)
    }

    /// Sum of two six-sided dice (2..=12)
    fn two_d6(&mut self) -> u32 {
        self.d6() + self.d6()
    }
}

impl<D: DieSource + ?Sized> DieSource for &mut D {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Dice backed by a random number generator
#[derive(Debug, Clone)]
pub struct RandomDice<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomDice<ChaCha8Rng> {
    /// Deterministic dice for replays and tests
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Dice seeded from the thread-local generator
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }
}

impl<R: Rng> DieSource for RandomDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(1..=sides)
    }
}

/// Dice that replay a fixed queue of results
///
/// Used when the game master rolls physical dice and enters the values,
/// and in tests. Values are clamped into `1..=sides`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            queue: rolls.into_iter().collect(),
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.queue.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.queue.pop_front() {
            Some(roll) => roll.clamp(1, sides),
            None => {
                tracing::warn!(sides, "scripted dice exhausted, rolling 1");
                1
            }
        }
    }
}
