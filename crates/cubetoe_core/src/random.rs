//! Randomness seam for the opponent and promo codes.

use super::position::Position;
use std::collections::VecDeque;

/// Source of independent uniform draws.
///
/// Every [`rand::Rng`] is a `RandomSource`. [`ScriptedRandom`] replays fixed
/// draws so a game can be reproduced exactly.
pub trait RandomSource {
    /// Returns true with probability `probability`.
    fn chance(&mut self, probability: f64) -> bool;

    /// Picks one candidate uniformly. `candidates` must not be empty.
    fn pick(&mut self, candidates: &[Position]) -> Position;

    /// Uniform integer in `low..=high`.
    fn between(&mut self, low: u32, high: u32) -> u32;
}

impl<R: rand::Rng> RandomSource for R {
    fn chance(&mut self, probability: f64) -> bool {
        self.random::<f64>() < probability
    }

    fn pick(&mut self, candidates: &[Position]) -> Position {
        candidates[self.random_range(0..candidates.len())]
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        self.random_range(low..=high)
    }
}

/// Replays queued draws.
///
/// Each `chance` call consumes one roll in `[0, 1)` and fires when the roll
/// is below the probability; once the rolls run out no gate fires. Each
/// `pick` consumes one index (taken modulo the candidate count, first
/// candidate when exhausted). Each `between` consumes one number, clamped
/// into range (`low` when exhausted).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    rolls: VecDeque<f64>,
    picks: VecDeque<usize>,
    numbers: VecDeque<u32>,
}

impl ScriptedRandom {
    /// Creates an empty script: no gate fires, picks take the first candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues rolls for `chance`.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    /// Queues candidate indices for `pick`.
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Queues values for `between`.
    pub fn with_numbers(mut self, numbers: impl IntoIterator<Item = u32>) -> Self {
        self.numbers.extend(numbers);
        self
    }

    /// Draws not yet consumed, as `(rolls, picks, numbers)`.
    pub fn remaining(&self) -> (usize, usize, usize) {
        (self.rolls.len(), self.picks.len(), self.numbers.len())
    }
}

impl RandomSource for ScriptedRandom {
    fn chance(&mut self, probability: f64) -> bool {
        self.rolls.pop_front().is_some_and(|roll| roll < probability)
    }

    fn pick(&mut self, candidates: &[Position]) -> Position {
        let index = self.picks.pop_front().unwrap_or(0);
        candidates[index % candidates.len()]
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        self.numbers
            .pop_front()
            .map_or(low, |n| n.clamp(low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scripted_exhausted_never_fires() {
        let mut rng = ScriptedRandom::new();
        assert!(!rng.chance(0.99));
        assert_eq!(rng.pick(&[Position::Center, Position::TopLeft]), Position::Center);
        assert_eq!(rng.between(10, 20), 10);
    }

    #[test]
    fn test_scripted_roll_below_probability_fires() {
        let mut rng = ScriptedRandom::new().with_rolls([0.29, 0.30]);
        assert!(rng.chance(0.30));
        assert!(!rng.chance(0.30));
    }

    #[test]
    fn test_std_rng_between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let n = rng.between(10000, 99999);
            assert!((10000..=99999).contains(&n));
        }
    }
}
