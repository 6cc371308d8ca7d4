//! Randomness sources
//!
//! Game logic never touches `rand` directly. It asks a `RandomSource` for an
//! inclusive uniform roll or a weighted pick over a static table, which lets
//! tests and replays script every draw.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform and weighted integer draws
pub trait RandomSource: Send {
    /// Uniform draw in `low..=high`
    fn roll(&mut self, low: u32, high: u32) -> u32;

    /// Index into `weights`, each index drawn with probability `w / sum(w)`
    fn weighted_index(&mut self, weights: &[u32]) -> usize;
}

/// Deterministic PRNG-backed source
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn roll(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> usize {
        match WeightedIndex::new(weights.iter().copied()) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(e) => {
                tracing::warn!("Degenerate weight table ({}), picking first entry", e);
                0
            }
        }
    }
}

/// Replays queued draws in order
///
/// Rolls are clamped into the requested range; an exhausted queue yields
/// the lowest value (rolls) or index 0 (picks).
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    rolls: VecDeque<u32>,
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self, low: u32, high: u32) -> u32 {
        self.rolls
            .pop_front()
            .map(|r| r.clamp(low, high.max(low)))
            .unwrap_or(low)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> usize {
        let last = weights.len().saturating_sub(1);
        self.picks.pop_front().map(|p| p.min(last)).unwrap_or(0)
    }
}

/// A random source shared by every subsystem of one game
pub struct Dice {
    source: Mutex<Box<dyn RandomSource>>,
}

impl Dice {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Mutex::new(Box::new(source)),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededRandom::new(seed))
    }

    pub fn roll(&self, low: u32, high: u32) -> u32 {
        let mut source = self.source.lock().unwrap_or_else(|e| e.into_inner());
        source.roll(low, high)
    }

    pub fn weighted_index(&self, weights: &[u32]) -> usize {
        let mut source = self.source.lock().unwrap_or_else(|e| e.into_inner());
        source.weighted_index(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rolls_stay_in_range() {
        let mut random = SeededRandom::new(42);
        for _ in 0..1000 {
            let r = random.roll(1, 20);
            assert!((1..=20).contains(&r));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        let xs: Vec<u32> = (0..16).map(|_| a.roll(1, 100)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.roll(1, 100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_weighted_index_never_picks_zero_weight() {
        let mut random = SeededRandom::new(3);
        for _ in 0..500 {
            assert_eq!(random.weighted_index(&[0, 5, 0]), 1);
        }
    }

    #[test]
    fn test_weighted_index_follows_weights() {
        let mut random = SeededRandom::new(11);
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            counts[random.weighted_index(&[90, 10])] += 1;
        }
        assert!(counts[0] > 8_500 && counts[0] < 9_500);
    }

    #[test]
    fn test_degenerate_table_falls_back_to_first() {
        let mut random = SeededRandom::new(1);
        assert_eq!(random.weighted_index(&[0, 0]), 0);
        assert_eq!(random.weighted_index(&[]), 0);
    }

    #[test]
    fn test_scripted_replays_and_clamps() {
        let mut random = ScriptedRandom::new().with_rolls([5, 99]).with_picks([2, 9]);
        assert_eq!(random.roll(1, 20), 5);
        assert_eq!(random.roll(1, 20), 20);
        assert_eq!(random.roll(3, 20), 3);
        assert_eq!(random.weighted_index(&[1, 1, 1]), 2);
        assert_eq!(random.weighted_index(&[1, 1, 1]), 2);
        assert_eq!(random.weighted_index(&[1, 1, 1]), 0);
    }
}
