//! Seeded combat random number generator.
//!
//! A 31-bit linear congruential generator. It is not suitable for anything
//! but reproducible gameplay variance: the same seed always yields the same
//! sequence of rolls on every platform.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_RNG_SEED;

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS: u64 = 1 << 31;

/// Number of distinct roll values (`0..ROLL_SIDES`).
pub const ROLL_SIDES: u32 = 100;

/// Deterministic roll source owned by a combat engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatRng {
    seed: u32,
}

impl CombatRng {
    /// Create a generator at `seed`.
    #[must_use]
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Current internal state. Recreating a generator from this value
    /// continues the same sequence.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance the state and return a roll in `0..100`.
    pub fn next_roll(&mut self) -> i32 {
        let next = (u64::from(self.seed) * MULTIPLIER + INCREMENT) % MODULUS;
        self.seed = next as u32;
        (self.seed % ROLL_SIDES) as i32
    }
}

impl Default for CombatRng {
    fn default() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_from_default_seed() {
        let mut rng = CombatRng::default();
        let roll = rng.next_roll();
        // (42 * 1103515245 + 12345) mod 2^31
        let expected = (42u64 * 1_103_515_245 + 12_345) % (1 << 31);
        assert_eq!(u64::from(rng.seed()), expected);
        assert_eq!(roll as u64, expected % 100);
    }

    #[test]
    fn test_rolls_in_range() {
        let mut rng = CombatRng::with_seed(7);
        for _ in 0..10_000 {
            let roll = rng.next_roll();
            assert!((0..100).contains(&roll));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = CombatRng::with_seed(12345);
        let mut b = CombatRng::with_seed(12345);
        for _ in 0..100 {
            assert_eq!(a.next_roll(), b.next_roll());
        }
    }

    #[test]
    fn test_resume_from_seed() {
        let mut rng = CombatRng::with_seed(99);
        rng.next_roll();
        let mut resumed = CombatRng::with_seed(rng.seed());
        assert_eq!(rng.next_roll(), resumed.next_roll());
    }

    #[test]
    fn test_state_stays_below_modulus() {
        let mut rng = CombatRng::with_seed(u32::MAX);
        rng.next_roll();
        assert!(u64::from(rng.seed()) < MODULUS);
    }
}
