//! Random source for mine placement and AI guesses.
//!
//! Wraps `SmallRng` (xoshiro256++), which is fast and builds for WASM.
//! Entropy comes from `getrandom` (the browser crypto API on wasm32).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seedable RNG owned by a game session or a solver.
///
/// Seeded instances replay the same mine layouts and guesses, which the
/// tests rely on.
pub struct GameRng {
    inner: SmallRng,
}

impl GameRng {
    /// Create from system entropy (browser crypto.getRandomValues or OS).
    pub fn new() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Create with a specific seed for deterministic behavior.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generate a random index in [0, max). `max` must be non-zero.
    #[inline(always)]
    pub fn gen_index(&mut self, max: usize) -> usize {
        self.inner.random_range(0..max)
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.gen_index(items.len()))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_deterministic() {
        let mut rng1 = GameRng::from_seed(42);
        let mut rng2 = GameRng::from_seed(42);
        for _ in 0..100 {
            assert_eq!(rng1.gen_index(1000), rng2.gen_index(1000));
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = GameRng::from_seed(123);
        for _ in 0..1000 {
            let v = rng.gen_index(10);
            assert!(v < 10);
        }
    }

    #[test]
    fn test_choose_empty_and_single() {
        let mut rng = GameRng::from_seed(7);
        let empty: [usize; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[5usize]), Some(&5));
    }
}
