//! Deterministic seeded RNG for generation and monster AI.
//!
//! Every piece of procedural and AI randomness in the simulation flows
//! through [`SimRng`], so identical seeds produce bit-identical levels and
//! monster behavior. The draw contract is deliberately narrow — integer
//! draws are `x mod range`, float draws are `x / 2³²` — so that the
//! distribution shape of the generator (notably the anchor-selection bias)
//! is fixed by this module alone.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A seeded deterministic random-number generator.
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Create a generator from a 64-bit seed.
    pub fn seed_from(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next raw 32-bit draw.
    pub fn rand_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform integer in `0..n`. Returns 0 when `n <= 0`.
    pub fn randn(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        (self.inner.next_u32() % n as u32) as i32
    }

    /// Uniform float in `[0, 1)`.
    pub fn rand01(&mut self) -> f32 {
        (f64::from(self.inner.next_u32()) / (f64::from(u32::MAX) + 1.0)) as f32
    }

    /// Draw a 64-bit seed, for deriving child generators.
    pub fn next_seed(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::seed_from(7);
        let mut b = SimRng::seed_from(7);
        for _ in 0..100 {
            assert_eq!(a.rand_u32(), b.rand_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::seed_from(1);
        let mut b = SimRng::seed_from(2);
        let same = (0..32).filter(|_| a.rand_u32() == b.rand_u32()).count();
        assert!(same < 32);
    }

    #[test]
    fn randn_stays_in_range() {
        let mut rng = SimRng::seed_from(42);
        for _ in 0..1000 {
            let v = rng.randn(10);
            assert!((0..10).contains(&v));
        }
    }

    #[test]
    fn randn_of_zero_is_zero() {
        let mut rng = SimRng::seed_from(42);
        assert_eq!(rng.randn(0), 0);
        assert_eq!(rng.randn(-3), 0);
    }

    #[test]
    fn rand01_stays_in_unit_interval() {
        let mut rng = SimRng::seed_from(42);
        for _ in 0..1000 {
            let v = rng.rand01();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
