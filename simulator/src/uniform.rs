//! Sources of uniform randomness.

use rand::{distributions::Open01, Rng, RngCore};

/// A source of independent draws from the uniform distribution on `(0, 1)`.
///
/// Draws outside the open interval are rejected by [crate::Network::step]. Every
/// [rand::RngCore] is a [UniformSource] (via [rand::distributions::Open01]), so a
/// seeded [rand::rngs::StdRng] makes a simulation reproducible. Scripted sources such as
/// [crate::mocks::Sequence] allow individual transitions to be checked by hand.
pub trait UniformSource {
    /// Draw the next uniform value.
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.sample(Open01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rng_draws_in_open_interval() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10_000 {
            let u = rng.next_uniform();
            assert!(u > 0.0 && u < 1.0);
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(a.next_uniform(), b.next_uniform());
        }
    }
}
