//! Seedable random sources for the randomized generators.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator RNG: the same seed always reproduces the same field.
pub fn generator_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fresh seed drawn from the thread-local entropy source.
pub fn random_seed() -> u64 {
    rand::rng().next_u64()
}
