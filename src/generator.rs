//! Random sequence generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest bar height (inclusive).
pub const VALUE_MIN: u32 = 20;
/// Largest bar height (exclusive).
pub const VALUE_MAX: u32 = 320;

pub const SIZE_MIN: usize = 10;
pub const SIZE_MAX: usize = 100;

/// Draw `size` independent uniform values in `[VALUE_MIN, VALUE_MAX)`.
pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<u32> {
    (0..size).map(|_| rng.gen_range(VALUE_MIN..VALUE_MAX)).collect()
}

/// Seeded RNG for reproducible runs, entropy-seeded otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
