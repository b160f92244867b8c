// Copyright (c) 2024 Mike Tsao

//! Provides a random-number generator for pattern generation and testing.

use byteorder::{BigEndian, ByteOrder};
use delegate::delegate;

/// A pseudorandom number generator (PRNG) for applications such as
/// generative patterns that don't require cryptographically secure random
/// numbers.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
#[allow(missing_docs)]
impl Rng {
    /// Pass the same number to [Rng::new_with_seed()] to get the same stream
    /// back again. Good for reproducing test failures.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    /// Creates an [Rng] seeded from the operating system's entropy source.
    pub fn new_from_entropy() -> anyhow::Result<Self> {
        Ok(Self::new_with_seed(Self::generate_seed()?))
    }

    /// Create a sufficiently high-quality random number that's suitable for
    /// [Rng].
    pub fn generate_seed() -> anyhow::Result<u128> {
        let mut bytes = [0u8; 16];

        getrandom::getrandom(&mut bytes)?;
        Ok(BigEndian::read_u128(&bytes))
    }

    /// Returns a value in the inclusive range `low..=high`.
    pub fn rand_inclusive(&mut self, low: u64, high: u64) -> u64 {
        self.rand_range(low..high + 1)
    }

    delegate! {
        to self.0 {
            pub fn rand_u64(&mut self) -> u64;
            pub fn rand_float(&mut self) -> f64;
            pub fn rand_range(&mut self, range: core::ops::Range<u64>) -> u64;
        }
    }
}
