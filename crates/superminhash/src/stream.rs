//! Deterministic random streams that drive signature updates.
//!
//! A [`Signature`](crate::Signature) never looks at item bytes directly. It asks
//! a [`StreamSeeder`] for a fingerprint of the item and for a [`RandomStream`]
//! seeded from that fingerprint. The stream must be a pure function of the
//! fingerprint: the same item always produces the same sequence of draws,
//! which is what makes signatures independent of push order.

use std::marker::PhantomData;

use fnv::FnvBuildHasher;
use rand::{Rng as _, RngCore, SeedableRng as _};
use rand_chacha::ChaCha8Rng;

use crate::build_hasher::ReproducibleBuildHasher;

/// Salt mixed into every fingerprint by [`ChaChaSeeder::default`].
pub const DEFAULT_SALT: u64 = 42;

/// A source of uniform draws, consumed one item at a time.
pub trait RandomStream {
    /// Returns a uniform real in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Returns a uniform integer in `[0, bound)`. `bound` is never zero.
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<R: RngCore> RandomStream for R {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    #[inline]
    fn next_below(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}

/// Turns item bytes into a fingerprint and a fingerprint into a [`RandomStream`].
///
/// Two signatures can only be compared if they were filled through equal seeders.
pub trait StreamSeeder: Clone + PartialEq {
    type Stream: RandomStream;

    /// A 64-bit fingerprint of the item bytes.
    fn fingerprint(&self, item: &[u8]) -> u64;

    /// A fresh stream seeded with the given fingerprint.
    fn stream(&self, fingerprint: u64) -> Self::Stream;
}

/// The default seeder: a salted hash of the item bytes keys a ChaCha8 generator.
pub struct ChaChaSeeder<H: ReproducibleBuildHasher = FnvBuildHasher> {
    salt: u64,
    _hasher: PhantomData<H>,
}

impl<H: ReproducibleBuildHasher> ChaChaSeeder<H> {
    pub fn with_salt(salt: u64) -> Self {
        Self {
            salt,
            _hasher: PhantomData,
        }
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }
}

impl<H: ReproducibleBuildHasher> Default for ChaChaSeeder<H> {
    fn default() -> Self {
        Self::with_salt(DEFAULT_SALT)
    }
}

// Manual impls, so that `H` itself needs neither `Debug` nor `PartialEq`.
impl<H: ReproducibleBuildHasher> Clone for ChaChaSeeder<H> {
    fn clone(&self) -> Self {
        Self::with_salt(self.salt)
    }
}

impl<H: ReproducibleBuildHasher> PartialEq for ChaChaSeeder<H> {
    fn eq(&self, other: &Self) -> bool {
        H::debug_assert_hashers_eq();
        self.salt == other.salt
    }
}

impl<H: ReproducibleBuildHasher> Eq for ChaChaSeeder<H> {}

impl<H: ReproducibleBuildHasher> std::fmt::Debug for ChaChaSeeder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ChaChaSeeder")
            .field("salt", &self.salt)
            .finish()
    }
}

impl<H: ReproducibleBuildHasher> StreamSeeder for ChaChaSeeder<H> {
    type Stream = ChaCha8Rng;

    #[inline]
    fn fingerprint(&self, item: &[u8]) -> u64 {
        H::default().fingerprint(self.salt, item)
    }

    #[inline]
    fn stream(&self, fingerprint: u64) -> Self::Stream {
        ChaCha8Rng::seed_from_u64(fingerprint)
    }
}
