//! SuperMinHash signature and its similarity estimator.

use fnv::FnvBuildHasher;
use tracing::{debug, trace};

use crate::error::SignatureError;
use crate::permutation::LazyPermutation;
use crate::stream::{ChaChaSeeder, RandomStream as _, StreamSeeder};

/// Largest supported signature length.
///
/// Candidates are stored as `j + r` in an `f64`, so this bound leaves at least
/// 29 bits for the fractional part and keeps permutation entries in a `u32`.
pub const MAX_LENGTH: usize = 1 << 24;

/// Seeder used by [`Signature::new`] and [`Signature::from_values`].
pub type DefaultSeeder = ChaChaSeeder<FnvBuildHasher>;

/// Fixed-length summary of a collection of byte strings, from which the
/// Jaccard similarity of two collections can be estimated.
///
/// Every slot holds the minimum over all pushed items of a per-item candidate
/// `j + r`, where `j` is the position of the slot in a random permutation drawn
/// for that item and `r` is uniform in `[0, 1)`. This is equivalent to running
/// `length` independent MinHash sketches, but cheaper:
///
/// 1.  The permutation is shuffled lazily, with generation-stamped entries, so a push
///     never reinitialises per-slot state.
///
/// 2.  A histogram counts how many slots hold a value in each integer layer.
///     The highest non-empty layer is the active bound `a`. A candidate drawn
///     at position `j > a` is at least `j` and can no longer improve any slot,
///     so a push stops after position `a`. As more items are pushed, the bound
///     shrinks and pushes become cheaper.
///
/// The final slot values do not depend on push order, because each item always
/// draws the same candidates and the minimum is commutative.
#[derive(Clone)]
pub struct Signature<S: StreamSeeder = DefaultSeeder> {
    seeder: S,
    values: Vec<f64>,
    permutation: LazyPermutation,
    bucket_counts: Vec<u32>,
    active_bound: usize,
}

impl<S: StreamSeeder> std::fmt::Debug for Signature<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Signature(length: {}, active bound: {}, pushes: {})",
            self.length(),
            self.active_bound,
            self.pushes(),
        )
    }
}

impl Signature<DefaultSeeder> {
    /// Creates an empty signature with the default seeder.
    pub fn new(length: usize) -> Result<Self, SignatureError> {
        Self::with_seeder(length, DefaultSeeder::default())
    }

    /// Creates a signature directly from slot values, bypassing [`Self::push`].
    pub fn from_values(values: Vec<f64>) -> Result<Self, SignatureError> {
        Self::from_values_with_seeder(values, DefaultSeeder::default())
    }
}

impl<S: StreamSeeder> Signature<S> {
    pub fn with_seeder(length: usize, seeder: S) -> Result<Self, SignatureError> {
        validate_length(length)?;
        let mut bucket_counts = vec![0; length];
        bucket_counts[length - 1] = length as u32;
        debug!(length, "created signature");
        Ok(Self {
            seeder,
            // Every candidate is strictly smaller than `length`.
            values: vec![length as f64; length],
            permutation: LazyPermutation::identity(length),
            bucket_counts,
            active_bound: length - 1,
        })
    }

    /// Every value must be finite and lie in `[0, length]`, the range a
    /// pushed signature can reach. Each one is counted in the layer
    /// `floor(value)`, clamped into `0..length`.
    pub fn from_values_with_seeder(values: Vec<f64>, seeder: S) -> Result<Self, SignatureError> {
        let length = values.len();
        validate_length(length)?;
        let sentinel = length as f64;
        if let Some(index) = values
            .iter()
            .position(|value| !(0.0..=sentinel).contains(value))
        {
            return Err(SignatureError::InvalidValue { index, length });
        }
        let mut bucket_counts = vec![0u32; length];
        for &value in &values {
            bucket_counts[layer(value, length)] += 1;
        }
        let active_bound = bucket_counts
            .iter()
            .rposition(|&count| count > 0)
            .unwrap_or_default();
        Ok(Self {
            seeder,
            values,
            permutation: LazyPermutation::identity(length),
            bucket_counts,
            active_bound,
        })
    }

    /// Number of slots.
    pub fn length(&self) -> usize {
        self.values.len()
    }

    /// The per-slot minima.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Highest slot position a push still examines.
    pub fn active_bound(&self) -> usize {
        self.active_bound
    }

    /// True once every slot holds a value below 1, so that a push only
    /// examines the first permutation position.
    pub fn is_converged(&self) -> bool {
        self.active_bound == 0
    }

    /// Number of push calls on this signature.
    pub fn pushes(&self) -> u64 {
        self.permutation.generation()
    }

    pub fn seeder(&self) -> &S {
        &self.seeder
    }

    /// Adds one item to the summarized collection.
    pub fn push(&mut self, item: impl AsRef<[u8]>) {
        let fingerprint = self.seeder.fingerprint(item.as_ref());
        self.push_hash(fingerprint);
    }

    /// Adds an item given by its precomputed fingerprint.
    ///
    /// `push(item)` is the same as `push_hash(seeder.fingerprint(item))`.
    pub fn push_hash(&mut self, fingerprint: u64) {
        let mut stream = self.seeder.stream(fingerprint);
        let length = self.length();
        let mut j = 0;
        // The bound is re-read every iteration, since it can shrink mid-round.
        while j <= self.active_bound {
            let r = stream.next_unit();
            let k = j + stream.next_below(length - j);
            let target = self.permutation.swap(j, k);
            let candidate = j as f64 + r;
            if candidate < self.values[target] {
                let previous = layer(self.values[target], length);
                self.values[target] = candidate;
                // Equals `j`, unless `j + r` was rounded up to `j + 1`.
                let current = layer(candidate, length);
                if current < previous {
                    self.bucket_counts[previous] -= 1;
                    self.bucket_counts[current] += 1;
                    self.shrink_active_bound();
                }
            }
            j += 1;
        }
        self.permutation.advance();
    }

    /// Estimates the Jaccard similarity of the two summarized collections as
    /// the fraction of slots holding identical values.
    ///
    /// Two signatures without any pushed item compare as fully similar.
    pub fn similarity(&self, other: &Self) -> Result<f64, SignatureError> {
        self.check_compatible(other)?;
        let matches = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.length() as f64)
    }

    /// Turns this signature into the signature of the union of both
    /// collections. On error, `self` is left unchanged.
    pub fn merge(&mut self, other: &Self) -> Result<(), SignatureError> {
        self.check_compatible(other)?;
        let length = self.length();
        for (value, &theirs) in self.values.iter_mut().zip(&other.values) {
            if theirs < *value {
                self.bucket_counts[layer(*value, length)] -= 1;
                self.bucket_counts[layer(theirs, length)] += 1;
                *value = theirs;
            }
        }
        self.shrink_active_bound();
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), SignatureError> {
        debug_assert!(
            self.seeder == other.seeder,
            "signatures were built with different seeders"
        );
        if self.length() != other.length() {
            let err = SignatureError::LengthMismatch {
                left: self.length(),
                right: other.length(),
            };
            debug!(error = %err, "rejected signature pair");
            return Err(err);
        }
        Ok(())
    }

    fn shrink_active_bound(&mut self) {
        let before = self.active_bound;
        while self.active_bound > 0 && self.bucket_counts[self.active_bound] == 0 {
            self.active_bound -= 1;
        }
        if self.active_bound < before {
            trace!(from = before, to = self.active_bound, "active bound shrank");
            if self.active_bound == 0 {
                debug!(
                    length = self.length(),
                    pushes = self.pushes(),
                    "signature converged"
                );
            }
        }
    }
}

impl<S: StreamSeeder, T: AsRef<[u8]>> Extend<T> for Signature<S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }
}

fn validate_length(length: usize) -> Result<(), SignatureError> {
    if length == 0 || length > MAX_LENGTH {
        return Err(SignatureError::InvalidLength {
            length,
            max: MAX_LENGTH,
        });
    }
    Ok(())
}

/// The histogram layer of a slot value: `floor(value)` clamped into
/// `0..length`. The initial value `length` lands in the top layer.
#[inline]
fn layer(value: f64, length: usize) -> usize {
    // `f64::min` ignores NaN, so NaN lands in the top layer.
    value.min((length - 1) as f64).max(0.0) as usize
}
