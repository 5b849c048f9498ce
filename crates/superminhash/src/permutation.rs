//! A permutation of `0..len` that resets to the identity in O(1).
//!
//! Every entry carries the generation in which it was last written. An entry
//! whose stamp differs from the current generation is stale and reads as its
//! own index. Advancing the generation therefore resets the whole array
//! without touching it, and a Fisher-Yates shuffle only pays for the positions
//! it actually visits.

/// Stamp of an entry that was never written. No generation reaches it.
const NEVER_WRITTEN: u64 = u64::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LazyPermutation {
    entries: Vec<u32>,
    stamps: Vec<u64>,
    generation: u64,
}

impl LazyPermutation {
    /// Callers guarantee that `len` fits into `u32`.
    pub(crate) fn identity(len: usize) -> Self {
        debug_assert!(len <= u32::MAX as usize);
        Self {
            entries: (0..len as u32).collect(),
            stamps: vec![NEVER_WRITTEN; len],
            generation: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of completed generations.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Current value at position `j`.
    #[cfg(test)]
    pub(crate) fn get(&self, j: usize) -> usize {
        if self.stamps[j] == self.generation {
            self.entries[j] as usize
        } else {
            j
        }
    }

    /// Swaps positions `j` and `k` of the current generation and returns the
    /// value now stored at `j`.
    #[inline]
    pub(crate) fn swap(&mut self, j: usize, k: usize) -> usize {
        self.materialize(j);
        self.materialize(k);
        self.entries.swap(j, k);
        self.entries[j] as usize
    }

    /// Starts a new generation, in which every position reads as its index.
    #[inline]
    pub(crate) fn advance(&mut self) {
        self.generation += 1;
    }

    #[inline]
    fn materialize(&mut self, j: usize) {
        if self.stamps[j] != self.generation {
            self.stamps[j] = self.generation;
            self.entries[j] = j as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::Rng as _;

    use crate::test_rng::prng_test_harness;

    use super::*;

    fn snapshot(p: &LazyPermutation) -> Vec<usize> {
        (0..p.len()).map(|j| p.get(j)).collect_vec()
    }

    #[test]
    fn test_never_written_reads_identity() {
        let p = LazyPermutation::identity(17);
        assert_eq!(p.generation(), 0);
        assert_eq!(snapshot(&p), (0..17).collect_vec());
    }

    #[test]
    fn test_swap_returns_new_value() {
        let mut p = LazyPermutation::identity(5);
        assert_eq!(p.swap(0, 3), 3);
        assert_eq!(p.swap(1, 1), 1);
        assert_eq!(p.swap(1, 4), 4);
        assert_eq!(snapshot(&p), vec![3, 4, 2, 0, 1]);
    }

    #[test]
    fn test_advance_resets_lazily() {
        let mut p = LazyPermutation::identity(6);
        p.swap(0, 5);
        p.swap(2, 4);
        p.advance();
        assert_eq!(p.generation(), 1);
        assert_eq!(snapshot(&p), (0..6).collect_vec());
        // Stale entries are rewritten on first touch in the new generation.
        assert_eq!(p.swap(0, 2), 2);
        assert_eq!(snapshot(&p), vec![2, 1, 0, 3, 4, 5]);
    }

    #[test]
    fn test_partial_shuffles_are_permutations() {
        prng_test_harness(20, |rnd| {
            let len = rnd.random_range(1..200);
            let mut p = LazyPermutation::identity(len);
            for _ in 0..10 {
                let steps = rnd.random_range(0..=len);
                for j in 0..steps {
                    let k = rnd.random_range(j..len);
                    p.swap(j, k);
                }
                let sorted = snapshot(&p).into_iter().sorted().collect_vec();
                assert_eq!(sorted, (0..len).collect_vec());
                p.advance();
            }
        })
    }
}
