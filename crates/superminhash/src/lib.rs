//! This crate implements SuperMinHash signatures for estimating the [Jaccard similarity](https://en.wikipedia.org/wiki/Jaccard_index) of two collections without storing their items.
//!
//! - [`Signature`] summarizes a collection of byte strings into a fixed number of slots. Items can be pushed in any order, duplicates are ignored.
//!   The fraction of slots on which two signatures agree estimates the Jaccard similarity of the two collections.
//!   Signatures of two collections can be merged into the signature of their union.
//! - [`stream`] defines the deterministic random stream which turns an item into slot candidates.
//!   The default uses a salted FNV fingerprint of the item to seed a ChaCha8 generator; both halves can be replaced.
//!
//! The update cost per item shrinks as the signature fills up: once every slot holds a small value, later items only need to examine a prefix of the slots.
//! The result is still exactly the same as running one independent MinHash per slot.

pub mod build_hasher;
mod error;
#[cfg(feature = "evaluation")]
pub mod evaluation;
mod permutation;
mod signature;
pub mod stream;
#[cfg(test)]
mod test_rng;

pub use error::SignatureError;
pub use signature::{DefaultSeeder, Signature, MAX_LENGTH};
pub use stream::{ChaChaSeeder, RandomStream, StreamSeeder};

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDocTests;
