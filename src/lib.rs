//! Compute, compare and merge MinHash sketches of genomic sequences.
//!
//! This is the core library for kmersketch, which turns streams of
//! biological k-mers into compact [MinHash][0] sketches that can be
//! merged, intersected and compared. It supports both classical bottom-k
//! sampling (keep the `num` smallest hashes) and scaled sampling (keep
//! every hash below a threshold), with optional per-hash abundance
//! tracking.
//!
//! [0]: https://en.wikipedia.org/wiki/MinHash
//!
//! The crate is organized around a few concepts:
//!
//! - A **sketch** is a sublinear representation of a sequence data set,
//!   supporting limited operations (similarity, containment or cardinality
//!   estimation). The MinHash engine lives in the [`sketch`] submodule,
//!   next to the [Bloom filter][1] and [HyperLogLog][2] auxiliary indexes.
//!
//! - An alphabet **encoding** maps input sequences into the hashed
//!   residue space: DNA canonicalization, six-frame translation to amino
//!   acids, and the Dayhoff and hydrophobic-polar reduced alphabets.
//!   These are defined in the [`encodings`] submodule.
//!
//! - A **signature** is a named collection of sketches derived from the
//!   same data set, typically at several k-mer sizes or molecule types.
//!   Signatures are implemented in the [`signature`] submodule and
//!   serialize to a JSON envelope, optionally gzip-compressed.
//!
//!  [1]: https://en.wikipedia.org/wiki/Bloom_filter
//!  [2]: https://en.wikipedia.org/wiki/HyperLogLog

pub mod errors;
pub use errors::SketchError as Error;

pub mod cmd;
pub mod encodings;
pub mod ffi;
pub mod signature;
pub mod sketch;

use murmurhash3::murmurhash3_x64_128;

/// Hash values stored by every sketch in this crate.
pub type HashIntoType = u64;

/// Hash a word with MurmurHash3 x64-128, keeping the low 64 bits.
///
/// This exact construction is part of the on-disk and FFI contract:
/// conforming implementations must produce byte-identical sketches for
/// identical inputs and seed.
pub fn hash_murmur(kmer: &[u8], seed: u64) -> u64 {
    murmurhash3_x64_128(kmer, seed).0
}
