//! This crate provides a simple interface for parsing, serializing, and
//! hashing Elements-style confidential transactions.
//!
//! Transactions are treated as byte-oriented data structures: confidential
//! assets, values, and nonces are carried as opaque tag-prefixed byte
//! strings, range and surjection proofs are opaque varslices, and scripts
//! are opaque byte vectors. No consensus validation is performed.
//!
//! The sighash engine produces the digests signed by spending witnesses in
//! all three dialects: the legacy clone-and-mutate scheme, the BIP143-style
//! segwit v0 scheme with Elements issuance extensions, and the taproot v1
//! scheme with the Elements `TapSighash/elements` tag.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[doc(hidden)]
pub mod prelude;

pub mod hashes;
pub mod types;
