//! # Liquids Core
//!
//! `liquids-core` contains the serialization and hashing plumbing shared by
//! the `liquids` transaction crates.
//!
//! ## Crate Layout
//!
//! ### Hashes
//!
//! The hashes module provides hash writers with a `std::io::Write` interface
//! (Bitcoin-style double-sha2, plain sha2, and BIP-340-style tagged sha2),
//! plus tooling for newtyping 32-byte digests. Marked digests are intended to
//! prevent type-confusion between TXIDs, WTXIDs, block hashes, and other
//! 32-byte values.
//!
//! #### ByteFormat trait
//!
//! The `ByteFormat` trait is a simple serialization API using
//! `std::io::{Read, Write}`. Implementers define the binary serialization
//! format of the type. The transaction types must implement `ByteFormat`, as
//! txid and sighash logic assumes access to the `write_to` method.
//!
//! `ByteFormat` has an associated `Error` type. Most basic types can simply
//! use the provided `SerError`. More complex (de)serialization will want to
//! implement a custom error type to handle (e.g.) invalid transactions. These
//! types must be easily instantiated from a `SerError` or an `std::io::Error`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

#[macro_use]
pub mod macros;

pub mod hashes;
pub mod ser;
