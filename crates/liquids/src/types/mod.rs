//! Holds Elements transaction types and components.

/// Confidential assets, values, nonces, and the issuance record.
pub mod confidential;

/// Opaque script and proof byte-vector types.
pub mod script;

/// The sighash engine: legacy, segwit v0, and taproot v1 dialects.
pub mod sighash;

/// The transaction model, codec, and ID derivation.
pub mod tx;

/// Outpoints, inputs, and per-input witnesses.
pub mod txin;

/// Outputs and per-output witnesses.
pub mod txout;

pub use confidential::*;
pub use script::*;
pub use sighash::*;
pub use tx::*;
pub use txin::*;
pub use txout::*;
