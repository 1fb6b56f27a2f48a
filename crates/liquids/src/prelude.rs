pub use crate::{
    hashes::{BlockHash, TXID, WTXID},
    types::*,
};

pub use liquids_core::{
    hashes::{Hash256Digest, Hash256Writer, MarkedDigest, MarkedDigestWriter, Sha256Writer},
    ser::{ByteFormat, SerError},
};
