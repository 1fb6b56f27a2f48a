//! Single and BIP-340-style tagged sha2 with a `Write` interface.

use digest::Digest as Sha2Digest;
use sha2::Sha256;
use std::io::{Result as IOResult, Write};

use crate::hashes::{
    hash256::Hash256Digest,
    marked::{MarkedDigest, MarkedDigestWriter},
};

/// A struct that exposes a single-SHA2 `Write` interface. Used where a
/// protocol commits to `sha256(x)` rather than Bitcoin's `sha256d(x)`.
#[derive(Default)]
pub struct Sha256Writer {
    internal: Sha256,
}

impl Sha256Writer {
    /// Returns a writer whose hasher has been pre-fed
    /// `sha256(tag) || sha256(tag)`, producing the BIP-340 tagged hash
    /// `sha256(sha256(tag) || sha256(tag) || msg)` of whatever is
    /// subsequently written.
    pub fn tagged(tag: &[u8]) -> Self {
        let tag_digest = Sha256::digest(tag);
        let mut internal = Sha256::new();
        internal.update(tag_digest);
        internal.update(tag_digest);
        Self { internal }
    }
}

impl Write for Sha256Writer {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl MarkedDigestWriter<Hash256Digest> for Sha256Writer {
    fn finish(self) -> Hash256Digest {
        let result = self.internal.finalize();
        let mut digest = Hash256Digest::default();
        digest.copy_from_slice(&result[..]);
        digest
    }
}

/// Convenience function for the tagged hash of a complete message.
pub fn tagged_hash(tag: &[u8], msg: &[u8]) -> Hash256Digest {
    let mut w = Sha256Writer::tagged(tag);
    w.write_all(msg).expect("no IOError from SHA2");
    w.finish()
}

/// Convenience function for a single sha256.
pub fn sha256(msg: &[u8]) -> Hash256Digest {
    let mut w = Sha256Writer::default();
    w.write_all(msg).expect("no IOError from SHA2");
    w.finish()
}

/// Convenience function wrapping a digest in a marked type.
pub fn sha256_marked<M: MarkedDigest<Digest = Hash256Digest>>(msg: &[u8]) -> M {
    M::new(sha256(msg))
}
