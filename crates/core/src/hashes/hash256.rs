//! Bitcoin-style double-sha2 with a `Write` interface.

use digest::Digest as Sha2Digest;
use sha2::Sha256;
use std::io::{Result as IOResult, Write};

use crate::hashes::marked::{Digest, MarkedDigestWriter};

/// A raw 32-byte digest. Marked newtypes (TXIDs etc.) wrap this.
pub type Hash256Digest = [u8; 32];

impl Digest for Hash256Digest {}

/// A struct that exposes a Bitcoin-style Hash256 `Write` interface by
/// wrapping an internal SHA2 instance.
///
/// ```
/// # use std::io::{Result, Write};
/// use liquids_core::hashes::{Hash256Writer, MarkedDigestWriter};
///
/// # fn main() -> Result<()> {
/// let mut w = Hash256Writer::default();
/// # let data = [0u8; 32];
///
/// // Writing more than once will update the hasher.
/// w.write(&data)?;
///
/// // Call finish to consume the hasher and produce the digest.
/// let digest = w.finish();
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Hash256Writer {
    internal: Sha256,
}

impl Write for Hash256Writer {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.internal.update(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl MarkedDigestWriter<Hash256Digest> for Hash256Writer {
    fn finish(self) -> Hash256Digest {
        let first = self.internal.finalize();
        let second = Sha256::digest(first);
        let mut digest = Hash256Digest::default();
        digest.copy_from_slice(&second[..]);
        digest
    }
}
