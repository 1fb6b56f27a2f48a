//! This module holds `MarkedDigest` types used by Elements transactions.

use liquids_core::{hashes::Hash256Digest, mark_32_byte_hash};

mark_32_byte_hash!(
    /// A marked digest representing transaction IDs. Byte order matches the
    /// value returned by `LiquidTx::txid`, i.e. the reversed double-sha2 of
    /// the witness-stripped serialization.
    TXID,
    Hash256Digest
);
mark_32_byte_hash!(
    /// A marked digest representing witness transaction IDs, in internal
    /// (unreversed) byte order.
    WTXID,
    Hash256Digest
);
mark_32_byte_hash!(
    /// A marked digest representing block hashes, in internal byte order.
    /// The taproot sighash commits to the genesis block hash this way.
    BlockHash,
    Hash256Digest
);

#[cfg(test)]
mod test {
    use super::*;
    use liquids_core::ser::ByteFormat;

    #[test]
    fn it_serializes_and_derializes_hash256digests() {
        let cases = [(
            TXID::default(),
            "0000000000000000000000000000000000000000000000000000000000000000",
        )];
        for case in cases.iter() {
            let digest = TXID::deserialize_hex(case.1).unwrap();
            assert_eq!(digest.serialized_length(), 32);
            assert_eq!(digest, case.0);
            assert_eq!(digest.serialize_hex().unwrap(), case.1);
        }
    }

    #[test]
    fn it_reverses_marked_digests_for_display() {
        use liquids_core::hashes::MarkedDigest;
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let txid = TXID::from(bytes);
        assert_eq!(
            txid.to_be_hex(),
            "00000000000000000000000000000000000000000000000000000000000000ab"
        );
        assert_eq!(TXID::from_be_hex(&txid.to_be_hex()).unwrap(), txid);
        assert_eq!(txid.reversed().reversed(), txid);
    }
}
