//! Elements TxOut, Vout, and per-output witness types.

use std::io::{Read, Write};

use liquids_core::ser::{ByteFormat, SerError, SerResult};

use crate::types::{
    confidential::{ConfidentialAsset, ConfidentialNonce, ConfidentialValue},
    script::{RangeProof, ScriptPubkey, SurjectionProof},
    tx::{VALUE_MAX_U64, ZERO_32},
};

/// The witness fields attached to a single output by the extended
/// serialization suffix: the surjection proof, then the range proof.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct OutputWitness {
    /// Proof that the output asset is drawn from the input asset set. May
    /// be empty.
    pub surjection_proof: SurjectionProof,
    /// Proof that the committed value is in range. May be empty.
    pub range_proof: RangeProof,
}

impl OutputWitness {
    /// True if both proofs are empty.
    pub fn is_empty(&self) -> bool {
        self.surjection_proof.is_empty() && self.range_proof.is_empty()
    }

    /// True if the output counts as witnessed for serialization purposes.
    /// Only an output carrying *both* proofs triggers the extended flag;
    /// this matches upstream behavior for the half-populated case, which
    /// does not occur in practice.
    pub fn is_witnessed(&self) -> bool {
        !self.surjection_proof.is_empty() && !self.range_proof.is_empty()
    }
}

impl ByteFormat for OutputWitness {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.surjection_proof.serialized_length() + self.range_proof.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(OutputWitness {
            surjection_proof: SurjectionProof::read_from(reader, 0)?,
            range_proof: RangeProof::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.surjection_proof.write_to(writer)?;
        len += self.range_proof.write_to(writer)?;
        Ok(len)
    }
}

/// An Elements output: a confidential asset, value, and nonce, followed by
/// the script pubkey. The proofs travel separately in the extended
/// serialization suffix.
///
/// `LiquidTxOut::null()` and `LiquidTxOut::default()` return the blank
/// output substituted below the signed index by legacy SIGHASH_SINGLE: raw
/// 32-zero-byte asset and nonce, a raw 8-byte 0xff..ff value, and an empty
/// script.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct LiquidTxOut {
    /// The asset being paid, explicit or committed.
    pub asset: ConfidentialAsset,
    /// The amount being paid, explicit or committed.
    pub value: ConfidentialValue,
    /// The ECDH nonce used by the receiver to unblind, or null.
    pub nonce: ConfidentialNonce,
    /// The `ScriptPubkey` which locks the UTXO.
    pub script_pubkey: ScriptPubkey,
    /// The proofs carried by the extended serialization suffix.
    pub witness: OutputWitness,
}

impl Default for LiquidTxOut {
    fn default() -> Self {
        Self::null()
    }
}

impl LiquidTxOut {
    /// Instantiate a new explicit LiquidTxOut.
    pub fn new<T>(asset: [u8; 32], value: u64, script_pubkey: T) -> Self
    where
        T: Into<ScriptPubkey>,
    {
        LiquidTxOut {
            asset: ConfidentialAsset::explicit(asset),
            value: ConfidentialValue::explicit(value),
            nonce: ConfidentialNonce::null(),
            script_pubkey: script_pubkey.into(),
            witness: OutputWitness::default(),
        }
    }

    /// Instantiate the blank output used below the signed index by legacy
    /// SIGHASH_SINGLE. Its fields are the *prefixless* raw forms the
    /// preimage layout requires, emitted verbatim by serialization.
    pub fn null() -> Self {
        LiquidTxOut {
            asset: ConfidentialAsset::from_raw(ZERO_32.to_vec()),
            value: ConfidentialValue::from_raw(VALUE_MAX_U64.to_vec()),
            nonce: ConfidentialNonce::from_raw(ZERO_32.to_vec()),
            script_pubkey: ScriptPubkey::null(),
            witness: OutputWitness::default(),
        }
    }

    /// Serialize the output body. When `blind_value` is set (legacy
    /// signing of a witness-bearing transaction), the stored value is
    /// replaced on the wire by a single 0x00 byte followed by a zero LE
    /// u64.
    pub(crate) fn write_body<W>(&self, writer: &mut W, blind_value: bool) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.asset.write_to(writer)?;
        if blind_value {
            len += Self::write_u8(writer, 0x00)?;
            len += Self::write_u64_le(writer, 0)?;
        } else {
            len += self.value.write_to(writer)?;
        }
        len += self.nonce.write_to(writer)?;
        len += self.script_pubkey.write_to(writer)?;
        Ok(len)
    }

    /// Byte length of the output body under the given value substitution.
    pub(crate) fn body_length(&self, blind_value: bool) -> usize {
        let value_len = if blind_value {
            9
        } else {
            self.value.serialized_length()
        };
        self.asset.serialized_length()
            + value_len
            + self.nonce.serialized_length()
            + self.script_pubkey.serialized_length()
    }
}

impl ByteFormat for LiquidTxOut {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.body_length(false)
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(LiquidTxOut {
            asset: ConfidentialAsset::read_from(reader, 0)?,
            value: ConfidentialValue::read_from(reader, 0)?,
            nonce: ConfidentialNonce::read_from(reader, 0)?,
            script_pubkey: ScriptPubkey::read_from(reader, 0)?,
            witness: OutputWitness::default(),
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        self.write_body(writer, false)
    }
}

/// Vout is a type alias for `Vec<LiquidTxOut>`. A transaction's Vout is the
/// Vector of OUTputs, with a length prefix.
pub type Vout = Vec<LiquidTxOut>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_serializes_and_derializes_outputs() {
        let asset = [0x11u8; 32];
        let output = LiquidTxOut::new(asset, 1_000_000, vec![0x6a]);
        let expected = concat!(
            "011111111111111111111111111111111111111111111111111111111111111111",
            "0100000000000f4240",
            "00",
            "016a",
        );
        assert_eq!(output.serialized_length(), expected.len() / 2);
        assert_eq!(output.serialize_hex().unwrap(), expected);
        assert_eq!(LiquidTxOut::deserialize_hex(expected).unwrap(), output);
    }

    #[test]
    fn it_emits_the_blank_output_verbatim() {
        let blank = LiquidTxOut::null();
        let mut buf = vec![];
        blank.write_body(&mut buf, false).unwrap();
        let expected = concat!(
            "0000000000000000000000000000000000000000000000000000000000000000",
            "ffffffffffffffff",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "00",
        );
        assert_eq!(hex::encode(&buf), expected);
        assert_eq!(blank.serialized_length(), buf.len());
    }

    #[test]
    fn it_substitutes_values_when_signing_witness_txns() {
        let output = LiquidTxOut::new([0x11u8; 32], 1_000_000, vec![0x6a]);
        let mut buf = vec![];
        output.write_body(&mut buf, true).unwrap();
        let expected = concat!(
            "011111111111111111111111111111111111111111111111111111111111111111",
            "000000000000000000",
            "00",
            "016a",
        );
        assert_eq!(hex::encode(&buf), expected);
        assert_eq!(output.body_length(true), buf.len());
    }
}
