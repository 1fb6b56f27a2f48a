//! Elements Outpoint, TxIn, Vin, and per-input witness types.

use std::io::{Read, Write};

use liquids_core::ser::{ByteFormat, SerError, SerResult};

use crate::{
    hashes::TXID,
    types::{
        confidential::AssetIssuance,
        script::{RangeProof, ScriptSig, Witness},
        tx::{TxError, TxResult},
    },
};

/// Set on the wire outpoint index when the input carries an inline asset
/// issuance.
pub const OUTPOINT_ISSUANCE_FLAG: u32 = 0x8000_0000;

/// Set on the wire outpoint index when the input spends a peg-in.
pub const OUTPOINT_PEGIN_FLAG: u32 = 0x4000_0000;

/// Masks the two flag bits off a wire outpoint index, leaving the logical
/// index.
pub const OUTPOINT_INDEX_MASK: u32 = 0x3fff_ffff;

/// The index sentinel used by coinbase inputs. Preserved verbatim on read
/// and write; never masked or flagged.
pub const NULL_OUTPOINT_INDEX: u32 = 0xffff_ffff;

/// An Outpoint. This is a unique identifier for a UTXO, composed of a
/// transaction ID (in Bitcoin-style LE format) and the *logical* index of
/// the output being spent within that transaction's output vector. The
/// issuance and peg-in flag bits that Elements packs into the high bits of
/// the wire index live on the input, not here.
///
/// `Outpoint::null()` and `Outpoint::default()` return the null outpoint,
/// which references a txid of all 0 and an index of 0xffff_ffff. This null
/// outpoint is used in every coinbase transaction.
#[derive(serde::Serialize, serde::Deserialize, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Outpoint {
    /// The txid that created the UTXO being pointed to.
    pub txid: TXID,
    /// The logical index of that UTXO in the transaction's output vector.
    /// Never has the flag bits set, except as part of the sentinel.
    pub idx: u32,
}

impl Outpoint {
    /// Returns a new Outpoint from a digest and index
    pub fn new(txid: TXID, idx: u32) -> Self {
        Self { txid, idx }
    }

    /// Returns the `default`, or `null` Outpoint. This is used in the
    /// coinbase input.
    pub fn null() -> Self {
        Outpoint {
            txid: TXID::default(),
            idx: NULL_OUTPOINT_INDEX,
        }
    }
}

impl Default for Outpoint {
    fn default() -> Self {
        Outpoint::null()
    }
}

impl ByteFormat for Outpoint {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        36
    }

    fn read_from<T>(reader: &mut T, _limit: usize) -> SerResult<Self>
    where
        T: Read,
        Self: std::marker::Sized,
    {
        Ok(Outpoint {
            txid: TXID::read_from(reader, 0)?,
            idx: Self::read_u32_le(reader)?,
        })
    }

    fn write_to<T>(&self, writer: &mut T) -> SerResult<usize>
    where
        T: Write,
    {
        let mut len = self.txid.write_to(writer)?;
        len += Self::write_u32_le(writer, self.idx)?;
        Ok(len)
    }
}

/// The witness fields attached to a single input by the extended
/// serialization suffix: two opaque issuance proofs, the script witness
/// stack, and the peg-in witness stack.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct InputWitness {
    /// Range proof for a blinded issuance amount. May be empty.
    pub issuance_range_proof: RangeProof,
    /// Range proof for blinded inflation keys. May be empty.
    pub inflation_range_proof: RangeProof,
    /// The script witness stack.
    pub script_witness: Witness,
    /// The peg-in witness stack.
    pub pegin_witness: Witness,
}

impl InputWitness {
    /// True if the script witness stack is empty. Only the script witness
    /// decides whether the input counts as witnessed for serialization;
    /// proofs and peg-in data alone do not trigger the extended flag,
    /// matching upstream behavior.
    pub fn is_empty(&self) -> bool {
        self.script_witness.is_empty()
    }
}

impl ByteFormat for InputWitness {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        use liquids_core::ser::prefix_byte_len;
        let mut len = self.issuance_range_proof.serialized_length();
        len += self.inflation_range_proof.serialized_length();
        len += prefix_byte_len(self.script_witness.len() as u64) as usize;
        len += self.script_witness.serialized_length();
        len += prefix_byte_len(self.pegin_witness.len() as u64) as usize;
        len += self.pegin_witness.serialized_length();
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(InputWitness {
            issuance_range_proof: RangeProof::read_from(reader, 0)?,
            inflation_range_proof: RangeProof::read_from(reader, 0)?,
            script_witness: Self::read_prefix_vec(reader)?,
            pegin_witness: Self::read_prefix_vec(reader)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.issuance_range_proof.write_to(writer)?;
        len += self.inflation_range_proof.write_to(writer)?;
        len += Self::write_prefix_vec(writer, &self.script_witness)?;
        len += Self::write_prefix_vec(writer, &self.pegin_witness)?;
        Ok(len)
    }
}

/// An Elements transaction input.
///
/// On the wire the outpoint index packs two flag bits:
/// `OUTPOINT_ISSUANCE_FLAG` when `issuance` is present, and
/// `OUTPOINT_PEGIN_FLAG` when `is_pegin` is set. In memory we keep the
/// logical index and derive the wire form on serialization, so there is a
/// single source of truth for issuance presence. The coinbase sentinel
/// index `0xffff_ffff` bypasses flag packing entirely.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct LiquidTxIn {
    /// The Outpoint identifying the UTXO being spent.
    pub outpoint: Outpoint,
    /// For Legacy transactions, the authorization information necessary to
    /// spend the UTXO.
    pub script_sig: ScriptSig,
    /// The nSequence field
    pub sequence: u32,
    /// True if the input spends a federated peg-in deposit.
    pub is_pegin: bool,
    /// An inline asset issuance, if this input mints assets.
    pub issuance: Option<AssetIssuance>,
    /// The witness fields carried by the extended serialization suffix.
    pub witness: InputWitness,
}

impl LiquidTxIn {
    /// Instantiate a new LiquidTxIn with no issuance, no peg-in flag, and
    /// an empty witness.
    pub fn new<T>(outpoint: Outpoint, script_sig: T, sequence: u32) -> Self
    where
        T: Into<ScriptSig>,
    {
        LiquidTxIn {
            outpoint,
            script_sig: script_sig.into(),
            sequence,
            is_pegin: false,
            issuance: None,
            witness: InputWitness::default(),
        }
    }

    /// The flag byte committed to by the taproot sighash:
    /// bit 7 = issuance present, bit 6 = peg-in.
    pub fn outpoint_flag(&self) -> u8 {
        (u8::from(self.issuance.is_some()) << 7) | (u8::from(self.is_pegin) << 6)
    }
}

impl ByteFormat for LiquidTxIn {
    type Error = TxError;

    fn serialized_length(&self) -> usize {
        let mut len = self.outpoint.serialized_length();
        len += self.script_sig.serialized_length();
        len += 4; // sequence
        if self.outpoint.idx != NULL_OUTPOINT_INDEX {
            if let Some(issuance) = &self.issuance {
                len += issuance.serialized_length();
            }
        }
        len
    }

    fn read_from<T>(reader: &mut T, _limit: usize) -> TxResult<Self>
    where
        T: Read,
        Self: std::marker::Sized,
    {
        let txid = TXID::read_from(reader, 0)?;
        let raw_idx = Self::read_u32_le(reader)?;
        let script_sig = ScriptSig::read_from(reader, 0)?;
        let sequence = Self::read_u32_le(reader)?;

        let mut idx = raw_idx;
        let mut is_pegin = false;
        let mut has_issuance = false;
        if raw_idx != NULL_OUTPOINT_INDEX {
            has_issuance = raw_idx & OUTPOINT_ISSUANCE_FLAG != 0;
            is_pegin = raw_idx & OUTPOINT_PEGIN_FLAG != 0;
            idx = raw_idx & OUTPOINT_INDEX_MASK;
        }
        let issuance = if has_issuance {
            Some(AssetIssuance::read_from(reader, 0)?)
        } else {
            None
        };

        Ok(LiquidTxIn {
            outpoint: Outpoint::new(txid, idx),
            script_sig,
            sequence,
            is_pegin,
            issuance,
            witness: InputWitness::default(),
        })
    }

    fn write_to<T>(&self, writer: &mut T) -> TxResult<usize>
    where
        T: Write,
    {
        let mut idx = self.outpoint.idx;
        if idx != NULL_OUTPOINT_INDEX {
            if idx & OUTPOINT_ISSUANCE_FLAG != 0 && self.issuance.is_none() {
                return Err(TxError::MissingIssuance);
            }
            if self.issuance.is_some() {
                idx |= OUTPOINT_ISSUANCE_FLAG;
            }
            if self.is_pegin {
                idx |= OUTPOINT_PEGIN_FLAG;
            }
        }

        let mut len = self.outpoint.txid.write_to(writer)?;
        len += Self::write_u32_le(writer, idx)?;
        len += self.script_sig.write_to(writer)?;
        len += Self::write_u32_le(writer, self.sequence)?;
        // the sentinel has no flag bits, so it can never signal an issuance
        if self.outpoint.idx != NULL_OUTPOINT_INDEX {
            if let Some(issuance) = &self.issuance {
                len += issuance.write_to(writer)?;
            }
        }
        Ok(len)
    }
}

/// Vin is a type alias for `Vec<LiquidTxIn>`. A transaction's Vin is the
/// Vector of INputs, with a length prefix.
pub type Vin = Vec<LiquidTxIn>;

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::script::WitnessStackItem;

    static NULL_OUTPOINT: &str =
        "0000000000000000000000000000000000000000000000000000000000000000ffffffff";

    #[test]
    fn it_serializes_and_derializes_outpoints() {
        let cases = [
            (
                Outpoint {
                    txid: TXID::default(),
                    idx: 0,
                },
                (0..36).map(|_| "00").collect::<String>(),
            ),
            (Outpoint::null(), NULL_OUTPOINT.to_string()),
        ];
        for case in cases.iter() {
            assert_eq!(case.0.serialized_length(), case.1.len() / 2);
            assert_eq!(case.0.serialize_hex().unwrap(), case.1);
            assert_eq!(Outpoint::deserialize_hex(&case.1).unwrap(), case.0);
        }
    }

    #[test]
    fn it_preserves_the_coinbase_sentinel() {
        let hex_str = format!("{}{}{}", NULL_OUTPOINT, "00", "ffffffff");
        let input = LiquidTxIn::deserialize_hex(&hex_str).unwrap();
        assert_eq!(input.outpoint.idx, NULL_OUTPOINT_INDEX);
        assert!(!input.is_pegin);
        assert!(input.issuance.is_none());
        assert_eq!(input.serialize_hex().unwrap(), hex_str);
    }

    #[test]
    fn it_unpacks_outpoint_flag_bits() {
        // logical index 2, issuance + pegin bits set, null issuance record
        let hex_str = concat!(
            "1111111111111111111111111111111111111111111111111111111111111111",
            // 0xc0000002 LE
            "020000c0",
            "00",
            "feffffff",
            // issuance: zero nonce, zero entropy, two null amounts
            "0000000000000000000000000000000000000000000000000000000000000000",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "0000",
        );
        let input = LiquidTxIn::deserialize_hex(hex_str).unwrap();
        assert_eq!(input.outpoint.idx, 2);
        assert!(input.is_pegin);
        assert!(input.issuance.is_some());
        assert_eq!(input.outpoint_flag(), 0xc0);
        assert_eq!(input.serialize_hex().unwrap(), hex_str);
    }

    #[test]
    fn it_counts_only_the_script_witness_as_witness_data() {
        let mut witness = InputWitness {
            issuance_range_proof: RangeProof::new(vec![0xaa; 8]),
            inflation_range_proof: RangeProof::new(vec![0xbb; 8]),
            script_witness: vec![],
            pegin_witness: vec![WitnessStackItem::new(vec![0xcc])],
        };
        assert!(witness.is_empty());

        witness.script_witness.push(WitnessStackItem::new(vec![0xdd]));
        assert!(!witness.is_empty());
    }

    #[test]
    fn it_refuses_to_write_flagged_indices_without_issuance() {
        let mut input = LiquidTxIn::new(Outpoint::default(), vec![], 0xffff_ffff);
        input.outpoint.idx = OUTPOINT_ISSUANCE_FLAG | 7;
        match input.serialize_hex() {
            Err(TxError::MissingIssuance) => {}
            other => panic!("expected MissingIssuance, got {:?}", other),
        }
    }
}
