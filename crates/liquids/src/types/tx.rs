//! The Elements transaction: model, two-mode codec, size oracle, and ID
//! derivation.

use std::io::{Cursor, Error as IOError, Read, Write};
use thiserror::Error;

use liquids_core::{
    hashes::{Hash256Writer, MarkedDigest, MarkedDigestWriter},
    ser::{prefix_byte_len, ByteFormat, SerError},
};

use crate::{
    hashes::{TXID, WTXID},
    types::{
        txin::{InputWitness, LiquidTxIn, Vin},
        txout::{LiquidTxOut, OutputWitness, Vout},
    },
};

/// The default nSequence: no relative locktime, no RBF signaling.
pub const DEFAULT_SEQUENCE: u32 = 0xffff_ffff;

/// Bit 0 of the flag byte: the transaction uses the extended serialization
/// with the witness/proof suffix.
pub const ADVANCED_TRANSACTION_FLAG: u8 = 0x01;

/// Witness bytes are discounted 4:1 in weight calculations.
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// Thirty-two zero bytes. Substituted for omitted sub-hashes in the v0
/// sighash, and used as blank asset/nonce fields by the legacy sighash.
pub const ZERO_32: [u8; 32] = [0u8; 32];

/// The 32-byte constant returned by the legacy sighash in place of the two
/// historical out-of-range quirks. This is a specified output, not an
/// error.
pub const ONE_32: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1,
];

/// The raw 8-byte all-ones value carried by the blank output of legacy
/// SIGHASH_SINGLE.
pub const VALUE_MAX_U64: [u8; 8] = [0xff; 8];

/// An Error type for transaction objects
#[derive(Debug, Error)]
pub enum TxError {
    /// Serialization-related errors
    #[error(transparent)]
    Ser(#[from] SerError),

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to`
    /// implementation.
    #[error(transparent)]
    Io(#[from] IOError),

    /// An input's outpoint index carries the issuance flag bit but the
    /// input has no issuance record.
    #[error("Outpoint index has the issuance bit set but no issuance is attached")]
    MissingIssuance,

    /// The taproot sighash received companion arrays of the wrong length.
    #[error("Prevout arrays ({prevouts}) must match the input count ({inputs})")]
    MismatchedPrevouts {
        /// Length of the offending companion array.
        prevouts: usize,
        /// Number of transaction inputs.
        inputs: usize,
    },

    /// An operation addressed a non-existent input or output.
    #[error("Index {index} out of range for length {len}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the addressed vector.
        len: usize,
    },
}

/// Type alias for result with TxError
pub type TxResult<T> = Result<T, TxError>;

/// The serialization mode switches. The wire format, the txid preimage, the
/// weight calculation, and the legacy sighash preimage are all the same
/// pass over the transaction with different switches thrown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SerMode {
    /// Permit the flag byte to signal witnesses, and append the
    /// witness/proof suffix when the transaction has witness data.
    pub allow_witness: bool,
    /// Force the flag byte to zero and omit the suffix even when witness
    /// data exists. Used by txid computation.
    pub force_zero_flag: bool,
    /// Omit the flag byte entirely and blind output values when witness
    /// data exists. Used only by the legacy sighash.
    pub for_signature: bool,
}

impl SerMode {
    /// Full extended serialization: the wire form and the wtxid preimage.
    pub const FULL: SerMode = SerMode {
        allow_witness: true,
        force_zero_flag: false,
        for_signature: false,
    };

    /// The witness-stripped form hashed for the txid.
    pub const NO_WITNESS: SerMode = SerMode {
        allow_witness: true,
        force_zero_flag: true,
        for_signature: false,
    };

    /// The base-size form used by the weight calculation.
    pub const BASE: SerMode = SerMode {
        allow_witness: false,
        force_zero_flag: false,
        for_signature: false,
    };

    /// The legacy sighash preimage form.
    pub const SIGNING: SerMode = SerMode {
        allow_witness: false,
        force_zero_flag: false,
        for_signature: true,
    };
}

/// An Elements confidential transaction.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq, Default)]
pub struct LiquidTx {
    /// The version number.
    pub version: i32,
    /// The advanced-serialization flag byte as read from the wire. Bit 0
    /// set means the buffer carried the witness/proof suffix. Derived, not
    /// consulted, on serialization of freshly built transactions.
    pub flag: u8,
    /// The vector of inputs
    pub vin: Vin,
    /// The vector of outputs
    pub vout: Vout,
    /// The nLocktime field.
    pub locktime: u32,
}

impl LiquidTx {
    /// Instantiate a new LiquidTx with a zero flag byte. The extended
    /// serialization is still emitted if any input or output carries
    /// witness data.
    pub fn new<I, O>(version: i32, vin: I, vout: O, locktime: u32) -> Self
    where
        I: Into<Vec<LiquidTxIn>>,
        O: Into<Vec<LiquidTxOut>>,
    {
        Self {
            version,
            flag: 0,
            vin: vin.into(),
            vout: vout.into(),
            locktime,
        }
    }

    /// True if the transaction must be serialized in the extended format:
    /// the wire flag was set, an input has a script witness, or an output
    /// carries both of its proofs.
    pub fn has_witnesses(&self) -> bool {
        self.flag & ADVANCED_TRANSACTION_FLAG != 0
            || self.vin.iter().any(|i| !i.witness.is_empty())
            || self.vout.iter().any(|o| o.witness.is_witnessed())
    }

    /// True if this is a coinbase: a single input spending the null txid.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].outpoint.txid == TXID::default()
    }

    /// Deserialize a transaction from a byte buffer. Unless `non_strict`
    /// is set, the buffer must be exactly consumed.
    pub fn from_bytes(buf: &[u8], non_strict: bool) -> TxResult<Self> {
        let mut cursor = Cursor::new(buf);
        let tx = Self::read_from(&mut cursor, 0)?;
        let consumed = cursor.position() as usize;
        if !non_strict && consumed != buf.len() {
            return Err(SerError::TrailingBytes(buf.len() - consumed).into());
        }
        Ok(tx)
    }

    /// Serialize the transaction to a fresh pre-sized buffer, with or
    /// without the witness/proof suffix.
    pub fn to_bytes(&self, allow_witness: bool) -> TxResult<Vec<u8>> {
        let mode = if allow_witness {
            SerMode::FULL
        } else {
            SerMode::BASE
        };
        let mut buf = Vec::with_capacity(self.serialized_length_with(mode));
        self.write_with(&mut buf, mode)?;
        Ok(buf)
    }

    /// Serialize under the given mode switches.
    pub fn write_with<W>(&self, writer: &mut W, mode: SerMode) -> TxResult<usize>
    where
        W: Write,
    {
        let has_witnesses = mode.allow_witness && self.has_witnesses() && !mode.force_zero_flag;
        let blind_values = mode.for_signature && self.has_witnesses();

        let mut len = Self::write_i32_le(writer, self.version)?;
        if !mode.for_signature {
            let flag = if has_witnesses {
                ADVANCED_TRANSACTION_FLAG
            } else {
                0
            };
            len += Self::write_u8(writer, flag)?;
        }

        len += Self::write_compact_int(writer, self.vin.len() as u64)?;
        for input in self.vin.iter() {
            len += input.write_to(writer)?;
        }

        len += Self::write_compact_int(writer, self.vout.len() as u64)?;
        for output in self.vout.iter() {
            len += output.write_body(writer, blind_values)?;
        }

        len += Self::write_u32_le(writer, self.locktime)?;

        if has_witnesses {
            for input in self.vin.iter() {
                len += input.witness.write_to(writer)?;
            }
            for output in self.vout.iter() {
                len += output.witness.write_to(writer)?;
            }
        }
        Ok(len)
    }

    /// Exact byte length of the serialization under the given mode
    /// switches.
    pub fn serialized_length_with(&self, mode: SerMode) -> usize {
        let has_witnesses = mode.allow_witness && self.has_witnesses() && !mode.force_zero_flag;
        let blind_values = mode.for_signature && self.has_witnesses();

        let mut len = 4; // version
        if !mode.for_signature {
            len += 1; // flag
        }
        len += prefix_byte_len(self.vin.len() as u64) as usize;
        len += self.vin.iter().map(|i| i.serialized_length()).sum::<usize>();
        len += prefix_byte_len(self.vout.len() as u64) as usize;
        len += self
            .vout
            .iter()
            .map(|o| o.body_length(blind_values))
            .sum::<usize>();
        len += 4; // locktime
        if has_witnesses {
            len += self
                .vin
                .iter()
                .map(|i| i.witness.serialized_length())
                .sum::<usize>();
            len += self
                .vout
                .iter()
                .map(|o| o.witness.serialized_length())
                .sum::<usize>();
        }
        len
    }

    /// Byte length of the witness-stripped serialization.
    pub fn base_size(&self) -> usize {
        self.serialized_length_with(SerMode::BASE)
    }

    /// Byte length of the full extended serialization.
    pub fn total_size(&self) -> usize {
        self.serialized_length_with(SerMode::FULL)
    }

    /// Transaction weight: `base_size * 3 + total_size`.
    pub fn weight(&self) -> usize {
        self.base_size() * (WITNESS_SCALE_FACTOR - 1) + self.total_size()
    }

    /// Virtual size: weight scaled down by the witness discount, rounded
    /// up.
    pub fn vsize(&self) -> usize {
        (self.weight() + WITNESS_SCALE_FACTOR - 1) / WITNESS_SCALE_FACTOR
    }

    /// Calculates the transaction ID: the double-sha2 of the
    /// witness-stripped serialization, byte-reversed.
    pub fn txid(&self) -> TxResult<TXID> {
        let mut w = Hash256Writer::default();
        self.write_with(&mut w, SerMode::NO_WITNESS)?;
        Ok(w.finish_marked::<TXID>().reversed())
    }

    /// Calculates the witness transaction ID: the double-sha2 of the full
    /// extended serialization, *not* reversed. A coinbase's wtxid is
    /// defined to be all zeroes regardless of its serialization.
    pub fn wtxid(&self) -> TxResult<WTXID> {
        if self.is_coinbase() {
            return Ok(WTXID::default());
        }
        let mut w = Hash256Writer::default();
        self.write_with(&mut w, SerMode::FULL)?;
        Ok(w.finish_marked())
    }
}

impl ByteFormat for LiquidTx {
    type Error = TxError;

    fn serialized_length(&self) -> usize {
        self.serialized_length_with(SerMode::FULL)
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> TxResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let version = Self::read_i32_le(reader)?;
        let flag = Self::read_u8(reader)?;
        let mut vin: Vin = Self::read_prefix_vec(reader)?;
        let mut vout: Vout = Self::read_prefix_vec(reader)?;
        let locktime = Self::read_u32_le(reader)?;

        if flag & ADVANCED_TRANSACTION_FLAG != 0 {
            for input in vin.iter_mut() {
                input.witness = InputWitness::read_from(reader, 0)?;
            }
            for output in vout.iter_mut() {
                output.witness = OutputWitness::read_from(reader, 0)?;
            }
        }

        Ok(Self {
            version,
            flag,
            vin,
            vout,
            locktime,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> TxResult<usize>
    where
        W: Write,
    {
        self.write_with(writer, SerMode::FULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::txin::Outpoint;

    #[test]
    fn it_assembles_and_serializes_simple_txns() {
        let input = LiquidTxIn::new(Outpoint::null(), vec![], DEFAULT_SEQUENCE);
        let output = LiquidTxOut::new([0x22u8; 32], 50_000, vec![0x51]);
        let tx = LiquidTx::new(2, vec![input], vec![output], 0);

        let expected = concat!(
            "02000000",
            "00",
            "01",
            "0000000000000000000000000000000000000000000000000000000000000000ffffffff00ffffffff",
            "01",
            "012222222222222222222222222222222222222222222222222222222222222222",
            "01000000000000c350",
            "00",
            "0151",
            "00000000",
        );
        assert_eq!(tx.serialize_hex().unwrap(), expected);
        assert_eq!(tx.serialized_length(), expected.len() / 2);
        assert_eq!(LiquidTx::deserialize_hex(expected).unwrap(), tx);

        // no witness data, so all four sizes agree
        assert_eq!(tx.base_size(), tx.total_size());
        assert_eq!(tx.weight(), 4 * tx.base_size());
        assert_eq!(tx.vsize(), tx.base_size());
    }

    #[test]
    fn it_errors_on_trailing_bytes_in_strict_mode() {
        let input = LiquidTxIn::new(Outpoint::null(), vec![], DEFAULT_SEQUENCE);
        let tx = LiquidTx::new(2, vec![input], vec![], 0);
        let mut buf = tx.to_bytes(true).unwrap();
        buf.push(0xde);

        match LiquidTx::from_bytes(&buf, false) {
            Err(TxError::Ser(SerError::TrailingBytes(1))) => {}
            other => panic!("expected TrailingBytes, got {:?}", other),
        }
        // non-strict tolerates the same buffer
        assert_eq!(LiquidTx::from_bytes(&buf, true).unwrap(), tx);
    }

    #[test]
    fn it_detects_coinbases() {
        let coinbase = LiquidTx::new(
            2,
            vec![LiquidTxIn::new(Outpoint::null(), vec![0x01, 0x02], DEFAULT_SEQUENCE)],
            vec![LiquidTxOut::new([0x22u8; 32], 0, vec![])],
            0,
        );
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.wtxid().unwrap(), WTXID::default());

        let spend = LiquidTx::new(
            2,
            vec![LiquidTxIn::new(
                Outpoint::new(TXID::from([0xaa; 32]), 0),
                vec![],
                DEFAULT_SEQUENCE,
            )],
            vec![],
            0,
        );
        assert!(!spend.is_coinbase());
        assert_ne!(spend.wtxid().unwrap(), WTXID::default());
    }
}
