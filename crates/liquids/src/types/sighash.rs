//! The sighash engine: the digests signed by spending witnesses, in all
//! three dialects.
//!
//! * **Legacy**: the original clone-and-mutate scheme, double-sha2 over a
//!   `for_signature` serialization of a projected copy of the transaction.
//! * **SegWit v0**: BIP143-style, extended with the Elements issuance
//!   commitment, double-sha2 over a flat preimage of precomputed
//!   sub-hashes.
//! * **Taproot v1**: BIP341-style with the Elements extensions, a
//!   `TapSighash/elements`-tagged single sha2 over a preimage committing to
//!   every spent asset, value, script, flag, and proof.
//!
//! The sighash mode is a raw hash-type integer rather than an enum: the
//! five mode bits are orthogonal, `0x00` is a distinct taproot default, and
//! undefined output modes fall back to ALL semantics, all of which an
//! exhaustive enum obscures.

use std::io::Write;

use liquids_core::{
    hashes::{Hash256Digest, Hash256Writer, MarkedDigestWriter, Sha256Writer},
    ser::ByteFormat,
};

use crate::{
    hashes::BlockHash,
    types::{
        confidential::{ConfidentialAsset, ConfidentialValue},
        script::{RangeProof, Script, ScriptPubkey, ScriptSig},
        tx::{LiquidTx, SerMode, TxError, TxResult, ONE_32, ZERO_32},
        txout::LiquidTxOut,
    },
};

/// Taproot-only: behaves as SIGHASH_ALL while signaling "default signing".
pub const SIGHASH_DEFAULT: u32 = 0x00;
/// Sign ALL inputs and ALL outputs.
pub const SIGHASH_ALL: u32 = 0x01;
/// Sign ALL inputs and NO outputs.
pub const SIGHASH_NONE: u32 = 0x02;
/// Sign ALL inputs and the output paired with the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;
/// Modifier: sign only the input being spent.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;
/// Masks the taproot output-mode bits from a hash type.
pub const SIGHASH_OUTPUT_MASK: u32 = 0x03;
/// Masks the input-mode bit from a hash type.
pub const SIGHASH_INPUT_MASK: u32 = 0x80;

// Legacy and v0 select the output mode with the wider historical mask.
const LEGACY_OUTPUT_MASK: u32 = 0x1f;

/// Arguments required to serialize the transaction to create the legacy
/// sighash digest.
///
/// SIGHASH_ALL commits to ALL inputs, and ALL outputs. It indicates that no
/// further modification of the transaction is allowed without invalidating
/// the signature.
///
/// SIGHASH_NONE commits to no outputs at all.
///
/// SIGHASH_SINGLE commits specifically to the output at the same index as
/// the input being signed; outputs below that index are blanked, outputs
/// above it are dropped.
///
/// The ANYONECANPAY bit restricts the input commitment to the single input
/// being signed, allowing others to add inputs.
///
/// # Note
///
/// After signing the digest, you MUST append the sighash indicator byte to
/// the resulting signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegacySighashArgs<'a> {
    /// The index of the input we'd like to sign
    pub index: usize,
    /// The sighash mode to use.
    pub sighash_flag: u32,
    /// The script used in the prevout, which must be signed. In complex
    /// cases involving `OP_CODESEPARATOR` this must be the subset of the
    /// script containing the `OP_CHECKSIG` currently being executed.
    pub prevout_script: &'a Script,
}

/// Arguments required to create the BIP143-style segwit v0 sighash digest.
///
/// The mode semantics match `LegacySighashArgs`, but out-of-range SINGLE
/// indices commit to a zero hash instead of reproducing the legacy quirk,
/// and the prevout's confidential value is committed verbatim.
///
/// # Note
///
/// After signing the digest, you MUST append the sighash indicator byte to
/// the resulting signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WitnessV0SighashArgs<'a> {
    /// The index of the input we'd like to sign
    pub index: usize,
    /// The sighash mode to use.
    pub sighash_flag: u32,
    /// The script code being executed, which must be signed.
    pub prevout_script: &'a Script,
    /// The serialized confidential value of the prevout being spent,
    /// committed to the preimage verbatim.
    pub prevout_value: &'a ConfidentialValue,
}

/// The asset and value of an output being spent, as companions to the
/// taproot sighash. Commitments are committed verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpentOutput {
    /// The asset of the output being spent.
    pub asset: ConfidentialAsset,
    /// The value of the output being spent.
    pub value: ConfidentialValue,
}

/// Arguments required to create the taproot v1 sighash digest in the
/// Elements dialect.
///
/// Unlike the older dialects, v1 commits to data from *every* input being
/// spent, so the caller supplies a script and a `SpentOutput` per input.
/// The genesis block hash domain-separates sidechains.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaprootSighashArgs<'a> {
    /// The index of the input we'd like to sign
    pub index: usize,
    /// The sighash mode to use. `0x00` is SIGHASH_DEFAULT.
    pub sighash_flag: u8,
    /// The script pubkeys of every output being spent, in input order.
    pub prev_scripts: &'a [ScriptPubkey],
    /// The asset/value pairs of every output being spent, in input order.
    pub spent_outputs: &'a [SpentOutput],
    /// The hash of the chain's genesis block.
    pub genesis_hash: BlockHash,
    /// For script-path spends, the tapleaf hash. None for key-path spends.
    pub leaf_hash: Option<Hash256Digest>,
    /// The annex, if one is present in the witness.
    pub annex: Option<&'a [u8]>,
}

// The v1 preimage commits absent proofs as a one-byte zero varslice.
fn write_proof_or_zero<W: Write>(writer: &mut W, proof: &[u8]) -> TxResult<usize> {
    if proof.is_empty() {
        Ok(LiquidTx::write_u8(writer, 0x01)? + LiquidTx::write_u8(writer, 0x00)?)
    } else {
        let mut len = LiquidTx::write_compact_int(writer, proof.len() as u64)?;
        len += writer.write(proof)?;
        Ok(len)
    }
}

impl LiquidTx {
    /// Modifies copy_tx according to legacy SIGHASH_NONE semantics: no
    /// outputs are committed, and other inputs' sequences are zeroed.
    fn legacy_sighash_none(copy_tx: &mut Self, index: usize) {
        copy_tx.vout.clear();
        Self::legacy_zero_other_sequences(copy_tx, index);
    }

    /// Modifies copy_tx according to legacy SIGHASH_SINGLE semantics:
    /// outputs above the signed index are dropped, outputs below it are
    /// blanked, and other inputs' sequences are zeroed.
    fn legacy_sighash_single(copy_tx: &mut Self, index: usize) {
        copy_tx.vout.truncate(index + 1);
        for output in copy_tx.vout[..index].iter_mut() {
            *output = LiquidTxOut::null();
        }
        Self::legacy_zero_other_sequences(copy_tx, index);
    }

    fn legacy_zero_other_sequences(copy_tx: &mut Self, index: usize) {
        for (i, input) in copy_tx.vin.iter_mut().enumerate() {
            if i != index {
                input.sequence = 0;
            }
        }
    }

    /// Calculates the legacy sighash digest.
    ///
    /// Two historical quirks are reproduced as specified outputs rather
    /// than errors: signing a non-existent input, or SIGHASH_SINGLE of a
    /// non-existent output, both return `ONE_32`.
    pub fn legacy_sighash(&self, args: &LegacySighashArgs) -> TxResult<Hash256Digest> {
        if args.index >= self.vin.len() {
            return Ok(ONE_32);
        }

        let cleaned = args.prevout_script.without_code_separators();
        let mut copy_tx = self.clone();

        match args.sighash_flag & LEGACY_OUTPUT_MASK {
            SIGHASH_NONE => Self::legacy_sighash_none(&mut copy_tx, args.index),
            SIGHASH_SINGLE => {
                if args.index >= self.vout.len() {
                    return Ok(ONE_32);
                }
                Self::legacy_sighash_single(&mut copy_tx, args.index);
            }
            _ => {}
        }

        if args.sighash_flag & SIGHASH_INPUT_MASK != 0 {
            let mut input = copy_tx.vin[args.index].clone();
            input.script_sig = ScriptSig::from(cleaned.items());
            copy_tx.vin = vec![input];
        } else {
            for (i, input) in copy_tx.vin.iter_mut().enumerate() {
                input.script_sig = if i == args.index {
                    ScriptSig::from(cleaned.items())
                } else {
                    ScriptSig::null()
                };
            }
        }

        let mut w = Hash256Writer::default();
        copy_tx.write_with(&mut w, SerMode::SIGNING)?;
        Self::write_u32_le(&mut w, args.sighash_flag)?;
        Ok(w.finish())
    }

    /// Calculates `hash_prevouts` according to BIP143 semantics, over the
    /// logical (unflagged) outpoint indices.
    fn hash_prevouts_v0(&self, sighash_flag: u32) -> TxResult<Hash256Digest> {
        if sighash_flag & SIGHASH_INPUT_MASK != 0 {
            return Ok(ZERO_32);
        }
        let mut w = Hash256Writer::default();
        for input in self.vin.iter() {
            input.outpoint.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    /// Calculates `hash_sequence` according to BIP143 semantics.
    fn hash_sequence_v0(&self, sighash_flag: u32) -> TxResult<Hash256Digest> {
        let output_mode = sighash_flag & LEGACY_OUTPUT_MASK;
        if sighash_flag & SIGHASH_INPUT_MASK != 0
            || output_mode == SIGHASH_NONE
            || output_mode == SIGHASH_SINGLE
        {
            return Ok(ZERO_32);
        }
        let mut w = Hash256Writer::default();
        for input in self.vin.iter() {
            Self::write_u32_le(&mut w, input.sequence)?;
        }
        Ok(w.finish())
    }

    /// Calculates the Elements `hash_issuances` commitment: each input
    /// contributes its full issuance record, or a single zero byte.
    fn hash_issuances_v0(&self, sighash_flag: u32) -> TxResult<Hash256Digest> {
        if sighash_flag & SIGHASH_INPUT_MASK != 0 {
            return Ok(ZERO_32);
        }
        let mut w = Hash256Writer::default();
        for input in self.vin.iter() {
            match &input.issuance {
                Some(issuance) => {
                    issuance.write_to(&mut w)?;
                }
                None => {
                    Self::write_u8(&mut w, 0x00)?;
                }
            }
        }
        Ok(w.finish())
    }

    /// Calculates `hash_outputs` according to BIP143 semantics. An
    /// out-of-range SINGLE commits to the zero hash.
    fn hash_outputs_v0(&self, index: usize, sighash_flag: u32) -> TxResult<Hash256Digest> {
        match sighash_flag & LEGACY_OUTPUT_MASK {
            SIGHASH_NONE => Ok(ZERO_32),
            SIGHASH_SINGLE => {
                if index >= self.vout.len() {
                    return Ok(ZERO_32);
                }
                let mut w = Hash256Writer::default();
                self.vout[index].write_to(&mut w)?;
                Ok(w.finish())
            }
            _ => {
                let mut w = Hash256Writer::default();
                for output in self.vout.iter() {
                    output.write_to(&mut w)?;
                }
                Ok(w.finish())
            }
        }
    }

    /// Writes the segwit v0 sighash preimage to the provided `writer`.
    pub fn write_witness_v0_sighash_preimage<W: Write>(
        &self,
        writer: &mut W,
        args: &WitnessV0SighashArgs,
    ) -> TxResult<()> {
        if args.index >= self.vin.len() {
            return Err(TxError::OutOfRange {
                index: args.index,
                len: self.vin.len(),
            });
        }
        let input = &self.vin[args.index];

        Self::write_i32_le(writer, self.version)?;
        self.hash_prevouts_v0(args.sighash_flag)?.write_to(writer)?;
        self.hash_sequence_v0(args.sighash_flag)?.write_to(writer)?;
        self.hash_issuances_v0(args.sighash_flag)?.write_to(writer)?;
        input.outpoint.write_to(writer)?;
        args.prevout_script.write_to(writer)?;
        args.prevout_value.write_to(writer)?;
        Self::write_u32_le(writer, input.sequence)?;
        if let Some(issuance) = &input.issuance {
            issuance.write_to(writer)?;
        }
        self.hash_outputs_v0(args.index, args.sighash_flag)?
            .write_to(writer)?;
        Self::write_u32_le(writer, self.locktime)?;
        Self::write_u32_le(writer, args.sighash_flag)?;
        Ok(())
    }

    /// Calculates the segwit v0 sighash digest given the sighash args.
    pub fn witness_v0_sighash(&self, args: &WitnessV0SighashArgs) -> TxResult<Hash256Digest> {
        let mut w = Hash256Writer::default();
        self.write_witness_v0_sighash_preimage(&mut w, args)?;
        Ok(w.finish())
    }

    // Taproot v1 subcomponents. All single-sha2, spanning every input.

    fn sha_prevouts(&self) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for input in self.vin.iter() {
            input.outpoint.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    fn sha_outpoint_flags(&self) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for input in self.vin.iter() {
            Self::write_u8(&mut w, input.outpoint_flag())?;
        }
        Ok(w.finish())
    }

    fn sha_spent_assets_values(spent_outputs: &[SpentOutput]) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for spent in spent_outputs.iter() {
            spent.asset.write_to(&mut w)?;
            spent.value.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    fn sha_issuance_proofs(&self) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for input in self.vin.iter() {
            write_proof_or_zero(&mut w, input.witness.issuance_range_proof.items())?;
            write_proof_or_zero(&mut w, input.witness.inflation_range_proof.items())?;
        }
        Ok(w.finish())
    }

    fn sha_script_pubkeys(prev_scripts: &[ScriptPubkey]) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for script in prev_scripts.iter() {
            script.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    fn sha_sequences(&self) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for input in self.vin.iter() {
            Self::write_u32_le(&mut w, input.sequence)?;
        }
        Ok(w.finish())
    }

    fn sha_issuances(&self) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for input in self.vin.iter() {
            match &input.issuance {
                Some(issuance) => {
                    issuance.write_to(&mut w)?;
                }
                None => {
                    Self::write_u8(&mut w, 0x00)?;
                }
            }
        }
        Ok(w.finish())
    }

    fn sha_outputs(outputs: &[LiquidTxOut]) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for output in outputs.iter() {
            output.write_to(&mut w)?;
        }
        Ok(w.finish())
    }

    fn sha_output_witnesses(outputs: &[LiquidTxOut]) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        for output in outputs.iter() {
            write_proof_or_zero(&mut w, output.witness.surjection_proof.items())?;
            write_proof_or_zero(&mut w, output.witness.range_proof.items())?;
        }
        Ok(w.finish())
    }

    // sha256 over the two proof varslices of a single input, committed by
    // the ANYONECANPAY per-input block.
    fn sha_single_input_proofs(
        issuance_range_proof: &RangeProof,
        inflation_range_proof: &RangeProof,
    ) -> TxResult<Hash256Digest> {
        let mut w = Sha256Writer::default();
        write_proof_or_zero(&mut w, issuance_range_proof.items())?;
        write_proof_or_zero(&mut w, inflation_range_proof.items())?;
        Ok(w.finish())
    }

    /// Calculates the taproot v1 sighash digest in the Elements dialect:
    /// the `TapSighash/elements`-tagged hash of the full preimage.
    pub fn taproot_sighash(&self, args: &TaprootSighashArgs) -> TxResult<Hash256Digest> {
        if args.prev_scripts.len() != self.vin.len() {
            return Err(TxError::MismatchedPrevouts {
                prevouts: args.prev_scripts.len(),
                inputs: self.vin.len(),
            });
        }
        if args.spent_outputs.len() != self.vin.len() {
            return Err(TxError::MismatchedPrevouts {
                prevouts: args.spent_outputs.len(),
                inputs: self.vin.len(),
            });
        }
        if args.index >= self.vin.len() {
            return Err(TxError::OutOfRange {
                index: args.index,
                len: self.vin.len(),
            });
        }

        let output_type = if args.sighash_flag as u32 == SIGHASH_DEFAULT {
            SIGHASH_ALL
        } else {
            args.sighash_flag as u32 & SIGHASH_OUTPUT_MASK
        };
        let is_anyonecanpay = args.sighash_flag as u32 & SIGHASH_INPUT_MASK != 0;
        let is_none = output_type == SIGHASH_NONE;
        let is_single = output_type == SIGHASH_SINGLE;

        // Committed before spend_type for ALL modes, and again after the
        // input block for SINGLE. An out-of-range SINGLE commits to the
        // zero hash.
        let output_hashes = if is_none {
            None
        } else if is_single {
            if args.index < self.vout.len() {
                let single = std::slice::from_ref(&self.vout[args.index]);
                Some((Self::sha_outputs(single)?, Self::sha_output_witnesses(single)?))
            } else {
                Some((ZERO_32, ZERO_32))
            }
        } else {
            Some((
                Self::sha_outputs(&self.vout)?,
                Self::sha_output_witnesses(&self.vout)?,
            ))
        };

        let spend_type =
            u8::from(args.leaf_hash.is_some()) * 2 + u8::from(args.annex.is_some());

        let mut w = Sha256Writer::tagged(b"TapSighash/elements");

        args.genesis_hash.write_to(&mut w)?;
        args.genesis_hash.write_to(&mut w)?;

        Self::write_u8(&mut w, args.sighash_flag)?;
        Self::write_i32_le(&mut w, self.version)?;
        Self::write_u32_le(&mut w, self.locktime)?;

        if !is_anyonecanpay {
            self.sha_outpoint_flags()?.write_to(&mut w)?;
            self.sha_prevouts()?.write_to(&mut w)?;
            Self::sha_spent_assets_values(args.spent_outputs)?.write_to(&mut w)?;
            Self::sha_script_pubkeys(args.prev_scripts)?.write_to(&mut w)?;
            self.sha_sequences()?.write_to(&mut w)?;
            self.sha_issuances()?.write_to(&mut w)?;
            self.sha_issuance_proofs()?.write_to(&mut w)?;
        }

        if !(is_none || is_single) {
            let (sha_outputs, sha_output_witnesses) =
                output_hashes.expect("present for ALL modes");
            sha_outputs.write_to(&mut w)?;
            sha_output_witnesses.write_to(&mut w)?;
        }

        Self::write_u8(&mut w, spend_type)?;

        if is_anyonecanpay {
            let input = &self.vin[args.index];
            Self::write_u8(&mut w, input.outpoint_flag())?;
            input.outpoint.write_to(&mut w)?;
            args.spent_outputs[args.index].asset.write_to(&mut w)?;
            args.spent_outputs[args.index].value.write_to(&mut w)?;
            args.prev_scripts[args.index].write_to(&mut w)?;
            Self::write_u32_le(&mut w, input.sequence)?;
            match &input.issuance {
                Some(issuance) => {
                    issuance.write_to(&mut w)?;
                    Self::sha_single_input_proofs(
                        &input.witness.issuance_range_proof,
                        &input.witness.inflation_range_proof,
                    )?
                    .write_to(&mut w)?;
                }
                None => {
                    Self::write_u8(&mut w, 0x00)?;
                }
            }
        } else {
            Self::write_u32_le(&mut w, args.index as u32)?;
        }

        if let Some(annex) = args.annex {
            let mut annex_writer = Sha256Writer::default();
            Self::write_compact_int(&mut annex_writer, annex.len() as u64)?;
            annex_writer.write_all(annex)?;
            annex_writer.finish().write_to(&mut w)?;
        }

        if is_single {
            let (sha_outputs, sha_output_witnesses) =
                output_hashes.expect("present for SINGLE");
            sha_outputs.write_to(&mut w)?;
            sha_output_witnesses.write_to(&mut w)?;
        }

        if let Some(leaf_hash) = args.leaf_hash {
            leaf_hash.write_to(&mut w)?;
            // key version, and the no-codeseparator position sentinel
            Self::write_u8(&mut w, 0x00)?;
            Self::write_u32_le(&mut w, 0xffff_ffff)?;
        }

        Ok(w.finish())
    }
}
