//! Simple types for scripts, witness stack items, and confidential proofs,
//! each of which is treated as an opaque, wrapped byte vector.
//!
//! We do not handle assembly, disassembly, or script execution here. Scripts
//! are opaque byte vectors with no semantics, with a single exception: the
//! legacy sighash must remove `OP_CODESEPARATOR` from the script being
//! signed, so `Script` knows enough about push opcodes to skip over push
//! payloads while filtering.

use liquids_core::{impl_script_conversion, wrap_prefixed_byte_vector};

/// The opcode stripped from prevout scripts during legacy sighash.
pub const OP_CODESEPARATOR: u8 = 0xab;

wrap_prefixed_byte_vector!(
    /// A Script is a marked byte vector for use as an opaque script in
    /// `SighashArgs` structs.
    ///
    /// `Script::null()` and `Script::default()` return the empty byte
    /// vector with a 0 prefix, which represents numerical 0, boolean
    /// `false`, or null bytestring.
    Script
);
wrap_prefixed_byte_vector!(
    /// A ScriptSig is a marked byte vector for use in the input script_sig.
    ScriptSig
);
wrap_prefixed_byte_vector!(
    /// A ScriptPubkey is a marked byte vector holding the spending
    /// constraints of an output.
    ScriptPubkey
);
wrap_prefixed_byte_vector!(
    /// A WitnessStackItem is a marked byte vector intended for use in
    /// witnesses. Each input witness stack is a prefixed vector of these.
    WitnessStackItem
);
wrap_prefixed_byte_vector!(
    /// A RangeProof is a marked byte vector carrying an opaque confidential
    /// range proof (or the issuance amount/inflation-keys proofs on
    /// inputs). May be empty.
    RangeProof
);
wrap_prefixed_byte_vector!(
    /// A SurjectionProof is a marked byte vector carrying an opaque asset
    /// surjection proof. May be empty.
    SurjectionProof
);

impl_script_conversion!(Script, ScriptPubkey);
impl_script_conversion!(Script, ScriptSig);
impl_script_conversion!(Script, WitnessStackItem);
impl_script_conversion!(ScriptPubkey, ScriptSig);

/// A Witness is an input's stack of witness items. The transaction's
/// witness suffix carries one of these per input, each with its own count
/// prefix.
pub type Witness = Vec<WitnessStackItem>;

impl Script {
    /// Returns a copy of the script with every `OP_CODESEPARATOR` removed.
    ///
    /// Push payloads are skipped, not scanned, so a `0xab` byte inside
    /// pushed data is preserved. A push opcode whose payload runs past the
    /// end of the script is copied verbatim.
    pub fn without_code_separators(&self) -> Script {
        let bytes = self.items();
        let mut filtered = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            let op = bytes[i];
            let (header_len, payload_len) = match op {
                0x01..=0x4b => (1, op as usize),
                // OP_PUSHDATA1/2/4
                0x4c if i + 1 < bytes.len() => (2, bytes[i + 1] as usize),
                0x4d if i + 2 < bytes.len() => {
                    (3, u16::from_le_bytes([bytes[i + 1], bytes[i + 2]]) as usize)
                }
                0x4e if i + 4 < bytes.len() => (
                    5,
                    u32::from_le_bytes([
                        bytes[i + 1],
                        bytes[i + 2],
                        bytes[i + 3],
                        bytes[i + 4],
                    ]) as usize,
                ),
                OP_CODESEPARATOR => {
                    i += 1;
                    continue;
                }
                _ => (1, 0),
            };
            let end = usize::min(i + header_len + payload_len, bytes.len());
            filtered.extend_from_slice(&bytes[i..end]);
            i = end;
        }
        Script::new(filtered)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use liquids_core::ser::ByteFormat;

    #[test]
    fn it_serializes_and_derializes_scripts() {
        let cases = [
            (Script::new(vec![]), "00", 1),
            (Script::new(vec![0xab]), "01ab", 2),
            (
                Script::deserialize_hex("160014758ce550380d964051086798d6546bebdca27a73").unwrap(),
                "160014758ce550380d964051086798d6546bebdca27a73",
                23,
            ),
        ];
        for case in cases.iter() {
            assert_eq!(case.0.serialized_length(), case.2);
            assert_eq!(case.0.serialize_hex().unwrap(), case.1);
            assert_eq!(Script::deserialize_hex(case.1).unwrap(), case.0);
        }
    }

    #[test]
    fn it_strips_code_separators() {
        let cases: &[(&str, &str)] = &[
            // bare codeseparator
            ("ab", ""),
            // codeseparator between opcodes
            ("76ab88ac", "7688ac"),
            // 0xab inside a direct push is preserved
            ("02abab87", "02abab87"),
            // OP_PUSHDATA1 payload containing 0xab is preserved
            ("4c02ababab", "4c02abab"),
            // no separators at all
            ("76a914000000000000000000000000000000000000000088ac",
             "76a914000000000000000000000000000000000000000088ac"),
            // truncated push is copied verbatim
            ("ab4c05abab", "4c05abab"),
        ];
        for (script, expected) in cases.iter() {
            let script = Script::new(hex::decode(script).unwrap());
            let stripped = script.without_code_separators();
            assert_eq!(hex::encode(stripped.items()), *expected);
        }
    }
}
