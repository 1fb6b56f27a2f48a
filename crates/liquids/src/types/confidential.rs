//! Confidential assets, values, and nonces, plus the per-input asset
//! issuance record.
//!
//! Each confidential field is a tag-prefixed byte string: the first byte
//! selects between an explicit cleartext encoding and an opaque commitment.
//! This module stores the *entire* field, prefix included, and never
//! interprets commitment internals. The widths are fixed by the prefix:
//!
//! | field | `0x00` | `0x01` | other |
//! |-------|--------|--------|-------|
//! | asset | 1      | 33     | 33    |
//! | value | 1      | 9      | 33    |
//! | nonce | 1      | 33     | 33    |
//!
//! An explicit value carries its amount as a **big-endian** u64, unlike
//! every other integer in the wire format.

use std::io::{Read, Write};

use liquids_core::{
    impl_hex_serde,
    ser::{ByteFormat, SerError, SerResult},
};

/// An opaque confidential asset: `0x01` + 32-byte tag when explicit, or a
/// 33-byte commitment (prefix `0x0a`/`0x0b`), or a single `0x00` when null.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConfidentialAsset(Vec<u8>);

/// An opaque confidential value: `0x01` + 8-byte BE amount when explicit,
/// or a 33-byte commitment (prefix `0x08`/`0x09`), or a single `0x00` when
/// null. Issuance records use the null form for absent amounts.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConfidentialValue(Vec<u8>);

/// An opaque confidential nonce: a single `0x00` when absent, else a
/// 33-byte commitment (prefix `0x02`/`0x03`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConfidentialNonce(Vec<u8>);

macro_rules! confidential_field {
    ($name:ident, $explicit_body_len:expr) => {
        impl $name {
            /// Wrap raw wire bytes (prefix included). The bytes are not
            /// validated; the caller is responsible for a well-formed
            /// field. The sighash engine also uses this for the prefixless
            /// blank forms that legacy signing substitutes.
            pub fn from_raw(v: impl Into<Vec<u8>>) -> Self {
                Self(v.into())
            }

            /// The null form: a single `0x00` byte.
            pub fn null() -> Self {
                Self(vec![0x00])
            }

            /// True if the field is the single-byte null form.
            pub fn is_null(&self) -> bool {
                self.0 == [0x00]
            }

            /// True if the field carries an explicit (cleartext) encoding.
            pub fn is_explicit(&self) -> bool {
                self.0.first() == Some(&0x01)
            }

            /// True if the field carries a commitment rather than an
            /// explicit encoding or the null form.
            pub fn is_confidential(&self) -> bool {
                !self.is_null() && !self.is_explicit()
            }

            /// The complete wire bytes, prefix included.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl ByteFormat for $name {
            type Error = SerError;

            fn serialized_length(&self) -> usize {
                self.0.len()
            }

            fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
            where
                R: Read,
                Self: std::marker::Sized,
            {
                let prefix = Self::read_u8(reader)?;
                let body_len = match prefix {
                    0x00 => 0,
                    0x01 => $explicit_body_len,
                    _ => 32,
                };
                let mut bytes = vec![0u8; 1 + body_len];
                bytes[0] = prefix;
                reader.read_exact(&mut bytes[1..])?;
                Ok(Self(bytes))
            }

            fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
            where
                W: Write,
            {
                Ok(writer.write(&self.0)?)
            }
        }

        impl_hex_serde!($name);
    };
}

confidential_field!(ConfidentialAsset, 32);
confidential_field!(ConfidentialValue, 8);
confidential_field!(ConfidentialNonce, 32);

impl ConfidentialAsset {
    /// An explicit asset: `0x01` followed by the 32-byte asset tag.
    pub fn explicit(tag: [u8; 32]) -> Self {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(0x01);
        bytes.extend_from_slice(&tag);
        Self(bytes)
    }

    /// The explicit asset tag, if this is the explicit form.
    pub fn explicit_tag(&self) -> Option<[u8; 32]> {
        if self.is_explicit() && self.0.len() == 33 {
            let mut tag = [0u8; 32];
            tag.copy_from_slice(&self.0[1..]);
            Some(tag)
        } else {
            None
        }
    }
}

impl ConfidentialValue {
    /// An explicit value: `0x01` followed by the amount as a BE u64.
    pub fn explicit(amount: u64) -> Self {
        let mut bytes = Vec::with_capacity(9);
        bytes.push(0x01);
        bytes.extend_from_slice(&amount.to_be_bytes());
        Self(bytes)
    }

    /// The explicit amount, if this is the explicit form.
    pub fn explicit_value(&self) -> Option<u64> {
        if self.is_explicit() && self.0.len() == 9 {
            let mut amount = [0u8; 8];
            amount.copy_from_slice(&self.0[1..]);
            Some(u64::from_be_bytes(amount))
        } else {
            None
        }
    }
}

impl ConfidentialNonce {
    /// A nonce commitment: the given prefix (`0x02`/`0x03`) followed by a
    /// 32-byte point.
    pub fn commitment(prefix: u8, point: [u8; 32]) -> Self {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(prefix);
        bytes.extend_from_slice(&point);
        Self(bytes)
    }
}

/// A per-input asset issuance record, carried inline when the issuance bit
/// of the outpoint index is set on the wire.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct AssetIssuance {
    /// The blinding nonce for the issued asset. All zeroes for new
    /// issuances.
    pub asset_blinding_nonce: [u8; 32],
    /// The issuance entropy.
    pub asset_entropy: [u8; 32],
    /// The amount of the asset being issued. Null when absent.
    pub amount: ConfidentialValue,
    /// The amount of reissuance tokens being issued. Null when absent.
    pub inflation_keys: ConfidentialValue,
}

impl Default for AssetIssuance {
    fn default() -> Self {
        Self {
            asset_blinding_nonce: [0u8; 32],
            asset_entropy: [0u8; 32],
            amount: ConfidentialValue::null(),
            inflation_keys: ConfidentialValue::null(),
        }
    }
}

impl ByteFormat for AssetIssuance {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        64 + self.amount.serialized_length() + self.inflation_keys.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let asset_blinding_nonce = <[u8; 32]>::read_from(reader, 0)?;
        let asset_entropy = <[u8; 32]>::read_from(reader, 0)?;
        let amount = ConfidentialValue::read_from(reader, 0)?;
        let inflation_keys = ConfidentialValue::read_from(reader, 0)?;
        Ok(Self {
            asset_blinding_nonce,
            asset_entropy,
            amount,
            inflation_keys,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut len = self.asset_blinding_nonce.write_to(writer)?;
        len += self.asset_entropy.write_to(writer)?;
        len += self.amount.write_to(writer)?;
        len += self.inflation_keys.write_to(writer)?;
        Ok(len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_reads_tag_determined_widths() {
        // null, explicit, commitment
        let value_cases: &[(&str, usize)] = &[
            ("00", 1),
            ("01000000003b9aca00", 9),
            (
                "08aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                33,
            ),
        ];
        for (hex_str, width) in value_cases.iter() {
            let value = ConfidentialValue::deserialize_hex(hex_str).unwrap();
            assert_eq!(value.serialized_length(), *width);
            assert_eq!(value.serialize_hex().unwrap(), *hex_str);
        }

        let asset = ConfidentialAsset::deserialize_hex(
            "010101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        assert_eq!(asset.serialized_length(), 33);
        assert_eq!(asset.explicit_tag(), Some([0x01u8; 32]));
        assert_eq!(asset, ConfidentialAsset::explicit([0x01u8; 32]));

        let nonce = ConfidentialNonce::deserialize_hex("00").unwrap();
        assert!(nonce.is_null());
        assert_eq!(nonce.serialized_length(), 1);
    }

    #[test]
    fn it_round_trips_explicit_values() {
        let value = ConfidentialValue::explicit(1_000_000_000);
        assert_eq!(value.serialize_hex().unwrap(), "01000000003b9aca00");
        assert_eq!(value.explicit_value(), Some(1_000_000_000));
        assert!(value.is_explicit());
        assert!(!value.is_confidential());
    }

    #[test]
    fn it_rejects_truncated_fields() {
        // commitment prefix with a short body
        let res = ConfidentialAsset::deserialize_hex("0aabcdef");
        match res {
            Err(SerError::Truncated) => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn it_round_trips_issuances() {
        let issuance_hex = concat!(
            "0000000000000000000000000000000000000000000000000000000000000000",
            "1111111111111111111111111111111111111111111111111111111111111111",
            "01000000003b9aca00",
            "00",
        );
        let issuance = AssetIssuance::deserialize_hex(issuance_hex).unwrap();
        assert_eq!(issuance.amount.explicit_value(), Some(1_000_000_000));
        assert!(issuance.inflation_keys.is_null());
        assert_eq!(issuance.serialized_length(), 64 + 9 + 1);
        assert_eq!(issuance.serialize_hex().unwrap(), issuance_hex);
    }
}
