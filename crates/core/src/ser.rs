//! A simple trait for binary (de)Serialization using std `Read` and `Write` traits.

use hex::FromHexError;
use std::io::{Cursor, Error as IOError, ErrorKind, Read, Write};
use thiserror::Error;

/// Hard cap on VarInt-declared element counts. Counts above this would allow
/// a short malformed buffer to request an enormous allocation.
pub const MAX_VEC_ENTRIES: u64 = 1 << 24;

/// Errors related to serialization of types.
#[derive(Debug, Error)]
pub enum SerError {
    /// A reader ran out of bytes mid-structure.
    #[error("Ran out of bytes while deserializing")]
    Truncated,

    /// Strict-mode deserialization consumed the structure but left bytes in
    /// the buffer.
    #[error("Deserialization left {0} unconsumed trailing bytes")]
    TrailingBytes(usize),

    /// A VarInt prefix was inconsistent with its payload. Minimality is not
    /// checked by this codec on read; the variant is reserved for strict
    /// validation layers built on top of it.
    #[error("Inconsistent VarInt prefix: {0:#04x}")]
    InvalidVarInt(u8),

    /// A VarInt-declared element count exceeds `MAX_VEC_ENTRIES`.
    #[error("VarInt count {0} exceeds the maximum of {MAX_VEC_ENTRIES} entries")]
    OversizedVector(u64),

    /// IOError bubbled up from a `Write` passed to a `ByteFormat::write_to`
    /// implementation.
    #[error(transparent)]
    Io(IOError),

    /// `deserialize_hex` encountered an error on its input.
    #[error(transparent)]
    FromHex(#[from] FromHexError),

    /// An error by a component call in data structure (de)serialization
    #[error("Error in component (de)serialization: {0}")]
    Component(String),
}

impl From<IOError> for SerError {
    fn from(e: IOError) -> Self {
        // `read_exact` signals a short buffer as UnexpectedEof
        if e.kind() == ErrorKind::UnexpectedEof {
            SerError::Truncated
        } else {
            SerError::Io(e)
        }
    }
}

/// Type alias for serialization errors
pub type SerResult<T> = Result<T, SerError>;

/// Calculates the minimum prefix length for a VarInt encoding `number`
pub fn prefix_byte_len(number: u64) -> u8 {
    match number {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x10000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Matches the length of the VarInt to the 1-byte flag
pub fn first_byte_from_len(number: u8) -> Option<u8> {
    match number {
        3 => Some(0xfd),
        5 => Some(0xfe),
        9 => Some(0xff),
        _ => None,
    }
}

/// Matches the VarInt prefix flag to the serialized length
pub fn prefix_len_from_first_byte(number: u8) -> u8 {
    match number {
        0..=0xfc => 1,
        0xfd => 3,
        0xfe => 5,
        0xff => 9,
    }
}

/// Convenience function for writing a Bitcoin-style VarInt. Always emits the
/// minimal encoding.
pub fn write_compact_int<W>(writer: &mut W, number: u64) -> Result<usize, SerError>
where
    W: Write,
{
    let prefix_len = prefix_byte_len(number);
    let written: usize = match first_byte_from_len(prefix_len) {
        None => writer.write(&[number as u8])?,
        Some(prefix) => {
            let mut written = writer.write(&[prefix])?;
            let body = number.to_le_bytes();
            written += writer.write(&body[..prefix_len as usize - 1])?;
            written
        }
    };
    Ok(written)
}

/// Convenience function for reading a Bitcoin-style VarInt. Non-minimal
/// encodings are tolerated; strict layers may re-check with
/// `prefix_byte_len`.
pub fn read_compact_int<R>(reader: &mut R) -> Result<u64, SerError>
where
    R: Read,
{
    let mut prefix = [0u8; 1];
    reader.read_exact(&mut prefix)?;
    let prefix_len = prefix_len_from_first_byte(prefix[0]);

    if prefix_len == 1 {
        return Ok(prefix[0] as u64);
    }

    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf[..prefix_len as usize - 1])?;
    Ok(u64::from_le_bytes(buf))
}

/// A simple trait for deserializing from `std::io::Read` and serializing to
/// `std::io::Write`. We have provided implementations for `u8`, `[u8; 32]`,
/// and `Vec<T: ByteFormat>`.
///
/// `ByteFormat` is used extensively in Sighash calculation, txid
/// calculations, and transaction serialization and deserialization.
pub trait ByteFormat {
    /// An associated error type
    type Error: From<SerError> + From<IOError> + std::error::Error;

    /// Returns the byte-length of the serialized data structure.
    fn serialized_length(&self) -> usize;

    /// Convenience function for reading a u8
    fn read_u8<R>(reader: &mut R) -> Result<u8, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Convenience function for reading a LE i32
    fn read_i32_le<R>(reader: &mut R) -> Result<i32, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE u32
    fn read_u32_le<R>(reader: &mut R) -> Result<u32, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Convenience function for reading a LE u64
    fn read_u64_le<R>(reader: &mut R) -> Result<u64, Self::Error>
    where
        R: Read,
    {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Convenience function for reading a Bitcoin-style VarInt
    fn read_compact_int<R>(reader: &mut R) -> Result<u64, <Self as ByteFormat>::Error>
    where
        R: Read,
    {
        read_compact_int(reader).map_err(Into::into)
    }

    /// Convenience function for reading a prefixed vector. Errors if the
    /// declared count exceeds `MAX_VEC_ENTRIES`.
    fn read_prefix_vec<R, E, I>(reader: &mut R) -> Result<Vec<I>, <Self as ByteFormat>::Error>
    where
        R: Read,
        E: Into<Self::Error> + From<SerError> + From<IOError> + std::error::Error,
        I: ByteFormat<Error = E>,
    {
        let items = Self::read_compact_int(reader)?;
        if items > MAX_VEC_ENTRIES {
            return Err(SerError::OversizedVector(items).into());
        }
        let mut ret = vec![];
        for _ in 0..items {
            ret.push(I::read_from(reader, 0).map_err(Into::into)?);
        }
        Ok(ret)
    }

    /// Convenience function for writing a u8
    fn write_u8<W>(writer: &mut W, byte: u8) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
    {
        Ok(writer.write(&[byte])?)
    }

    /// Convenience function for writing a LE i32
    fn write_i32_le<W>(writer: &mut W, number: i32) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Convenience function for writing a LE u32
    fn write_u32_le<W>(writer: &mut W, number: u32) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Convenience function for writing a LE u64
    fn write_u64_le<W>(writer: &mut W, number: u64) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
    {
        Ok(writer.write(&number.to_le_bytes())?)
    }

    /// Convenience function for writing a Bitcoin-style VarInt
    fn write_compact_int<W>(
        writer: &mut W,
        number: u64,
    ) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
    {
        write_compact_int(writer, number).map_err(Into::into)
    }

    /// Convenience function to write a length-prefixed vector.
    fn write_prefix_vec<W, E, I>(
        writer: &mut W,
        vector: &[I],
    ) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write,
        E: Into<Self::Error> + From<SerError> + From<IOError> + std::error::Error,
        I: ByteFormat<Error = E>,
    {
        let mut written = Self::write_compact_int(writer, vector.len() as u64)?;
        for i in vector.iter() {
            written += i.write_to(writer).map_err(Into::into)?;
        }
        Ok(written)
    }

    /// Deserializes an instance of `Self` from a `std::io::Read`.
    /// The `limit` argument is used only when deserializing collections, and
    /// specifies a maximum number of instances of the underlying type to
    /// read.
    fn read_from<R>(reader: &mut R, limit: usize) -> Result<Self, Self::Error>
    where
        R: Read,
        Self: std::marker::Sized;

    /// Decodes a hex string to a `Vec<u8>`, deserializes an instance of
    /// `Self` from that vector.
    fn deserialize_hex(s: &str) -> Result<Self, Self::Error>
    where
        Self: std::marker::Sized,
    {
        let v: Vec<u8> = hex::decode(s).map_err(SerError::from)?;
        let mut cursor = Cursor::new(v);
        Self::read_from(&mut cursor, 0)
    }

    /// Serializes `Self` to a `std::io::Write`. Following `Write` trait
    /// conventions, its `Ok` type is a `usize` denoting the number of bytes
    /// written.
    fn write_to<W>(&self, writer: &mut W) -> Result<usize, <Self as ByteFormat>::Error>
    where
        W: Write;

    /// Serializes `self` to a vector, returns the hex-encoded vector
    fn serialize_hex(&self) -> Result<String, <Self as ByteFormat>::Error> {
        let mut v: Vec<u8> = Vec::with_capacity(self.serialized_length());
        self.write_to(&mut v)?;
        Ok(hex::encode(v))
    }
}

impl<E, I> ByteFormat for Vec<I>
where
    E: From<SerError> + From<IOError> + std::error::Error,
    I: ByteFormat<Error = E>,
{
    type Error = E;

    fn serialized_length(&self) -> usize {
        self.iter().map(|v| v.serialized_length()).sum()
    }

    fn read_from<T>(reader: &mut T, limit: usize) -> Result<Self, Self::Error>
    where
        T: Read,
        Self: std::marker::Sized,
    {
        let mut v = vec![];
        for _ in 0..limit {
            v.push(I::read_from(reader, 0)?);
        }
        Ok(v)
    }

    fn write_to<W>(&self, writer: &mut W) -> Result<usize, Self::Error>
    where
        W: Write,
    {
        let mut written = 0;
        for item in self.iter() {
            written += item.write_to(writer)?;
        }
        Ok(written)
    }
}

impl ByteFormat for [u8; 32] {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        32
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(self.as_ref())?)
    }
}

impl ByteFormat for u8 {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        1
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(writer.write(&[*self])?)
    }
}
