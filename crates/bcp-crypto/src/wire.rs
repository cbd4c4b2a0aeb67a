//! Versioned blob encoding for parameters, keys, and ciphertexts.
//!
//! Every blob is a fixed 8-byte [`BlobHeader`] followed by length-prefixed
//! fields:
//!
//! ```text
//! [magic "BCPE": 4][version: 1][kind: 1][reserved: 2]
//! [len: u64 BE][field bytes] ...
//! ```
//!
//! Integers are minimal big-endian (no leading zero byte, never empty).
//! Trailing bytes after the last expected field are rejected, so every value
//! has exactly one encoding.

use num_bigint::BigUint;
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Structural decoding errors.
///
/// Public decoders map these onto [`crate::BcpError`] according to the kind
/// of value being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Buffer ended before a header or field was complete
    #[error("blob truncated: needed {expected} bytes, had {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Magic number mismatch
    #[error("invalid magic number")]
    InvalidMagic,

    /// Format version not understood by this build
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// Blob holds a different kind of value
    #[error("unexpected blob kind: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedKind {
        /// Kind the caller asked for
        expected: u8,
        /// Kind found in the header
        actual: u8,
    },

    /// Reserved header bytes were not zero
    #[error("reserved header bytes must be zero")]
    ReservedBytes,

    /// Fixed-size field has the wrong length
    #[error("field length mismatch: expected {expected}, got {actual}")]
    FieldLength {
        /// Required length
        expected: usize,
        /// Encoded length
        actual: usize,
    },

    /// Integer field is empty or has a leading zero byte
    #[error("non-canonical integer encoding")]
    NonCanonicalInteger,

    /// Bytes remain after the last field
    #[error("{0} trailing bytes after blob")]
    TrailingBytes(usize),
}

/// Kind tag stored in the blob header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlobKind {
    /// Public parameters `(level, n, g)`
    PublicParameters = 0x01,
    /// Holder public key `(id, h)`
    PublicKey = 0x02,
    /// Holder secret key `(id, a)`
    SecretKey = 0x03,
    /// Hybrid ciphertext `(id, A, B, nonce, tag, payload)`
    Ciphertext = 0x04,
    /// Scalar ciphertext `(id, A, B)`
    ScalarCiphertext = 0x05,
}

impl BlobKind {
    fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Fixed 8-byte blob header.
#[repr(C)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct BlobHeader {
    magic: [u8; 4],
    version: u8,
    kind: u8,
    reserved: [u8; 2],
}

impl BlobHeader {
    /// Serialized header size
    pub const SIZE: usize = 8;

    /// Magic number: "BCPE" in ASCII
    pub const MAGIC: [u8; 4] = *b"BCPE";

    /// Current format version
    pub const VERSION: u8 = 0x01;

    fn new(kind: BlobKind) -> Self {
        Self { magic: Self::MAGIC, version: Self::VERSION, kind: kind.to_u8(), reserved: [0; 2] }
    }

    /// Parse and validate the header at the start of `bytes`.
    ///
    /// Checks are ordered cheapest first: size, magic, version, reserved.
    /// The kind byte is returned unchecked.
    pub fn parse(bytes: &[u8]) -> Result<(&Self, &[u8]), WireError> {
        let (header, rest) = Self::ref_from_prefix(bytes)
            .map_err(|_| WireError::Truncated { expected: Self::SIZE, actual: bytes.len() })?;

        if header.magic != Self::MAGIC {
            return Err(WireError::InvalidMagic);
        }

        if header.version != Self::VERSION {
            return Err(WireError::UnsupportedVersion(header.version));
        }

        if header.reserved != [0; 2] {
            return Err(WireError::ReservedBytes);
        }

        Ok((header, rest))
    }

    /// Kind byte.
    pub fn kind(&self) -> u8 {
        self.kind
    }

    /// Format version byte.
    pub fn version(&self) -> u8 {
        self.version
    }
}

/// Builds a blob field by field.
pub(crate) struct BlobWriter {
    buf: Vec<u8>,
}

impl BlobWriter {
    pub(crate) fn new(kind: BlobKind) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(BlobHeader::new(kind).as_bytes());
        Self { buf }
    }

    pub(crate) fn bytes(mut self, field: &[u8]) -> Self {
        self.buf.extend_from_slice(&(field.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(field);
        self
    }

    pub(crate) fn integer(self, value: &BigUint) -> Self {
        self.bytes(&value.to_bytes_be())
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads fields of a blob in order.
pub(crate) struct BlobReader<'a> {
    rest: &'a [u8],
}

impl<'a> BlobReader<'a> {
    pub(crate) fn open(bytes: &'a [u8], expected: BlobKind) -> Result<Self, WireError> {
        let (header, rest) = BlobHeader::parse(bytes)?;
        if header.kind() != expected.to_u8() {
            return Err(WireError::UnexpectedKind { expected: expected.to_u8(), actual: header.kind() });
        }
        Ok(Self { rest })
    }

    pub(crate) fn bytes(&mut self) -> Result<&'a [u8], WireError> {
        let Some((len_bytes, rest)) = self.rest.split_first_chunk::<8>() else {
            return Err(WireError::Truncated { expected: 8, actual: self.rest.len() });
        };

        let declared = u64::from_be_bytes(*len_bytes);
        let len = usize::try_from(declared)
            .ok()
            .filter(|&len| len <= rest.len())
            .ok_or(WireError::Truncated {
                expected: usize::try_from(declared).unwrap_or(usize::MAX),
                actual: rest.len(),
            })?;

        let (field, rest) = rest.split_at(len);
        self.rest = rest;
        Ok(field)
    }

    pub(crate) fn fixed<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let field = self.bytes()?;
        <[u8; N]>::try_from(field)
            .map_err(|_| WireError::FieldLength { expected: N, actual: field.len() })
    }

    pub(crate) fn integer(&mut self) -> Result<BigUint, WireError> {
        Ok(BigUint::from_bytes_be(self.integer_bytes()?))
    }

    /// Canonical integer field as raw bytes, for secrets that must not be
    /// materialized.
    pub(crate) fn integer_bytes(&mut self) -> Result<&'a [u8], WireError> {
        let field = self.bytes()?;
        match field.first() {
            None | Some(0) => Err(WireError::NonCanonicalInteger),
            Some(_) => Ok(field),
        }
    }

    pub(crate) fn finish(self) -> Result<(), WireError> {
        if self.rest.is_empty() { Ok(()) } else { Err(WireError::TrailingBytes(self.rest.len())) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let blob = BlobWriter::new(BlobKind::Ciphertext).finish();
        assert_eq!(blob, vec![b'B', b'C', b'P', b'E', 0x01, 0x04, 0x00, 0x00]);
    }

    #[test]
    fn fields_round_trip() {
        let blob = BlobWriter::new(BlobKind::PublicKey)
            .bytes(&[0xAA; 3])
            .integer(&BigUint::from(0x0102u32))
            .finish();

        assert_eq!(&blob[8..16], &3u64.to_be_bytes());

        let mut reader = BlobReader::open(&blob, BlobKind::PublicKey).unwrap();
        assert_eq!(reader.fixed::<3>().unwrap(), [0xAA; 3]);
        assert_eq!(reader.integer().unwrap(), BigUint::from(0x0102u32));
        reader.finish().unwrap();
    }

    #[test]
    fn rejects_short_header() {
        let result = BlobHeader::parse(b"BCP");
        assert_eq!(result.err(), Some(WireError::Truncated { expected: 8, actual: 3 }));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut blob = BlobWriter::new(BlobKind::PublicKey).finish();
        blob[0] = b'X';
        assert_eq!(BlobHeader::parse(&blob).err(), Some(WireError::InvalidMagic));
    }

    #[test]
    fn rejects_future_version() {
        let mut blob = BlobWriter::new(BlobKind::PublicKey).finish();
        blob[4] = 0x02;
        assert_eq!(BlobHeader::parse(&blob).err(), Some(WireError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_reserved_bits() {
        let mut blob = BlobWriter::new(BlobKind::PublicKey).finish();
        blob[7] = 0x01;
        assert_eq!(BlobHeader::parse(&blob).err(), Some(WireError::ReservedBytes));
    }

    #[test]
    fn rejects_wrong_kind() {
        let blob = BlobWriter::new(BlobKind::SecretKey).finish();
        let result = BlobReader::open(&blob, BlobKind::PublicKey);
        assert!(matches!(result, Err(WireError::UnexpectedKind { expected: 0x02, actual: 0x03 })));
    }

    #[test]
    fn rejects_oversized_length_prefix() {
        let mut blob = BlobWriter::new(BlobKind::PublicKey).bytes(&[1, 2, 3]).finish();
        blob[15] = 0xFF;

        let mut reader = BlobReader::open(&blob, BlobKind::PublicKey).unwrap();
        assert!(matches!(reader.bytes(), Err(WireError::Truncated { .. })));
    }

    #[test]
    fn rejects_non_canonical_integers() {
        let blob = BlobWriter::new(BlobKind::PublicKey).bytes(&[0x00, 0x01]).bytes(&[]).finish();

        let mut reader = BlobReader::open(&blob, BlobKind::PublicKey).unwrap();
        assert_eq!(reader.integer().err(), Some(WireError::NonCanonicalInteger));
        assert_eq!(reader.integer().err(), Some(WireError::NonCanonicalInteger));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut blob = BlobWriter::new(BlobKind::PublicKey).bytes(&[1]).finish();
        blob.push(0);

        let mut reader = BlobReader::open(&blob, BlobKind::PublicKey).unwrap();
        reader.bytes().unwrap();
        assert_eq!(reader.finish().err(), Some(WireError::TrailingBytes(1)));
    }

    #[test]
    fn rejects_wrong_fixed_length() {
        let blob = BlobWriter::new(BlobKind::PublicKey).bytes(&[1, 2]).finish();
        let mut reader = BlobReader::open(&blob, BlobKind::PublicKey).unwrap();
        assert_eq!(reader.fixed::<4>().err(), Some(WireError::FieldLength { expected: 4, actual: 2 }));
    }
}
