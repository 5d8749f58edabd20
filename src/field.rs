//! Field primitives: fixed-width unsigned integers and raw byte strings.
//!
//! A field is the smallest unit of a binary layout. Integers encode
//! big-endian at a declared width of 1..=8 bytes. Byte strings carry a
//! [`LenBind`] that tells the enclosing container how many bytes to consume
//! on decode.

use crate::error::CodecError;
use bytes::{BufMut, Bytes, BytesMut};

/// How a byte-string field learns its decode length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LenBind {
    /// Consume the entire remaining buffer. Only sensible for the final
    /// field of a layout.
    Remaining,
    /// Consume exactly as many bytes as the named sibling integer field
    /// holds at decode time. The sibling must appear earlier in the layout.
    Sibling(&'static str),
}

/// Declared shape of a field, fixed at schema-definition time.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Big-endian unsigned integer of `width` bytes.
    Uint { width: usize, default: u64 },
    /// Raw byte string.
    Bytes {
        bind: LenBind,
        default: &'static [u8],
    },
}

/// Named field declaration within a schema.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    /// Declares a fixed-width unsigned integer field.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=8`. Field declarations happen at
    /// type-definition time; an invalid width is a programming error.
    pub fn uint(name: &'static str, width: usize, default: u64) -> Self {
        assert!(
            (1..=8).contains(&width),
            "integer field '{name}' declares width {width}, expected 1..=8"
        );
        Self {
            name,
            kind: FieldKind::Uint { width, default },
        }
    }

    /// Declares a byte-string field.
    pub fn bytes(name: &'static str, bind: LenBind) -> Self {
        Self {
            name,
            kind: FieldKind::Bytes { bind, default: &[] },
        }
    }
}

/// Live value of a field inside a container instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Uint { width: usize, value: u64 },
    Bytes { bind: LenBind, value: Bytes },
}

impl FieldValue {
    /// Instantiates a field from its declaration, using the default value.
    pub(crate) fn from_kind(kind: &FieldKind) -> Self {
        match *kind {
            FieldKind::Uint { width, default } => FieldValue::Uint {
                width,
                value: default & width_mask(width),
            },
            FieldKind::Bytes { bind, default } => FieldValue::Bytes {
                bind,
                value: Bytes::from_static(default),
            },
        }
    }

    /// Current encoded size in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            FieldValue::Uint { width, .. } => *width,
            FieldValue::Bytes { value, .. } => value.len(),
        }
    }

    /// Appends this field's wire bytes to `buf`.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            FieldValue::Uint { width, value } => put_uint(buf, *width, *value),
            FieldValue::Bytes { value, .. } => buf.put_slice(value),
        }
    }

    /// Integer value, if this is an integer field.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FieldValue::Uint { value, .. } => Some(*value),
            FieldValue::Bytes { .. } => None,
        }
    }

    /// Byte content, if this is a byte-string field.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            FieldValue::Bytes { value, .. } => Some(value),
            FieldValue::Uint { .. } => None,
        }
    }
}

/// Bit mask covering `width` bytes. Stored integer values are masked to
/// their declared width so every stored value round-trips exactly.
pub(crate) fn width_mask(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

/// Writes the low `width` bytes of `value`, big-endian.
pub(crate) fn put_uint(buf: &mut BytesMut, width: usize, value: u64) {
    buf.put_slice(&value.to_be_bytes()[8 - width..]);
}

/// Reads a big-endian unsigned integer of `width` bytes off the front of
/// `buf`, returning the value and the unconsumed remainder.
pub(crate) fn take_uint<'a>(
    field: &'static str,
    width: usize,
    buf: &'a [u8],
) -> Result<(u64, &'a [u8]), CodecError> {
    if buf.len() < width {
        return Err(CodecError::ShortBuffer {
            field,
            needed: width,
            remaining: buf.len(),
        });
    }
    let mut value = 0u64;
    for &b in &buf[..width] {
        value = (value << 8) | u64::from(b);
    }
    Ok((value, &buf[width..]))
}

/// Splits exactly `len` bytes off the front of `buf`.
pub(crate) fn take_bytes<'a>(
    field: &'static str,
    len: usize,
    buf: &'a [u8],
) -> Result<(Bytes, &'a [u8]), CodecError> {
    if buf.len() < len {
        return Err(CodecError::ShortBuffer {
            field,
            needed: len,
            remaining: buf.len(),
        });
    }
    Ok((Bytes::copy_from_slice(&buf[..len]), &buf[len..]))
}
