//! Field containers: instances of a schema with encode/decode.
//!
//! A [`Container`] pairs a shared [`Schema`] with per-instance field values.
//! Encoding concatenates member encodings in schema order. Decoding consumes
//! bytes off the front of a buffer field-by-field, each field taking exactly
//! the bytes it declares, and returns the unconsumed remainder. A failed
//! decode leaves the container untouched: values are staged and committed
//! only once every field has decoded.

use crate::error::CodecError;
use crate::field::{self, FieldKind, FieldValue, LenBind};
use crate::schema::Schema;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tracing::trace;

/// Uniform codec surface for containers, TLVs, and payloads, so an outer
/// dispatch layer can register and drive them interchangeably.
pub trait Wire {
    /// Total encoded size in bytes, given current field values.
    fn total_size(&self) -> usize;

    /// Encodes all fields in wire order.
    fn encode(&self) -> BytesMut;

    /// Decodes from the front of `buf`, returning the unconsumed remainder.
    fn decode<'a>(&mut self, buf: &'a [u8]) -> Result<&'a [u8], CodecError>;
}

/// An ordered, named collection of live field values.
#[derive(Debug, Clone)]
pub struct Container {
    schema: Arc<Schema>,
    values: Vec<FieldValue>,
}

impl Container {
    /// Instantiates a container with every field at its declared default.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|def| FieldValue::from_kind(&def.kind))
            .collect();
        Self { schema, values }
    }

    /// The schema this container instantiates.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Live field by name.
    pub fn field(&self, name: &'static str) -> Result<&FieldValue, CodecError> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or(CodecError::UnknownField(name))?;
        Ok(&self.values[idx])
    }

    /// Mutable live field by name. Mutations are immediately visible in
    /// subsequent `encode` and `total_size` calls.
    pub fn field_mut(&mut self, name: &'static str) -> Result<&mut FieldValue, CodecError> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or(CodecError::UnknownField(name))?;
        Ok(&mut self.values[idx])
    }

    /// Integer value of the named field.
    pub fn uint(&self, name: &'static str) -> Result<u64, CodecError> {
        self.field(name)?
            .as_uint()
            .ok_or(CodecError::WrongKind {
                field: name,
                expected: "an integer field",
            })
    }

    /// Sets the named integer field, masking to its declared width.
    pub fn set_uint(&mut self, name: &'static str, value: u64) -> Result<(), CodecError> {
        match self.field_mut(name)? {
            FieldValue::Uint { width, value: slot } => {
                *slot = value & field::width_mask(*width);
                Ok(())
            }
            FieldValue::Bytes { .. } => Err(CodecError::WrongKind {
                field: name,
                expected: "an integer field",
            }),
        }
    }

    /// Byte content of the named field.
    pub fn bytes(&self, name: &'static str) -> Result<&Bytes, CodecError> {
        self.field(name)?
            .as_bytes()
            .ok_or(CodecError::WrongKind {
                field: name,
                expected: "a byte-string field",
            })
    }

    /// Replaces the named byte-string field's content.
    pub fn set_bytes(
        &mut self,
        name: &'static str,
        content: impl Into<Bytes>,
    ) -> Result<(), CodecError> {
        match self.field_mut(name)? {
            FieldValue::Bytes { value, .. } => {
                *value = content.into();
                Ok(())
            }
            FieldValue::Uint { .. } => Err(CodecError::WrongKind {
                field: name,
                expected: "a byte-string field",
            }),
        }
    }

    /// Decodes every field into a staged value list without touching `self`.
    /// Returns the staged values and the unconsumed remainder.
    fn decode_staged<'a>(&self, buf: &'a [u8]) -> Result<(Vec<FieldValue>, &'a [u8]), CodecError> {
        let mut staged = Vec::with_capacity(self.values.len());
        let mut rest = buf;
        for def in self.schema.fields() {
            let value = match def.kind {
                FieldKind::Uint { width, .. } => {
                    let (v, r) = field::take_uint(def.name, width, rest)?;
                    rest = r;
                    FieldValue::Uint { width, value: v }
                }
                FieldKind::Bytes { bind, .. } => {
                    let len = match bind {
                        LenBind::Remaining => rest.len(),
                        LenBind::Sibling(sibling) => self
                            .schema
                            .index_of(sibling)
                            .and_then(|idx| staged.get(idx))
                            .and_then(FieldValue::as_uint)
                            .ok_or(CodecError::BadBinding {
                                field: def.name,
                                bind: sibling,
                            })? as usize,
                    };
                    let (v, r) = field::take_bytes(def.name, len, rest)?;
                    rest = r;
                    FieldValue::Bytes { bind, value: v }
                }
            };
            staged.push(value);
        }
        Ok((staged, rest))
    }
}

impl Wire for Container {
    fn total_size(&self) -> usize {
        self.values.iter().map(FieldValue::byte_size).sum()
    }

    fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.total_size());
        for value in &self.values {
            value.encode_into(&mut buf);
        }
        buf
    }

    fn decode<'a>(&mut self, buf: &'a [u8]) -> Result<&'a [u8], CodecError> {
        let (staged, rest) = self.decode_staged(buf)?;
        self.values = staged;
        trace!(
            consumed = buf.len() - rest.len(),
            fields = self.values.len(),
            "decoded container"
        );
        Ok(rest)
    }
}
