//! Chainable payloads: a generic base layout and a key-exchange extension.
//!
//! Base payload layout:
//!
//! ```text
//! +-------------+---------+---------+----------------------+
//! | next_header | flags   | length  | body                 |
//! | 1 byte      | 1 byte  | 2 bytes | length - 4 bytes     |
//! +-------------+---------+---------+----------------------+
//! ```
//!
//! `length` is the total on-wire size of the payload including the 4 fixed
//! header bytes. Decode consumes exactly `length` bytes and hands the rest
//! of the buffer back, so the payload named by `next_header` can continue
//! parsing a chain.
//!
//! [`KxPayload`] shows the extension pattern: it splices `group_id`,
//! `reserved`, and `exchange_data` before the inherited `body` and overrides
//! decode, because the exchange data's size is derived from the outer
//! `length` member rather than bound to an adjacent sibling.

use crate::container::{Container, Wire};
use crate::error::CodecError;
use crate::field::{self, FieldDef, LenBind};
use crate::schema::{Schema, SchemaBuilder};
use crate::symbol::SymbolTable;
use crate::tlv::TypeRef;
use bytes::{Bytes, BytesMut};
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Fixed header width of the base payload.
pub const PAYLOAD_HEADER_SIZE: usize = 4;

/// Fixed header width of the key-exchange payload (base header plus
/// `group_id` and `reserved`).
pub const KX_HEADER_SIZE: usize = 8;

/// Diffie-Hellman group identifiers, supplied by the surrounding protocol.
pub static DH_GROUPS: SymbolTable =
    SymbolTable::new(&[(1, "MODP4096"), (2, "MODP6144"), (3, "MODP8192")]);

/// The base layout every payload starts from. Subtypes splice their own
/// fields in front of `body`.
fn base_layout() -> SchemaBuilder {
    Schema::builder()
        .field(FieldDef::uint("next_header", 1, 0))
        .field(FieldDef::uint("flags", 1, 0))
        .field(FieldDef::uint("length", 2, PAYLOAD_HEADER_SIZE as u64))
        .field(FieldDef::bytes("body", LenBind::Remaining))
}

fn base_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA.get_or_init(|| base_layout().build()).clone()
}

fn kx_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            base_layout()
                .field_before("body", FieldDef::uint("group_id", 2, 0))
                .field_before("body", FieldDef::uint("reserved", 2, 0))
                .field_before("body", FieldDef::bytes("exchange_data", LenBind::Remaining))
                .build()
        })
        .clone()
}

/// Generic payload with an opaque body.
#[derive(Debug, Clone)]
pub struct Payload {
    inner: Container,
}

impl Payload {
    /// An empty payload (`length` = header size).
    pub fn new() -> Self {
        Self {
            inner: Container::new(base_schema()),
        }
    }

    pub fn next_header(&self) -> u64 {
        self.inner
            .uint("next_header")
            .expect("payload schema declares 'next_header'")
    }

    pub fn set_next_header(&mut self, value: u64) {
        self.inner
            .set_uint("next_header", value)
            .expect("payload schema declares 'next_header'");
    }

    /// Total on-wire size of this payload, including its fixed header.
    pub fn length(&self) -> u64 {
        self.inner
            .uint("length")
            .expect("payload schema declares 'length'")
    }

    pub fn body(&self) -> &Bytes {
        self.inner
            .bytes("body")
            .expect("payload schema declares 'body'")
    }

    /// Replaces the body and re-derives `length`.
    pub fn set_body(&mut self, content: impl Into<Bytes>) {
        let content = content.into();
        let length = (PAYLOAD_HEADER_SIZE + content.len()) as u64;
        self.inner
            .set_bytes("body", content)
            .expect("payload schema declares 'body'");
        self.inner
            .set_uint("length", length)
            .expect("payload schema declares 'length'");
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new()
    }
}

impl Wire for Payload {
    fn total_size(&self) -> usize {
        self.inner.total_size()
    }

    fn encode(&self) -> BytesMut {
        self.inner.encode()
    }

    /// Consumes exactly `length` bytes and returns the remainder for the
    /// next payload in the chain. A failed decode leaves the payload
    /// untouched.
    fn decode<'a>(&mut self, buf: &'a [u8]) -> Result<&'a [u8], CodecError> {
        let (next_header, rest) = field::take_uint("next_header", 1, buf)?;
        let (flags, rest) = field::take_uint("flags", 1, rest)?;
        let (length, rest) = field::take_uint("length", 2, rest)?;
        if (length as usize) < PAYLOAD_HEADER_SIZE {
            return Err(CodecError::InvalidLength {
                field: "length",
                value: length,
                min: PAYLOAD_HEADER_SIZE,
            });
        }
        let (body, rest) = field::take_bytes("body", length as usize - PAYLOAD_HEADER_SIZE, rest)?;

        self.inner.set_uint("next_header", next_header)?;
        self.inner.set_uint("flags", flags)?;
        self.inner.set_uint("length", length)?;
        self.inner.set_bytes("body", body)?;
        trace!(length, remaining = rest.len(), "decoded payload");
        Ok(rest)
    }
}

/// Key-exchange payload:
///
/// ```text
/// +-------------+-------+---------+----------+----------+------------------+
/// | next_header | flags | length  | group_id | reserved | exchange_data    |
/// | 1 byte      |1 byte | 2 bytes | 2 bytes  | 2 bytes  | length - 8 bytes |
/// +-------------+-------+---------+----------+----------+------------------+
/// ```
#[derive(Debug, Clone)]
pub struct KxPayload {
    inner: Container,
}

impl KxPayload {
    /// Creates a key-exchange payload for the given group, by numeric
    /// identifier or by symbolic name resolved against [`DH_GROUPS`].
    /// An unrecognized name fails before anything is constructed.
    pub fn new<'a>(group: impl Into<TypeRef<'a>>) -> Result<Self, CodecError> {
        let group_id = match group.into() {
            TypeRef::Code(code) => code,
            TypeRef::Name(name) => {
                DH_GROUPS
                    .code(name)
                    .ok_or_else(|| CodecError::UnknownSymbol {
                        field: "group_id",
                        name: name.to_string(),
                    })?
            }
        };
        let mut inner = Container::new(kx_schema());
        inner.set_uint("group_id", group_id)?;
        inner.set_uint("length", KX_HEADER_SIZE as u64)?;
        Ok(Self { inner })
    }

    pub fn next_header(&self) -> u64 {
        self.inner
            .uint("next_header")
            .expect("kx schema declares 'next_header'")
    }

    pub fn set_next_header(&mut self, value: u64) {
        self.inner
            .set_uint("next_header", value)
            .expect("kx schema declares 'next_header'");
    }

    /// Total on-wire size, including the 8-byte fixed header.
    pub fn length(&self) -> u64 {
        self.inner
            .uint("length")
            .expect("kx schema declares 'length'")
    }

    pub fn group_id(&self) -> u64 {
        self.inner
            .uint("group_id")
            .expect("kx schema declares 'group_id'")
    }

    /// Symbolic group name when known, decimal form otherwise.
    pub fn group_display(&self) -> String {
        DH_GROUPS.display(self.group_id())
    }

    pub fn exchange_data(&self) -> &Bytes {
        self.inner
            .bytes("exchange_data")
            .expect("kx schema declares 'exchange_data'")
    }

    /// Replaces the exchange data and re-derives `length`.
    pub fn set_exchange_data(&mut self, content: impl Into<Bytes>) {
        let content = content.into();
        let length = (KX_HEADER_SIZE + content.len()) as u64;
        self.inner
            .set_bytes("exchange_data", content)
            .expect("kx schema declares 'exchange_data'");
        self.inner
            .set_uint("length", length)
            .expect("kx schema declares 'length'");
    }
}

impl Wire for KxPayload {
    fn total_size(&self) -> usize {
        self.inner.total_size()
    }

    fn encode(&self) -> BytesMut {
        self.inner.encode()
    }

    /// Decode override for a non-adjacent length binding: the exchange
    /// data's size comes from the outer `length` member, not from a sibling
    /// field next to it. The base header decodes first, then the spliced
    /// fixed fields, then exactly `length - 8` bytes of exchange data; the
    /// remainder goes back to the caller so the chain can continue.
    fn decode<'a>(&mut self, buf: &'a [u8]) -> Result<&'a [u8], CodecError> {
        let (next_header, rest) = field::take_uint("next_header", 1, buf)?;
        let (flags, rest) = field::take_uint("flags", 1, rest)?;
        let (length, rest) = field::take_uint("length", 2, rest)?;
        if (length as usize) < KX_HEADER_SIZE {
            return Err(CodecError::InvalidLength {
                field: "length",
                value: length,
                min: KX_HEADER_SIZE,
            });
        }
        let (group_id, rest) = field::take_uint("group_id", 2, rest)?;
        let (reserved, rest) = field::take_uint("reserved", 2, rest)?;
        let (data, rest) =
            field::take_bytes("exchange_data", length as usize - KX_HEADER_SIZE, rest)?;

        self.inner.set_uint("next_header", next_header)?;
        self.inner.set_uint("flags", flags)?;
        self.inner.set_uint("length", length)?;
        self.inner.set_uint("group_id", group_id)?;
        self.inner.set_uint("reserved", reserved)?;
        self.inner.set_bytes("exchange_data", data)?;
        self.inner.set_bytes("body", Bytes::new())?;
        trace!(length, group_id, remaining = rest.len(), "decoded kx payload");
        Ok(rest)
    }
}
