//! # wirestruct
//!
//! Declarative binary structure composition and codec.
//!
//! This crate provides:
//! - Field primitives: fixed-width big-endian integers and byte strings
//!   whose decode length can be bound to a sibling field
//! - Ordered field schemas with before/after insertion for subtype layouts
//! - Containers with declarative encode/decode and exact byte accounting
//! - A parameterized TLV composite with symbol-table type translation and
//!   automatic length synchronization
//! - A chainable payload base plus a key-exchange payload showing the
//!   extension pattern (spliced fields, overridden decode)
//!
//! Decoding always consumes exactly the bytes a layout declares and returns
//! the unconsumed remainder, so payloads can be chained by an outer
//! dispatch layer through the [`Wire`] trait.

pub mod container;
pub mod error;
pub mod field;
pub mod payload;
pub mod schema;
pub mod symbol;
pub mod tlv;

pub use container::{Container, Wire};
pub use error::CodecError;
pub use field::{FieldDef, FieldKind, FieldValue, LenBind};
pub use payload::{KxPayload, Payload, DH_GROUPS, KX_HEADER_SIZE, PAYLOAD_HEADER_SIZE};
pub use schema::{Schema, SchemaBuilder};
pub use symbol::SymbolTable;
pub use tlv::{HumanCodec, Tlv, TlvConfig, TlvValue, TypeRef, ValueRepr};
