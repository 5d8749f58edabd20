//! Ordered field schemas.
//!
//! A [`Schema`] is the type-level description of a binary layout: an ordered
//! list of named field declarations. Declaration order is wire order. A
//! schema is built once per concrete type and shared by every instance; the
//! builder supports splicing a field before or after an already-declared one
//! so a subtype can interleave its own fields into an inherited layout
//! without disturbing the inherited order.

use crate::field::FieldDef;
use std::sync::Arc;

/// Immutable ordered field layout shared by all instances of a type.
#[derive(Debug)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Field declarations in wire order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Position of the named field, if declared.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Builder for [`Schema`].
///
/// Schema construction happens at type-definition time, so misdeclarations
/// (duplicate names, unknown anchors) are programming errors and panic
/// rather than returning `Result`.
#[derive(Debug)]
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Appends a field at the end of the layout.
    ///
    /// # Panics
    ///
    /// Panics if a field with the same name is already declared.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.insert_at(self.fields.len(), def);
        self
    }

    /// Inserts a field immediately before the named anchor field.
    ///
    /// # Panics
    ///
    /// Panics if the anchor is not declared or the name is a duplicate.
    pub fn field_before(mut self, anchor: &str, def: FieldDef) -> Self {
        let idx = self.anchor_index(anchor);
        self.insert_at(idx, def);
        self
    }

    /// Inserts a field immediately after the named anchor field.
    ///
    /// # Panics
    ///
    /// Panics if the anchor is not declared or the name is a duplicate.
    pub fn field_after(mut self, anchor: &str, def: FieldDef) -> Self {
        let idx = self.anchor_index(anchor) + 1;
        self.insert_at(idx, def);
        self
    }

    /// Finalizes the schema.
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            fields: self.fields,
        })
    }

    fn anchor_index(&self, anchor: &str) -> usize {
        self.fields
            .iter()
            .position(|f| f.name == anchor)
            .unwrap_or_else(|| panic!("schema declares no field named '{anchor}'"))
    }

    fn insert_at(&mut self, idx: usize, def: FieldDef) {
        assert!(
            self.fields.iter().all(|f| f.name != def.name),
            "duplicate field name '{}'",
            def.name
        );
        self.fields.insert(idx, def);
    }
}
