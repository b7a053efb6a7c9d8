//! Engine binding a field schema
//!
//! The engine carries the configured [`Schema`]; field access and wire
//! transcoding are methods on it (see [`fields`](crate::fields),
//! [`encoder`](crate::encoder) and [`decoder`](crate::decoder)). Several
//! engines with different schemas can live side by side, and a configured
//! engine is read-only while encoding or decoding.

use crate::error::{Error, Result};
use crate::schema::{BitmapMode, FieldFormat, Schema};

/// ISO 8583 codec bound to a field schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engine {
    schema: Option<Schema>,
}

impl Engine {
    /// Create an engine with no schema; every operation fails with
    /// `Error::SchemaNotConfigured` until one is configured
    #[inline]
    pub const fn new() -> Self {
        Self { schema: None }
    }

    /// Create an engine bound to `schema`
    #[inline]
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Configure from a bitmap mode and a field format table
    ///
    /// Replaces any previous schema.
    pub fn configure(&mut self, mode: BitmapMode, table: &[FieldFormat]) -> Result<()> {
        self.configure_schema(Schema::new(mode, table)?)
    }

    /// Configure from a prepared schema, validating it first
    ///
    /// Replaces any previous schema. Use this for schemas loaded through
    /// serde, which bypass [`Schema::new`].
    pub fn configure_schema(&mut self, schema: Schema) -> Result<()> {
        schema.validate()?;
        crate::debug!(
            mode = ?schema.mode(),
            policy = ?schema.digit_policy(),
            "field schema configured"
        );
        self.schema = Some(schema);
        Ok(())
    }

    /// Check whether a schema is bound
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.schema.is_some()
    }

    /// The bound schema
    #[inline]
    pub fn schema(&self) -> Result<&Schema> {
        self.schema.as_ref().ok_or(Error::SchemaNotConfigured)
    }
}
