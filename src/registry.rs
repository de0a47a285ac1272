use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::constants::extract::LOG_PREFIX;
use crate::errors::ExtractError;
use crate::schema::{AnyRecord, Record, Schema};

/// Mapping from record type identity to its registered schema.
///
/// Replaces runtime reflection: a type is only visible to the extractor once
/// its schema has been inserted here.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<TypeId, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a schema, returning the previous one for that type.
    pub fn insert(&mut self, schema: Schema) -> Option<Arc<Schema>> {
        debug!(
            "{LOG_PREFIX} registered schema '{}' ({} fields)",
            schema.type_name(),
            schema.len()
        );
        self.schemas.insert(schema.type_id(), Arc::new(schema))
    }

    /// Build and insert the schema a [`Record`] type declares for itself.
    pub fn register<R: Record>(&mut self) -> Result<Arc<Schema>, ExtractError> {
        let schema = Arc::new(Schema::of::<R>()?);
        self.schemas.insert(TypeId::of::<R>(), Arc::clone(&schema));
        debug!(
            "{LOG_PREFIX} registered record '{}' ({} fields)",
            schema.type_name(),
            schema.len()
        );
        Ok(schema)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<R: Record>(mut self) -> Result<Self, ExtractError> {
        self.register::<R>()?;
        Ok(self)
    }

    /// Schema registered for `type_id`.
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<Schema>> {
        self.schemas.get(&type_id)
    }

    /// Schema registered for `R`.
    pub fn schema_of<R: 'static>(&self) -> Option<&Arc<Schema>> {
        self.get(TypeId::of::<R>())
    }

    /// Schema registered for the runtime type of `record`.
    pub fn schema_for(&self, record: &dyn AnyRecord) -> Option<&Arc<Schema>> {
        self.get(record.as_any().type_id())
    }

    /// Return `true` when `R` has a schema.
    pub fn contains<R: 'static>(&self) -> bool {
        self.schemas.contains_key(&TypeId::of::<R>())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
