use std::any::{Any, TypeId};

use crate::errors::ExtractError;
use crate::schema::Schema;

/// Copy every writable field of `source` into `destination`.
///
/// Fields are matched by their declared identity in `schema`; fields that were
/// not registered with [`SchemaBuilder::writable`](crate::schema::SchemaBuilder::writable)
/// are left untouched. Returns the number of fields copied.
pub fn clone_fields<R: Any>(
    schema: &Schema,
    source: &R,
    destination: &mut R,
) -> Result<usize, ExtractError> {
    if TypeId::of::<R>() != schema.type_id() {
        return Err(ExtractError::SchemaMismatch {
            schema: schema.type_name(),
            record: std::any::type_name::<R>(),
        });
    }
    let mut copied = 0;
    for field in schema.fields().filter(|field| field.is_writable()) {
        if field.copy_between(source, &mut *destination) {
            copied += 1;
        }
    }
    Ok(copied)
}
