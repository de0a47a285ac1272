use crate::coerce::{coerce, coerce_opt};
use crate::constants::extract::{ONE_HOT_SELECTED, ONE_HOT_UNSELECTED};
use crate::errors::FlattenError;
use crate::field::{FieldShape, FieldValue};
use crate::schema::FieldDescriptor;
use crate::types::FeatureVector;

/// Flatten one field's value into its numeric sub-vector.
///
/// `value` is `None` when the field could not be read (the record belongs to
/// another type). Scalars never fail and fall back to `NaN`; arrays and
/// enumerations report a [`FlattenError`] when the value does not have the
/// declared structure.
pub fn flatten(
    field: &FieldDescriptor,
    value: Option<FieldValue>,
) -> Result<FeatureVector, FlattenError> {
    match field.shape() {
        FieldShape::Scalar => Ok(vec![coerce_opt(value.as_ref())]),
        FieldShape::FixedArray(len) => match value {
            Some(FieldValue::Array(elements)) => {
                if elements.len() != *len {
                    return Err(FlattenError::LengthMismatch {
                        field: field.name(),
                        expected: *len,
                        found: elements.len(),
                    });
                }
                Ok(elements.iter().map(coerce).collect())
            }
            Some(_) => Err(FlattenError::NotASequence {
                field: field.name(),
            }),
            None => Err(FlattenError::ForeignRecord {
                field: field.name(),
            }),
        },
        FieldShape::Enum(domain) => {
            let selected = match value {
                Some(FieldValue::Variant(variant)) => domain.position_of(&variant),
                Some(_) => None,
                None => {
                    return Err(FlattenError::ForeignRecord {
                        field: field.name(),
                    });
                }
            };
            let Some(selected) = selected else {
                return Err(FlattenError::UnresolvedVariant {
                    field: field.name(),
                    domain: domain.type_name(),
                });
            };
            Ok((0..domain.len())
                .map(|idx| {
                    if idx == selected {
                        ONE_HOT_SELECTED
                    } else {
                        ONE_HOT_UNSELECTED
                    }
                })
                .collect())
        }
    }
}

/// Read `field` from `record` and flatten it.
pub fn flatten_field(
    field: &FieldDescriptor,
    record: &dyn std::any::Any,
) -> Result<FeatureVector, FlattenError> {
    flatten(field, field.read(record))
}
