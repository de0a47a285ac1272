use thiserror::Error;

use crate::types::{FieldName, TypeLabel};

/// Error type for schema registration, strict extraction, cloning, and date arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("invalid schema for '{type_name}': {reason}")]
    Schema { type_name: TypeLabel, reason: String },
    #[error("record type '{0}' has no registered schema")]
    UnregisteredType(TypeLabel),
    #[error("row {row} has type '{found}' but the collection started with '{expected}'")]
    MixedRecordTypes {
        row: usize,
        expected: TypeLabel,
        found: TypeLabel,
    },
    #[error("schema for '{schema}' cannot be applied to a '{record}' record")]
    SchemaMismatch { schema: TypeLabel, record: TypeLabel },
    #[error("can only add a non-negative number of business days (got {0})")]
    NegativeDayCount(i64),
    #[error("date arithmetic left the representable range")]
    DateOutOfRange,
}

/// Structural failure while flattening one field.
///
/// The vectorizer absorbs these as a zero-length contribution and counts them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("field '{field}' is declared as an array but holds a non-sequence value")]
    NotASequence { field: FieldName },
    #[error("field '{field}' is declared with {expected} elements but holds {found}")]
    LengthMismatch {
        field: FieldName,
        expected: usize,
        found: usize,
    },
    #[error("field '{field}' holds a value that is not a member of '{domain}'")]
    UnresolvedVariant { field: FieldName, domain: TypeLabel },
    #[error("field '{field}' could not be read from a record of another type")]
    ForeignRecord { field: FieldName },
}

impl FlattenError {
    /// Name of the field that failed to flatten.
    pub fn field(&self) -> FieldName {
        match self {
            FlattenError::NotASequence { field }
            | FlattenError::LengthMismatch { field, .. }
            | FlattenError::UnresolvedVariant { field, .. }
            | FlattenError::ForeignRecord { field } => field,
        }
    }
}
