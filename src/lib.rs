#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Field cloning between records of the same registered type.
pub mod clone;
/// Scalar-to-`f64` coercion.
pub mod coerce;
/// Extraction configuration types.
pub mod config;
/// Centralized constants used across extraction, splits, and dates.
pub mod constants;
/// Unix-time and business-day helpers.
pub mod dates;
/// Reusable example runners shared by downstream crates.
pub mod example_apps;
/// Record vectorization and matrix building.
pub mod extract;
/// Role markers, field shapes, and field values.
pub mod field;
/// Per-field flattening into numeric sub-vectors.
pub mod flatten;
/// Matrix output and extraction diagnostics.
pub mod matrix;
/// Schema registry keyed by record type.
pub mod registry;
/// Field-descriptor schemas and their builder.
pub mod schema;
/// Random train/test splitting.
pub mod splits;
/// Shared type aliases.
pub mod types;

mod errors;

pub use clone::clone_fields;
pub use coerce::coerce;
pub use config::ExtractionConfig;
pub use errors::{ExtractError, FlattenError};
pub use extract::Extractor;
pub use field::{Categorical, EnumDomain, FieldShape, FieldValue, Role, RoleSet, VariantValue};
pub use flatten::flatten;
pub use matrix::{ExtractionReport, Matrix, Vectorized};
pub use registry::SchemaRegistry;
pub use schema::{AnyRecord, FieldDescriptor, Record, Schema, SchemaBuilder};
pub use splits::{SplitLabel, TrainTestSplit, split, split_seeded};
pub use types::{ColumnLabel, FeatureVector, FieldName, TypeLabel, UnixSeconds};
