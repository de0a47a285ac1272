//! Record vectorization and matrix building.
//!
//! The field set of a matrix is always taken from the first record's type;
//! every row is then vectorized against that single field set. Fields whose
//! values are structurally wrong contribute nothing to their row and are
//! counted in the [`ExtractionReport`](crate::matrix::ExtractionReport).

use std::any::{Any, TypeId};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::clone::clone_fields;
use crate::config::ExtractionConfig;
use crate::constants::extract::LOG_PREFIX;
use crate::errors::ExtractError;
use crate::field::Role;
use crate::flatten::flatten_field;
use crate::matrix::{Matrix, Vectorized};
use crate::registry::SchemaRegistry;
use crate::schema::{AnyRecord, FieldDescriptor, Schema};
use crate::types::FeatureVector;

/// Vectorize `record` against an already classified field list.
pub fn vectorize_fields(fields: &[&FieldDescriptor], record: &dyn Any) -> Vectorized {
    let width = fields.iter().map(|field| field.shape().width()).sum();
    let mut values = Vec::with_capacity(width);
    let mut degraded = Vec::new();
    for field in fields {
        match flatten_field(field, record) {
            Ok(sub_vector) => values.extend(sub_vector),
            Err(err) => degraded.push(err),
        }
    }
    Vectorized { values, degraded }
}

impl Schema {
    /// Vectorize one record under `role`, keeping per-field failures.
    pub fn vectorize(&self, record: &dyn Any, role: Role) -> Vectorized {
        vectorize_fields(&self.classify(role), record)
    }

    /// Build a matrix from records of the schema's own type.
    pub fn matrix<R: AnyRecord>(&self, records: &[R], role: Role) -> Matrix {
        let records: Vec<&dyn AnyRecord> = records.iter().map(AnyRecord::as_record).collect();
        assemble(self, &records, role, &ExtractionConfig::default())
    }
}

/// Extraction entry point over a [`SchemaRegistry`].
///
/// Holds no per-call state; every method derives its result from the
/// registry and its arguments.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    registry: SchemaRegistry,
    config: ExtractionConfig,
}

impl Extractor {
    /// Create an extractor with the default config.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self::with_config(registry, ExtractionConfig::default())
    }

    /// Create an extractor with an explicit config.
    pub fn with_config(registry: SchemaRegistry, config: ExtractionConfig) -> Self {
        Self { registry, config }
    }

    /// Registered schemas.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Active config.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Fields of the type `type_id` carrying `role`, in declaration order.
    ///
    /// Empty for unregistered types.
    pub fn classify(&self, type_id: TypeId, role: Role) -> Vec<&FieldDescriptor> {
        self.registry
            .get(type_id)
            .map(|schema| schema.classify(role))
            .unwrap_or_default()
    }

    /// Numeric row for one record, classified against its own type.
    pub fn vectorize<T: AnyRecord + ?Sized>(&self, record: &T, role: Role) -> FeatureVector {
        self.vectorize_detailed(record, role).values
    }

    /// Like [`vectorize`](Self::vectorize), keeping per-field failures.
    pub fn vectorize_detailed<T: AnyRecord + ?Sized>(
        &self,
        record: &T,
        role: Role,
    ) -> Vectorized {
        let record = record.as_record();
        let Some(schema) = self.registry.schema_for(record) else {
            debug!(
                "{LOG_PREFIX} no schema registered for '{}'; vectorized as empty",
                record.type_label()
            );
            return Vectorized::default();
        };
        let vectorized = schema.vectorize(record.as_any(), role);
        if self.config.warn_on_degraded && !vectorized.is_complete() {
            warn!(
                "{LOG_PREFIX} {} {role} field(s) of '{}' degraded: {}",
                vectorized.degraded.len(),
                schema.type_name(),
                describe_failures(&vectorized)
            );
        }
        vectorized
    }

    /// Model-input matrix (fields marked [`Role::Feature`]).
    pub fn input_matrix<'a, I, T>(&self, records: I) -> Matrix
    where
        I: IntoIterator<Item = &'a T>,
        T: AnyRecord + ?Sized + 'a,
    {
        self.build_matrix(records, Role::Feature)
    }

    /// Model-output matrix (fields marked [`Role::Label`]).
    pub fn output_matrix<'a, I, T>(&self, records: I) -> Matrix
    where
        I: IntoIterator<Item = &'a T>,
        T: AnyRecord + ?Sized + 'a,
    {
        self.build_matrix(records, Role::Label)
    }

    /// Matrix for `role`, using the first record's type to pick the field set.
    ///
    /// Returns an empty matrix for an empty collection, an unregistered first
    /// type, or a first type with no fields for `role`. Never fails: records of
    /// other types are still vectorized against the first type's fields and
    /// counted as foreign rows.
    pub fn build_matrix<'a, I, T>(&self, records: I, role: Role) -> Matrix
    where
        I: IntoIterator<Item = &'a T>,
        T: AnyRecord + ?Sized + 'a,
    {
        let records = collect_records(records);
        let Some(&first) = records.first() else {
            return Matrix::empty();
        };
        let Some(schema) = self.registry.schema_for(first) else {
            if self.config.warn_on_degraded {
                warn!(
                    "{LOG_PREFIX} no schema registered for '{}'; {role} matrix is empty",
                    first.type_label()
                );
            }
            return Matrix::empty();
        };
        assemble(schema, &records, role, &self.config)
    }

    /// Strict [`build_matrix`](Self::build_matrix): every record must share the
    /// first record's registered type.
    pub fn try_build_matrix<'a, I, T>(
        &self,
        records: I,
        role: Role,
    ) -> Result<Matrix, ExtractError>
    where
        I: IntoIterator<Item = &'a T>,
        T: AnyRecord + ?Sized + 'a,
    {
        let records = collect_records(records);
        let Some(&first) = records.first() else {
            return Ok(Matrix::empty());
        };
        let schema = self
            .registry
            .schema_for(first)
            .ok_or_else(|| ExtractError::UnregisteredType(first.type_label()))?;
        if let Some((row, &record)) = records
            .iter()
            .enumerate()
            .find(|&(_, &record)| !schema.accepts(record.as_any()))
        {
            return Err(ExtractError::MixedRecordTypes {
                row,
                expected: first.type_label(),
                found: record.type_label(),
            });
        }
        Ok(assemble(schema, &records, role, &self.config))
    }

    /// Copy every writable field of `source` into `destination` using the
    /// registered schema of `R`. Returns the number of fields copied.
    pub fn clone_record<R: AnyRecord>(
        &self,
        source: &R,
        destination: &mut R,
    ) -> Result<usize, ExtractError> {
        let schema = self
            .registry
            .schema_of::<R>()
            .ok_or_else(|| ExtractError::UnregisteredType(std::any::type_name::<R>()))?;
        clone_fields(schema, source, destination)
    }
}

fn collect_records<'a, I, T>(records: I) -> Vec<&'a dyn AnyRecord>
where
    I: IntoIterator<Item = &'a T>,
    T: AnyRecord + ?Sized + 'a,
{
    records.into_iter().map(|record| record.as_record()).collect()
}

fn assemble(
    schema: &Schema,
    records: &[&dyn AnyRecord],
    role: Role,
    config: &ExtractionConfig,
) -> Matrix {
    let fields = schema.classify(role);
    if records.is_empty() || fields.is_empty() {
        return Matrix::empty();
    }

    let foreign_rows = records
        .iter()
        .filter(|&&record| !schema.accepts(record.as_any()))
        .count();
    let rows = vectorize_rows(&fields, records, config);
    let matrix = Matrix::from_vectorized(rows, schema.width(role), foreign_rows);

    let report = matrix.report();
    if config.warn_on_degraded && (report.degraded_fields > 0 || report.foreign_rows > 0) {
        warn!(
            "{LOG_PREFIX} {role} matrix for '{}' degraded: {} field(s) dropped, {} ragged row(s), {} foreign row(s)",
            schema.type_name(),
            report.degraded_fields,
            report.ragged_rows,
            report.foreign_rows
        );
    }
    debug!(
        "{LOG_PREFIX} built {role} matrix for '{}' ({} rows x {} columns, {} NaN)",
        schema.type_name(),
        report.rows,
        report.columns,
        report.nan_values
    );
    matrix
}

#[cfg(feature = "parallel")]
fn vectorize_rows(
    fields: &[&FieldDescriptor],
    records: &[&dyn AnyRecord],
    config: &ExtractionConfig,
) -> Vec<Vectorized> {
    if records.len() >= config.parallel_row_threshold {
        records
            .par_iter()
            .map(|&record| vectorize_fields(fields, record.as_any()))
            .collect()
    } else {
        records
            .iter()
            .map(|&record| vectorize_fields(fields, record.as_any()))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn vectorize_rows(
    fields: &[&FieldDescriptor],
    records: &[&dyn AnyRecord],
    _config: &ExtractionConfig,
) -> Vec<Vectorized> {
    records
        .iter()
        .map(|&record| vectorize_fields(fields, record.as_any()))
        .collect()
}

fn describe_failures(vectorized: &Vectorized) -> String {
    vectorized
        .degraded
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
