use serde::{Deserialize, Serialize};

use crate::errors::FlattenError;
use crate::types::FeatureVector;

/// One record's numeric row plus the fields that failed to flatten.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vectorized {
    /// Concatenated sub-vectors of every field that flattened.
    pub values: FeatureVector,
    /// Fields that contributed no columns.
    pub degraded: Vec<FlattenError>,
}

impl Vectorized {
    /// Return `true` when every classified field flattened.
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Diagnostics gathered while building a [`Matrix`].
///
/// Extraction never fails; this is where degraded input shows up instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Number of rows produced.
    pub rows: usize,
    /// Expected row width when every field flattens.
    pub columns: usize,
    /// Total fields (across all rows) that contributed no columns.
    pub degraded_fields: usize,
    /// Rows whose width differs from `columns`.
    pub ragged_rows: usize,
    /// Rows whose record type differs from the type that defined the field set.
    pub foreign_rows: usize,
    /// `NaN` entries across all rows.
    pub nan_values: usize,
}

impl ExtractionReport {
    /// Return `true` when nothing degraded and no value is `NaN`.
    pub fn is_clean(&self) -> bool {
        self.degraded_fields == 0
            && self.ragged_rows == 0
            && self.foreign_rows == 0
            && self.nan_values == 0
    }
}

/// Row-major numeric matrix: row `i` derives from input record `i`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: Vec<FeatureVector>,
    report: ExtractionReport,
}

impl Matrix {
    /// Matrix with no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_vectorized(
        rows: Vec<Vectorized>,
        columns: usize,
        foreign_rows: usize,
    ) -> Self {
        let mut report = ExtractionReport {
            rows: rows.len(),
            columns,
            foreign_rows,
            ..ExtractionReport::default()
        };
        let rows: Vec<FeatureVector> = rows
            .into_iter()
            .map(|row| {
                report.degraded_fields += row.degraded.len();
                if row.values.len() != columns {
                    report.ragged_rows += 1;
                }
                report.nan_values += row.values.iter().filter(|value| value.is_nan()).count();
                row.values
            })
            .collect();
        Self { rows, report }
    }

    /// All rows in input order.
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Row `idx`, if present.
    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Iterate rows in input order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Common row width, or `None` when the matrix is empty or ragged.
    pub fn width(&self) -> Option<usize> {
        let first = self.rows.first()?.len();
        self.rows
            .iter()
            .all(|row| row.len() == first)
            .then_some(first)
    }

    /// Extraction diagnostics.
    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Contiguous row-major buffer, or `None` when rows differ in width.
    pub fn to_row_major(&self) -> Option<Vec<f64>> {
        if self.rows.is_empty() {
            return Some(Vec::new());
        }
        self.width()?;
        Some(self.rows.concat())
    }

    /// Consume the matrix, keeping only the rows.
    pub fn into_rows(self) -> Vec<FeatureVector> {
        self.rows
    }
}
