/// One numeric row produced for a record under one role.
/// Example: `[3.0, 1.0, 2.0]`
pub type FeatureVector = Vec<f64>;
/// Declared field name inside a schema.
/// Examples: `temperature`, `window`, `weather`
pub type FieldName = &'static str;
/// Readable type name used in schemas, diagnostics, and errors.
/// Examples: `Reading`, `my_crate::SensorRecord`
pub type TypeLabel = &'static str;
/// Readable label for one output column of a matrix.
/// Examples: `temperature`, `window[2]`, `weather=Rain`
pub type ColumnLabel = String;
/// Seconds since 1970-01-01T00:00:00.
/// Example: `1735732800`
pub type UnixSeconds = i64;
