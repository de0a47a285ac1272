/// Constants used by record vectorization and matrix building.
pub mod extract {
    /// Minimum number of rows before row vectorization is spread across the rayon pool.
    pub const DEFAULT_PARALLEL_ROW_THRESHOLD: usize = 4096;
    /// Prefix used on every log line emitted by the extraction engine.
    pub const LOG_PREFIX: &str = "[featurekit]";
    /// Value written at the selected position of a one-hot sub-vector.
    pub const ONE_HOT_SELECTED: f64 = 1.0;
    /// Value written at every other position of a one-hot sub-vector.
    pub const ONE_HOT_UNSELECTED: f64 = 0.0;
}

/// Constants used by train/test splitting.
pub mod split {
    /// Training share used by the demo runner when none is given.
    pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;
    /// Smallest training set produced from a non-empty collection.
    pub const MIN_TRAIN_COUNT: usize = 1;
}

/// Constants used by Unix-time conversion and business-day arithmetic.
pub mod dates {
    /// Seconds in one calendar day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Calendar days in one week.
    pub const DAYS_PER_WEEK: i64 = 7;
    /// Business days in one week.
    pub const BUSINESS_DAYS_PER_WEEK: i64 = 5;
}
