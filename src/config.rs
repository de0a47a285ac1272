use crate::constants::extract::DEFAULT_PARALLEL_ROW_THRESHOLD;

/// Runtime knobs for matrix extraction.
#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    /// Minimum row count before rows are vectorized on the rayon pool.
    ///
    /// Ignored when the crate is built without the `parallel` feature. Row
    /// order is identical either way.
    pub parallel_row_threshold: usize,
    /// Emit a `warn!` line when fields degrade or rows belong to another type.
    pub warn_on_degraded: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel_row_threshold: DEFAULT_PARALLEL_ROW_THRESHOLD,
            warn_on_degraded: true,
        }
    }
}

impl ExtractionConfig {
    /// Config that always vectorizes on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel_row_threshold: usize::MAX,
            ..Self::default()
        }
    }
}
