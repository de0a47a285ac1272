use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::extract::LOG_PREFIX;
use crate::constants::split::MIN_TRAIN_COUNT;

/// Logical dataset partitions produced by [`split`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Test split.
    Test,
}

/// Disjoint train/test partition of a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit<T> {
    /// Records drawn for training, in draw order.
    pub train: Vec<T>,
    /// Remaining records, in their original relative order.
    pub test: Vec<T>,
}

impl<T> TrainTestSplit<T> {
    /// Total records across both partitions.
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// Returns true if both partitions are empty.
    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Records assigned to `label`.
    pub fn get(&self, label: SplitLabel) -> &[T] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Test => &self.test,
        }
    }

    /// Consume the split into `(train, test)`.
    pub fn into_parts(self) -> (Vec<T>, Vec<T>) {
        (self.train, self.test)
    }
}

/// Training-set size for `total` records at `ratio`.
///
/// `None` for degenerate input: an empty collection, or a ratio that is not
/// strictly between 0 and 1 (including `NaN`).
///
/// ```
/// use featurekit::splits::train_count;
///
/// assert_eq!(train_count(10, 0.75), Some(7));
/// assert_eq!(train_count(3, 0.1), Some(1));
/// assert_eq!(train_count(10, 1.0), None);
/// ```
pub fn train_count(total: usize, ratio: f64) -> Option<usize> {
    if total == 0 || !(ratio > 0.0 && ratio < 1.0) {
        return None;
    }
    let count = (total as f64 * ratio).floor() as usize;
    Some(count.max(MIN_TRAIN_COUNT).min(total))
}

/// Draw a training set from `records` without replacement.
///
/// Every remaining record is equally likely at each draw. Degenerate input
/// keeps every record in training and leaves the test set empty.
pub fn split<T, R>(records: Vec<T>, ratio: f64, rng: &mut R) -> TrainTestSplit<T>
where
    R: Rng + ?Sized,
{
    let total = records.len();
    let Some(count) = train_count(total, ratio) else {
        debug!("{LOG_PREFIX} degenerate split (records={total}, ratio={ratio}); all rows train");
        return TrainTestSplit {
            train: records,
            test: Vec::new(),
        };
    };

    let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();
    let train: Vec<T> = index::sample(rng, total, count)
        .iter()
        .filter_map(|idx| slots[idx].take())
        .collect();
    let test: Vec<T> = slots.into_iter().flatten().collect();
    debug!(
        "{LOG_PREFIX} split {total} records into train={} test={}",
        train.len(),
        test.len()
    );
    TrainTestSplit { train, test }
}

/// [`split`] driven by a `StdRng` seeded with `seed`.
pub fn split_seeded<T>(records: Vec<T>, ratio: f64, seed: u64) -> TrainTestSplit<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    split(records, ratio, &mut rng)
}
