//! Feature/label extraction and the positional train/validation split.

use core::ops::Range;

use ndarray::{s, Array1, Array2, Axis};

use reorderlab_inventory::ProductRecord;

/// Number of numeric features per product:
/// `[current_inventory, avg_sales_per_week, days_to_replenish]`.
pub const FEATURE_COUNT: usize = 3;

/// Feature matrix plus a label vector, one row per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Self {
        assert_eq!(features.nrows(), labels.len());
        Dataset { features, labels }
    }

    /// Extracts features and rule labels, preserving record order.
    pub fn from_records(records: &[ProductRecord]) -> Self {
        Dataset {
            features: feature_matrix(records),
            labels: records.iter().map(|r| f64::from(r.reorder_label())).collect(),
        }
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Same labels over a replaced feature matrix (e.g. normalized copy).
    pub fn with_features(&self, features: Array2<f64>) -> Self {
        Dataset::new(features, self.labels.clone())
    }

    /// Copies the rows in `range` into a new dataset.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Dataset {
            features: self.features.slice(s![range.clone(), ..]).to_owned(),
            labels: self.labels.slice(s![range]).to_owned(),
        }
    }

    /// Gathers the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}

/// Feature matrix for `records`, one row per record in order.
pub fn feature_matrix(records: &[ProductRecord]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), FEATURE_COUNT), |(row, col)| records[row].features()[col])
}

/// Deterministic train/validation partition by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

/// Splits `n` rows at `floor(train_fraction * n)`: the leading block trains,
/// the rest validates. No shuffling happens here.
pub fn positional_split(n: usize, train_fraction: f64) -> Split {
    let cut = ((train_fraction * n as f64).floor() as usize).min(n);
    Split {
        train: 0..cut,
        validation: cut..n,
    }
}
