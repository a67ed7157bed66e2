//! Per-column min/max normalization.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Column-wise min/max scaler, fitted once and applied to any matrix with the
/// same column layout.
///
/// A column whose maximum equals its minimum normalizes to `0` for every
/// row, so constant features never divide by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    max: Array1<f64>,
}

impl MinMaxScaler {
    /// Computes per-column bounds over every row of `features`.
    ///
    /// An empty matrix yields `[0, 0]` bounds for every column.
    pub fn fit(features: &Array2<f64>) -> Self {
        if features.nrows() == 0 {
            return MinMaxScaler {
                min: Array1::zeros(features.ncols()),
                max: Array1::zeros(features.ncols()),
            };
        }
        MinMaxScaler {
            min: features.fold_axis(Axis(0), f64::INFINITY, |&lo, &x| lo.min(x)),
            max: features.fold_axis(Axis(0), f64::NEG_INFINITY, |&hi, &x| hi.max(x)),
        }
    }

    pub fn min(&self) -> &Array1<f64> {
        &self.min
    }

    pub fn max(&self) -> &Array1<f64> {
        &self.max
    }

    pub fn cols(&self) -> usize {
        self.min.len()
    }

    /// Returns a normalized copy of `features`.
    ///
    /// Panics if `features` does not have [`cols`](Self::cols) columns.
    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        assert_eq!(features.ncols(), self.cols());
        let mut out = features.to_owned();
        for ((mut column, &lo), &hi) in out.axis_iter_mut(Axis(1)).zip(&self.min).zip(&self.max) {
            let range = hi - lo;
            if range == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|x| (x - lo) / range);
            }
        }
        out
    }
}
