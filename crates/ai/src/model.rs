use ndarray::{Array1, Array2};

use reorderlab_inventory::ProductRecord;

use crate::dataset;
use crate::network::Sequential;
use crate::result::AiError;
use crate::scaler::MinMaxScaler;

/// A fitted reorder classifier: the network plus the normalization it was
/// trained under.
///
/// The two halves are only meaningful together, so they live and die as one
/// handle. Not `Clone`: a session holds exactly one current model and hands
/// ownership over when a new one replaces it.
#[derive(Debug)]
pub struct ReorderModel {
    scaler: MinMaxScaler,
    network: Sequential,
}

impl ReorderModel {
    pub fn new(scaler: MinMaxScaler, network: Sequential) -> Result<Self, AiError> {
        if scaler.cols() != network.input_len() {
            return Err(AiError::invalid_input(format!(
                "scaler has {} columns but network expects {} inputs",
                scaler.cols(),
                network.input_len()
            )));
        }
        Ok(Self { scaler, network })
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn network(&self) -> &Sequential {
        &self.network
    }

    /// Scores raw (un-normalized) features.
    pub fn score_features(&self, features: &[f64]) -> Result<f64, AiError> {
        if features.len() != self.scaler.cols() {
            return Err(AiError::inference_failed(format!(
                "expected {} features, found {}",
                self.scaler.cols(),
                features.len()
            )));
        }
        let row = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| AiError::inference_failed(e.to_string()))?;
        let scores = self.score_matrix(&row)?;
        Ok(scores[0])
    }

    /// Probability that `record` needs reordering.
    pub fn score(&self, record: &ProductRecord) -> Result<f64, AiError> {
        self.score_features(&record.features())
    }

    /// Scores every record, returning copies carrying fresh predictions.
    ///
    /// Predictions already present on the input are discarded.
    pub fn score_all(&self, records: &[ProductRecord]) -> Result<Vec<ProductRecord>, AiError> {
        let scores = self.score_matrix(&dataset::feature_matrix(records))?;
        Ok(records
            .iter()
            .zip(scores.iter())
            .map(|(record, &score)| record.clone().with_prediction(score))
            .collect())
    }

    /// Normalizes raw rows and runs them through the network in one batch.
    fn score_matrix(&self, features: &Array2<f64>) -> Result<Array1<f64>, AiError> {
        let normalized = self.scaler.transform(features);
        let scores = self.network.predict(&normalized).column(0).to_owned();
        if let Some(bad) = scores.iter().find(|s| !(0.0..=1.0).contains(*s)) {
            return Err(AiError::inference_failed(format!("model produced invalid score {bad}")));
        }
        Ok(scores)
    }
}
