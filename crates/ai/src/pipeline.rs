//! Normalize, fit and score in one cycle.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use reorderlab_inventory::ProductRecord;

use crate::dataset::{positional_split, Dataset, FEATURE_COUNT};
use crate::model::ReorderModel;
use crate::network::Sequential;
use crate::optimizer::Adam;
use crate::result::AiError;
use crate::scaler::MinMaxScaler;
use crate::trainer::{EpochMetrics, Logging, Shuffle, Trainer, TrainingConfig};

/// Summary of one training cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: Vec<EpochMetrics>,
    pub train_size: usize,
    pub validation_size: usize,
    /// Validation accuracy of the final epoch; `None` without a validation block.
    pub validation_accuracy: Option<f64>,
    pub final_loss: f64,
    pub trained_at: DateTime<Utc>,
}

/// Everything a successful cycle produces.
#[derive(Debug)]
pub struct TrainingOutcome {
    /// Input records, in order, carrying fresh predictions.
    pub records: Vec<ProductRecord>,
    pub report: TrainingReport,
    pub model: ReorderModel,
}

/// Fits a fresh classifier on `records` and scores every one of them.
///
/// The scaler is fitted once over all rows, the leading
/// `floor(train_fraction * n)` rows train the network and the remainder is
/// only used for validation metrics. Scoring re-applies the same scaler to
/// the full feature matrix.
pub fn train_and_score(records: &[ProductRecord], config: &TrainingConfig) -> Result<TrainingOutcome, AiError> {
    if records.is_empty() {
        return Err(AiError::invalid_input("no products to train on"));
    }
    config.validate()?;

    let split = positional_split(records.len(), config.train_fraction);
    if split.train.is_empty() {
        return Err(AiError::invalid_input(format!(
            "{} product(s) leave an empty training block",
            records.len()
        )));
    }

    info!(
        products = records.len(),
        train = split.train.len(),
        validation = split.validation.len(),
        epochs = config.epochs,
        "training reorder model"
    );

    let raw = Dataset::from_records(records);
    let scaler = MinMaxScaler::fit(raw.features());
    let normalized = raw.with_features(scaler.transform(raw.features()));
    let train = normalized.slice(split.train.clone());
    let validation = normalized.slice(split.validation.clone());
    drop(normalized);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let network = Sequential::new(FEATURE_COUNT, &config.layer_specs(), &mut rng)?;
    let fitted = Trainer::new(network, Adam::new(config.learning_rate))
        .epochs(config.epochs)
        .batch_size(config.batch_size)
        .shuffle(Shuffle::Seeded(config.seed.wrapping_add(1)))
        .logging(Logging::Epochs(20))
        .fit(&train, &validation)?;

    let model = ReorderModel::new(scaler, fitted.network)?;
    let scored = model.score_all(records)?;

    let last = fitted.history.last();
    let report = TrainingReport {
        train_size: train.len(),
        validation_size: validation.len(),
        validation_accuracy: last.and_then(|m| m.validation_accuracy),
        final_loss: last.map_or(f64::NAN, |m| m.loss),
        trained_at: Utc::now(),
        epochs: fitted.history,
    };

    info!(
        final_loss = report.final_loss,
        val_accuracy = ?report.validation_accuracy,
        "reorder model trained"
    );

    Ok(TrainingOutcome {
        records: scored,
        report,
        model,
    })
}
