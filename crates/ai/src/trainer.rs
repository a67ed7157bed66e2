//! Utilities for fitting networks with minibatch gradient descent.

use std::time::Instant;

use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activator::Activator;
use crate::dataset::Dataset;
use crate::loss;
use crate::network::{LayerSpec, Sequential};
use crate::optimizer::Optimizer;
use crate::result::AiError;

/// Hyper-parameters of one training cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Full passes over the training block.
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Leading fraction of rows used for training; the rest validates.
    pub train_fraction: f64,
    /// Hidden layer widths (ReLU); the sigmoid output unit is implicit.
    pub hidden_layers: Vec<usize>,
    /// Seeds weight initialization and minibatch shuffling.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 80,
            batch_size: 16,
            learning_rate: 0.01,
            train_fraction: 0.8,
            hidden_layers: vec![24, 12],
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), AiError> {
        if self.epochs == 0 {
            return Err(AiError::invalid_input("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(AiError::invalid_input("batch_size must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AiError::invalid_input("learning_rate must be a finite positive number"));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(AiError::invalid_input("train_fraction must be in (0, 1]"));
        }
        if self.hidden_layers.iter().any(|&units| units == 0) {
            return Err(AiError::invalid_input("hidden layers must have at least one unit"));
        }
        Ok(())
    }

    /// Layer stack: ReLU hidden layers followed by one sigmoid output unit.
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        self.hidden_layers
            .iter()
            .map(|&units| LayerSpec::new(units, Activator::ReLU))
            .chain(std::iter::once(LayerSpec::new(1, Activator::Sigmoid)))
            .collect()
    }
}

/// Metrics observed at the end of one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub validation_loss: Option<f64>,
    pub validation_accuracy: Option<f64>,
}

/// Minibatch ordering during fitting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shuffle {
    /// Visit training rows in their original order every epoch.
    None,
    /// Reshuffle training rows every epoch from a seeded generator.
    Seeded(u64),
}

/// Logging frequency to use during training
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted at completion
    Completion,
    /// A summary will be emitted after every `n` epochs, and at completion
    Epochs(usize),
}

impl Logging {
    fn epoch(&self, metrics: &EpochMetrics) {
        match *self {
            Logging::Epochs(freq) if freq > 0 && metrics.epoch % freq == 0 => info!(
                epoch = metrics.epoch,
                loss = metrics.loss,
                accuracy = metrics.accuracy,
                val_accuracy = ?metrics.validation_accuracy,
                "epoch finished"
            ),
            Logging::Silent => {}
            _ => debug!(epoch = metrics.epoch, loss = metrics.loss, "epoch finished"),
        }
    }

    fn completion(&self, history: &[EpochMetrics], start_time: Instant) {
        if let Logging::Silent = self {
            return;
        }
        if let Some(last) = history.last() {
            info!(
                epochs = last.epoch,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                final_loss = last.loss,
                val_accuracy = ?last.validation_accuracy,
                "training completed"
            );
        }
    }
}

/// Output of [`Trainer::fit`].
#[derive(Debug, Clone)]
pub struct Fitted {
    pub network: Sequential,
    pub history: Vec<EpochMetrics>,
}

/// A builder for fitting a binary classifier.
#[derive(Debug)]
pub struct Trainer<O: Optimizer> {
    network: Sequential,
    optimizer: O,
    epochs: usize,
    batch_size: usize,
    shuffle: Shuffle,
    logging: Logging,
}

impl<O: Optimizer> Trainer<O> {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * 80 epochs.
    /// * Minibatches of 16 rows.
    /// * Rows visited in their original order.
    /// * Logs on training completion.
    pub fn new(network: Sequential, optimizer: O) -> Self {
        Trainer {
            network,
            optimizer,
            epochs: 80,
            batch_size: 16,
            shuffle: Shuffle::None,
            logging: Logging::Completion,
        }
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn shuffle(mut self, shuffle: Shuffle) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Fits the network to `train`, measuring `validation` after every epoch.
    ///
    /// Labels are expected in `{0, 1}` and the network must end in a single
    /// sigmoid unit. An empty `validation` set simply yields no validation
    /// metrics.
    pub fn fit(mut self, train: &Dataset, validation: &Dataset) -> Result<Fitted, AiError> {
        self.validate(train, validation)?;

        let start_time = Instant::now();
        let mut rng = match self.shuffle {
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            Shuffle::None => None,
        };

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut history = Vec::with_capacity(self.epochs);

        for epoch in 1..=self.epochs {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }

            let mut epoch_loss = 0.0;
            let mut correct = 0usize;
            for batch in order.chunks(self.batch_size) {
                let batch = train.select(batch);
                let activations = self.network.feed_forward(batch.features());
                let predictions = activations[activations.len() - 1].column(0).to_owned();

                for (&prediction, &label) in predictions.iter().zip(batch.labels()) {
                    epoch_loss += loss::binary_cross_entropy(prediction, label);
                    if loss::is_correct(prediction, label) {
                        correct += 1;
                    }
                }

                // Mean over the batch, so the summed layer gradients come out averaged.
                let scale = 1.0 / batch.len() as f64;
                let delta: Array1<f64> = predictions
                    .iter()
                    .zip(batch.labels())
                    .map(|(&prediction, &label)| loss::sigmoid_bce_delta(prediction, label) * scale)
                    .collect();
                let gradients = self.network.feed_backward(&activations, delta.insert_axis(Axis(1)));
                self.optimizer.step(self.network.layers_mut(), &gradients);
            }

            let loss = epoch_loss / train.len() as f64;
            if !loss.is_finite() {
                return Err(AiError::training_failed(format!(
                    "loss became non-finite at epoch {epoch}"
                )));
            }

            let (validation_loss, validation_accuracy) = match self.evaluate(validation) {
                Some((l, a)) => (Some(l), Some(a)),
                None => (None, None),
            };
            let metrics = EpochMetrics {
                epoch,
                loss,
                accuracy: correct as f64 / train.len() as f64,
                validation_loss,
                validation_accuracy,
            };
            self.logging.epoch(&metrics);
            history.push(metrics);
        }

        self.logging.completion(&history, start_time);
        Ok(Fitted {
            network: self.network,
            history,
        })
    }

    /// Mean loss and accuracy of the current network on `data`.
    fn evaluate(&self, data: &Dataset) -> Option<(f64, f64)> {
        if data.is_empty() {
            return None;
        }
        let predictions = self.network.predict(data.features());
        loss::evaluate(
            predictions
                .column(0)
                .iter()
                .copied()
                .zip(data.labels().iter().copied()),
        )
    }

    /// Verifies that all provided inputs to the `Trainer` are valid, returning
    /// an error if something is wrong.
    fn validate(&self, train: &Dataset, validation: &Dataset) -> Result<(), AiError> {
        if self.epochs == 0 {
            return Err(AiError::invalid_input("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(AiError::invalid_input("batch_size must be at least 1"));
        }
        if train.is_empty() {
            return Err(AiError::invalid_input("training block is empty"));
        }
        if self.network.output_len() != 1 || self.network.output_activator() != Activator::Sigmoid {
            return Err(AiError::invalid_input(
                "network must end in a single sigmoid unit",
            ));
        }
        for data in [train, validation] {
            if !data.is_empty() && data.features().ncols() != self.network.input_len() {
                return Err(AiError::invalid_input(format!(
                    "expected {} features per row, found {}",
                    self.network.input_len(),
                    data.features().ncols()
                )));
            }
        }
        if let Some(label) = train.labels().iter().find(|&&l| l != 0.0 && l != 1.0) {
            return Err(AiError::invalid_input(format!("labels must be 0 or 1, found {label}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::Adam;
    use ndarray::{array, Array2};

    fn net(seed: u64, specs: &[LayerSpec], inputs: usize) -> Sequential {
        Sequential::new(inputs, specs, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    fn classifier(seed: u64) -> Sequential {
        net(seed, &TrainingConfig::default().layer_specs(), 1)
    }

    /// Label is 1 when x < 0.5.
    fn threshold_data(n: usize) -> Dataset {
        let xs = Array2::from_shape_fn((n, 1), |(i, _)| i as f64 / n as f64);
        let labels = xs.column(0).mapv(|x| if x < 0.5 { 1.0 } else { 0.0 });
        Dataset::new(xs, labels)
    }

    fn empty() -> Dataset {
        Dataset::new(Array2::zeros((0, 1)), Array1::zeros(0))
    }

    #[test]
    fn default_config_matches_reorder_model() {
        let cfg = TrainingConfig::default();
        assert_eq!(cfg.epochs, 80);
        assert_eq!(cfg.batch_size, 16);
        assert!(cfg.validate().is_ok());
        let specs = cfg.layer_specs();
        assert_eq!(specs.iter().map(|s| s.units).collect::<Vec<_>>(), vec![24, 12, 1]);
        assert_eq!(specs[2].activator, Activator::Sigmoid);
    }

    #[test]
    fn config_rejects_bad_values() {
        let bad = [
            TrainingConfig { epochs: 0, ..Default::default() },
            TrainingConfig { batch_size: 0, ..Default::default() },
            TrainingConfig { learning_rate: 0.0, ..Default::default() },
            TrainingConfig { learning_rate: f64::NAN, ..Default::default() },
            TrainingConfig { train_fraction: 0.0, ..Default::default() },
            TrainingConfig { train_fraction: 1.5, ..Default::default() },
            TrainingConfig { hidden_layers: vec![4, 0], ..Default::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: TrainingConfig = serde_json::from_str(r#"{"epochs": 5}"#).unwrap();
        assert_eq!(cfg.epochs, 5);
        assert_eq!(cfg.batch_size, 16);
    }

    #[test]
    fn learns_a_threshold() {
        let data = threshold_data(64);
        let fitted = Trainer::new(classifier(1), Adam::new(0.01))
            .epochs(150)
            .batch_size(8)
            .shuffle(Shuffle::Seeded(9))
            .logging(Logging::Silent)
            .fit(&data, &empty())
            .unwrap();
        let last = fitted.history.last().unwrap();
        assert_eq!(fitted.history.len(), 150);
        assert!(last.loss < fitted.history[0].loss);
        assert!(last.accuracy >= 0.9, "accuracy {}", last.accuracy);
        assert!(last.validation_accuracy.is_none());
    }

    #[test]
    fn records_validation_every_epoch() {
        let data = threshold_data(40);
        let fitted = Trainer::new(classifier(2), Adam::new(0.01))
            .epochs(3)
            .batch_size(4)
            .logging(Logging::Silent)
            .fit(&data.slice(0..32), &data.slice(32..40))
            .unwrap();
        assert_eq!(fitted.history.len(), 3);
        for (i, m) in fitted.history.iter().enumerate() {
            assert_eq!(m.epoch, i + 1);
            let acc = m.validation_accuracy.unwrap();
            assert!((0.0..=1.0).contains(&acc));
            assert!(m.validation_loss.unwrap().is_finite());
        }
    }

    #[test]
    fn fit_is_reproducible_with_seeds() {
        let data = threshold_data(32);
        let run = || {
            Trainer::new(classifier(5), Adam::new(0.01))
                .epochs(5)
                .shuffle(Shuffle::Seeded(11))
                .logging(Logging::Silent)
                .fit(&data, &empty())
                .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.network, b.network);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn empty_training_block_is_rejected() {
        let err = Trainer::new(classifier(0), Adam::new(0.01)).fit(&empty(), &empty()).unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)));
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let data = threshold_data(8);
        let three_inputs = net(0, &TrainingConfig::default().layer_specs(), 3);
        assert!(Trainer::new(three_inputs, Adam::new(0.01)).fit(&data, &empty()).is_err());
    }

    #[test]
    fn non_sigmoid_output_is_rejected() {
        let data = threshold_data(8);
        let linear = net(0, &[LayerSpec::new(1, Activator::Identity)], 1);
        assert!(Trainer::new(linear, Adam::new(0.01)).fit(&data, &empty()).is_err());
    }

    #[test]
    fn non_binary_labels_are_rejected() {
        let data = Dataset::new(array![[0.1], [0.2]], array![0.0, 2.0]);
        assert!(Trainer::new(classifier(0), Adam::new(0.01)).fit(&data, &empty()).is_err());
    }

    #[test]
    fn diverging_loss_is_reported() {
        // ReLU would swallow the NaN, so feed it straight into the sigmoid unit.
        let data = Dataset::new(array![[f64::NAN], [0.2]], array![0.0, 1.0]);
        let logistic = net(0, &[LayerSpec::new(1, Activator::Sigmoid)], 1);
        let err = Trainer::new(logistic, Adam::new(0.01))
            .epochs(1)
            .logging(Logging::Silent)
            .fit(&data, &empty())
            .unwrap_err();
        assert!(matches!(err, AiError::TrainingFailed(_)), "{err:?}");
    }
}
