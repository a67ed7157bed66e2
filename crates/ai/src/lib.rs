//! `reorderlab-ai`
//!
//! **Responsibility:** the reorder classifier.
//!
//! - Feature extraction, min/max normalization and the positional split.
//! - A small dense network trained with Adam on binary cross-entropy.
//! - [`train_and_score`]: one full normalize/fit/score cycle returning an
//!   owned [`ReorderModel`] handle.
//!
//! This crate never mutates its input records; scored copies are returned.

pub mod activator;
pub mod dataset;
pub mod job;
pub mod layer;
pub mod loss;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod pipeline;
pub mod result;
pub mod scaler;
pub mod trainer;

pub use activator::Activator;
pub use dataset::{positional_split, Dataset, Split, FEATURE_COUNT};
pub use job::{AiJob, ReorderTrainingJob};
pub use layer::{Dense, Gradients};
pub use model::ReorderModel;
pub use network::{LayerSpec, Sequential};
pub use optimizer::{Adam, Optimizer};
pub use pipeline::{train_and_score, TrainingOutcome, TrainingReport};
pub use result::AiError;
pub use scaler::MinMaxScaler;
pub use trainer::{EpochMetrics, Logging, Shuffle, Trainer, TrainingConfig};
