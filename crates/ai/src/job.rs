use reorderlab_inventory::ProductRecord;

use crate::pipeline::{train_and_score, TrainingOutcome};
use crate::result::AiError;
use crate::trainer::TrainingConfig;

/// A self-contained inference unit.
///
/// Jobs own a snapshot of their input and must not mutate it; results are
/// returned to the caller, which decides whether to install them.
pub trait AiJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output;

    /// The input snapshot the job will run on.
    fn input(&self) -> &Self::Input;

    /// Execute the job.
    fn run(&self) -> Result<Self::Output, AiError>;
}

/// Trains a reorder classifier over a product snapshot and scores it.
#[derive(Debug, Clone)]
pub struct ReorderTrainingJob {
    input: Vec<ProductRecord>,
    config: TrainingConfig,
}

impl ReorderTrainingJob {
    pub fn new(input: Vec<ProductRecord>) -> Self {
        Self {
            input,
            config: TrainingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

impl AiJob for ReorderTrainingJob {
    type Input = Vec<ProductRecord>;
    type Output = TrainingOutcome;

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<TrainingOutcome, AiError> {
        train_and_score(&self.input, &self.config)
    }
}
