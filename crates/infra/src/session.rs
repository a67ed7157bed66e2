//! One user session: the current product set, the current model, and the
//! Idle/Training state machine guarding them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{error, info, warn};

use reorderlab_ai::{
    AiError, AiJob, ReorderModel, ReorderTrainingJob, TrainingConfig, TrainingOutcome,
    TrainingReport,
};
use reorderlab_inventory::{generate, ProductRecord};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// A second trigger arrived while a cycle was running.
    #[error("a training cycle is already in progress")]
    TrainingInProgress,

    /// A finished cycle was handed to a session that did not start it.
    #[error("training result belongs to another session")]
    ForeignCycle,

    /// The cycle ran and failed; previous products and model are kept.
    #[error(transparent)]
    Training(#[from] AiError),
}

/// Re-entrancy guard for training cycles.
///
/// `Idle -> Training` on [`begin`](Self::begin), `Training -> Idle` on
/// [`finish`](Self::finish). Triggers arriving while `Training` are
/// rejected, never queued.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Training,
}

impl SessionState {
    pub fn begin(&mut self) -> Result<(), SessionError> {
        match self {
            SessionState::Idle => {
                *self = SessionState::Training;
                Ok(())
            }
            SessionState::Training => Err(SessionError::TrainingInProgress),
        }
    }

    /// Unconditionally returns to `Idle`.
    pub fn finish(&mut self) {
        *self = SessionState::Idle;
    }

    pub fn is_training(&self) -> bool {
        matches!(self, SessionState::Training)
    }
}

/// State shared between a session and its outstanding ticket.
#[derive(Debug, Clone, Default)]
struct StateCell(Arc<Mutex<SessionState>>);

impl StateCell {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock still holds a valid state.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self) -> SessionState {
        *self.lock()
    }

    fn begin(&self) -> Result<(), SessionError> {
        self.lock().begin()
    }

    fn finish(&self) {
        self.lock().finish();
    }

    fn is_same(&self, other: &StateCell) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A started training cycle.
///
/// Holds the job built from the session's products at the time the cycle
/// began. The session is in `Training` for as long as this ticket (or the
/// [`FinishedTraining`] it turns into) is alive; dropping it returns the
/// session to `Idle` without touching products or model.
#[derive(Debug)]
#[must_use = "dropping a started cycle abandons it"]
pub struct PendingTraining {
    job: ReorderTrainingJob,
    state: StateCell,
}

impl PendingTraining {
    pub fn job(&self) -> &ReorderTrainingJob {
        &self.job
    }

    /// Runs the job on the current thread.
    pub fn run(self) -> FinishedTraining {
        let result = self.job.run();
        FinishedTraining {
            pending: self,
            result,
        }
    }
}

impl Drop for PendingTraining {
    fn drop(&mut self) {
        self.state.finish();
    }
}

/// A cycle that has run, waiting to be handed back through
/// [`Session::complete_training`].
#[derive(Debug)]
#[must_use = "a finished cycle must be completed for its results to be installed"]
pub struct FinishedTraining {
    pending: PendingTraining,
    result: Result<TrainingOutcome, AiError>,
}

impl FinishedTraining {
    pub fn result(&self) -> &Result<TrainingOutcome, AiError> {
        &self.result
    }
}

/// In-memory session state.
#[derive(Debug)]
pub struct Session {
    config: TrainingConfig,
    state: StateCell,
    products: Vec<ProductRecord>,
    model: Option<ReorderModel>,
    last_report: Option<TrainingReport>,
}

impl Session {
    /// Starts a session over a freshly generated dataset of `product_count`
    /// records.
    pub fn new(product_count: usize, config: TrainingConfig) -> Self {
        Self::with_products(generate(product_count), config)
    }

    pub fn with_products(products: Vec<ProductRecord>, config: TrainingConfig) -> Self {
        Self {
            config,
            state: StateCell::default(),
            products,
            model: None,
            last_report: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn model(&self) -> Option<&ReorderModel> {
        self.model.as_ref()
    }

    pub fn last_report(&self) -> Option<&TrainingReport> {
        self.last_report.as_ref()
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Replaces the product set with `count` freshly generated records.
    ///
    /// The current model and report describe the old set and are dropped.
    pub fn regenerate(&mut self, count: usize) -> Result<(), SessionError> {
        if self.state().is_training() {
            warn!("regenerate rejected: training in progress");
            return Err(SessionError::TrainingInProgress);
        }
        self.products = generate(count);
        self.model = None;
        self.last_report = None;
        info!(products = count, "dataset regenerated");
        Ok(())
    }

    /// Moves to `Training` and snapshots the products into a job.
    pub fn begin_training(&mut self) -> Result<PendingTraining, SessionError> {
        if let Err(e) = self.state.begin() {
            warn!("training rejected: a cycle is already in progress");
            return Err(e);
        }
        info!(products = self.products.len(), "training cycle started");
        Ok(PendingTraining {
            job: ReorderTrainingJob::new(self.products.clone()).with_config(self.config.clone()),
            state: self.state.clone(),
        })
    }

    /// Ends a cycle started by [`begin_training`](Self::begin_training).
    ///
    /// A ticket from another session is rejected and this session is left
    /// untouched. Otherwise the session returns to `Idle` whatever the
    /// result. On success the previous model is released before the new
    /// model, records and report are installed; on failure nothing else
    /// changes.
    pub fn complete_training(&mut self, finished: FinishedTraining) -> Result<TrainingReport, SessionError> {
        let FinishedTraining { pending, result } = finished;
        if !pending.state.is_same(&self.state) {
            warn!("training result rejected: started by another session");
            return Err(SessionError::ForeignCycle);
        }
        drop(pending);

        match result {
            Ok(outcome) => {
                drop(self.model.take());
                self.model = Some(outcome.model);
                self.products = outcome.records;
                self.last_report = Some(outcome.report.clone());
                info!(
                    val_accuracy = ?outcome.report.validation_accuracy,
                    final_loss = outcome.report.final_loss,
                    "training cycle completed"
                );
                Ok(outcome.report)
            }
            Err(e) => {
                error!(error = %e, "training cycle failed; keeping previous model");
                Err(e.into())
            }
        }
    }

    /// Runs a whole cycle on the current thread.
    pub fn train(&mut self) -> Result<TrainingReport, SessionError> {
        let finished = self.begin_training()?.run();
        self.complete_training(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> TrainingConfig {
        TrainingConfig {
            epochs: 5,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn state_machine_rejects_double_begin() {
        let mut state = SessionState::default();
        assert_eq!(state, SessionState::Idle);
        state.begin().unwrap();
        assert!(state.is_training());
        assert_eq!(state.begin(), Err(SessionError::TrainingInProgress));
        state.finish();
        assert!(state.begin().is_ok());
    }

    #[test]
    fn new_session_is_untrained() {
        let session = Session::new(150, quick());
        assert_eq!(session.products().len(), 150);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.model().is_none());
        assert!(session.last_report().is_none());
        assert!(session.products().iter().all(|p| p.prediction_score().is_none()));
    }

    #[test]
    fn train_installs_model_and_predictions() {
        let mut session = Session::new(150, quick());
        let report = session.train().unwrap();
        assert_eq!(report.train_size, 120);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.model().is_some());
        assert_eq!(session.last_report(), Some(&report));
        for p in session.products() {
            let score = p.prediction_score().unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert_eq!(p.predicted_label(), Some(u8::from(score > 0.5)));
        }
    }

    #[test]
    fn second_trigger_while_training_is_rejected() {
        let mut session = Session::new(20, quick());
        let pending = session.begin_training().unwrap();
        assert_eq!(session.state(), SessionState::Training);
        assert_eq!(session.begin_training().unwrap_err(), SessionError::TrainingInProgress);
        assert_eq!(session.regenerate(10), Err(SessionError::TrainingInProgress));
        assert_eq!(session.products().len(), 20);

        let finished = pending.run();
        assert_eq!(session.state(), SessionState::Training);
        session.complete_training(finished).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn dropped_ticket_returns_session_to_idle() {
        let mut session = Session::new(20, quick());
        let pending = session.begin_training().unwrap();
        assert_eq!(session.state(), SessionState::Training);
        drop(pending);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.model().is_none());

        session.train().unwrap();
        assert!(session.model().is_some());
    }

    #[test]
    fn dropped_result_is_never_installed() {
        let mut session = Session::new(20, quick());
        let finished = session.begin_training().unwrap().run();
        assert!(finished.result().is_ok());
        drop(finished);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.model().is_none());
        assert!(session.products().iter().all(|p| p.prediction_score().is_none()));
    }

    #[test]
    fn result_from_another_session_is_rejected() {
        let mut first = Session::new(20, quick());
        let mut second = Session::new(30, quick());
        second.train().unwrap();
        let products_before = second.products().to_vec();
        let report_before = second.last_report().cloned();

        let finished = first.begin_training().unwrap().run();
        let err = second.complete_training(finished).unwrap_err();
        assert_eq!(err, SessionError::ForeignCycle);
        assert_eq!(second.products(), &products_before[..]);
        assert_eq!(second.last_report().cloned(), report_before);
        assert_eq!(second.state(), SessionState::Idle);

        // The rejected ticket still releases the session that issued it.
        assert_eq!(first.state(), SessionState::Idle);
        assert!(first.model().is_none());
        assert!(first.products().iter().all(|p| p.prediction_score().is_none()));
    }

    #[test]
    fn empty_dataset_reports_error_and_stays_idle() {
        let mut session = Session::new(0, quick());
        let err = session.train().unwrap_err();
        assert_eq!(err, SessionError::Training(AiError::invalid_input("no products to train on")));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.model().is_none());
        assert!(session.products().is_empty());
    }

    #[test]
    fn failed_cycle_keeps_previous_results() {
        let scored: Vec<_> = generate(40).into_iter().map(|r| r.with_prediction(0.25)).collect();
        let config = TrainingConfig {
            epochs: 0,
            ..quick()
        };
        let mut session = Session::with_products(scored.clone(), config);

        let err = session.train().unwrap_err();
        assert_eq!(err.to_string(), "invalid training input: epochs must be at least 1");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.products(), &scored[..]);
        assert!(session.model().is_none());
        assert!(session.last_report().is_none());
    }

    #[test]
    fn regenerate_discards_model_and_predictions() {
        let mut session = Session::new(30, quick());
        session.train().unwrap();
        session.regenerate(50).unwrap();
        assert_eq!(session.products().len(), 50);
        assert!(session.model().is_none());
        assert!(session.last_report().is_none());
        assert!(session.products().iter().all(|p| p.predicted_label().is_none()));
    }
}
