//! Session layer: the training state machine, the rule-vs-model dashboard,
//! CSV export and configuration loading.

pub mod config;
pub mod dashboard;
pub mod export;
pub mod session;

pub use config::{ConfigError, DemoConfig};
pub use dashboard::{Dashboard, ModelComparison};
pub use export::{read_csv, to_csv_string, write_csv, write_csv_file, ExportError, ExportRow};
pub use session::{FinishedTraining, PendingTraining, Session, SessionError, SessionState};
