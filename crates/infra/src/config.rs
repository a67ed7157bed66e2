//! Configuration loading and representation.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reorderlab_ai::TrainingConfig;
use reorderlab_inventory::DEFAULT_PRODUCT_COUNT;
use reorderlab_observability::LogFormat;

pub const PRODUCT_COUNT: &str = "REORDERLAB_PRODUCT_COUNT";
pub const EPOCHS: &str = "REORDERLAB_EPOCHS";
pub const BATCH_SIZE: &str = "REORDERLAB_BATCH_SIZE";
pub const LEARNING_RATE: &str = "REORDERLAB_LEARNING_RATE";
pub const SEED: &str = "REORDERLAB_SEED";
pub const EXPORT_PATH: &str = "REORDERLAB_EXPORT_PATH";
pub const LOG_FORMAT: &str = "REORDERLAB_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for one demo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub product_count: usize,
    pub training: TrainingConfig,
    /// Where to write the scored table; no export when unset.
    pub export_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            product_count: DEFAULT_PRODUCT_COUNT,
            training: TrainingConfig::default(),
            export_path: None,
            log_format: LogFormat::default(),
        }
    }
}

impl DemoConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`; missing or blank keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = DemoConfig::default();

        if let Some(v) = get(PRODUCT_COUNT) {
            cfg.product_count = parse(PRODUCT_COUNT, &v)?;
        }
        if let Some(v) = get(EPOCHS) {
            cfg.training.epochs = parse(EPOCHS, &v)?;
        }
        if let Some(v) = get(BATCH_SIZE) {
            cfg.training.batch_size = parse(BATCH_SIZE, &v)?;
        }
        if let Some(v) = get(LEARNING_RATE) {
            cfg.training.learning_rate = parse(LEARNING_RATE, &v)?;
        }
        if let Some(v) = get(SEED) {
            cfg.training.seed = parse(SEED, &v)?;
        }
        if let Some(v) = get(EXPORT_PATH) {
            cfg.export_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get(LOG_FORMAT) {
            cfg.log_format = parse(LOG_FORMAT, &v)?;
        }

        cfg.training.validate().map_err(|e| ConfigError::Invalid {
            key: "training",
            value: format!("{:?}", cfg.training),
            reason: e.to_string(),
        })?;
        Ok(cfg)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = DemoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, DemoConfig::default());
        assert_eq!(cfg.product_count, 150);
        assert_eq!(cfg.training.epochs, 80);
        assert!(cfg.export_path.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = DemoConfig::from_lookup(lookup(&[
            (PRODUCT_COUNT, "300"),
            (EPOCHS, " 10 "),
            (BATCH_SIZE, "32"),
            (LEARNING_RATE, "0.005"),
            (SEED, "7"),
            (EXPORT_PATH, "/tmp/out.csv"),
            (LOG_FORMAT, "json"),
        ]))
        .unwrap();
        assert_eq!(cfg.product_count, 300);
        assert_eq!(cfg.training.epochs, 10);
        assert_eq!(cfg.training.batch_size, 32);
        assert_eq!(cfg.training.learning_rate, 0.005);
        assert_eq!(cfg.training.seed, 7);
        assert_eq!(cfg.export_path, Some(PathBuf::from("/tmp/out.csv")));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let cfg = DemoConfig::from_lookup(lookup(&[(EXPORT_PATH, "  ")])).unwrap();
        assert!(cfg.export_path.is_none());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = DemoConfig::from_lookup(lookup(&[(PRODUCT_COUNT, "many")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, PRODUCT_COUNT);
                assert_eq!(value, "many");
            }
        }
        assert!(DemoConfig::from_lookup(lookup(&[(LOG_FORMAT, "xml")])).is_err());
    }

    #[test]
    fn invalid_training_values_are_rejected() {
        assert!(DemoConfig::from_lookup(lookup(&[(EPOCHS, "0")])).is_err());
        assert!(DemoConfig::from_lookup(lookup(&[(LEARNING_RATE, "-1")])).is_err());
    }
}
