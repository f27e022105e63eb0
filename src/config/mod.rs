use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::{EngineError, Result},
    ledger::budget::{AlertThreshold, ThresholdKind},
    storage::json_backend::{tmp_path, write_atomic},
    utils::{
        paths::{ensure_dir, PathResolver},
        DEFAULT_LOG_FILTER,
    },
};

/// Threshold template applied to budgets created without explicit thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThresholdSpec {
    pub percentage: u8,
    pub kind: ThresholdKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::log_filter_default")]
    pub log_filter: String,
    #[serde(default = "EngineConfig::thresholds_default")]
    pub default_thresholds: Vec<ThresholdSpec>,
    #[serde(default = "EngineConfig::max_rollover_default")]
    pub default_max_rollover_percentage: f64,
    #[serde(default = "EngineConfig::ledger_file_default")]
    pub ledger_file_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: Self::log_filter_default(),
            default_thresholds: Self::thresholds_default(),
            default_max_rollover_percentage: Self::max_rollover_default(),
            ledger_file_name: Self::ledger_file_default(),
        }
    }
}

impl EngineConfig {
    /// Fresh thresholds (new ids) built from the configured templates.
    pub fn default_alert_thresholds(&self) -> Vec<AlertThreshold> {
        self.default_thresholds
            .iter()
            .map(|spec| AlertThreshold::new(spec.percentage, spec.kind))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.default_max_rollover_percentage) {
            return Err(EngineError::Config(format!(
                "default_max_rollover_percentage must be within 0-100, got {}",
                self.default_max_rollover_percentage
            )));
        }
        if let Some(spec) = self
            .default_thresholds
            .iter()
            .find(|spec| !(1..=100).contains(&spec.percentage))
        {
            return Err(EngineError::Config(format!(
                "threshold percentage must be within 1-100, got {}",
                spec.percentage
            )));
        }
        if self.ledger_file_name.trim().is_empty() {
            return Err(EngineError::Config("ledger_file_name is empty".into()));
        }
        Ok(())
    }

    fn log_filter_default() -> String {
        DEFAULT_LOG_FILTER.into()
    }

    fn thresholds_default() -> Vec<ThresholdSpec> {
        vec![
            ThresholdSpec {
                percentage: 80,
                kind: ThresholdKind::Warning,
            },
            ThresholdSpec {
                percentage: 100,
                kind: ThresholdKind::Critical,
            },
        ]
    }

    fn max_rollover_default() -> f64 {
        100.0
    }

    fn ledger_file_default() -> String {
        "ledger.json".into()
    }
}

/// Loads and saves `config.json` inside the application data directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Returns the stored configuration, or defaults when no file exists yet.
    pub fn load(&self) -> Result<EngineConfig> {
        if !self.path.exists() {
            return Ok(EngineConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: EngineConfig = serde_json::from_str(&data)
            .map_err(|err| EngineError::Config(format!("{}: {}", self.path.display(), err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger_path(&self, config: &EngineConfig) -> PathBuf {
        self.base.join(&config.ledger_file_name)
    }
}
