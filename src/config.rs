//! Detector configuration: cache sizing, confidence thresholds and the
//! optional subprocess identifier. Loadable from JSON, overridable from env.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_CACHE_CAPACITY: &str = "CODESWITCH_CACHE_CAPACITY";
pub const ENV_CACHE_TTL_MINUTES: &str = "CODESWITCH_CACHE_TTL_MINUTES";
pub const ENV_WORKER_PROGRAM: &str = "CODESWITCH_WORKER_PROGRAM";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub cache_capacity: usize,
    pub cache_ttl_minutes: u64,
    /// Fallback acceptance threshold without user hints.
    pub default_threshold: f64,
    /// Fallback acceptance threshold when hints are supplied.
    pub hinted_threshold: f64,
    pub worker: Option<WorkerConfig>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 500,
            cache_ttl_minutes: 15,
            default_threshold: 0.6,
            hinted_threshold: 0.4,
            worker: None,
        }
    }
}

/// External language-ID worker process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    pub max_failures: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: "python3".into(),
            args: vec!["fasttext_worker.py".into()],
            timeout_ms: 2000,
            max_failures: 3,
        }
    }
}

impl DetectorConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = get(ENV_CACHE_CAPACITY) {
            self.cache_capacity = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_CACHE_CAPACITY} is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = get(ENV_CACHE_TTL_MINUTES) {
            self.cache_ttl_minutes = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_CACHE_TTL_MINUTES} is not a number: {raw}"))
            })?;
        }
        if let Some(program) = get(ENV_WORKER_PROGRAM).filter(|p| !p.trim().is_empty()) {
            let worker = self.worker.get_or_insert_with(WorkerConfig::default);
            worker.program = program;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be > 0".into()));
        }
        if self.cache_ttl_minutes == 0 {
            return Err(ConfigError::Invalid("cache_ttl_minutes must be > 0".into()));
        }
        for (name, value) in [
            ("default_threshold", self.default_threshold),
            ("hinted_threshold", self.hinted_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1]")));
            }
        }
        if let Some(worker) = &self.worker {
            if worker.program.trim().is_empty() {
                return Err(ConfigError::Invalid("worker.program is empty".into()));
            }
            if worker.timeout_ms == 0 {
                return Err(ConfigError::Invalid("worker.timeout_ms must be > 0".into()));
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    /// Threshold for the statistical step given whether hints were supplied.
    pub fn threshold_for(&self, has_hints: bool) -> f64 {
        if has_hints {
            self.hinted_threshold
        } else {
            self.default_threshold
        }
    }
}
