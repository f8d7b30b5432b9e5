//! Configuration file
//!
//! JSON, every field optional:
//!
//! ```json
//! {
//!   "processing_delay_ms": 1000,
//!   "admission_timeout_ms": 5000,
//!   "admission_policy": "readers_first",
//!   "max_records": 100,
//!   "max_record_bytes": 1024,
//!   "diagnostics": "text"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::ExecutorConfig;
use crate::gate::AdmissionPolicy;
use crate::observability::{DiagnosticSink, LogSink, NullSink, TextSink};
use crate::store::StoreLimits;

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid config JSON
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        "RWSTORE_CONFIG_ERROR"
    }
}

/// Where per-operation progress goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsMode {
    /// Human-readable lines on stdout
    #[default]
    Text,
    /// Structured JSON log lines
    Json,
    /// Discard; stdout carries shell responses only
    Off,
}

impl DiagnosticsMode {
    /// Build the sink for this mode
    pub fn sink(&self) -> Arc<dyn DiagnosticSink> {
        match self {
            DiagnosticsMode::Text => Arc::new(TextSink::new()),
            DiagnosticsMode::Json => Arc::new(LogSink::new()),
            DiagnosticsMode::Off => Arc::new(NullSink),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Simulated I/O latency per operation (default 1000)
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// Admission deadline; unbounded when absent
    #[serde(default)]
    pub admission_timeout_ms: Option<u64>,

    /// Reader/writer preference (default readers_first)
    #[serde(default)]
    pub admission_policy: AdmissionPolicy,

    /// Maximum number of records; unbounded when absent
    #[serde(default)]
    pub max_records: Option<usize>,

    /// Maximum bytes per record; unbounded when absent
    #[serde(default)]
    pub max_record_bytes: Option<usize>,

    /// Diagnostic output (default text)
    #[serde(default)]
    pub diagnostics: DiagnosticsMode,
}

fn default_processing_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing_delay_ms: default_processing_delay_ms(),
            admission_timeout_ms: None,
            admission_policy: AdmissionPolicy::default(),
            max_records: None,
            max_record_bytes: None,
            diagnostics: DiagnosticsMode::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero-valued limits and timeouts
    pub fn validate(&self) -> ConfigResult<()> {
        if self.admission_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "admission_timeout_ms",
                reason: "must be > 0 when set",
            });
        }
        if self.max_records == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_records",
                reason: "must be > 0 when set",
            });
        }
        if self.max_record_bytes == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_record_bytes",
                reason: "must be > 0 when set",
            });
        }
        Ok(())
    }

    /// Convert to executor configuration
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            admission_timeout: self.admission_timeout_ms.map(Duration::from_millis),
            policy: self.admission_policy,
            limits: StoreLimits {
                max_records: self.max_records,
                max_record_bytes: self.max_record_bytes,
            },
        }
    }
}
