//! Solver configuration
//!
//! A [`LinsolveConfig`] can be built in code or read from a JSON or TOML
//! file; the format is picked from the file extension. Every section has
//! defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! threshold = 300
//!
//! [dense]
//! equilibration = "auto"
//!
//! [sparse]
//! solver = "Klu"
//!
//! [krylov]
//! max_iterations = 10000
//! restart = 30
//! tolerance = 1e-6
//!
//! [execution]
//! mode = "threads"
//! workers = 4
//! ```

use crate::dispatch::{DEFAULT_SIZE_THRESHOLD, SelectionPolicy};
use crate::iterative::GmresConfig;
use crate::strategy::StrategyId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinsolveConfig {
    /// Problem size from which the large dense engine is used
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// Route every solve to this strategy instead of choosing by size
    #[serde(default)]
    pub strategy: Option<StrategyId>,
    /// Large dense engine settings
    #[serde(default)]
    pub dense: DenseConfig,
    /// Sparse direct engine settings
    #[serde(default)]
    pub sparse: SparseConfig,
    /// Krylov engine settings
    #[serde(default)]
    pub krylov: KrylovConfig,
    /// Worker setup, resolved once when the solver is built
    #[serde(default)]
    pub execution: ExecutionConfig,
}

fn default_threshold() -> usize {
    DEFAULT_SIZE_THRESHOLD
}

impl Default for LinsolveConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIZE_THRESHOLD,
            strategy: None,
            dense: DenseConfig::default(),
            sparse: SparseConfig::default(),
            krylov: KrylovConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

/// When the dense engine scales rows and columns before factoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equilibration {
    /// Only when the engine reports that scaling would help
    #[default]
    Auto,
    /// Always scale
    Always,
    /// Never scale
    Never,
}

/// Large dense engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DenseConfig {
    /// Equilibration policy
    #[serde(default)]
    pub equilibration: Equilibration,
}

/// Sparse direct engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseConfig {
    /// Name of the factorization backend ("Klu", "Lapack")
    pub solver: String,
    /// Threshold partial pivoting tolerance: the diagonal is kept as pivot
    /// while `|a_kk| >= pivot_tolerance * max|a_ik|`
    pub pivot_tolerance: f64,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            solver: "Klu".to_string(),
            pivot_tolerance: 0.001,
        }
    }
}

/// Preconditioner applied by the Krylov strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KrylovPreconditioner {
    /// Diagonal scaling
    #[default]
    Jacobi,
    /// No preconditioning
    None,
}

/// Krylov engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrylovConfig {
    /// Total iteration budget across restarts
    pub max_iterations: usize,
    /// Krylov subspace size before restart
    pub restart: usize,
    /// Relative residual tolerance
    pub tolerance: f64,
    /// Preconditioner
    pub preconditioner: KrylovPreconditioner,
    /// Log progress every N inner iterations (0 = silent)
    pub print_interval: usize,
}

impl Default for KrylovConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            restart: 30,
            tolerance: 1e-6,
            preconditioner: KrylovPreconditioner::Jacobi,
            print_interval: 0,
        }
    }
}

impl From<&KrylovConfig> for GmresConfig<f64> {
    fn from(config: &KrylovConfig) -> Self {
        GmresConfig {
            max_iterations: config.max_iterations,
            restart: config.restart,
            tolerance: config.tolerance,
            print_interval: config.print_interval,
        }
    }
}

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single thread
    #[default]
    Serial,
    /// Dedicated worker pool
    Threads,
}

/// Execution context configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Serial or threaded
    pub mode: ExecutionMode,
    /// Worker count for `threads` (defaults to the available parallelism)
    pub workers: Option<usize>,
}

impl LinsolveConfig {
    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.krylov.restart == 0 {
            return Err(ConfigError::InvalidValue {
                field: "krylov.restart",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.krylov.tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "krylov.tolerance",
                reason: format!("must be positive, got {}", self.krylov.tolerance),
            });
        }
        if !(0.0..=1.0).contains(&self.sparse.pivot_tolerance) {
            return Err(ConfigError::InvalidValue {
                field: "sparse.pivot_tolerance",
                reason: format!("must lie in [0, 1], got {}", self.sparse.pivot_tolerance),
            });
        }
        if self.execution.workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "execution.workers",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Selection policy described by this configuration
    pub fn selection_policy(&self) -> SelectionPolicy {
        let policy = SelectionPolicy::new(self.threshold);
        match self.strategy {
            Some(id) => policy.with_override(id),
            None => policy,
        }
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Load a configuration file
///
/// Format is auto-detected from file extension (.json or .toml)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LinsolveConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    parse_config(&content, format)
}

/// Parse and validate a configuration from a string
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<LinsolveConfig, ConfigError> {
    let config: LinsolveConfig = match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Save a configuration to a file
pub fn save_config<P: AsRef<Path>>(config: &LinsolveConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    let content = serialize_config(config, format)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serialize a configuration to a string
pub fn serialize_config(
    config: &LinsolveConfig,
    format: ConfigFormat,
) -> Result<String, ConfigError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::SerializeError(e.to_string())),
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The worker pool could not be created
    #[error("Execution context error: {0}")]
    ExecutionContext(String),
}
