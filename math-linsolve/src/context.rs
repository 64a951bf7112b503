//! Execution context for the distributed-capable strategies
//!
//! The context is resolved once, when the [`Solver`](crate::Solver) is built,
//! and handed by reference to every strategy that can use more than one
//! worker. A solve never changes the context and the caller only observes
//! its effect through wall-clock time.

use crate::config::{ConfigError, ExecutionConfig, ExecutionMode};
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Where the engines run their inner loops
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    /// Everything runs on the calling thread
    #[default]
    Serial,
    /// A fixed pool of worker threads owned by this context
    #[cfg(feature = "rayon")]
    Threads(Arc<rayon::ThreadPool>),
}

impl ExecutionContext {
    /// Single-threaded context
    pub fn serial() -> Self {
        ExecutionContext::Serial
    }

    /// Context backed by a dedicated pool of `workers` threads
    #[cfg(feature = "rayon")]
    pub fn threads(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execution.workers",
                reason: "must be at least 1".to_string(),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("linsolve-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::ExecutionContext(e.to_string()))?;
        log::info!("execution context: {} worker threads", workers);
        Ok(ExecutionContext::Threads(Arc::new(pool)))
    }

    /// Build the context described by the configuration
    ///
    /// Requesting threads from a build without the `rayon` feature falls
    /// back to a serial context with a warning.
    pub fn from_config(config: &ExecutionConfig) -> Result<Self, ConfigError> {
        match config.mode {
            ExecutionMode::Serial => Ok(ExecutionContext::Serial),
            ExecutionMode::Threads => {
                #[cfg(feature = "rayon")]
                {
                    let workers = config.workers.unwrap_or_else(default_workers);
                    Self::threads(workers)
                }
                #[cfg(not(feature = "rayon"))]
                {
                    log::warn!(
                        "threaded execution requested ({:?} workers) but the rayon feature is disabled; running serially",
                        config.workers
                    );
                    Ok(ExecutionContext::Serial)
                }
            }
        }
    }

    /// Number of cooperating workers
    pub fn workers(&self) -> usize {
        match self {
            ExecutionContext::Serial => 1,
            #[cfg(feature = "rayon")]
            ExecutionContext::Threads(pool) => pool.current_num_threads(),
        }
    }

    /// True when more than one worker is available
    pub fn is_parallel(&self) -> bool {
        self.workers() > 1
    }

    /// Run `op` inside this context
    ///
    /// Parallel helpers called from `op` use this context's workers.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            ExecutionContext::Serial => op(),
            #[cfg(feature = "rayon")]
            ExecutionContext::Threads(pool) => pool.install(op),
        }
    }
}

#[cfg(feature = "rayon")]
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
