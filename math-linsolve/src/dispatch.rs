//! Size-adaptive solve dispatch
//!
//! [`Solver`] validates the system, asks its [`SelectionPolicy`] which
//! strategy to use and runs it. Below the size threshold the reference LU
//! wins on overhead; at or above it the dense engine is used. The sparse
//! and Krylov strategies are only reached through [`Solver::solve_with`] or
//! an explicit override.

use crate::config::{ConfigError, LinsolveConfig};
use crate::context::ExecutionContext;
use crate::error::{Result, ensure_len};
use crate::strategy::{
    DenseAdapter, KrylovAdapter, SparseAdapter, Strategy, StrategyId, validate_system,
};
use std::fmt;
use std::sync::Arc;

/// Problem size from which the large dense engine is selected
pub const DEFAULT_SIZE_THRESHOLD: usize = 300;

/// Maps a problem size to a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    threshold: usize,
    force: Option<StrategyId>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_THRESHOLD)
    }
}

impl SelectionPolicy {
    /// Size-based policy with the given threshold
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            force: None,
        }
    }

    /// Route every size to `strategy`
    pub fn with_override(mut self, strategy: StrategyId) -> Self {
        self.force = Some(strategy);
        self
    }

    /// Size threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Forced strategy, if any
    pub fn forced(&self) -> Option<StrategyId> {
        self.force
    }

    /// Strategy for a system of size `n`
    pub fn select(&self, n: usize) -> StrategyId {
        match self.force {
            Some(strategy) => strategy,
            None if n < self.threshold => StrategyId::DirectSmall,
            None => StrategyId::DirectLargeDense,
        }
    }
}

/// Observer of dispatch decisions
pub type SelectionHook = Arc<dyn Fn(StrategyId, usize) + Send + Sync>;

/// Solver configured once and reused for many systems
///
/// The execution context is resolved when the solver is built. A `Solver`
/// can be shared between threads; each call owns its working buffers.
#[derive(Clone)]
pub struct Solver {
    config: LinsolveConfig,
    policy: SelectionPolicy,
    ctx: ExecutionContext,
    hook: Option<SelectionHook>,
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("policy", &self.policy)
            .field("workers", &self.ctx.workers())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            config: LinsolveConfig::default(),
            policy: SelectionPolicy::default(),
            ctx: ExecutionContext::Serial,
            hook: None,
        }
    }
}

impl Solver {
    /// Validate `config` and build its execution context
    pub fn new(config: LinsolveConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let ctx = ExecutionContext::from_config(&config.execution)?;
        Self::with_context(config, ctx)
    }

    /// Use an already built execution context instead of `config.execution`
    pub fn with_context(
        config: LinsolveConfig,
        ctx: ExecutionContext,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "solver: threshold = {}, override = {:?}, workers = {}",
            config.threshold,
            config.strategy,
            ctx.workers()
        );
        Ok(Self {
            policy: config.selection_policy(),
            config,
            ctx,
            hook: None,
        })
    }

    /// Call `hook` with every `(strategy, n)` decision made by
    /// [`solve`](Self::solve) and [`solve_into`](Self::solve_into)
    pub fn on_select<F>(mut self, hook: F) -> Self
    where
        F: Fn(StrategyId, usize) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Configuration this solver was built from
    pub fn config(&self) -> &LinsolveConfig {
        &self.config
    }

    /// Selection policy in use
    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Execution context shared by the strategies
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Strategy the policy picks for size `n`
    pub fn select(&self, n: usize) -> StrategyId {
        self.policy.select(n)
    }

    /// Build the adapter for `id`
    pub fn strategy(&self, id: StrategyId) -> Strategy<'_> {
        match id {
            StrategyId::DirectSmall => Strategy::DirectSmall,
            StrategyId::DirectLargeDense => Strategy::DirectLargeDense(DenseAdapter::new(
                &self.ctx,
                self.config.dense.equilibration,
            )),
            StrategyId::DirectSparse => {
                Strategy::DirectSparse(SparseAdapter::new(&self.ctx, self.config.sparse.clone()))
            }
            StrategyId::IterativeKrylov => Strategy::IterativeKrylov(KrylovAdapter::new(
                &self.ctx,
                self.config.krylov.clone(),
            )),
        }
    }

    /// Solve the row-major system `A x = b` with the selected strategy
    pub fn solve(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        validate_system(a, b, n)?;
        let id = self.select(n);
        if let Some(hook) = &self.hook {
            hook(id, n);
        }
        log::debug!("dispatch: n = {} -> {}", n, id);
        self.strategy(id).solve(a, b, n)
    }

    /// Like [`solve`](Self::solve), writing the solution into `x`
    ///
    /// `x` is only written when the solve succeeds.
    pub fn solve_into(&self, a: &[f64], b: &[f64], n: usize, x: &mut [f64]) -> Result<()> {
        ensure_len("x", n, x.len())?;
        let solution = self.solve(a, b, n)?;
        x.copy_from_slice(&solution);
        Ok(())
    }

    /// Solve with a specific strategy, bypassing selection
    pub fn solve_with(
        &self,
        strategy: StrategyId,
        a: &[f64],
        b: &[f64],
        n: usize,
    ) -> Result<Vec<f64>> {
        validate_system(a, b, n)?;
        log::debug!("dispatch: n = {} -> {} (explicit)", n, strategy);
        self.strategy(strategy).solve(a, b, n)
    }
}

/// Solve `A x = b` with the default configuration on the calling thread
pub fn solve(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    Solver::default().solve(a, b, n)
}

/// Solve `A x = b` with `strategy` and the default configuration
pub fn solve_with(strategy: StrategyId, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    Solver::default().solve_with(strategy, a, b, n)
}
