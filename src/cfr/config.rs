//! Configuration for the layered CFR solver.
//!
//! Everything here is resolved once at construction; the hot traversal loop
//! never inspects configuration per call.

use serde::{Deserialize, Serialize};

use crate::cfr::error::SolverError;
use crate::cfr::policy::RegretMatchingVariant;

/// How cumulative-strategy contributions are weighted across iterations.
///
/// The acting player's own reach probability always factors in; the scheme
/// selects the additional per-iteration weight. Uniform weighting matches
/// the classic CFR average; linear weighting emphasizes later iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingScheme {
    /// Every iteration contributes with weight 1.
    #[default]
    Uniform,
    /// Iteration t contributes with weight t.
    Linear,
}

/// Solver configuration.
///
/// # Example
/// ```
/// use layered_cfr::cfr::{RegretMatchingVariant, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_variant(RegretMatchingVariant::Plus)
///     .with_exploitability_every(100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Regret-matching variant (vanilla CFR or regret matching+).
    pub variant: RegretMatchingVariant,

    /// Average-strategy weighting scheme.
    pub averaging: AveragingScheme,

    /// Evaluate exploitability every this many iterations.
    ///
    /// `None` disables periodic evaluation; it can still be requested on
    /// demand through `Solver::exploitability`.
    pub exploitability_every: Option<u64>,
}

impl SolverConfig {
    /// Plain vanilla CFR with uniform averaging.
    pub fn vanilla() -> Self {
        Self::default()
    }

    /// Regret matching+ with linear averaging, the faster-converging setup.
    pub fn plus() -> Self {
        Self {
            variant: RegretMatchingVariant::Plus,
            averaging: AveragingScheme::Linear,
            exploitability_every: None,
        }
    }

    /// Builder method: set the regret-matching variant.
    pub fn with_variant(mut self, variant: RegretMatchingVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Builder method: set the averaging scheme.
    pub fn with_averaging(mut self, averaging: AveragingScheme) -> Self {
        self.averaging = averaging;
        self
    }

    /// Builder method: set the exploitability-evaluation cadence.
    pub fn with_exploitability_every(mut self, every: u64) -> Self {
        self.exploitability_every = Some(every);
        self
    }

    /// Validate the configuration.
    ///
    /// Runs before any iteration; a zero cadence would never fire and is
    /// rejected rather than silently ignored.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.exploitability_every == Some(0) {
            return Err(SolverError::InvalidConfiguration(
                "exploitability cadence must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scalar metrics published after each iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration index, starting at 1.
    pub iteration: u64,
    /// Game value per player under the running average strategy.
    pub game_value: [f64; 2],
    /// Exploitability of the average strategy, when on cadence.
    pub exploitability: Option<f64>,
}
