//! Layered CFR solver core.
//!
//! # Overview
//!
//! CFR converges to a Nash equilibrium by repeating three steps:
//! 1. derive each information set's current strategy from cumulative regret
//!    (regret matching);
//! 2. evaluate the whole tree under that strategy and accumulate each
//!    action's counterfactual regret;
//! 3. average the strategies across iterations; the average, not the
//!    current strategy, is what converges.
//!
//! This implementation expresses one iteration as whole-tree batch sweeps
//! over a layer-ordered flat tree rather than a recursive walk, so layers
//! parallelize cleanly and results stay deterministic (see
//! [`traversal`] for the scheduling contract).
//!
//! # Pipeline
//!
//! ```text
//! GameDefinition ──build──▶ GameTree (flat, layered, immutable)
//!                              │
//!                              ▼
//!        ┌─────────── Solver::run(iterations) ───────────┐
//!        │  TraversalEngine: profile / reach / value pass │
//!        │  RegretTables:    regret + strategy accumulate │
//!        └──────────────────────┬───────────────────────-┘
//!                               ▼
//!          IterationRecord stream + AverageStrategy artifact
//!          (exploitability via best response on demand)
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete
//!   Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+"
//!   (2014)

pub mod config;
pub mod error;
pub mod exploitability;
pub mod policy;
pub mod tables;
pub mod traversal;
pub mod tree;

mod solver;

// Re-export main types for convenient access
pub use config::{AveragingScheme, IterationRecord, SolverConfig};
pub use error::{MalformedGameError, SolverError};
pub use policy::RegretMatchingVariant;
pub use solver::{AverageStrategy, InfosetStrategy, Solver};
pub use tables::RegretTables;
pub use traversal::TraversalEngine;
pub use tree::{GameDefinition, GameTree, NodeDef, NodeKind};
