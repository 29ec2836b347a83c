//! # Layered CFR
//!
//! A batch-parallel Counterfactual Regret Minimization (CFR) solver for
//! two-player zero-sum extensive-form games.
//!
//! Instead of the usual recursive tree walk, the solver flattens the game
//! into breadth-first layers and runs each CFR iteration as two directional
//! sweeps (reach probabilities down, counterfactual values up) with every
//! node in a layer processed as an independent batch item. Results are
//! bit-for-bit deterministic regardless of how many workers run the batches.
//!
//! ## Quick Start
//!
//! ```no_run
//! use layered_cfr::cfr::{Solver, SolverConfig};
//! use layered_cfr::games::kuhn;
//!
//! let mut solver = Solver::new(&kuhn::game(), SolverConfig::default()).unwrap();
//! let records = solver.run(10_000).unwrap();
//!
//! println!("game value: {:+.4}", records.last().unwrap().game_value[0]);
//! for entry in solver.average_strategy().entries {
//!     println!("{}: {:?}", entry.key, entry.probabilities);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: the flattened tree, the traversal engine, and the solver
//! - [`games`]: built-in game definitions (Kuhn poker, rock-paper-scissors)

#![warn(missing_docs)]

/// Core CFR machinery: tree store, tables, traversal, evaluation, solver.
pub mod cfr;

/// Built-in game definitions for testing and validation.
pub mod games;

// Re-export the main entry points at the crate root for convenience.
pub use cfr::{
    AverageStrategy, AveragingScheme, GameDefinition, IterationRecord, NodeDef,
    RegretMatchingVariant, Solver, SolverConfig, SolverError,
};
