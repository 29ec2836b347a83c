//! The solver invocation surface.
//!
//! Ties the flattened tree, the regret/strategy tables, and the traversal
//! engine together behind the interface external drivers consume: build
//! once from a game definition, run a caller-chosen number of iterations,
//! collect per-iteration records, and extract the final average strategy.
//! There is no internal stopping rule; termination is the caller's call.

use log::{debug, info};
use serde::Serialize;

use crate::cfr::config::{IterationRecord, SolverConfig};
use crate::cfr::error::SolverError;
use crate::cfr::exploitability;
use crate::cfr::tables::RegretTables;
use crate::cfr::traversal::TraversalEngine;
use crate::cfr::tree::{GameDefinition, GameTree};

/// The average strategy of one information set in the final artifact.
#[derive(Debug, Clone, Serialize)]
pub struct InfosetStrategy {
    /// Information-set key from the game definition.
    pub key: String,
    /// Acting player.
    pub player: usize,
    /// Action labels from the game definition.
    pub actions: Vec<String>,
    /// Average probability per action.
    pub probabilities: Vec<f64>,
}

/// The final solve artifact: the average strategy keyed by information set.
///
/// This, not the current strategy, is the converging approximate
/// equilibrium; downstream reporting collaborators consume it as is.
#[derive(Debug, Clone, Serialize)]
pub struct AverageStrategy {
    /// One entry per information set, in dense infoset order.
    pub entries: Vec<InfosetStrategy>,
}

/// Layered batched CFR solver for a two-player zero-sum game.
///
/// # Example
/// ```no_run
/// use layered_cfr::cfr::{Solver, SolverConfig};
/// use layered_cfr::games::kuhn;
///
/// let mut solver = Solver::new(&kuhn::game(), SolverConfig::default()).unwrap();
/// let records = solver.run(1000).unwrap();
/// println!("final value: {:?}", records.last().unwrap().game_value);
/// let strategy = solver.average_strategy();
/// ```
pub struct Solver {
    tree: GameTree,
    tables: RegretTables,
    engine: TraversalEngine,
    config: SolverConfig,
}

impl Solver {
    /// Build a solver from an external game definition.
    ///
    /// Both the tree construction and the configuration are validated here,
    /// before any iteration can run.
    pub fn new(definition: &GameDefinition, config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let tree = GameTree::build(definition)?;
        let tables = RegretTables::new(&tree, config.variant);
        let engine = TraversalEngine::new(&tree);

        debug!(
            "solver ready: {} nodes in {} layers, {} information sets, variant {:?}",
            tree.num_nodes(),
            tree.num_layers(),
            tree.num_infosets(),
            config.variant
        );

        Ok(Self { tree, tables, engine, config })
    }

    /// Run `iterations` further CFR iterations.
    ///
    /// Returns one record per iteration; exploitability is filled on the
    /// configured cadence. Repeated calls continue from the accumulated
    /// state. Either an iteration completes fully and the tables hold its
    /// updates, or the error aborts the run with no further iterations.
    pub fn run(&mut self, iterations: u64) -> Result<Vec<IterationRecord>, SolverError> {
        if iterations == 0 {
            return Err(SolverError::InvalidConfiguration(
                "iteration count must be positive".to_string(),
            ));
        }

        let mut records = Vec::with_capacity(iterations as usize);
        let mut profile = vec![0.0; self.tree.total_actions()];

        for _ in 0..iterations {
            self.engine.run_iteration(&self.tree, &mut self.tables, self.config.averaging);
            let iteration = self.engine.iteration();

            if !self.tables.check_finite() {
                return Err(SolverError::NumericInstability { iteration });
            }

            self.tables.average_profile(&mut profile);
            let value = exploitability::expected_value(&self.tree, &profile);

            let on_cadence = self
                .config
                .exploitability_every
                .is_some_and(|every| iteration % every == 0);
            let expl = on_cadence.then(|| exploitability::evaluate(&self.tree, &profile));

            records.push(IterationRecord {
                iteration,
                game_value: [value, -value],
                exploitability: expl,
            });
        }

        if let Some(last) = records.last() {
            info!(
                "completed {} iterations (total {}), average value {:+.6}",
                iterations,
                last.iteration,
                last.game_value[0]
            );
        }

        Ok(records)
    }

    /// Completed iteration count.
    pub fn iteration(&self) -> u64 {
        self.engine.iteration()
    }

    /// Exploitability of the current average strategy.
    pub fn exploitability(&self) -> f64 {
        exploitability::evaluate(&self.tree, &self.average_profile())
    }

    /// Game value per player under the current average strategy.
    pub fn game_value(&self) -> [f64; 2] {
        let value = exploitability::expected_value(&self.tree, &self.average_profile());
        [value, -value]
    }

    /// The average strategy as a flat profile on the action axis.
    pub fn average_profile(&self) -> Vec<f64> {
        let mut profile = vec![0.0; self.tree.total_actions()];
        self.tables.average_profile(&mut profile);
        profile
    }

    /// The final average-strategy artifact, keyed by information set.
    pub fn average_strategy(&self) -> AverageStrategy {
        let entries = (0..self.tree.num_infosets())
            .map(|h| InfosetStrategy {
                key: self.tree.infoset_key(h).to_string(),
                player: self.tree.infoset_player(h),
                actions: self.tree.action_labels(h).to_vec(),
                probabilities: self.tables.average_strategy(h),
            })
            .collect();

        AverageStrategy { entries }
    }

    /// The flattened game tree.
    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// The regret and cumulative-strategy tables.
    pub fn tables(&self) -> &RegretTables {
        &self.tables
    }
}
