//! The two-pass layered traversal engine.
//!
//! One CFR iteration is three tree-wide batch steps instead of a recursive
//! walk:
//!
//! 1. a strategy refresh deriving the current profile from the regret
//!    tables, one independent batch item per information set;
//! 2. a reach-probability pass from the root layer down, tracking each
//!    player's own-strategy reach separately from the chance reach;
//! 3. a counterfactual-value pass from the deepest layer up, which also
//!    accumulates instantaneous regrets and the reach-weighted current
//!    strategy into the tables.
//!
//! Within a layer every node is independent (its inputs live in the
//! previous layer for pass 2, the parent layer for pass 1), so layers are
//! processed with `rayon` and a barrier between layers. Table accumulation
//! runs sequentially in ascending node order after each layer's parallel
//! value batch, which keeps the merged tables bit-for-bit identical no
//! matter how the batch was scheduled.

use rayon::prelude::*;

use crate::cfr::config::AveragingScheme;
use crate::cfr::tables::RegretTables;
use crate::cfr::tree::{GameTree, NodeKind};

/// Reusable per-node state for the two passes of an iteration.
#[derive(Debug)]
pub struct TraversalEngine {
    /// Own-strategy reach probability per player, per node.
    reach: Vec<[f64; 2]>,
    /// Chance reach probability per node.
    chance_reach: Vec<f64>,
    /// Expected value for player 0 per node (player 1's is the negation).
    values: Vec<f64>,
    /// Current strategy profile on the action axis.
    profile: Vec<f64>,
    /// Scratch regret-delta buffer, sized to the widest information set.
    scratch: Vec<f64>,
    /// Completed iterations.
    iteration: u64,
}

/// Split a flat action-axis buffer into one mutable slice per infoset.
fn split_by_counts<'a>(mut buf: &'a mut [f64], counts: &[usize]) -> Vec<&'a mut [f64]> {
    let mut slices = Vec::with_capacity(counts.len());
    for &count in counts {
        let (head, tail) = buf.split_at_mut(count);
        slices.push(head);
        buf = tail;
    }
    slices
}

impl TraversalEngine {
    /// Allocate engine state for a tree.
    pub fn new(tree: &GameTree) -> Self {
        Self {
            reach: vec![[0.0; 2]; tree.num_nodes()],
            chance_reach: vec![0.0; tree.num_nodes()],
            values: vec![0.0; tree.num_nodes()],
            profile: vec![0.0; tree.total_actions()],
            scratch: vec![0.0; tree.max_actions],
            iteration: 0,
        }
    }

    /// Completed iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The current strategy profile derived in the latest iteration.
    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    /// Run one full CFR iteration and return the root value for player 0
    /// under the current profile.
    ///
    /// Both players' regrets and strategy sums are updated in the single
    /// value pass (simultaneous updates). The tables are read only during
    /// the strategy refresh, so every read observes the fully-merged state
    /// of the previous iteration.
    pub fn run_iteration(
        &mut self,
        tree: &GameTree,
        tables: &mut RegretTables,
        averaging: AveragingScheme,
    ) -> f64 {
        self.iteration += 1;

        self.refresh_profile(tree, tables);
        self.reach_pass(tree);
        self.value_pass(tree, tables, averaging);

        self.values[0]
    }

    /// Derive the current strategy for every information set as one batch.
    fn refresh_profile(&mut self, tree: &GameTree, tables: &RegretTables) {
        split_by_counts(&mut self.profile, &tree.infoset_actions)
            .into_par_iter()
            .enumerate()
            .for_each(|(h, out)| tables.current_strategy(h, out));
    }

    /// Root-to-leaves pass: per-player own reach and chance reach.
    fn reach_pass(&mut self, tree: &GameTree) {
        let Self { reach, chance_reach, profile, .. } = self;
        let profile = &profile[..];

        reach[0] = [1.0, 1.0];
        chance_reach[0] = 1.0;

        for layer in &tree.layers[1..] {
            let start = layer.start;
            let len = layer.len();

            let (head, tail) = reach.split_at_mut(start);
            let head = &head[..];
            let (chead, ctail) = chance_reach.split_at_mut(start);
            let chead = &chead[..];

            tail[..len]
                .par_iter_mut()
                .zip(ctail[..len].par_iter_mut())
                .enumerate()
                .for_each(|(i, (r, c))| {
                    let v = start + i;
                    let p = tree.parent[v];
                    let mut own = head[p];
                    let mut chance = chead[p];

                    match tree.kind[p] {
                        NodeKind::Chance => chance *= tree.chance_prob[v],
                        NodeKind::Decision => {
                            let q = tree.player[p];
                            let at = tree.infoset_offset[tree.infoset[p]]
                                + tree.action_index[v];
                            own[q] *= profile[at];
                        }
                        // Terminals have no children, so a terminal parent
                        // cannot occur in a well-formed tree.
                        NodeKind::Terminal => debug_assert!(false),
                    }

                    *r = own;
                    *c = chance;
                });
        }
    }

    /// Leaves-to-root pass: expected values, regret and strategy updates.
    fn value_pass(
        &mut self,
        tree: &GameTree,
        tables: &mut RegretTables,
        averaging: AveragingScheme,
    ) {
        let iteration_weight = match averaging {
            AveragingScheme::Uniform => 1.0,
            AveragingScheme::Linear => self.iteration as f64,
        };

        for d in (0..tree.layers.len()).rev() {
            let layer = tree.layers[d].clone();

            // Parallel value batch: each node reads only the next layer.
            {
                let (head, tail) = self.values.split_at_mut(layer.end);
                let tail = &tail[..];
                let profile = &self.profile;
                let start = layer.start;
                let end = layer.end;

                head[start..].par_iter_mut().enumerate().for_each(|(i, val)| {
                    let v = start + i;
                    *val = match tree.kind[v] {
                        NodeKind::Terminal => tree.payoff[v],
                        NodeKind::Chance => tree
                            .children(v)
                            .map(|c| tree.chance_prob[c] * tail[c - end])
                            .sum(),
                        NodeKind::Decision => {
                            let at = tree.infoset_offset[tree.infoset[v]];
                            tree.children(v)
                                .map(|c| profile[at + tree.action_index[c]] * tail[c - end])
                                .sum()
                        }
                    };
                });
            }

            // Sequential accumulation in ascending node order: deterministic
            // commutative merge of all branches touching an information set.
            for v in layer {
                if tree.kind[v] != NodeKind::Decision {
                    continue;
                }

                let h = tree.infoset[v];
                let p = tree.player[v];
                let at = tree.infoset_offset[h];
                let count = tree.infoset_actions[h];

                // Counterfactual reach excludes the acting player's own
                // probabilities; values are stored for player 0, so flip the
                // sign for player 1.
                let counterfactual = self.chance_reach[v] * self.reach[v][1 - p];
                let sign = if p == 0 { 1.0 } else { -1.0 };
                let node_value = self.values[v];

                let delta = &mut self.scratch[..count];
                for (slot, c) in tree.children(v).enumerate() {
                    delta[slot] = counterfactual * sign * (self.values[c] - node_value);
                }
                tables.accumulate_regret(h, delta);

                let weight = self.reach[v][p] * iteration_weight;
                if weight != 0.0 {
                    tables.accumulate_strategy(h, weight, &self.profile[at..at + count]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::policy::{self, RegretMatchingVariant};
    use crate::cfr::tree::{GameDefinition, NodeDef};

    fn run_n(def: &GameDefinition, iterations: u64) -> (GameTree, RegretTables) {
        let tree = GameTree::build(def).unwrap();
        let mut tables = RegretTables::new(&tree, RegretMatchingVariant::Vanilla);
        let mut engine = TraversalEngine::new(&tree);
        for _ in 0..iterations {
            engine.run_iteration(&tree, &mut tables, AveragingScheme::Uniform);
        }
        (tree, tables)
    }

    #[test]
    fn single_decision_game_resolves_in_one_iteration() {
        let def = GameDefinition {
            nodes: vec![
                NodeDef::Decision {
                    player: 0,
                    info_key: "root".to_string(),
                    actions: vec!["win".to_string(), "lose".to_string()],
                    children: vec![1, 2],
                },
                NodeDef::Terminal { payoff: 1.0 },
                NodeDef::Terminal { payoff: -1.0 },
            ],
        };
        let (_, tables) = run_n(&def, 1);

        // Uniform play values the node at 0, so the regrets are the raw
        // payoff gaps and regret matching is already pure.
        assert_eq!(tables.read_regret(0), &[1.0, -1.0]);
        let mut strategy = [0.0; 2];
        policy::derive_strategy(tables.read_regret(0), &mut strategy);
        assert_eq!(strategy, [1.0, 0.0]);
    }

    #[test]
    fn strategies_are_probability_distributions() {
        let (tree, tables) = run_n(&crate::games::kuhn::game(), 50);

        let mut out = vec![0.0; tree.total_actions()];
        for h in 0..tree.num_infosets() {
            let count = tree.infoset_actions(h);
            tables.current_strategy(h, &mut out[..count]);
            let sum: f64 = out[..count].iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "current strategy at {} sums to {}", h, sum);

            let avg: f64 = tables.average_strategy(h).iter().sum();
            assert!((avg - 1.0).abs() < 1e-12, "average strategy at {} sums to {}", h, avg);
        }
    }

    #[test]
    fn iterations_are_deterministic_across_worker_counts() {
        let (_, reference) = run_n(&crate::games::kuhn::game(), 100);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let (_, single) = pool.install(|| run_n(&crate::games::kuhn::game(), 100));

        // Bit-for-bit: accumulation order does not depend on scheduling.
        assert_eq!(reference.regrets(), single.regrets());
        assert_eq!(reference.strategy_sums(), single.strategy_sums());
    }

    #[test]
    fn sibling_order_does_not_change_results() {
        // The same game expressed twice, with the two chance branches (and
        // their probability entries) listed in opposite orders. Both
        // branches map onto the same information set, so the accumulated
        // tables must agree regardless of which branch is processed first.
        fn lopsided(flipped: bool) -> GameDefinition {
            let mut nodes = vec![NodeDef::Chance {
                children: if flipped { vec![4, 1] } else { vec![1, 4] },
                probs: if flipped { vec![0.7, 0.3] } else { vec![0.3, 0.7] },
            }];
            for payoffs in [[1.0, -0.5], [-0.25, 0.75]] {
                let base = nodes.len();
                nodes.push(NodeDef::Decision {
                    player: 0,
                    info_key: "x".to_string(),
                    actions: vec!["l".to_string(), "r".to_string()],
                    children: vec![base + 1, base + 2],
                });
                nodes.push(NodeDef::Terminal { payoff: payoffs[0] });
                nodes.push(NodeDef::Terminal { payoff: payoffs[1] });
            }
            GameDefinition { nodes }
        }

        let (tree_a, tables_a) = run_n(&lopsided(false), 200);
        let (tree_b, tables_b) = run_n(&lopsided(true), 200);

        let h_a = tree_a.infoset_index("x").unwrap();
        let h_b = tree_b.infoset_index("x").unwrap();
        for (x, y) in tables_a
            .read_regret(h_a)
            .iter()
            .zip(tables_b.read_regret(h_b))
        {
            assert!((x - y).abs() < 1e-12);
        }
        for (x, y) in tables_a
            .average_strategy(h_a)
            .iter()
            .zip(&tables_b.average_strategy(h_b))
        {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
