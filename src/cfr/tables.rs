//! Cumulative regret and strategy tables.
//!
//! One regret vector and one cumulative-strategy vector per information set,
//! both living on the flat action axis laid out by the tree. Accumulation is
//! purely additive: contributions from independent tree branches that map to
//! the same information set within an iteration are summed in ascending node
//! order by the traversal engine, so the merged result is independent of how
//! the within-layer batch was scheduled.

use crate::cfr::policy::{self, RegretMatchingVariant};
use crate::cfr::tree::GameTree;

/// Mutable per-infoset accumulators, shared across iterations.
#[derive(Debug, Clone)]
pub struct RegretTables {
    /// Cumulative regret on the action axis.
    regrets: Vec<f64>,
    /// Cumulative weighted strategy on the action axis.
    strategy_sums: Vec<f64>,
    /// Per-infoset offsets into the action axis.
    offsets: Vec<usize>,
    /// Per-infoset action counts.
    counts: Vec<usize>,
    /// Regret-matching variant, fixed at construction.
    variant: RegretMatchingVariant,
}

impl RegretTables {
    /// Create zero-initialized tables matching a tree's infoset layout.
    pub fn new(tree: &GameTree, variant: RegretMatchingVariant) -> Self {
        Self {
            regrets: vec![0.0; tree.total_actions()],
            strategy_sums: vec![0.0; tree.total_actions()],
            offsets: tree.infoset_offset.clone(),
            counts: tree.infoset_actions.clone(),
            variant,
        }
    }

    /// Number of information sets covered by the tables.
    pub fn num_infosets(&self) -> usize {
        self.offsets.len()
    }

    /// The regret-matching variant the tables were built with.
    pub fn variant(&self) -> RegretMatchingVariant {
        self.variant
    }

    /// Cumulative regret vector of one information set.
    pub fn read_regret(&self, infoset: usize) -> &[f64] {
        let at = self.offsets[infoset];
        &self.regrets[at..at + self.counts[infoset]]
    }

    /// Add per-action instantaneous regrets to an information set.
    ///
    /// Under regret matching+ the cumulative regret is clamped to zero
    /// after the addition.
    pub fn accumulate_regret(&mut self, infoset: usize, delta: &[f64]) {
        let at = self.offsets[infoset];
        let slice = &mut self.regrets[at..at + self.counts[infoset]];
        debug_assert_eq!(slice.len(), delta.len());

        for (r, &d) in slice.iter_mut().zip(delta) {
            *r += d;
            if self.variant == RegretMatchingVariant::Plus && *r < 0.0 {
                *r = 0.0;
            }
        }
    }

    /// Add a reach-weighted strategy to an information set's cumulative sum.
    pub fn accumulate_strategy(&mut self, infoset: usize, weight: f64, strategy: &[f64]) {
        let at = self.offsets[infoset];
        let slice = &mut self.strategy_sums[at..at + self.counts[infoset]];
        debug_assert_eq!(slice.len(), strategy.len());

        for (s, &p) in slice.iter_mut().zip(strategy) {
            *s += weight * p;
        }
    }

    /// Current strategy of one information set via regret matching.
    pub fn current_strategy(&self, infoset: usize, out: &mut [f64]) {
        policy::derive_strategy(self.read_regret(infoset), out);
    }

    /// Average strategy of one information set.
    ///
    /// The normalized cumulative sum; uniform before the set has ever been
    /// reached with positive probability. This, not the current strategy, is
    /// the converging equilibrium approximation.
    pub fn average_strategy(&self, infoset: usize) -> Vec<f64> {
        let at = self.offsets[infoset];
        let sums = &self.strategy_sums[at..at + self.counts[infoset]];
        let total: f64 = sums.iter().sum();

        if total > 0.0 {
            sums.iter().map(|&s| s / total).collect()
        } else {
            vec![1.0 / sums.len() as f64; sums.len()]
        }
    }

    /// Write the full average-strategy profile onto the action axis.
    pub fn average_profile(&self, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.strategy_sums.len());
        for h in 0..self.num_infosets() {
            let at = self.offsets[h];
            out[at..at + self.counts[h]].copy_from_slice(&self.average_strategy(h));
        }
    }

    /// True if every accumulator is finite.
    pub fn check_finite(&self) -> bool {
        self.regrets.iter().all(|r| r.is_finite())
            && self.strategy_sums.iter().all(|s| s.is_finite())
    }

    /// Raw regret axis, for determinism comparisons.
    pub fn regrets(&self) -> &[f64] {
        &self.regrets
    }

    /// Raw cumulative-strategy axis, for determinism comparisons.
    pub fn strategy_sums(&self) -> &[f64] {
        &self.strategy_sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::tree::GameTree;

    fn tables(variant: RegretMatchingVariant) -> RegretTables {
        let tree = GameTree::build(&crate::games::rps::standard()).unwrap();
        RegretTables::new(&tree, variant)
    }

    #[test]
    fn accumulation_is_order_independent() {
        let mut a = tables(RegretMatchingVariant::Vanilla);
        let mut b = tables(RegretMatchingVariant::Vanilla);

        a.accumulate_regret(1, &[1.0, -2.0, 0.5]);
        a.accumulate_regret(1, &[0.25, 0.25, 0.25]);
        b.accumulate_regret(1, &[0.25, 0.25, 0.25]);
        b.accumulate_regret(1, &[1.0, -2.0, 0.5]);

        assert_eq!(a.read_regret(1), b.read_regret(1));
        assert_eq!(a.read_regret(1), &[1.25, -1.75, 0.75]);
    }

    #[test]
    fn plus_variant_floors_after_each_update() {
        let mut t = tables(RegretMatchingVariant::Plus);

        t.accumulate_regret(0, &[-1.0, 2.0, 0.0]);
        assert_eq!(t.read_regret(0), &[0.0, 2.0, 0.0]);

        // Vanilla would hold -1.0 here and sum to 1.0 on the next update;
        // RM+ restarts from the floor.
        t.accumulate_regret(0, &[2.0, -3.0, 0.0]);
        assert_eq!(t.read_regret(0), &[2.0, 0.0, 0.0]);
    }

    #[test]
    fn average_strategy_uniform_until_reached() {
        let mut t = tables(RegretMatchingVariant::Vanilla);
        assert_eq!(t.average_strategy(0), vec![1.0 / 3.0; 3]);

        t.accumulate_strategy(0, 2.0, &[0.5, 0.25, 0.25]);
        t.accumulate_strategy(0, 2.0, &[0.5, 0.25, 0.25]);
        let avg = t.average_strategy(0);
        assert!((avg[0] - 0.5).abs() < 1e-12);
        assert!((avg.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn finite_check_catches_nan() {
        let mut t = tables(RegretMatchingVariant::Vanilla);
        assert!(t.check_finite());
        t.accumulate_regret(0, &[f64::NAN, 0.0, 0.0]);
        assert!(!t.check_finite());
    }
}
