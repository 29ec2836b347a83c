//! Regret matching: deriving a current strategy from cumulative regret.
//!
//! The variant is fixed at construction time; the hot traversal loop never
//! branches on it per call. Vanilla regret matching floors regret at read
//! time; regret matching+ keeps the cumulative regret itself nonnegative by
//! clamping after every accumulation (see `RegretTables::accumulate_regret`),
//! so the derivation below is shared by both.

use serde::{Deserialize, Serialize};

/// Which regret-matching rule the tables follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegretMatchingVariant {
    /// Plain CFR: cumulative regret may go negative, floored at read time.
    #[default]
    Vanilla,
    /// Regret matching+: cumulative regret clamped to zero after each update.
    Plus,
}

impl RegretMatchingVariant {
    /// Parse a variant name, as accepted on the driver command line.
    pub fn parse(name: &str) -> Option<RegretMatchingVariant> {
        match name {
            "vanilla" | "cfr" => Some(RegretMatchingVariant::Vanilla),
            "plus" | "cfr+" => Some(RegretMatchingVariant::Plus),
            _ => None,
        }
    }
}

/// Derive a strategy from a regret vector into `out`.
///
/// Probabilities are proportional to positive regret. When no regret is
/// positive (including iteration 1, where all regrets are zero) the
/// strategy is uniform; that fallback is the defined tie-break, not an
/// error case.
pub fn derive_strategy(regrets: &[f64], out: &mut [f64]) {
    debug_assert_eq!(regrets.len(), out.len());

    let mut positive_sum = 0.0;
    for (o, &r) in out.iter_mut().zip(regrets) {
        *o = r.max(0.0);
        positive_sum += *o;
    }

    if positive_sum > 0.0 {
        for o in out.iter_mut() {
            *o /= positive_sum;
        }
    } else {
        let uniform = 1.0 / out.len() as f64;
        out.fill(uniform);
    }
}
