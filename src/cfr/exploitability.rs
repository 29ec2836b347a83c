//! Best-response evaluation of a strategy profile.
//!
//! Measures how far a profile is from equilibrium: each player in turn
//! best-responds to the other's fixed (average) strategy, and the sum of
//! both best-response values is the exploitability: zero exactly at a Nash
//! equilibrium, positive otherwise, since the two game values cancel under
//! the zero-sum invariant.
//!
//! The passes mirror the traversal engine's layer structure: one top-down
//! counterfactual-reach sweep and one bottom-up value sweep. The difference
//! is that the responder's node value is a maximum over actions, chosen per
//! information set by weighting each action's child values with the
//! counterfactual reach of the set's nodes (the responder cannot pick
//! different actions at nodes it cannot tell apart).

use crate::cfr::tree::{GameTree, NodeKind};

/// Expected value for player 0 when both players follow `profile`.
///
/// A single leaves-to-root pass; this is the "game value" reported per
/// iteration against the running average profile.
pub fn expected_value(tree: &GameTree, profile: &[f64]) -> f64 {
    let mut values = vec![0.0; tree.num_nodes()];

    for layer in tree.layers().iter().rev() {
        for v in layer.clone() {
            values[v] = match tree.kind[v] {
                NodeKind::Terminal => tree.payoff[v],
                NodeKind::Chance => tree
                    .children(v)
                    .map(|c| tree.chance_prob[c] * values[c])
                    .sum(),
                NodeKind::Decision => {
                    let at = tree.infoset_offset[tree.infoset[v]];
                    tree.children(v)
                        .map(|c| profile[at + tree.action_index[c]] * values[c])
                        .sum()
                }
            };
        }
    }

    values[0]
}

/// Value `responder` achieves by best-responding to the other player's
/// strategy in `profile`.
pub fn best_response_value(tree: &GameTree, profile: &[f64], responder: usize) -> f64 {
    // Top-down: counterfactual reach of each node, excluding the
    // responder's own choices (they count as probability 1).
    let mut counterfactual = vec![0.0; tree.num_nodes()];
    counterfactual[0] = 1.0;

    for layer in &tree.layers()[1..] {
        for v in layer.clone() {
            let p = tree.parent[v];
            counterfactual[v] = counterfactual[p]
                * match tree.kind[p] {
                    NodeKind::Chance => tree.chance_prob[v],
                    NodeKind::Decision if tree.player[p] == responder => 1.0,
                    NodeKind::Decision => {
                        let at = tree.infoset_offset[tree.infoset[p]];
                        profile[at + tree.action_index[v]]
                    }
                    NodeKind::Terminal => 0.0,
                };
        }
    }

    // Bottom-up: pick the responder's action per information set before
    // filling that layer's node values, so grouped nodes act identically.
    let sign = if responder == 0 { 1.0 } else { -1.0 };
    let mut values = vec![0.0; tree.num_nodes()];
    let mut best_action = vec![0usize; tree.num_infosets()];

    for (d, layer) in tree.layers().iter().enumerate().rev() {
        for h in 0..tree.num_infosets() {
            if tree.infoset_layer[h] != d || tree.infoset_player[h] != responder {
                continue;
            }

            let count = tree.infoset_actions[h];
            let mut best = 0usize;
            let mut best_score = f64::NEG_INFINITY;
            for a in 0..count {
                let score: f64 = tree.infoset_nodes[h]
                    .iter()
                    .map(|&v| counterfactual[v] * values[tree.child_start[v] + a])
                    .sum();
                // Strict comparison ties to the lowest action index.
                if score > best_score {
                    best_score = score;
                    best = a;
                }
            }
            best_action[h] = best;
        }

        for v in layer.clone() {
            values[v] = match tree.kind[v] {
                NodeKind::Terminal => sign * tree.payoff[v],
                NodeKind::Chance => tree
                    .children(v)
                    .map(|c| tree.chance_prob[c] * values[c])
                    .sum(),
                NodeKind::Decision if tree.player[v] == responder => {
                    values[tree.child_start[v] + best_action[tree.infoset[v]]]
                }
                NodeKind::Decision => {
                    let at = tree.infoset_offset[tree.infoset[v]];
                    tree.children(v)
                        .map(|c| profile[at + tree.action_index[c]] * values[c])
                        .sum()
                }
            };
        }
    }

    values[0]
}

/// Exploitability of a profile: the sum of both players' best-response
/// gains over the game value.
pub fn evaluate(tree: &GameTree, profile: &[f64]) -> f64 {
    best_response_value(tree, profile, 0) + best_response_value(tree, profile, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::tree::{GameDefinition, GameTree, NodeDef};

    fn uniform_profile(tree: &GameTree) -> Vec<f64> {
        let mut profile = vec![0.0; tree.total_actions()];
        for h in 0..tree.num_infosets() {
            let count = tree.infoset_actions(h);
            let at = tree.infoset_offset[h];
            profile[at..at + count].fill(1.0 / count as f64);
        }
        profile
    }

    #[test]
    fn uniform_rps_is_already_unexploitable() {
        let tree = GameTree::build(&crate::games::rps::standard()).unwrap();
        let profile = uniform_profile(&tree);

        assert_eq!(expected_value(&tree, &profile), 0.0);
        assert!(evaluate(&tree, &profile).abs() < 1e-12);
    }

    #[test]
    fn uniform_weighted_rps_matches_hand_computation() {
        // Against a uniform opponent the row player's best hand is rock
        // (payoff (0 - 1 + 2) / 3 = 1/3) and the column player's is also
        // rock ((0 + 1 - 2) / -3 = 1/3), so exploitability is 2/3.
        let tree = GameTree::build(&crate::games::rps::plus()).unwrap();
        let profile = uniform_profile(&tree);

        let br0 = best_response_value(&tree, &profile, 0);
        let br1 = best_response_value(&tree, &profile, 1);
        assert!((br0 - 1.0 / 3.0).abs() < 1e-12, "br0 = {}", br0);
        assert!((br1 - 1.0 / 3.0).abs() < 1e-12, "br1 = {}", br1);
        assert!((evaluate(&tree, &profile) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_decision_game_exploitability() {
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
        let tree = GameTree::build(&def).unwrap();
        let profile = uniform_profile(&tree);

        // Uniform play is worth 0; player 0's best response is worth 1 and
        // player 1 has no decision, so exploitability is the full gap.
        assert_eq!(expected_value(&tree, &profile), 0.0);
        assert_eq!(best_response_value(&tree, &profile, 0), 1.0);
        assert_eq!(best_response_value(&tree, &profile, 1), 0.0);
        assert_eq!(evaluate(&tree, &profile), 1.0);
    }

    #[test]
    fn exploitability_of_uniform_kuhn_is_positive() {
        let tree = GameTree::build(&crate::games::kuhn::game()).unwrap();
        let profile = uniform_profile(&tree);

        let expl = evaluate(&tree, &profile);
        assert!(expl > 0.0, "uniform Kuhn play must be exploitable, got {}", expl);
        assert!(expl.is_finite());
    }
}
