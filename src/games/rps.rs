//! Rock-paper-scissors with optional payoff weights.
//!
//! A one-shot matrix game rendered in sequence form: player 0 moves at the
//! root and player 1's three nodes share a single information set, so the
//! moves are effectively simultaneous. The winner collects the product of
//! the two chosen hands' weights.
//!
//! With uniform weights the unique equilibrium is uniform play. Doubling
//! the scissors weight shifts it to (0.4, 0.4, 0.2) for both players, a
//! useful check that the solver finds genuinely mixed, non-uniform
//! equilibria.

use crate::cfr::tree::{GameDefinition, NodeDef};

const HANDS: [&str; 3] = ["Rock", "Paper", "Scissors"];

/// Build a weighted rock-paper-scissors game definition.
///
/// `weights[a]` scales the stakes whenever hand `a` is involved in a win;
/// the winner of `a` vs `b` collects `weights[a] * weights[b]`.
pub fn game(weights: [f64; 3]) -> GameDefinition {
    let labels = || HANDS.iter().map(|s| s.to_string()).collect();

    let mut nodes = Vec::with_capacity(13);
    nodes.push(NodeDef::Decision {
        player: 0,
        info_key: "p0".to_string(),
        actions: labels(),
        children: vec![1, 5, 9],
    });

    for a in 0..3 {
        let base = nodes.len();
        nodes.push(NodeDef::Decision {
            player: 1,
            info_key: "p1".to_string(),
            actions: labels(),
            children: vec![base + 1, base + 2, base + 3],
        });
        for b in 0..3 {
            nodes.push(NodeDef::Terminal { payoff: payoff(weights, a, b) });
        }
    }

    GameDefinition { nodes }
}

/// Standard rock-paper-scissors: all weights 1, uniform equilibrium.
pub fn standard() -> GameDefinition {
    game([1.0; 3])
}

/// Scissors pay double: equilibrium (0.4, 0.4, 0.2) for both players.
pub fn plus() -> GameDefinition {
    game([1.0, 1.0, 2.0])
}

/// Player 0's payoff when player 0 shows `a` and player 1 shows `b`.
fn payoff(weights: [f64; 3], a: usize, b: usize) -> f64 {
    // Hand a beats hand b exactly when a follows b cyclically.
    let sign = match (3 + a - b) % 3 {
        0 => 0.0,
        1 => 1.0,
        _ => -1.0,
    };
    sign * weights[a] * weights[b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::tree::GameTree;

    #[test]
    fn payoff_matrix_is_antisymmetric() {
        let weights = [1.0, 1.5, 2.0];
        for a in 0..3 {
            assert_eq!(payoff(weights, a, a), 0.0);
            for b in 0..3 {
                assert_eq!(payoff(weights, a, b), -payoff(weights, b, a));
            }
        }
    }

    #[test]
    fn paper_beats_rock_and_the_cycle_holds() {
        let w = [1.0; 3];
        assert_eq!(payoff(w, 1, 0), 1.0); // paper covers rock
        assert_eq!(payoff(w, 2, 1), 1.0); // scissors cut paper
        assert_eq!(payoff(w, 0, 2), 1.0); // rock crushes scissors
    }

    #[test]
    fn doubled_scissors_scale_their_stakes() {
        let def = plus();
        match &def.nodes[0] {
            NodeDef::Decision { children, .. } => assert_eq!(children, &[1, 5, 9]),
            _ => panic!("root must be player 0's decision"),
        }
        assert_eq!(payoff([1.0, 1.0, 2.0], 0, 2), 2.0);
        assert_eq!(payoff([1.0, 1.0, 2.0], 2, 1), 2.0);
        assert_eq!(payoff([1.0, 1.0, 2.0], 1, 0), 1.0);
    }

    #[test]
    fn tree_groups_the_second_player_into_one_infoset() {
        let tree = GameTree::build(&standard()).unwrap();

        assert_eq!(tree.num_infosets(), 2);
        assert_eq!(tree.infoset_player(0), 0);
        assert_eq!(tree.infoset_player(1), 1);
        assert_eq!(tree.infoset_actions(0), 3);
        assert_eq!(tree.infoset_actions(1), 3);
        assert_eq!(tree.num_layers(), 3);
    }
}
