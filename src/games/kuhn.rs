//! Kuhn poker game definition.
//!
//! Three cards (0 = jack, 1 = queen, 2 = king), one dealt to each player,
//! one betting round with a single chip. Histories are strings over the
//! actions `p` (pass/check/fold) and `b` (bet/call):
//!
//! ```text
//! pp   showdown for 1       bp   player 0 wins 1
//! bb   showdown for 2       pbp  player 1 wins 1
//! pbb  showdown for 2
//! ```
//!
//! Information-set keys are `"{card}:{history}"`: the acting player sees
//! their own card and the betting history, not the opponent's card. The game
//! has a known equilibrium family: the first player's jack bluffs with some
//! rate alpha in [0, 1/3], the king bets 3*alpha, the queen never bets, and
//! the game value is -1/18 for the first player.

use crate::cfr::tree::{GameDefinition, NodeDef};

/// The six ordered two-card deals from a three-card deck.
const DEALS: [[usize; 2]; 6] = [[0, 1], [0, 2], [1, 0], [1, 2], [2, 0], [2, 1]];

/// Build the full Kuhn poker game definition.
///
/// A uniform chance root over the six deals, each followed by the complete
/// betting tree. 55 nodes, 12 information sets of two actions each.
pub fn game() -> GameDefinition {
    let mut nodes = vec![NodeDef::Terminal { payoff: 0.0 }];

    let mut deal_roots = Vec::with_capacity(DEALS.len());
    for cards in DEALS {
        deal_roots.push(build_history(&mut nodes, cards, ""));
    }
    nodes[0] = NodeDef::Chance {
        children: deal_roots,
        probs: vec![1.0 / DEALS.len() as f64; DEALS.len()],
    };

    GameDefinition { nodes }
}

/// Append the subtree for a betting history; returns its root index.
///
/// Decision nodes are pushed as placeholders first so the index is fixed
/// before the children are built, then overwritten.
fn build_history(nodes: &mut Vec<NodeDef>, cards: [usize; 2], history: &str) -> usize {
    if let Some(payoff) = terminal_payoff(cards, history) {
        nodes.push(NodeDef::Terminal { payoff });
        return nodes.len() - 1;
    }

    let index = nodes.len();
    nodes.push(NodeDef::Terminal { payoff: 0.0 });

    let pass = build_history(nodes, cards, &format!("{}p", history));
    let bet = build_history(nodes, cards, &format!("{}b", history));

    let player = history.len() % 2;
    nodes[index] = NodeDef::Decision {
        player,
        info_key: format!("{}:{}", cards[player], history),
        actions: vec!["Pass".to_string(), "Bet".to_string()],
        children: vec![pass, bet],
    };
    index
}

/// Player 0's payoff if `history` is terminal, `None` otherwise.
fn terminal_payoff(cards: [usize; 2], history: &str) -> Option<f64> {
    let showdown = |stake: f64| if cards[0] > cards[1] { stake } else { -stake };
    match history {
        "pp" => Some(showdown(1.0)),
        "bb" | "pbb" => Some(showdown(2.0)),
        "bp" => Some(1.0),
        "pbp" => Some(-1.0),
        _ => None,
    }
}
