//! Flattened, layer-indexed game tree store.
//!
//! The tree is the immutable heart of the solver: an extensive-form game
//! supplied by an external converter is renumbered into breadth-first layer
//! order and stored as flat parallel arrays, so that one CFR iteration can
//! run as two directional sweeps over layers with every node in a layer
//! processed as an independent batch. Recursion never touches this
//! representation; dependencies only flow layer-to-layer.

use std::ops::Range;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::error::MalformedGameError;

/// Sentinel for "no index" (root parent, non-decision infoset slots).
pub const NO_INDEX: usize = usize::MAX;

/// Tolerance when checking that chance probabilities sum to 1.
const PROB_SUM_TOLERANCE: f64 = 1e-9;

/// One node of an externally-supplied game definition.
///
/// Node indices refer to positions in [`GameDefinition::nodes`]; index 0 is
/// the root. Terminal payoffs are stated for player 0; player 1's payoff is
/// the negation, which makes the zero-sum invariant structural rather than
/// something to validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeDef {
    /// A chance node with a fixed distribution over its children.
    Chance {
        /// Child node indices, one per outcome.
        children: Vec<usize>,
        /// Outcome probabilities, aligned with `children`.
        probs: Vec<f64>,
    },
    /// A decision node owned by one player.
    Decision {
        /// Acting player, 0 or 1.
        player: usize,
        /// Information-set key; nodes sharing a key are indistinguishable
        /// to the acting player.
        info_key: String,
        /// Human-readable action labels, aligned with `children`.
        actions: Vec<String>,
        /// Child node indices, one per action.
        children: Vec<usize>,
    },
    /// A terminal node holding player 0's payoff.
    Terminal {
        /// Payoff for player 0 (player 1 receives the negation).
        payoff: f64,
    },
}

impl NodeDef {
    fn children(&self) -> &[usize] {
        match self {
            NodeDef::Chance { children, .. } => children,
            NodeDef::Decision { children, .. } => children,
            NodeDef::Terminal { .. } => &[],
        }
    }
}

/// A full extensive-form game tree as supplied by an external collaborator.
///
/// The solver treats this as an opaque, already-decompressed in-memory
/// structure; it performs no I/O on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDefinition {
    /// All nodes; index 0 is the root.
    pub nodes: Vec<NodeDef>,
}

/// Compact node kind stored per node in the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Fixed probability distribution over children.
    Chance,
    /// Owned by one player; belongs to an information set.
    Decision,
    /// Leaf with a payoff.
    Terminal,
}

/// Immutable flattened game tree, organized by depth layer.
///
/// Nodes are renumbered in breadth-first order at build time, so every layer
/// is a contiguous index range and every node's children form a contiguous
/// range in the next layer. All per-node attributes live in parallel arrays
/// indexed by the renumbered id; per-infoset attributes are indexed by a
/// dense infoset id with a flat "action axis" shared by the regret and
/// strategy tables.
#[derive(Debug, Clone)]
pub struct GameTree {
    // Per-node arrays (breadth-first numbering).
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) parent: Vec<usize>,
    pub(crate) action_index: Vec<usize>,
    pub(crate) chance_prob: Vec<f64>,
    pub(crate) infoset: Vec<usize>,
    pub(crate) player: Vec<usize>,
    pub(crate) child_start: Vec<usize>,
    pub(crate) child_count: Vec<usize>,
    pub(crate) payoff: Vec<f64>,
    pub(crate) depth: Vec<usize>,

    // Layer structure: layer d covers the node index range `layers[d]`.
    pub(crate) layers: Vec<Range<usize>>,

    // Per-infoset arrays.
    pub(crate) infoset_player: Vec<usize>,
    pub(crate) infoset_actions: Vec<usize>,
    pub(crate) infoset_offset: Vec<usize>,
    pub(crate) infoset_layer: Vec<usize>,
    pub(crate) infoset_nodes: Vec<Vec<usize>>,
    infoset_keys: Vec<String>,
    infoset_labels: Vec<Vec<String>>,
    key_index: FxHashMap<String, usize>,

    pub(crate) total_actions: usize,
    pub(crate) max_actions: usize,
}

impl GameTree {
    /// Build the flattened layered tree from an external game definition.
    ///
    /// This is a pure function of the definition; it performs no I/O.
    /// Returns [`MalformedGameError`] on any structural violation; no
    /// partial tree is ever returned.
    pub fn build(def: &GameDefinition) -> Result<GameTree, MalformedGameError> {
        let n = def.nodes.len();
        if n == 0 {
            return Err(MalformedGameError::EmptyDefinition);
        }

        // Local shape checks first, so index arithmetic below can assume
        // well-formed nodes.
        for (i, node) in def.nodes.iter().enumerate() {
            match node {
                NodeDef::Chance { children, probs } => {
                    if children.is_empty() {
                        return Err(MalformedGameError::MissingActions { node: i });
                    }
                    if probs.len() != children.len() {
                        return Err(MalformedGameError::ChildCountMismatch {
                            node: i,
                            actions: probs.len(),
                            children: children.len(),
                        });
                    }
                    let sum: f64 = probs.iter().sum();
                    if probs.iter().any(|p| !p.is_finite() || *p < 0.0)
                        || (sum - 1.0).abs() > PROB_SUM_TOLERANCE
                    {
                        return Err(MalformedGameError::BadChanceProbabilities { node: i });
                    }
                }
                NodeDef::Decision { player, actions, children, .. } => {
                    if children.is_empty() {
                        return Err(MalformedGameError::MissingActions { node: i });
                    }
                    if actions.len() != children.len() {
                        return Err(MalformedGameError::ChildCountMismatch {
                            node: i,
                            actions: actions.len(),
                            children: children.len(),
                        });
                    }
                    if *player > 1 {
                        return Err(MalformedGameError::InvalidPlayer {
                            node: i,
                            player: *player,
                        });
                    }
                }
                NodeDef::Terminal { .. } => {}
            }
        }

        // Breadth-first renumbering. `order[v]` is the definition index of
        // the node with new id `v`; pushing children consecutively makes
        // each node's children contiguous and each layer a contiguous range.
        let mut order = Vec::with_capacity(n);
        let mut new_id = vec![NO_INDEX; n];
        let mut parent = Vec::with_capacity(n);
        let mut action_index = Vec::with_capacity(n);
        let mut chance_prob = Vec::with_capacity(n);
        let mut depth = Vec::with_capacity(n);
        let mut layers = Vec::new();

        order.push(0);
        new_id[0] = 0;
        parent.push(NO_INDEX);
        action_index.push(0);
        chance_prob.push(1.0);
        depth.push(0);

        let mut level: Range<usize> = 0..1;
        layers.push(level.clone());

        while !level.is_empty() {
            let next_start = order.len();
            for pos in level.clone() {
                let d = order[pos];
                for (slot, &c) in def.nodes[d].children().iter().enumerate() {
                    if c >= n {
                        return Err(MalformedGameError::ChildIndexOutOfBounds {
                            node: d,
                            child: c,
                        });
                    }
                    if new_id[c] != NO_INDEX {
                        return Err(MalformedGameError::DuplicateParent { node: c });
                    }
                    new_id[c] = order.len();
                    order.push(c);
                    parent.push(pos);
                    action_index.push(slot);
                    chance_prob.push(match &def.nodes[d] {
                        NodeDef::Chance { probs, .. } => probs[slot],
                        _ => 1.0,
                    });
                    depth.push(layers.len());
                }
            }
            level = next_start..order.len();
            if !level.is_empty() {
                layers.push(level.clone());
            }
        }

        if order.len() != n {
            return Err(MalformedGameError::UnreachableNodes { count: n - order.len() });
        }

        // Contiguous child ranges in the new numbering.
        let mut child_start = vec![0usize; n];
        let mut child_count = vec![0usize; n];
        for v in 1..n {
            let p = parent[v];
            if child_count[p] == 0 {
                child_start[p] = v;
            }
            child_count[p] += 1;
        }

        // Per-node attributes and infoset interning.
        let mut kind = Vec::with_capacity(n);
        let mut infoset = vec![NO_INDEX; n];
        let mut player = vec![NO_INDEX; n];
        let mut payoff = vec![0.0; n];

        let mut key_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut infoset_player = Vec::new();
        let mut infoset_actions = Vec::new();
        let mut infoset_layer = Vec::new();
        let mut infoset_nodes: Vec<Vec<usize>> = Vec::new();
        let mut infoset_keys = Vec::new();
        let mut infoset_labels = Vec::new();

        for v in 0..n {
            match &def.nodes[order[v]] {
                NodeDef::Chance { .. } => kind.push(NodeKind::Chance),
                NodeDef::Terminal { payoff: u } => {
                    kind.push(NodeKind::Terminal);
                    payoff[v] = *u;
                }
                NodeDef::Decision { player: p, info_key, actions, children } => {
                    kind.push(NodeKind::Decision);
                    player[v] = *p;

                    let h = match key_index.get(info_key) {
                        Some(&h) => {
                            if infoset_actions[h] != children.len() {
                                return Err(MalformedGameError::InfosetActionMismatch {
                                    key: info_key.clone(),
                                });
                            }
                            if infoset_player[h] != *p {
                                return Err(MalformedGameError::InfosetPlayerMismatch {
                                    key: info_key.clone(),
                                });
                            }
                            if infoset_layer[h] != depth[v] {
                                return Err(MalformedGameError::InfosetLayerMismatch {
                                    key: info_key.clone(),
                                });
                            }
                            h
                        }
                        None => {
                            let h = infoset_keys.len();
                            key_index.insert(info_key.clone(), h);
                            infoset_keys.push(info_key.clone());
                            infoset_labels.push(actions.clone());
                            infoset_player.push(*p);
                            infoset_actions.push(children.len());
                            infoset_layer.push(depth[v]);
                            infoset_nodes.push(Vec::new());
                            h
                        }
                    };
                    infoset[v] = h;
                    infoset_nodes[h].push(v);
                }
            }
        }

        // Flat action axis: each infoset owns a contiguous slice of it.
        let mut infoset_offset = Vec::with_capacity(infoset_actions.len());
        let mut total_actions = 0;
        for &count in &infoset_actions {
            infoset_offset.push(total_actions);
            total_actions += count;
        }
        let max_actions = infoset_actions.iter().copied().max().unwrap_or(0);

        debug!(
            "built game tree: {} nodes, {} layers, {} information sets, {} actions",
            n,
            layers.len(),
            infoset_keys.len(),
            total_actions
        );

        Ok(GameTree {
            kind,
            parent,
            action_index,
            chance_prob,
            infoset,
            player,
            child_start,
            child_count,
            payoff,
            depth,
            layers,
            infoset_player,
            infoset_actions,
            infoset_offset,
            infoset_layer,
            infoset_nodes,
            infoset_keys,
            infoset_labels,
            key_index,
            total_actions,
            max_actions,
        })
    }

    /// Total number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.kind.len()
    }

    /// Number of depth layers (the root layer is layer 0).
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of information sets.
    pub fn num_infosets(&self) -> usize {
        self.infoset_keys.len()
    }

    /// Total length of the flat action axis.
    pub fn total_actions(&self) -> usize {
        self.total_actions
    }

    /// Node index ranges per layer, root first.
    pub fn layers(&self) -> &[Range<usize>] {
        &self.layers
    }

    /// Key of an information set.
    pub fn infoset_key(&self, infoset: usize) -> &str {
        &self.infoset_keys[infoset]
    }

    /// Dense index of an information set, if the key exists.
    pub fn infoset_index(&self, key: &str) -> Option<usize> {
        self.key_index.get(key).copied()
    }

    /// Number of legal actions at an information set.
    pub fn infoset_actions(&self, infoset: usize) -> usize {
        self.infoset_actions[infoset]
    }

    /// Acting player at an information set.
    pub fn infoset_player(&self, infoset: usize) -> usize {
        self.infoset_player[infoset]
    }

    /// Action labels at an information set.
    pub fn action_labels(&self, infoset: usize) -> &[String] {
        &self.infoset_labels[infoset]
    }

    /// Contiguous child range of a node in the breadth-first numbering.
    pub(crate) fn children(&self, node: usize) -> Range<usize> {
        self.child_start[node]..self.child_start[node] + self.child_count[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(player: usize, key: &str, children: Vec<usize>) -> NodeDef {
        let actions = (0..children.len()).map(|a| format!("a{}", a)).collect();
        NodeDef::Decision { player, info_key: key.to_string(), actions, children }
    }

    #[test]
    fn build_rejects_empty_definition() {
        let def = GameDefinition { nodes: vec![] };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::EmptyDefinition)
        ));
    }

    #[test]
    fn build_rejects_shared_child() {
        // Two actions leading to the same terminal: one node, two parents.
        let def = GameDefinition {
            nodes: vec![
                decision(0, "h", vec![1, 1]),
                NodeDef::Terminal { payoff: 1.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::DuplicateParent { node: 1 })
        ));
    }

    #[test]
    fn build_rejects_cycle() {
        let def = GameDefinition {
            nodes: vec![
                decision(0, "h", vec![1, 2]),
                decision(1, "g", vec![0, 2]),
                NodeDef::Terminal { payoff: 0.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::DuplicateParent { .. })
        ));
    }

    #[test]
    fn build_rejects_action_count_mismatch() {
        let def = GameDefinition {
            nodes: vec![
                NodeDef::Decision {
                    player: 0,
                    info_key: "h".to_string(),
                    actions: vec!["only".to_string()],
                    children: vec![1, 2],
                },
                NodeDef::Terminal { payoff: 1.0 },
                NodeDef::Terminal { payoff: -1.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::ChildCountMismatch { node: 0, actions: 1, children: 2 })
        ));
    }

    #[test]
    fn build_rejects_infoset_action_mismatch() {
        let def = GameDefinition {
            nodes: vec![
                NodeDef::Chance { children: vec![1, 2], probs: vec![0.5, 0.5] },
                decision(0, "h", vec![3, 4]),
                decision(0, "h", vec![5, 6, 7]),
                NodeDef::Terminal { payoff: 0.0 },
                NodeDef::Terminal { payoff: 0.0 },
                NodeDef::Terminal { payoff: 0.0 },
                NodeDef::Terminal { payoff: 0.0 },
                NodeDef::Terminal { payoff: 0.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::InfosetActionMismatch { .. })
        ));
    }

    #[test]
    fn build_rejects_bad_chance_probabilities() {
        let def = GameDefinition {
            nodes: vec![
                NodeDef::Chance { children: vec![1, 2], probs: vec![0.7, 0.7] },
                NodeDef::Terminal { payoff: 0.0 },
                NodeDef::Terminal { payoff: 0.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::BadChanceProbabilities { node: 0 })
        ));
    }

    #[test]
    fn build_rejects_unreachable_nodes() {
        let def = GameDefinition {
            nodes: vec![
                decision(0, "h", vec![1, 2]),
                NodeDef::Terminal { payoff: 1.0 },
                NodeDef::Terminal { payoff: -1.0 },
                NodeDef::Terminal { payoff: 0.0 },
            ],
        };
        assert!(matches!(
            GameTree::build(&def),
            Err(MalformedGameError::UnreachableNodes { count: 1 })
        ));
    }

    #[test]
    fn layers_are_contiguous_and_ordered() {
        let tree = GameTree::build(&crate::games::kuhn::game()).unwrap();

        // Root chance, deal layer, then three betting layers.
        assert_eq!(tree.num_layers(), 5);
        assert_eq!(tree.layers()[0], 0..1);

        let mut expected_start = 0;
        for layer in tree.layers() {
            assert_eq!(layer.start, expected_start);
            expected_start = layer.end;
        }
        assert_eq!(expected_start, tree.num_nodes());

        // Children always live in the parent's next layer.
        for v in 0..tree.num_nodes() {
            for c in tree.children(v) {
                assert_eq!(tree.depth[c], tree.depth[v] + 1);
            }
        }
    }

    #[test]
    fn kuhn_infoset_structure_round_trips() {
        let def = crate::games::kuhn::game();
        let tree = GameTree::build(&def).unwrap();

        // 12 information sets: 3 cards x 4 decision histories.
        assert_eq!(tree.num_infosets(), 12);
        for h in 0..tree.num_infosets() {
            assert_eq!(tree.infoset_actions(h), 2);
            // Each infoset groups the two deals indistinguishable to its owner.
            assert_eq!(tree.infoset_nodes[h].len(), 2);
            let key = tree.infoset_key(h).to_string();
            assert_eq!(tree.infoset_index(&key), Some(h));
        }

        // Rebuilding yields the identical structure.
        let again = GameTree::build(&def).unwrap();
        assert_eq!(again.num_nodes(), tree.num_nodes());
        assert_eq!(again.num_infosets(), tree.num_infosets());
        assert_eq!(again.total_actions(), tree.total_actions());
        for h in 0..tree.num_infosets() {
            assert_eq!(again.infoset_key(h), tree.infoset_key(h));
            assert_eq!(again.infoset_actions(h), tree.infoset_actions(h));
        }
    }
}
