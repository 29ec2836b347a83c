//! Error types for the CFR solver.
//!
//! All errors are detected eagerly at the boundary where the malformed data
//! is first read. Construction never returns a partial tree and a failed
//! iteration never leaves partially-updated tables behind.

use std::error::Error;
use std::fmt;

/// Structural violations in an input game definition.
///
/// Any of these aborts `GameTree::build` before a tree is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedGameError {
    /// The definition contains no nodes.
    EmptyDefinition,
    /// A child index points outside the node list.
    ChildIndexOutOfBounds {
        /// Offending parent node (definition index).
        node: usize,
        /// The out-of-bounds child index.
        child: usize,
    },
    /// A node is reachable along two paths, which also covers cycles.
    DuplicateParent {
        /// The node that was reached twice (definition index).
        node: usize,
    },
    /// Some nodes are not reachable from the root.
    UnreachableNodes {
        /// How many nodes were never visited.
        count: usize,
    },
    /// A chance or decision node has no children.
    MissingActions {
        /// Offending node (definition index).
        node: usize,
    },
    /// A node's child list disagrees with its action (or probability) count.
    ChildCountMismatch {
        /// Offending node (definition index).
        node: usize,
        /// Declared action/probability count.
        actions: usize,
        /// Actual child count.
        children: usize,
    },
    /// Chance probabilities are negative, non-finite, or do not sum to 1.
    BadChanceProbabilities {
        /// Offending chance node (definition index).
        node: usize,
    },
    /// A decision node names a player other than 0 or 1.
    InvalidPlayer {
        /// Offending node (definition index).
        node: usize,
        /// The invalid player index.
        player: usize,
    },
    /// An information set groups decision nodes with different action counts.
    InfosetActionMismatch {
        /// The information set key.
        key: String,
    },
    /// An information set groups decision nodes owned by different players.
    InfosetPlayerMismatch {
        /// The information set key.
        key: String,
    },
    /// An information set groups decision nodes at different tree depths.
    ///
    /// Layered traversal and per-infoset best response both require the
    /// nodes of an information set to share a depth layer.
    InfosetLayerMismatch {
        /// The information set key.
        key: String,
    },
}

impl fmt::Display for MalformedGameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedGameError::EmptyDefinition => {
                write!(f, "game definition contains no nodes")
            }
            MalformedGameError::ChildIndexOutOfBounds { node, child } => {
                write!(f, "node {} references out-of-bounds child {}", node, child)
            }
            MalformedGameError::DuplicateParent { node } => {
                write!(f, "node {} has more than one parent (cycle or shared child)", node)
            }
            MalformedGameError::UnreachableNodes { count } => {
                write!(f, "{} node(s) unreachable from the root", count)
            }
            MalformedGameError::MissingActions { node } => {
                write!(f, "node {} has no children", node)
            }
            MalformedGameError::ChildCountMismatch { node, actions, children } => {
                write!(
                    f,
                    "node {} declares {} action(s) but has {} child(ren)",
                    node, actions, children
                )
            }
            MalformedGameError::BadChanceProbabilities { node } => {
                write!(f, "chance node {} has an invalid probability distribution", node)
            }
            MalformedGameError::InvalidPlayer { node, player } => {
                write!(f, "node {} names invalid player {} (expected 0 or 1)", node, player)
            }
            MalformedGameError::InfosetActionMismatch { key } => {
                write!(f, "information set {:?} mixes different action counts", key)
            }
            MalformedGameError::InfosetPlayerMismatch { key } => {
                write!(f, "information set {:?} mixes different acting players", key)
            }
            MalformedGameError::InfosetLayerMismatch { key } => {
                write!(f, "information set {:?} spans multiple depth layers", key)
            }
        }
    }
}

impl Error for MalformedGameError {}

/// Errors surfaced by the solver invocation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The input tree violated a structural invariant during construction.
    MalformedGame(MalformedGameError),
    /// The configuration or invocation arguments are unusable.
    InvalidConfiguration(String),
    /// A non-finite value appeared in the regret or strategy tables.
    NumericInstability {
        /// Iteration after which the non-finite value was detected.
        iteration: u64,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::MalformedGame(e) => write!(f, "malformed game: {}", e),
            SolverError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            SolverError::NumericInstability { iteration } => {
                write!(f, "non-finite accumulator detected after iteration {}", iteration)
            }
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolverError::MalformedGame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MalformedGameError> for SolverError {
    fn from(e: MalformedGameError) -> Self {
        SolverError::MalformedGame(e)
    }
}
