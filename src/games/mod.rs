//! Built-in game definitions.
//!
//! Small games with known equilibria, used to validate the solver:
//!
//! - [`kuhn`]: three-card Kuhn poker, the classic imperfect-information
//!   benchmark with game value -1/18 for the first player
//! - [`rps`]: rock-paper-scissors with optional payoff weights, a one-shot
//!   matrix game with a closed-form mixed equilibrium

pub mod kuhn;
pub mod rps;
