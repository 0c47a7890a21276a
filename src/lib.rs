//! Optimal solutions to the N×N sliding-tile puzzle using A* search.
//!
//! Build a [`Puzzle`], pick a [`Heuristic`] ([`Manhattan`] or the stronger
//! [`LinearConflict`]), and call [`solve`]. The returned [`Solution`] holds
//! the chronological path from the start state to the goal.

pub mod errors;
pub mod generator;
pub mod heuristic;
pub mod present;
pub mod puzzle;
pub mod search;

#[cfg(test)]
mod test_support;

pub use errors::{InvalidState, Result as SolveResult, SolveError};
pub use heuristic::{Goal, Heuristic, LinearConflict, Manhattan};
pub use puzzle::{Action, Direction, Position, Puzzle};
pub use search::{solve, solve_with_options, SearchContext, SearchOptions, Solution, Step};
