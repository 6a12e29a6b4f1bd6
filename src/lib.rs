//! Solver for generalized sliding-tile puzzles: rectangular boards with walls, one blank
//! and uniquely labeled tiles.
//!
//! The core is a bidirectional breadth-first search ([`search`]) with Manhattan-score
//! frontier pruning, driven by a staged solver ([`staged`]) that can split a board into
//! label ranges and solve them in turn.

pub mod board;
pub mod config;
pub mod deadline;
pub mod error;
pub mod moves;
pub mod orientation;
pub mod problem;
pub mod search;
pub mod staged;

pub use board::{Arrangement, Cell};
pub use config::SolverConfig;
pub use error::{MoveError, ParseError, ProblemError};
pub use moves::{Move, MoveSeq};
pub use search::{SolveOutcome, StopReason};

/// Solves `start` towards its canonical goal.
pub fn solve(start: &Arrangement, config: &SolverConfig) -> SolveOutcome {
    solve_towards(start, &start.goal(), config)
}

/// Solves `start` towards an explicit `goal` with the same wall layout, e.g. the
/// transposed canonical goal of a transposed board.
pub fn solve_towards(start: &Arrangement, goal: &Arrangement, config: &SolverConfig) -> SolveOutcome {
    staged::solve_staged(start, goal, config).outcome
}
