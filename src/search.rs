//! Bidirectional breadth-first search that meets in the middle.
//!
//! One side grows from the start arrangement, the other from the goal, one node each per
//! round. A child that lands on an arrangement the other side has already visited closes the
//! gap and the two half-paths are stitched together.
//!
//! Full bidirectional BFS blows up quickly on larger boards, so every `prune_interval`
//! rounds the start-side frontier is thinned: nodes whose Manhattan score is not strictly
//! below the frontier mean are dropped from the queue (they stay visited). This trades
//! completeness for bounded time and memory. The goal-side frontier is left whole unless
//! `prune_backward` is set.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::board::{Arrangement, BoardNode, TargetIndex};
use crate::config::SolverConfig;
use crate::deadline::Deadline;
use crate::moves::{stitch_meeting, Move, MoveSeq};

/// Why a search gave up. None of these prove the board unsolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A frontier ran dry, either from exhausting its component or from pruning.
    Exhausted,
    /// The combined visited maps outgrew `max_visited`.
    MemoryCeiling,
    /// The attempt's deadline passed.
    BudgetExceeded,
    /// A staged mask would freeze a tile that is not on its goal cell.
    Unplaceable,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(MoveSeq),
    /// The start already equals the goal; no moves are needed.
    AlreadySolved,
    NotFound(StopReason),
}

impl SolveOutcome {
    /// Moves to reach the goal: empty when already solved, `None` when not found.
    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SolveOutcome::Solved(moves) => Some(&moves[..]),
            SolveOutcome::AlreadySolved => Some(&[][..]),
            SolveOutcome::NotFound(_) => None,
        }
    }

    pub fn into_moves(self) -> Option<MoveSeq> {
        match self {
            SolveOutcome::Solved(moves) => Some(moves),
            SolveOutcome::AlreadySolved => Some(MoveSeq::new()),
            SolveOutcome::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, SolveOutcome::NotFound(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub rounds: usize,
    pub forward_visited: usize,
    pub backward_visited: usize,
    pub forward_pruned: usize,
    pub backward_pruned: usize,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SolveOutcome,
    pub stats: SearchStats,
}

/// Frontier and visited map for one direction.
struct Side {
    frontier: VecDeque<BoardNode>,
    visited: FxHashMap<Arrangement, Vec<Move>>,
}

impl Side {
    fn seeded(origin: &Arrangement) -> Self {
        let mut visited = FxHashMap::default();
        visited.insert(origin.clone(), Vec::new());
        let mut frontier = VecDeque::new();
        frontier.push_back(BoardNode::root(origin.clone()));
        Self { frontier, visited }
    }
}

enum Expansion {
    Met(Vec<Move>),
    Grew,
    Empty,
}

/// Pops one node from `this` and records its unseen children. `from_start` says which end
/// `this` grows from, so the meeting paths are stitched in the right order.
fn expand(this: &mut Side, other: &Side, from_start: bool) -> Expansion {
    let Some(node) = this.frontier.pop_front() else {
        return Expansion::Empty;
    };
    for child in node.children() {
        if let Some(other_path) = other.visited.get(&child.arrangement) {
            let path = if from_start {
                stitch_meeting(&child.path, other_path)
            } else {
                stitch_meeting(other_path, &child.path)
            };
            return Expansion::Met(path);
        }
        if !this.visited.contains_key(&child.arrangement) {
            this.visited
                .insert(child.arrangement.clone(), child.path.clone());
            this.frontier.push_back(child);
        }
    }
    Expansion::Grew
}

/// Drops every frontier node whose distance to `target` is not strictly below the frontier
/// mean. Returns how many were dropped.
pub(crate) fn prune_frontier(frontier: &mut VecDeque<BoardNode>, target: &TargetIndex) -> usize {
    let len = frontier.len();
    if len == 0 {
        return 0;
    }
    let scores: Vec<usize> = frontier
        .iter()
        .map(|node| target.distance(&node.arrangement))
        .collect();
    let total: usize = scores.iter().sum();

    // score < total / len, kept in integers
    let mut scores = scores.into_iter();
    frontier.retain(|_| scores.next().is_some_and(|score| score * len < total));
    len - frontier.len()
}

/// Searches for moves taking `start` to `goal`, polling `deadline` once per round.
pub fn search(
    start: &Arrangement,
    goal: &Arrangement,
    config: &SolverConfig,
    deadline: Deadline,
) -> SearchReport {
    let mut stats = SearchStats::default();
    if start == goal {
        return SearchReport {
            outcome: SolveOutcome::AlreadySolved,
            stats,
        };
    }

    let to_goal = TargetIndex::new(goal);
    let to_start = config.prune_backward.then(|| TargetIndex::new(start));
    let mut forward = Side::seeded(start);
    let mut backward = Side::seeded(goal);

    let outcome = loop {
        if deadline.expired() {
            break SolveOutcome::NotFound(StopReason::BudgetExceeded);
        }

        match expand(&mut forward, &backward, true) {
            Expansion::Met(path) => break SolveOutcome::Solved(path.into()),
            Expansion::Empty => break SolveOutcome::NotFound(StopReason::Exhausted),
            Expansion::Grew => {}
        }
        match expand(&mut backward, &forward, false) {
            Expansion::Met(path) => break SolveOutcome::Solved(path.into()),
            Expansion::Empty => break SolveOutcome::NotFound(StopReason::Exhausted),
            Expansion::Grew => {}
        }
        stats.rounds += 1;

        if let Some(interval) = config.prune_interval.filter(|&n| n > 0) {
            if stats.rounds % interval == 0 {
                let dropped = prune_frontier(&mut forward.frontier, &to_goal);
                stats.forward_pruned += dropped;
                trace!(
                    round = stats.rounds,
                    dropped,
                    kept = forward.frontier.len(),
                    "pruned forward frontier"
                );
                if let Some(to_start) = &to_start {
                    let dropped = prune_frontier(&mut backward.frontier, to_start);
                    stats.backward_pruned += dropped;
                    trace!(
                        round = stats.rounds,
                        dropped,
                        kept = backward.frontier.len(),
                        "pruned backward frontier"
                    );
                }
            }
        }

        if forward.visited.len() + backward.visited.len() > config.max_visited {
            break SolveOutcome::NotFound(StopReason::MemoryCeiling);
        }
    };

    stats.forward_visited = forward.visited.len();
    stats.backward_visited = backward.visited.len();
    debug!(?outcome, ?stats, "search finished");
    SearchReport { outcome, stats }
}
