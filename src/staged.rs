//! Staged solving: split the goal into label ranges and solve them one stage at a time.
//!
//! For a stage `(fix, solve)` the goal cells are read in index order. Labels on the first
//! `fix` cells are frozen into walls, labels on cells `fix + solve ..` become wildcards, and
//! only the range in between has to reach its goal cell. Frozen tiles already sit on their
//! goal cells, so a masked solution replays unchanged on the real board: the search never
//! enters a wall, and wildcards move exactly like the tiles they stand for.

use std::iter;

use tracing::{debug, warn};

use crate::board::{Arrangement, Cell};
use crate::config::SolverConfig;
use crate::deadline::Deadline;
use crate::moves::{apply_moves, cancel_opposites, Move};
use crate::search::{search, SolveOutcome, StopReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Frozen,
    Active,
    Wild,
}

/// Builds the masked `(start, goal)` pair for a stage, or `None` if some frozen tile is
/// not on its goal cell.
pub(crate) fn mask(
    start: &Arrangement,
    goal: &Arrangement,
    fix: usize,
    solve: usize,
) -> Option<(Arrangement, Arrangement)> {
    let mut roles = [Role::Active; 256];
    for (i, &cell) in goal.cells().iter().enumerate() {
        if !cell.is_tile() {
            continue;
        }
        if i < fix {
            if start.cell(i) != cell {
                return None;
            }
            roles[cell.label()] = Role::Frozen;
        } else if i >= fix.saturating_add(solve) {
            roles[cell.label()] = Role::Wild;
        }
    }

    let remap = |cell: Cell| {
        if !cell.is_tile() {
            return cell;
        }
        match roles[cell.label()] {
            Role::Frozen => Cell::WALL,
            Role::Wild => Cell::WILDCARD,
            Role::Active => cell,
        }
    };
    Some((start.relabel(remap), goal.relabel(remap)))
}

/// Solves one stage under a fresh deadline from `config.stage_budget`.
pub fn solve_stage(
    start: &Arrangement,
    goal: &Arrangement,
    fix: usize,
    solve: usize,
    config: &SolverConfig,
) -> SolveOutcome {
    let Some((masked_start, masked_goal)) = mask(start, goal, fix, solve) else {
        debug!(fix, solve, "frozen tiles are not in place");
        return SolveOutcome::NotFound(StopReason::Unplaceable);
    };
    debug!(
        fix,
        solve,
        start = %masked_start.to_pattern(),
        goal = %masked_goal.to_pattern(),
        "stage"
    );

    let deadline = Deadline::from_budget(config.stage_budget);
    let outcome = search(&masked_start, &masked_goal, config, deadline).outcome;

    match &outcome {
        SolveOutcome::NotFound(StopReason::BudgetExceeded) => {
            warn!(fix, solve, budget = ?config.stage_budget, "stage ran out of time");
        }
        SolveOutcome::Solved(moves) => {
            debug_assert_eq!(
                apply_moves(&masked_start, moves).ok().as_ref(),
                Some(&masked_goal),
                "stage solution does not reach its goal"
            );
        }
        _ => {}
    }
    outcome
}

#[derive(Debug, Clone)]
pub struct StagedReport {
    pub outcome: SolveOutcome,
    /// Number of stage searches started.
    pub attempts: usize,
}

struct Driver<'a> {
    start: &'a Arrangement,
    goal: &'a Arrangement,
    config: &'a SolverConfig,
    attempts: usize,
}

impl Driver<'_> {
    fn stage(&mut self, from: &Arrangement, fix: usize, solve: usize) -> SolveOutcome {
        self.attempts += 1;
        solve_stage(from, self.goal, fix, solve, self.config)
    }

    /// STEP2 then STEP3 after a successful first stage over `[0, boundary)`.
    fn finish(&mut self, boundary: usize, first: &[Move]) -> Result<Vec<Move>, SolveOutcome> {
        let area = self.start.area();
        let middle = match apply_moves(self.start, first) {
            Ok(middle) => middle,
            Err(err) => {
                if cfg!(debug_assertions) {
                    panic!("first stage produced an invalid path: {err}");
                }
                return Err(SolveOutcome::NotFound(StopReason::Exhausted));
            }
        };

        debug!(boundary, area, "step 2: remaining labels");
        let rest = self.stage(&middle, boundary, area - boundary);
        if let Some(second) = rest.moves() {
            return Ok(cancel_opposites(&[first, second].concat()));
        }

        debug!(boundary, area, "step 3: whole board from intermediate");
        let retry = self.stage(&middle, 0, area);
        match retry.moves() {
            Some(third) => Ok(cancel_opposites(&[first, third].concat())),
            None => Err(retry),
        }
    }

    /// One boundary: STEP1 on `[0, boundary)`, then [`Driver::finish`].
    fn boundary(&mut self, boundary: usize) -> Result<Vec<Move>, SolveOutcome> {
        let area = self.start.area();
        debug!(boundary, area, "step 1: leading labels");
        let first = self.stage(self.start, 0, boundary);
        let first_moves = match first.moves() {
            Some(moves) => moves.to_vec(),
            None => return Err(first),
        };
        self.finish(boundary, &first_moves)
    }

    fn run(&mut self) -> SolveOutcome {
        let area = self.start.area();
        let mut last = SolveOutcome::NotFound(StopReason::Exhausted);
        for boundary in boundaries(area) {
            if boundary == area {
                let whole = self.stage(self.start, 0, area);
                if whole.is_found() || !self.config.staged_fallback {
                    return whole;
                }
                last = whole;
                continue;
            }
            match self.boundary(boundary) {
                Ok(moves) => return finished(moves),
                Err(outcome) => last = outcome,
            }
        }
        last
    }
}

fn finished(moves: Vec<Move>) -> SolveOutcome {
    if moves.is_empty() {
        SolveOutcome::AlreadySolved
    } else {
        SolveOutcome::Solved(moves.into())
    }
}

/// Runs the whole-board attempt and, when `config.staged_fallback` is set and that fails,
/// each split boundary in turn.
pub fn solve_staged(
    start: &Arrangement,
    goal: &Arrangement,
    config: &SolverConfig,
) -> StagedReport {
    let mut driver = Driver {
        start,
        goal,
        config,
        attempts: 0,
    };
    let outcome = driver.run();
    let attempts = driver.attempts;
    debug!(?outcome, attempts, "staged solve finished");
    StagedReport { outcome, attempts }
}

/// Solves a single boundary (STEP1, then STEP2 or STEP3) outside the driver loop.
pub fn solve_boundary(
    start: &Arrangement,
    goal: &Arrangement,
    boundary: usize,
    config: &SolverConfig,
) -> SolveOutcome {
    let mut driver = Driver {
        start,
        goal,
        config,
        attempts: 0,
    };
    driver.boundary(boundary).map_or_else(|outcome| outcome, finished)
}

/// Whole-board boundary followed by every split, in driver order.
pub fn boundaries(area: usize) -> impl Iterator<Item = usize> {
    iter::once(area).chain(1..area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unbounded() -> SolverConfig {
        SolverConfig::default()
            .with_prune_interval(None)
            .with_stage_budget(None)
    }

    #[test]
    fn mask_freezes_prefix_and_wildcards_suffix() {
        let start = Arrangement::parse(3, 2, "124035").unwrap();
        let goal = start.goal();
        let (s, g) = mask(&start, &goal, 2, 2).unwrap();
        assert_eq!(s.to_pattern(), "==403*");
        assert_eq!(g.to_pattern(), "==34*0");
        assert_eq!(s.blank(), start.blank());
    }

    #[test]
    fn mask_leaves_walls_and_blank_alone() {
        let start = Arrangement::parse(3, 2, "1=0453").unwrap();
        let goal = start.goal();
        // The wall on cell 1 counts towards the stage range.
        let (s, g) = mask(&start, &goal, 1, 1).unwrap();
        assert_eq!(s.to_pattern(), "==0***");
        assert_eq!(g.to_pattern(), "==***0");
    }

    #[test]
    fn mask_refuses_misplaced_frozen_tile() {
        let start = Arrangement::parse(3, 2, "213450").unwrap();
        assert!(mask(&start, &start.goal(), 1, 5).is_none());
        assert_eq!(
            solve_stage(&start, &start.goal(), 1, 5, &unbounded()),
            SolveOutcome::NotFound(StopReason::Unplaceable)
        );
    }

    #[test]
    fn leading_stage_places_only_its_labels() {
        let start = Arrangement::parse(3, 3, "867254301").unwrap();
        let goal = start.goal();
        let outcome = solve_stage(&start, &goal, 0, 3, &unbounded());
        let moves = outcome.moves().unwrap();
        let middle = apply_moves(&start, moves).unwrap();
        assert_eq!(&middle.cells()[..3], &goal.cells()[..3]);
        assert_eq!(middle.blank(), goal.blank());
    }

    #[test]
    fn frozen_tiles_never_move() {
        let start = Arrangement::parse(3, 3, "867254301").unwrap();
        let goal = start.goal();
        let config = unbounded();
        let first = solve_stage(&start, &goal, 0, 3, &config);
        let middle = apply_moves(&start, first.moves().unwrap()).unwrap();

        let rest = solve_stage(&middle, &goal, 3, 6, &config);
        let moves = rest.moves().unwrap();
        let mut board = middle.clone();
        for &mv in moves {
            assert!(board.slide(mv));
            assert_eq!(&board.cells()[..3], &goal.cells()[..3]);
        }
        assert_eq!(board, goal);
    }

    #[test]
    fn every_boundary_reaches_the_goal() {
        let start = Arrangement::parse(3, 3, "867254301").unwrap();
        let goal = start.goal();
        let config = unbounded();
        for boundary in 1..start.area() {
            let outcome = solve_boundary(&start, &goal, boundary, &config);
            let moves = outcome
                .moves()
                .unwrap_or_else(|| panic!("boundary {boundary}: {outcome:?}"));
            assert_eq!(apply_moves(&start, moves).unwrap(), goal, "boundary {boundary}");
        }
    }

    #[test]
    fn failed_second_stage_retries_whole_board() {
        // 1 and 2 are placed; with them frozen, the rest is a single path and 3,4,5 cannot
        // be reordered.
        let start = Arrangement::parse(3, 2, "124530").unwrap();
        let goal = start.goal();
        let config = unbounded();
        assert_eq!(
            solve_stage(&start, &goal, 2, 4, &config),
            SolveOutcome::NotFound(StopReason::Exhausted)
        );

        let mut driver = Driver {
            start: &start,
            goal: &goal,
            config: &config,
            attempts: 0,
        };
        let moves = driver.boundary(2).unwrap();
        assert_eq!(driver.attempts, 3);
        assert_eq!(apply_moves(&start, &moves).unwrap(), goal);

        let outcome = solve_boundary(&start, &goal, 2, &config);
        assert_eq!(apply_moves(&start, outcome.moves().unwrap()).unwrap(), goal);
    }

    #[test]
    fn whole_board_result_is_final_by_default() {
        let start = Arrangement::parse(3, 3, "867254301").unwrap();
        let config = unbounded().with_stage_budget(Some(Duration::ZERO));
        let report = solve_staged(&start, &start.goal(), &config);
        assert_eq!(report.attempts, 1);
        assert_eq!(
            report.outcome,
            SolveOutcome::NotFound(StopReason::BudgetExceeded)
        );
    }

    #[test]
    fn fallback_walks_every_boundary() {
        let start = Arrangement::parse(3, 3, "867254301").unwrap();
        let config = unbounded()
            .with_stage_budget(Some(Duration::ZERO))
            .with_staged_fallback(true);
        let report = solve_staged(&start, &start.goal(), &config);
        // Whole board plus one failed first stage per split.
        assert_eq!(report.attempts, 9);
        assert!(!report.outcome.is_found());
    }

    #[test]
    fn already_solved_is_reported() {
        let goal = Arrangement::parse(3, 3, "123456780").unwrap();
        let report = solve_staged(&goal, &goal, &unbounded());
        assert_eq!(report.outcome, SolveOutcome::AlreadySolved);
    }

    #[test]
    fn boundary_order_starts_with_whole_board() {
        assert_eq!(boundaries(4).collect::<Vec<_>>(), vec![4, 1, 2, 3]);
    }
}
