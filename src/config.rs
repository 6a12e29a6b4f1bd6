use std::time::Duration;

/// Limits and switches for one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Combined size of both visited maps at which a search gives up.
    pub max_visited: usize,
    /// Rounds between frontier pruning passes; `None` keeps the search a plain
    /// bidirectional BFS.
    pub prune_interval: Option<usize>,
    /// Also prune the goal-side frontier, scored against the start arrangement.
    pub prune_backward: bool,
    /// Wall-clock budget for each staged attempt; `None` lets attempts run to completion.
    pub stage_budget: Option<Duration>,
    /// When the whole-board attempt fails, go on to solve the board in split stages
    /// instead of reporting the failure.
    pub staged_fallback: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_visited: 20_000_000,
            prune_interval: Some(3usize.pow(8)),
            prune_backward: false,
            stage_budget: Some(Duration::from_secs(60)),
            staged_fallback: false,
        }
    }
}

impl SolverConfig {
    pub fn with_max_visited(mut self, max_visited: usize) -> Self {
        self.max_visited = max_visited;
        self
    }

    pub fn with_prune_interval(mut self, interval: Option<usize>) -> Self {
        self.prune_interval = interval;
        self
    }

    pub fn with_prune_backward(mut self, enabled: bool) -> Self {
        self.prune_backward = enabled;
        self
    }

    pub fn with_stage_budget(mut self, budget: Option<Duration>) -> Self {
        self.stage_budget = budget;
        self
    }

    pub fn with_staged_fallback(mut self, enabled: bool) -> Self {
        self.staged_fallback = enabled;
        self
    }
}
