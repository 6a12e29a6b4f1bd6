//! Wall-clock budgets for staged attempts.
//!
//! The search polls [`Deadline::expired`] once per expansion round; an attempt that runs
//! out of time returns and drops its frontiers with it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub const NONE: Deadline = Deadline { at: None };

    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
        }
    }

    /// `Some(budget)` starts a clock now; `None` is unbounded.
    pub fn from_budget(budget: Option<Duration>) -> Self {
        budget.map_or(Self::NONE, Self::after)
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        assert!(!Deadline::NONE.expired());
        assert!(!Deadline::from_budget(None).expired());
    }

    #[test]
    fn zero_budget_is_already_expired() {
        assert!(Deadline::after(Duration::ZERO).expired());
    }

    #[test]
    fn long_budget_is_live() {
        assert!(!Deadline::from_budget(Some(Duration::from_secs(3600))).expired());
    }
}
