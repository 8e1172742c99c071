//! Branch-and-bound quarter scheduler
//!
//! The scheduler packs a set of required courses into consecutive quarters:
//! 1. Validates the inputs (finalized graph, unit costs, cycles, reachability)
//! 2. Enumerates the eligible courses of the current offering slot
//! 3. Packs them into the best few subsets that fit the unit capacity,
//!    ranked by a pluggable [`WidthFunction`]
//! 4. Recurses depth-first, pruning with an admissible lower bound on the
//!    number of quarters still needed
//!
//! The result is the shortest plan found together with the root lower bound.

mod bound;
mod packing;
mod plan;
mod search;
mod state;
mod width;

pub use plan::{PlannedQuarter, QuarterPlan, ScheduleResult, SearchStats};
pub use search::Scheduler;
pub use state::SearchState;
pub use width::{SearchView, UnitLoad, UnlockWidth, WidthFunction, WidthTable};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default per-quarter unit cap
pub const DEFAULT_UNIT_CAP: f32 = 16.0;

/// Default quarter ceiling for the search
pub const DEFAULT_MAX_QUARTERS: usize = 20;

/// Default number of packings explored per quarter
pub const DEFAULT_BRANCH_FACTOR: usize = 3;

/// Default number of eligible courses considered for packing
pub const DEFAULT_MAX_CANDIDATES: usize = 12;

/// Hard limit on packing candidates (subsets are enumerated exhaustively)
pub const MAX_CANDIDATES_LIMIT: usize = 16;

/// How unit debt carries from one quarter to the next
///
/// Debt reduces the capacity of a quarter: `capacity = unit_cap - debt`.
/// A negative debt is a credit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DebtCarry {
    /// The initial debt applies to the first quarter only
    #[default]
    Reset,
    /// Unused capacity, up to `max_rollover`, becomes credit for the next
    /// quarter
    Rollover {
        /// Largest credit carried into a quarter
        max_rollover: f32,
    },
}

impl DebtCarry {
    /// Debt carried into the next quarter
    ///
    /// # Arguments
    /// * `capacity` - Capacity of the quarter just planned
    /// * `used` - Units placed in it
    #[must_use]
    pub fn next_debt(self, capacity: f32, used: f32) -> f32 {
        match self {
            Self::Reset => 0.0,
            Self::Rollover { max_rollover } => {
                let unused = (capacity - used).max(0.0);
                -(unused.min(max_rollover.max(0.0)))
            }
        }
    }
}

/// Configuration for the quarter scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Absolute index of the first planned quarter (0 = year 1 Fall)
    pub start_quarter: usize,
    /// Units already committed in the first quarter
    pub initial_debt: f32,
    /// Maximum units per quarter
    pub unit_cap: f32,
    /// Quarter ceiling; plans longer than this are never returned
    pub max_quarters: usize,
    /// Debt policy between quarters
    pub debt_carry: DebtCarry,
    /// Packings explored per quarter
    pub branch_factor: usize,
    /// Eligible courses considered per quarter (at most 16)
    pub max_candidates: usize,
    /// Stop after this many expanded states
    pub max_expansions: Option<usize>,
}

impl SchedulerConfig {
    /// Create a config with the given unit cap and defaults otherwise
    #[must_use]
    pub fn new(unit_cap: f32) -> Self {
        Self {
            unit_cap,
            ..Self::default()
        }
    }

    /// Start planning at absolute quarter `index`
    #[must_use]
    pub const fn starting_at(mut self, index: usize) -> Self {
        self.start_quarter = index;
        self
    }

    /// Set the units already committed in the first quarter
    #[must_use]
    pub const fn with_initial_debt(mut self, debt: f32) -> Self {
        self.initial_debt = debt;
        self
    }

    /// Set the per-quarter unit cap
    #[must_use]
    pub const fn with_unit_cap(mut self, unit_cap: f32) -> Self {
        self.unit_cap = unit_cap;
        self
    }

    /// Set the quarter ceiling
    #[must_use]
    pub const fn with_max_quarters(mut self, max_quarters: usize) -> Self {
        self.max_quarters = max_quarters;
        self
    }

    /// Set the debt policy
    #[must_use]
    pub const fn with_debt_carry(mut self, debt_carry: DebtCarry) -> Self {
        self.debt_carry = debt_carry;
        self
    }

    /// Set the number of packings explored per quarter
    #[must_use]
    pub const fn with_branch_factor(mut self, branch_factor: usize) -> Self {
        self.branch_factor = branch_factor;
        self
    }

    /// Set the number of eligible courses considered per quarter
    #[must_use]
    pub const fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Bound the search to `max_expansions` expanded states
    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Check that the numeric settings are usable
    ///
    /// # Errors
    /// Returns a description of the first invalid setting
    pub fn validate(&self) -> Result<(), String> {
        if !self.unit_cap.is_finite() || self.unit_cap <= 0.0 {
            return Err(format!("unit cap must be positive, got {}", self.unit_cap));
        }
        if !self.initial_debt.is_finite() {
            return Err(format!("initial debt must be finite, got {}", self.initial_debt));
        }
        if let DebtCarry::Rollover { max_rollover } = self.debt_carry {
            if !max_rollover.is_finite() || max_rollover < 0.0 {
                return Err(format!("max rollover must be non-negative, got {max_rollover}"));
            }
        }
        Ok(())
    }

    /// Effective branch factor (at least 1)
    #[must_use]
    pub fn effective_branch_factor(&self) -> usize {
        self.branch_factor.max(1)
    }

    /// Effective candidate limit (between 1 and [`MAX_CANDIDATES_LIMIT`])
    #[must_use]
    pub fn effective_max_candidates(&self) -> usize {
        self.max_candidates.clamp(1, MAX_CANDIDATES_LIMIT)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_quarter: 0,
            initial_debt: 0.0,
            unit_cap: DEFAULT_UNIT_CAP,
            max_quarters: DEFAULT_MAX_QUARTERS,
            debt_carry: DebtCarry::Reset,
            branch_factor: DEFAULT_BRANCH_FACTOR,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_expansions: None,
        }
    }
}

/// Shared flag for cancelling a running search from another thread
///
/// Cloning shares the flag. A cancelled search returns the best plan found so
/// far, marked as not exhaustive.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not raised
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been raised
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
