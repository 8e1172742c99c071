//! Depth-first branch-and-bound over quarter packings

use super::bound::{chain_depths, lower_bound, remaining_units, unit_bound, unschedulable};
use super::packing::best_packings;
use super::plan::{QuarterPlan, ScheduleResult, SearchStats};
use super::state::SearchState;
use super::width::{SearchView, WidthFunction};
use super::{CancelFlag, SchedulerConfig};
use crate::core::error::{Result, ScheduleError};
use crate::core::models::{quarter_label, CompletionRecord, CourseGraph, RequirementTable};
use logger::{debug, info, warn};
use std::collections::HashMap;

/// Key identifying states with the same future: offering slot, remaining
/// courses, exact debt bits and, unless the width function ignores it, the
/// elapsed quarter count
type MemoKey = (u8, Vec<String>, u32, Option<usize>);

/// Quarter scheduler over a finalized course graph
///
/// # Example
/// ```
/// use quarter_planner::core::models::{Course, CourseGraph, OrSet, Quarter, RequirementTable};
/// use quarter_planner::core::scheduler::{Scheduler, SchedulerConfig, UnlockWidth};
///
/// let mut graph = CourseGraph::new();
/// graph.add_course("a", Course::new(4.0, [Quarter::Fall]));
/// graph.add_course("b", Course::new(4.0, [Quarter::Winter]).with_prereq(OrSet::any_of(["a"])));
/// graph.derive_satisfy_edges();
///
/// let requirements = RequirementTable::new().with_group("core", ["a", "b"]);
/// let result = Scheduler::new(&graph, &requirements, UnlockWidth::default(), SchedulerConfig::new(8.0))
///     .run()
///     .unwrap();
/// assert_eq!(result.plan.to_names(), vec![vec!["a".to_string()], vec!["b".to_string()]]);
/// ```
pub struct Scheduler<'a> {
    graph: &'a CourseGraph,
    requirements: &'a RequirementTable,
    width: Box<dyn WidthFunction + 'a>,
    config: SchedulerConfig,
    completed: CompletionRecord,
    cancel: Option<CancelFlag>,
}

impl<'a> Scheduler<'a> {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `graph` - Finalized course graph (read-only during the search)
    /// * `requirements` - Courses to schedule
    /// * `width` - Scoring for candidate packings
    /// * `config` - Search settings
    #[must_use]
    pub fn new(
        graph: &'a CourseGraph,
        requirements: &'a RequirementTable,
        width: impl WidthFunction + 'a,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            graph,
            requirements,
            width: Box::new(width),
            config,
            completed: CompletionRecord::new(),
            cancel: None,
        }
    }

    /// Courses already taken before the first planned quarter
    #[must_use]
    pub fn with_completed(mut self, completed: CompletionRecord) -> Self {
        self.completed = completed;
        self
    }

    /// Allow another thread to stop the search
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Search settings
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Find the shortest plan within the quarter ceiling
    ///
    /// # Errors
    /// - [`ScheduleError::GraphNotFinalized`] if satisfy edges are stale
    /// - [`ScheduleError::InvalidConfig`] for an unusable unit cap or debt
    /// - [`ScheduleError::InvalidUnits`] / [`ScheduleError::UncapacitatedCourse`]
    ///   for required courses that can never fit a quarter
    /// - [`ScheduleError::PrerequisiteCycle`] if required courses wait on each other
    /// - [`ScheduleError::SchedulingInfeasible`] if no plan fits the ceiling
    /// - [`ScheduleError::SearchAborted`] if stopped before any plan was found
    pub fn run(&self) -> Result<ScheduleResult> {
        let remaining = self.validate()?;
        let root = SearchState::new(
            self.config.start_quarter,
            self.completed.clone(),
            remaining,
            self.config.initial_debt,
        );
        let best_bound = lower_bound(self.graph, root.remaining(), root.debt(), self.config.unit_cap);
        info!(
            target: "scheduler",
            "Scheduling {} courses from quarter {} (lower bound {best_bound}, ceiling {})",
            root.remaining().len(),
            self.config.start_quarter,
            self.config.max_quarters
        );

        if best_bound > self.config.max_quarters {
            return Err(ScheduleError::SchedulingInfeasible {
                max_quarters: self.config.max_quarters,
                best_bound,
                unschedulable: Vec::new(),
                partial: None,
            });
        }

        let mut search = Search::new(self);
        search.expand(root);
        let Search {
            best,
            deepest,
            stats,
            aborted,
            ..
        } = search;

        match best {
            Some((state, score)) => {
                let plan = QuarterPlan {
                    start_quarter: self.config.start_quarter,
                    quarters: state.into_schedule(),
                };
                info!(
                    target: "scheduler",
                    "Found {} quarter plan (bound {best_bound}, score {score:.2}, {} expansions{})",
                    plan.len(),
                    stats.expansions,
                    if aborted { ", stopped early" } else { "" }
                );
                Ok(ScheduleResult {
                    plan,
                    best_bound,
                    exhaustive: !aborted,
                    stats,
                })
            }
            None if aborted => Err(ScheduleError::SearchAborted {
                expansions: stats.expansions,
            }),
            None => {
                info!(
                    target: "scheduler",
                    "No plan within {} quarters after {} expansions",
                    self.config.max_quarters,
                    stats.expansions
                );
                Err(ScheduleError::SchedulingInfeasible {
                    max_quarters: self.config.max_quarters,
                    best_bound,
                    unschedulable: Vec::new(),
                    partial: deepest.map(|state| {
                        Box::new(QuarterPlan {
                            start_quarter: self.config.start_quarter,
                            quarters: state.into_schedule(),
                        })
                    }),
                })
            }
        }
    }

    /// Pre-search checks
    ///
    /// # Returns
    /// The required courses still to schedule, in requirement order
    fn validate(&self) -> Result<Vec<String>> {
        if !self.graph.is_finalized() {
            return Err(ScheduleError::GraphNotFinalized);
        }
        self.config.validate().map_err(ScheduleError::InvalidConfig)?;

        for reference in self.requirements.unknown_courses(self.graph) {
            warn!(target: "scheduler", "Dropping required {reference}");
        }
        for reference in self.graph.unknown_references() {
            debug!(target: "scheduler", "Treating as satisfied: {reference}");
        }

        let remaining: Vec<String> = self
            .requirements
            .required_courses()
            .into_iter()
            .filter(|name| self.graph.contains(name))
            .filter(|name| !self.completed.contains(name))
            .collect();

        for name in &remaining {
            let Some(course) = self.graph.get(name) else {
                continue;
            };
            if !course.units.is_finite() || course.units <= 0.0 {
                return Err(ScheduleError::InvalidUnits {
                    course: name.clone(),
                    units: course.units,
                });
            }
            if course.units > self.config.unit_cap {
                return Err(ScheduleError::UncapacitatedCourse {
                    course: name.clone(),
                    units: course.units,
                    unit_cap: self.config.unit_cap,
                });
            }
        }

        let chain = chain_depths(self.graph, &remaining);
        if !chain.unresolved.is_empty() {
            return Err(ScheduleError::PrerequisiteCycle {
                courses: chain.unresolved,
            });
        }

        let stuck = unschedulable(self.graph, &remaining, &self.completed);
        if !stuck.is_empty() {
            let units = remaining_units(self.graph, &remaining);
            return Err(ScheduleError::SchedulingInfeasible {
                max_quarters: self.config.max_quarters,
                best_bound: chain
                    .longest()
                    .max(unit_bound(units, self.config.initial_debt, self.config.unit_cap)),
                unschedulable: stuck,
                partial: None,
            });
        }

        Ok(remaining)
    }
}

/// Mutable bookkeeping of one `run`
struct Search<'s, 'a> {
    scheduler: &'s Scheduler<'a>,
    best: Option<(SearchState, f64)>,
    deepest: Option<SearchState>,
    memo: HashMap<MemoKey, usize>,
    stats: SearchStats,
    aborted: bool,
}

impl<'s, 'a> Search<'s, 'a> {
    fn new(scheduler: &'s Scheduler<'a>) -> Self {
        Self {
            scheduler,
            best: None,
            deepest: None,
            memo: HashMap::new(),
            stats: SearchStats::default(),
            aborted: false,
        }
    }

    fn should_stop(&self) -> bool {
        let over_budget = self
            .scheduler
            .config
            .max_expansions
            .is_some_and(|limit| self.stats.expansions >= limit);
        let cancelled = self
            .scheduler
            .cancel
            .as_ref()
            .is_some_and(CancelFlag::is_cancelled);
        over_budget || cancelled
    }

    fn best_len(&self) -> Option<usize> {
        self.best.as_ref().map(|(state, _)| state.elapsed())
    }

    fn expand(&mut self, state: SearchState) {
        if self.aborted {
            return;
        }
        if self.should_stop() {
            debug!(target: "search", "Stopping after {} expansions", self.stats.expansions);
            self.aborted = true;
            return;
        }
        self.stats.expansions += 1;

        if state.is_complete() {
            self.record_complete(state);
            return;
        }

        let scheduler = self.scheduler;
        let config = &scheduler.config;
        let graph = scheduler.graph;
        let elapsed = state.elapsed();
        let bound = lower_bound(graph, state.remaining(), state.debt(), config.unit_cap);
        let reachable = elapsed.saturating_add(bound);
        if reachable > config.max_quarters || self.best_len().is_some_and(|len| reachable >= len) {
            self.stats.bound_prunes += 1;
            return;
        }

        let key = memo_key(&state, scheduler.width.is_elapsed_invariant());
        if self.memo.get(&key).is_some_and(|&seen| seen <= elapsed) {
            self.stats.memo_prunes += 1;
            return;
        }
        self.memo.insert(key, elapsed);
        self.track_deepest(&state);

        let packings = {
            let view = SearchView::new(graph, &state, config.unit_cap);
            let eligible = state.eligible(graph);
            best_packings(&view, &eligible, scheduler.width.as_ref(), config)
        };
        debug!(
            target: "search",
            "{}: {} remaining, bound {bound}, {} packings",
            quarter_label(state.quarter()),
            state.remaining().len(),
            packings.len()
        );

        for packing in packings {
            let child = state.advance(
                graph,
                &packing.courses,
                packing.score,
                config.unit_cap,
                config.debt_carry,
            );
            self.expand(child);
            if self.aborted {
                return;
            }
        }
    }

    fn record_complete(&mut self, state: SearchState) {
        self.stats.complete_plans += 1;
        let len = state.elapsed();
        let score = state.score();
        let improves = match &self.best {
            None => true,
            Some((best, best_score)) => {
                len < best.elapsed() || (len == best.elapsed() && score > *best_score)
            }
        };
        if improves {
            debug!(target: "search", "New best plan: {len} quarters, score {score:.2}");
            self.best = Some((state, score));
        }
    }

    fn track_deepest(&mut self, state: &SearchState) {
        let deeper = self.deepest.as_ref().is_none_or(|d| {
            state.remaining().len() < d.remaining().len()
                || (state.remaining().len() == d.remaining().len() && state.elapsed() < d.elapsed())
        });
        if deeper {
            self.deepest = Some(state.clone());
        }
    }
}

/// With `elapsed` in the key, a state only matches an exact repeat of itself
fn memo_key(state: &SearchState, elapsed_invariant: bool) -> MemoKey {
    // adding 0.0 folds -0.0 into 0.0
    let debt = state.debt() + 0.0;
    (
        state.offering().number(),
        state.remaining().to_vec(),
        debt.to_bits(),
        (!elapsed_invariant).then(|| state.elapsed()),
    )
}
