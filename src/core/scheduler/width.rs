//! Width functions: scoring candidate quarter packings
//!
//! A width function sees the current search state through a [`SearchView`]
//! and returns a score for a candidate set of courses. Higher is better; a
//! non-finite score rules the set out.

use super::state::SearchState;
use crate::core::models::{CompletionRecord, CourseGraph};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

/// Scores a candidate set of courses for the current quarter
pub trait WidthFunction {
    /// Score `candidates` (in requirement order) at the state behind `view`
    ///
    /// Return `f64::NEG_INFINITY` (or any non-finite value) to reject the set.
    fn score(&self, view: &SearchView<'_>, candidates: &[&str]) -> f64;

    /// Whether scores never depend on [`SearchView::elapsed`]
    ///
    /// When true, the search may treat two states that differ only in
    /// elapsed quarters as having the same future and keep the earlier one.
    /// Closures and custom strategies default to `false`.
    fn is_elapsed_invariant(&self) -> bool {
        false
    }
}

impl<F> WidthFunction for F
where
    F: Fn(&SearchView<'_>, &[&str]) -> f64,
{
    fn score(&self, view: &SearchView<'_>, candidates: &[&str]) -> f64 {
        self(view, candidates)
    }
}

/// Read-only view of a search state handed to width functions
pub struct SearchView<'a> {
    graph: &'a CourseGraph,
    state: &'a SearchState,
    unit_cap: f32,
    downstream: RefCell<HashMap<String, usize>>,
}

impl<'a> SearchView<'a> {
    /// Create a view of `state`
    #[must_use]
    pub fn new(graph: &'a CourseGraph, state: &'a SearchState, unit_cap: f32) -> Self {
        Self {
            graph,
            state,
            unit_cap,
            downstream: RefCell::new(HashMap::new()),
        }
    }

    /// The course graph
    #[must_use]
    pub const fn graph(&self) -> &'a CourseGraph {
        self.graph
    }

    /// The state being expanded
    #[must_use]
    pub const fn state(&self) -> &'a SearchState {
        self.state
    }

    /// Per-quarter unit cap
    #[must_use]
    pub const fn unit_cap(&self) -> f32 {
        self.unit_cap
    }

    /// Quarters already planned on this branch
    #[must_use]
    pub const fn elapsed(&self) -> usize {
        self.state.elapsed()
    }

    /// Total units of `candidates`
    #[must_use]
    pub fn units_of(&self, candidates: &[&str]) -> f32 {
        candidates
            .iter()
            .filter_map(|name| self.graph.get(name))
            .map(|course| course.units)
            .sum()
    }

    /// Remaining courses that become eligible (prerequisite-wise) only once
    /// `candidates` are completed
    #[must_use]
    pub fn newly_unlocked(&self, candidates: &[&str]) -> usize {
        let completed = self.state.completed();
        let mut after: CompletionRecord = completed.clone();
        for name in candidates {
            after.complete(*name);
        }

        let affected: HashSet<&str> = candidates
            .iter()
            .filter_map(|name| self.graph.get_satisfy(name))
            .flatten()
            .map(String::as_str)
            .filter(|name| !candidates.contains(name))
            .collect();

        let remaining: HashSet<&str> = self.state.remaining().iter().map(String::as_str).collect();
        affected
            .into_iter()
            .filter(|name| remaining.contains(name))
            .filter(|name| {
                !self.graph.prerequisites_met(name, completed)
                    && self.graph.prerequisites_met(name, &after)
            })
            .count()
    }

    /// Number of remaining courses reachable from `course` through
    /// `satisfy` edges
    ///
    /// Results are cached for the lifetime of the view.
    #[must_use]
    pub fn downstream_count(&self, course: &str) -> usize {
        if let Some(count) = self.downstream.borrow().get(course) {
            return *count;
        }

        let remaining: HashSet<&str> = self.state.remaining().iter().map(String::as_str).collect();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(course);

        while let Some(current) = queue.pop_front() {
            if let Some(next) = self.graph.get_satisfy(current) {
                for name in next {
                    if remaining.contains(name.as_str()) && visited.insert(name.as_str()) {
                        queue.push_back(name.as_str());
                    }
                }
            }
        }

        let count = visited.len();
        self.downstream.borrow_mut().insert(course.to_string(), count);
        count
    }
}

/// Default width function: favor courses that unlock the rest of the plan
///
/// Score of a set:
/// `sum(1 + downstream_weight * downstream_count(c))`
/// `+ unlock_weight * newly_unlocked(set)`
/// `+ load_weight * units(set) / unit_cap`
///
/// The unlock term is computed on the whole set, so the score is not
/// additive over courses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnlockWidth {
    /// Weight of courses unlocked by completing the set
    pub unlock_weight: f64,
    /// Weight of each course's downstream reach
    pub downstream_weight: f64,
    /// Weight of the unit load relative to the cap
    pub load_weight: f64,
}

impl Default for UnlockWidth {
    fn default() -> Self {
        Self {
            unlock_weight: 2.0,
            downstream_weight: 1.0,
            load_weight: 1.0,
        }
    }
}

impl WidthFunction for UnlockWidth {
    #[allow(clippy::cast_precision_loss)]
    fn score(&self, view: &SearchView<'_>, candidates: &[&str]) -> f64 {
        if candidates.is_empty() {
            return 0.0;
        }
        let reach: f64 = candidates
            .iter()
            .map(|name| 1.0 + self.downstream_weight * view.downstream_count(name) as f64)
            .sum();
        let unlocked = view.newly_unlocked(candidates) as f64;
        let load = f64::from(view.units_of(candidates)) / f64::from(view.unit_cap());
        reach + self.unlock_weight * unlocked + self.load_weight * load
    }

    fn is_elapsed_invariant(&self) -> bool {
        true
    }
}

/// Width function that packs as many units as possible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitLoad;

impl WidthFunction for UnitLoad {
    fn score(&self, view: &SearchView<'_>, candidates: &[&str]) -> f64 {
        f64::from(view.units_of(candidates))
    }

    fn is_elapsed_invariant(&self) -> bool {
        true
    }
}

/// Per-quarter limit on the number of courses, wrapped around another width
/// function
///
/// `limits[i]` applies to the i-th planned quarter; the last entry repeats.
/// Sets over the limit score negative infinity, the rest are scored by
/// `inner`. An empty table imposes no limit.
#[derive(Debug, Clone, PartialEq)]
pub struct WidthTable<W> {
    /// Course count limit per elapsed quarter
    pub limits: Vec<usize>,
    /// Scoring for sets within the limit
    pub inner: W,
}

impl<W: WidthFunction> WidthTable<W> {
    /// Wrap `inner` with per-quarter course limits
    #[must_use]
    pub const fn new(limits: Vec<usize>, inner: W) -> Self {
        Self { limits, inner }
    }

    /// Limit for the quarter at `elapsed`, if any
    #[must_use]
    pub fn limit_at(&self, elapsed: usize) -> Option<usize> {
        self.limits
            .get(elapsed)
            .or_else(|| self.limits.last())
            .copied()
    }
}

impl<W: WidthFunction> WidthFunction for WidthTable<W> {
    fn score(&self, view: &SearchView<'_>, candidates: &[&str]) -> f64 {
        match self.limit_at(view.elapsed()) {
            Some(limit) if candidates.len() > limit => f64::NEG_INFINITY,
            _ => self.inner.score(view, candidates),
        }
    }

    /// A table with more than one entry changes its limit over time
    fn is_elapsed_invariant(&self) -> bool {
        self.limits.len() <= 1 && self.inner.is_elapsed_invariant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Course, OrSet, Quarter};

    /// a unlocks b and d, b unlocks c
    fn sample_graph() -> CourseGraph {
        let mut graph = CourseGraph::new();
        graph.add_course("a", Course::new(4.0, [Quarter::Fall]));
        graph.add_course("b", Course::new(4.0, [Quarter::Winter]).with_prereq(OrSet::any_of(["a"])));
        graph.add_course("c", Course::new(2.0, [Quarter::Spring]).with_prereq(OrSet::any_of(["b"])));
        graph.add_course(
            "d",
            Course::new(1.5, [Quarter::Winter])
                .with_prereq(OrSet::any_of(["a"]))
                .with_prereq(OrSet::any_of(["e"])),
        );
        graph.add_course("e", Course::new(3.5, [Quarter::Fall]));
        graph.derive_satisfy_edges();
        graph
    }

    fn root_state() -> SearchState {
        let remaining = ["a", "b", "c", "d", "e"].iter().map(ToString::to_string).collect();
        SearchState::new(0, CompletionRecord::new(), remaining, 0.0)
    }

    #[test]
    fn test_view_helpers() {
        let graph = sample_graph();
        let state = root_state();
        let view = SearchView::new(&graph, &state, 8.0);

        assert!((view.units_of(&["a", "e"]) - 7.5).abs() < f32::EPSILON);
        assert_eq!(view.downstream_count("a"), 3);
        assert_eq!(view.downstream_count("a"), 3);
        assert_eq!(view.downstream_count("c"), 0);
        assert_eq!(view.elapsed(), 0);

        // b needs only a; d also needs e
        assert_eq!(view.newly_unlocked(&["a"]), 1);
        assert_eq!(view.newly_unlocked(&["a", "e"]), 2);
    }

    #[test]
    fn test_unlock_width_prefers_gateways() {
        let graph = sample_graph();
        let state = root_state();
        let view = SearchView::new(&graph, &state, 8.0);
        let width = UnlockWidth::default();

        assert!(width.score(&view, &["a"]) > width.score(&view, &["e"]));
        assert!(width.score(&view, &["a", "e"]) > width.score(&view, &["a"]));
        assert!(width.score(&view, &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_load() {
        let graph = sample_graph();
        let state = root_state();
        let view = SearchView::new(&graph, &state, 8.0);
        assert!((UnitLoad.score(&view, &["a", "e"]) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_width_table_limits() {
        let graph = sample_graph();
        let state = root_state();
        let view = SearchView::new(&graph, &state, 8.0);
        let table = WidthTable::new(vec![1, 2], UnitLoad);

        assert_eq!(table.limit_at(0), Some(1));
        assert_eq!(table.limit_at(5), Some(2));
        assert!(table.score(&view, &["a", "e"]).is_infinite());
        assert!((table.score(&view, &["a"]) - 4.0).abs() < 1e-9);

        let unlimited = WidthTable::new(Vec::new(), UnitLoad);
        assert_eq!(unlimited.limit_at(0), None);
        assert!(unlimited.score(&view, &["a", "e"]).is_finite());
    }

    #[test]
    fn test_closure_width() {
        let graph = sample_graph();
        let state = root_state();
        let view = SearchView::new(&graph, &state, 8.0);
        let count = |_: &SearchView<'_>, candidates: &[&str]| -> f64 {
            candidates.len() as f64
        };
        assert!((count.score(&view, &["a", "e"]) - 2.0).abs() < 1e-9);
        assert!(!count.is_elapsed_invariant());
    }

    #[test]
    fn test_elapsed_invariance() {
        assert!(UnitLoad.is_elapsed_invariant());
        assert!(UnlockWidth::default().is_elapsed_invariant());
        assert!(WidthTable::new(vec![2], UnitLoad).is_elapsed_invariant());
        assert!(!WidthTable::new(vec![0, 0, 2], UnitLoad).is_elapsed_invariant());
        let closure = |_: &SearchView<'_>, _: &[&str]| 0.0;
        assert!(!WidthTable::new(Vec::new(), closure).is_elapsed_invariant());
    }
}
