//! Per-quarter packing: which eligible courses to take together

use super::width::{SearchView, WidthFunction};
use super::SchedulerConfig;
use std::cmp::Ordering;

/// Tolerance when comparing unit sums against capacity
const CAPACITY_EPSILON: f32 = 1e-4;

/// A candidate set of courses for one quarter
#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    /// Course names in requirement order
    pub courses: Vec<String>,
    /// Width score of the set
    pub score: f64,
    /// Positions of the courses in the eligible list (tie-break key)
    rank_key: Vec<usize>,
}

impl Packing {
    fn empty(score: f64) -> Self {
        Self {
            courses: Vec::new(),
            score,
            rank_key: Vec::new(),
        }
    }
}

/// Best packings of `eligible` for the state behind `view`
///
/// 1. Rank eligible courses by their singleton score (stable, so requirement
///    order breaks ties) and keep the best `max_candidates`
/// 2. Enumerate every subset that fits the capacity with no time conflicts
/// 3. Score each subset, drop non-finite scores, keep only maximal subsets
///    (no fitting course can be added with a finite score)
/// 4. Sort by score descending, then by requirement order, and keep the best
///    `branch_factor`
///
/// When nothing is eligible, or no subset scores finite, a single empty
/// packing is returned so the quarter can pass.
#[must_use]
pub fn best_packings(
    view: &SearchView<'_>,
    eligible: &[&str],
    width: &dyn WidthFunction,
    config: &SchedulerConfig,
) -> Vec<Packing> {
    if eligible.is_empty() {
        return vec![Packing::empty(width.score(view, &[]))];
    }

    let candidates = rank_candidates(view, eligible, width, config.effective_max_candidates());
    let capacity = view.state().capacity(config.unit_cap) + CAPACITY_EPSILON;
    let units: Vec<f32> = candidates
        .iter()
        .map(|&idx| view.units_of(&[eligible[idx]]))
        .collect();
    let conflicts = conflict_masks(view, eligible, &candidates);

    let subset_count = 1usize << candidates.len();
    let mut scores: Vec<Option<f64>> = vec![None; subset_count];
    for (mask, slot) in scores.iter_mut().enumerate() {
        let members = members_of(mask, candidates.len());
        if members.iter().any(|&i| conflicts[i] & mask != 0) {
            continue;
        }
        let load: f32 = members.iter().map(|&i| units[i]).sum();
        if load > capacity {
            continue;
        }
        let names = subset_names(eligible, &candidates, &members);
        let score = width.score(view, &names);
        if score.is_finite() {
            *slot = Some(score);
        }
    }

    let mut packings: Vec<Packing> = scores
        .iter()
        .enumerate()
        .filter_map(|(mask, score)| score.map(|s| (mask, s)))
        .filter(|&(mask, _)| {
            (0..candidates.len())
                .filter(|i| mask & (1 << i) == 0)
                .all(|i| scores[mask | (1 << i)].is_none())
        })
        .map(|(mask, score)| {
            let members = members_of(mask, candidates.len());
            let mut rank_key: Vec<usize> = members.iter().map(|&i| candidates[i]).collect();
            rank_key.sort_unstable();
            Packing {
                courses: rank_key.iter().map(|&idx| eligible[idx].to_string()).collect(),
                score,
                rank_key,
            }
        })
        .collect();

    if packings.is_empty() {
        return vec![Packing::empty(0.0)];
    }

    packings.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.rank_key.cmp(&b.rank_key),
        other => other,
    });
    packings.truncate(config.effective_branch_factor());
    packings
}

/// Indices into `eligible` of the best `limit` courses by singleton score
fn rank_candidates(
    view: &SearchView<'_>,
    eligible: &[&str],
    width: &dyn WidthFunction,
    limit: usize,
) -> Vec<usize> {
    if eligible.len() <= limit {
        return (0..eligible.len()).collect();
    }

    let mut ranked: Vec<(usize, f64)> = eligible
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let score = width.score(view, &[*name]);
            (idx, if score.is_finite() { score } else { f64::NEG_INFINITY })
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked.into_iter().map(|(idx, _)| idx).collect()
}

/// For each candidate, the bitmask of candidates it conflicts with
fn conflict_masks(view: &SearchView<'_>, eligible: &[&str], candidates: &[usize]) -> Vec<usize> {
    let graph = view.graph();
    candidates
        .iter()
        .map(|&idx| {
            let Some(course) = graph.get(eligible[idx]) else {
                return 0;
            };
            candidates
                .iter()
                .enumerate()
                .filter(|&(_, &other)| other != idx)
                .filter(|&(_, &other)| {
                    graph
                        .get(eligible[other])
                        .is_some_and(|o| course.conflicts_with(o))
                })
                .fold(0, |mask, (bit, _)| mask | (1 << bit))
        })
        .collect()
}

fn members_of(mask: usize, len: usize) -> Vec<usize> {
    (0..len).filter(|i| mask & (1 << i) != 0).collect()
}

fn subset_names<'e>(eligible: &[&'e str], candidates: &[usize], members: &[usize]) -> Vec<&'e str> {
    let mut indices: Vec<usize> = members.iter().map(|&i| candidates[i]).collect();
    indices.sort_unstable();
    indices.into_iter().map(|idx| eligible[idx]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CompletionRecord, Course, CourseGraph, Quarter};
    use crate::core::scheduler::state::SearchState;
    use crate::core::scheduler::width::{UnitLoad, WidthTable};

    fn flat_graph() -> CourseGraph {
        let mut graph = CourseGraph::new();
        graph.add_course("p", Course::new(4.0, [Quarter::Fall]));
        graph.add_course("q", Course::new(4.0, [Quarter::Fall]));
        graph.add_course("r", Course::new(2.0, [Quarter::Fall]));
        graph.add_course("s", Course::new(6.0, [Quarter::Fall]));
        graph.derive_satisfy_edges();
        graph
    }

    fn state_for(names: &[&str], debt: f32) -> SearchState {
        let remaining = names.iter().map(ToString::to_string).collect();
        SearchState::new(0, CompletionRecord::new(), remaining, debt)
    }

    fn names(packing: &Packing) -> Vec<&str> {
        packing.courses.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_packings_are_maximal_and_fit() {
        let graph = flat_graph();
        let state = state_for(&["p", "q", "r", "s"], 0.0);
        let view = SearchView::new(&graph, &state, 8.0);
        let eligible = state.eligible(&graph);
        let config = SchedulerConfig::new(8.0).with_branch_factor(10);

        let packings = best_packings(&view, &eligible, &UnitLoad, &config);

        // {p,q}, {s,r}, {p,r}, {q,r}; {p,r} cannot take q (10 > 8)
        assert_eq!(packings.len(), 4);
        assert_eq!(names(&packings[0]), vec!["p", "q"]);
        assert_eq!(names(&packings[1]), vec!["r", "s"]);
        assert_eq!(names(&packings[2]), vec!["p", "r"]);
        assert_eq!(names(&packings[3]), vec!["q", "r"]);
        for packing in &packings {
            assert!(view.units_of(&names(packing)) <= 8.0);
        }
    }

    #[test]
    fn test_branch_factor_truncates() {
        let graph = flat_graph();
        let state = state_for(&["p", "q", "r", "s"], 0.0);
        let view = SearchView::new(&graph, &state, 8.0);
        let eligible = state.eligible(&graph);
        let config = SchedulerConfig::new(8.0).with_branch_factor(1);

        let packings = best_packings(&view, &eligible, &UnitLoad, &config);
        assert_eq!(packings.len(), 1);
        assert_eq!(names(&packings[0]), vec!["p", "q"]);
    }

    #[test]
    fn test_debt_reduces_capacity() {
        let graph = flat_graph();
        let state = state_for(&["p", "q", "r"], 5.0);
        let view = SearchView::new(&graph, &state, 8.0);
        let eligible = state.eligible(&graph);
        let config = SchedulerConfig::new(8.0);

        let packings = best_packings(&view, &eligible, &UnitLoad, &config);
        assert_eq!(packings.len(), 1);
        assert_eq!(names(&packings[0]), vec!["r"]);
    }

    #[test]
    fn test_nothing_fits_gives_empty_quarter() {
        let graph = flat_graph();
        let state = state_for(&["p", "q"], 6.0);
        let view = SearchView::new(&graph, &state, 8.0);
        let eligible = state.eligible(&graph);

        let packings = best_packings(&view, &eligible, &UnitLoad, &SchedulerConfig::new(8.0));
        assert_eq!(packings.len(), 1);
        assert!(packings[0].courses.is_empty());
    }

    #[test]
    fn test_no_eligible_gives_empty_quarter() {
        let graph = flat_graph();
        let state = state_for(&[], 0.0);
        let view = SearchView::new(&graph, &state, 8.0);

        let packings = best_packings(&view, &[], &UnitLoad, &SchedulerConfig::new(8.0));
        assert_eq!(packings.len(), 1);
        assert!(packings[0].courses.is_empty());
    }

    #[test]
    fn test_width_table_limits_subset_size() {
        let graph = flat_graph();
        let state = state_for(&["p", "q", "r", "s"], 0.0);
        let view = SearchView::new(&graph, &state, 8.0);
        let eligible = state.eligible(&graph);
        let config = SchedulerConfig::new(8.0).with_branch_factor(10);
        let table = WidthTable::new(vec![1], UnitLoad);

        let packings = best_packings(&view, &eligible, &table, &config);
        assert!(packings.iter().all(|p| p.courses.len() == 1));
        assert_eq!(names(&packings[0]), vec!["s"]);
    }

    #[test]
    fn test_candidate_limit_keeps_best_singletons() {
        let graph = flat_graph();
        let state = state_for(&["p", "q", "r", "s"], 0.0);
        let view = SearchView::new(&graph, &state, 16.0);
        let eligible = state.eligible(&graph);
        let config = SchedulerConfig::new(16.0).with_max_candidates(2);

        // s (6) and p (4) rank highest; q wins no tie against p
        let packings = best_packings(&view, &eligible, &UnitLoad, &config);
        assert_eq!(packings.len(), 1);
        assert_eq!(names(&packings[0]), vec!["p", "s"]);
    }
}
