//! Lower bounds and pre-search structural checks
//!
//! All three computations peel the remaining courses off in rounds, the way a
//! topological sort peels vertices with no incoming edges. A course resolves
//! in a round once every OR-set has a member that is already resolved.

use crate::core::models::{CompletionRecord, CourseGraph};
use std::collections::{HashMap, HashSet};

/// Tolerance for fractional unit sums
const UNIT_EPSILON: f32 = 1e-4;

/// Chain depths of the remaining courses
#[derive(Debug, Clone, Default)]
pub struct ChainDepths {
    /// Depth of each resolved course (1 = no pending prerequisite)
    pub depths: HashMap<String, usize>,
    /// Courses that never resolved, in input order
    pub unresolved: Vec<String>,
}

impl ChainDepths {
    /// Longest chain, or 0 when nothing remains
    #[must_use]
    pub fn longest(&self) -> usize {
        self.depths.values().copied().max().unwrap_or(0)
    }
}

/// Compute the AND/OR chain depth of every remaining course
///
/// OR-set members outside `remaining` count as already resolved (depth 0).
/// An OR-set takes the smallest depth among its members and a course sits one
/// quarter after its deepest OR-set, so the depth of a course is the first
/// round in which all of its OR-sets have a resolved member.
///
/// Courses left unresolved depend on each other with no member outside the
/// group, i.e. they sit on or behind a cycle.
#[must_use]
pub fn chain_depths(graph: &CourseGraph, remaining: &[String]) -> ChainDepths {
    let pending_set: HashSet<&str> = remaining.iter().map(String::as_str).collect();
    let mut depths: HashMap<String, usize> = HashMap::new();
    let mut pending: Vec<&str> = remaining.iter().map(String::as_str).collect();
    let mut round = 0;

    while !pending.is_empty() {
        round += 1;
        let resolved: Vec<&str> = pending
            .iter()
            .copied()
            .filter(|name| {
                graph.get_prereq(name).is_none_or(|sets| {
                    sets.iter().all(|or_set| {
                        or_set
                            .names()
                            .any(|m| !pending_set.contains(m) || depths.contains_key(m))
                    })
                })
            })
            .collect();

        if resolved.is_empty() {
            break;
        }
        for name in &resolved {
            depths.insert((*name).to_string(), round);
        }
        pending.retain(|name| !resolved.contains(name));
    }

    ChainDepths {
        depths,
        unresolved: pending.into_iter().map(ToString::to_string).collect(),
    }
}

/// Remaining courses that can never become eligible
///
/// Stricter than [`chain_depths`]: a course must be offered in at least one
/// quarter, and an OR-set member only counts if it is unknown to the graph,
/// already completed (meeting any minimum mark) or itself a remaining course
/// that can be scheduled. Graph courses that are neither required nor
/// completed never count.
#[must_use]
pub fn unschedulable(
    graph: &CourseGraph,
    remaining: &[String],
    completed: &CompletionRecord,
) -> Vec<String> {
    let mut schedulable: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = remaining.iter().map(String::as_str).collect();

    loop {
        let resolved: Vec<&str> = pending
            .iter()
            .copied()
            .filter(|name| {
                graph.get(name).is_some_and(|course| {
                    !course.quarters.is_empty()
                        && course.prereq().iter().all(|or_set| {
                            or_set.iter().any(|member| {
                                !graph.contains(&member.course)
                                    || completed.meets(member)
                                    || schedulable.contains(member.course.as_str())
                            })
                        })
                })
            })
            .collect();

        if resolved.is_empty() {
            break;
        }
        schedulable.extend(resolved.iter().copied());
        pending.retain(|name| !resolved.contains(name));
    }

    pending.into_iter().map(ToString::to_string).collect()
}

/// Total units of the remaining courses
#[must_use]
pub fn remaining_units(graph: &CourseGraph, remaining: &[String]) -> f32 {
    remaining
        .iter()
        .filter_map(|name| graph.get(name))
        .map(|course| course.units)
        .sum()
}

/// Quarters needed to fit the remaining units under the cap
///
/// Capacity over `n` quarters never exceeds `n * unit_cap - debt`, whatever the
/// debt policy, since credit is only ever earned from unused capacity. Debt
/// above the cap is clamped because a quarter cannot hold negative units.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unit_bound(units: f32, debt: f32, unit_cap: f32) -> usize {
    let needed = (units + debt.min(unit_cap)) / unit_cap;
    if needed <= UNIT_EPSILON {
        return 0;
    }
    (needed - UNIT_EPSILON).ceil() as usize
}

/// Admissible lower bound on the quarters still needed
///
/// The larger of the chain bound and the unit bound. Returns `usize::MAX` if
/// some remaining course can no longer resolve.
#[must_use]
pub fn lower_bound(graph: &CourseGraph, remaining: &[String], debt: f32, unit_cap: f32) -> usize {
    if remaining.is_empty() {
        return 0;
    }
    let chain = chain_depths(graph, remaining);
    if !chain.unresolved.is_empty() {
        return usize::MAX;
    }
    let units = remaining_units(graph, remaining);
    chain.longest().max(unit_bound(units, debt, unit_cap))
}
