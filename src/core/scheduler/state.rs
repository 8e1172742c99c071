//! Branch-local search state

use super::plan::PlannedQuarter;
use super::DebtCarry;
use crate::core::models::{CompletionRecord, CourseGraph, Quarter};

/// State of one branch of the search
///
/// States are cloned per branch and never share mutable data, so the graph
/// can stay borrowed immutably for the whole search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    quarter: usize,
    start_quarter: usize,
    completed: CompletionRecord,
    remaining: Vec<String>,
    debt: f32,
    schedule: Vec<PlannedQuarter>,
    score: f64,
}

impl SearchState {
    /// Create the root state
    ///
    /// # Arguments
    /// * `start_quarter` - Absolute index of the first quarter to plan
    /// * `completed` - Courses already taken
    /// * `remaining` - Required courses still to schedule, in requirement order
    /// * `debt` - Units already committed in the first quarter
    #[must_use]
    pub const fn new(
        start_quarter: usize,
        completed: CompletionRecord,
        remaining: Vec<String>,
        debt: f32,
    ) -> Self {
        Self {
            quarter: start_quarter,
            start_quarter,
            completed,
            remaining,
            debt,
            schedule: Vec::new(),
            score: 0.0,
        }
    }

    /// Absolute index of the quarter being planned
    #[must_use]
    pub const fn quarter(&self) -> usize {
        self.quarter
    }

    /// Offering slot of the quarter being planned
    #[must_use]
    pub const fn offering(&self) -> Quarter {
        Quarter::from_index(self.quarter)
    }

    /// Quarters already planned on this branch
    #[must_use]
    pub const fn elapsed(&self) -> usize {
        self.quarter - self.start_quarter
    }

    /// Courses completed so far (already taken plus scheduled on this branch)
    #[must_use]
    pub const fn completed(&self) -> &CompletionRecord {
        &self.completed
    }

    /// Required courses not yet scheduled, in requirement order
    #[must_use]
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// Whether every required course is scheduled
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Unit debt carried into the current quarter
    #[must_use]
    pub const fn debt(&self) -> f32 {
        self.debt
    }

    /// Units available in the current quarter
    #[must_use]
    pub fn capacity(&self, unit_cap: f32) -> f32 {
        unit_cap - self.debt
    }

    /// Quarters planned so far on this branch
    #[must_use]
    pub fn schedule(&self) -> &[PlannedQuarter] {
        &self.schedule
    }

    /// Sum of the width scores of the chosen packings
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Remaining courses that can be taken in the current quarter
    ///
    /// A course is eligible when it is offered in the current slot and its
    /// prerequisites are met by the completed set. Requirement order is kept.
    #[must_use]
    pub fn eligible<'s>(&'s self, graph: &CourseGraph) -> Vec<&'s str> {
        let offering = self.offering();
        self.remaining
            .iter()
            .filter(|name| {
                graph.get(name).is_some_and(|course| {
                    course.offered_in(offering)
                        && course.is_satisfied_by(&self.completed, |n| graph.contains(n))
                })
            })
            .map(String::as_str)
            .collect()
    }

    /// Child state after taking `courses` in the current quarter
    ///
    /// # Arguments
    /// * `graph` - Course graph (for unit costs)
    /// * `courses` - Chosen courses, in requirement order
    /// * `score` - Width score of the choice
    /// * `unit_cap` - Per-quarter unit cap
    /// * `carry` - Debt policy
    #[must_use]
    pub fn advance(
        &self,
        graph: &CourseGraph,
        courses: &[String],
        score: f64,
        unit_cap: f32,
        carry: DebtCarry,
    ) -> Self {
        let mut planned = PlannedQuarter::new(self.quarter);
        let mut completed = self.completed.clone();
        for name in courses {
            let units = graph.get(name).map_or(0.0, |c| c.units);
            planned.add_course(name.clone(), units);
            completed.complete(name.clone());
        }

        let remaining = self
            .remaining
            .iter()
            .filter(|name| !courses.contains(name))
            .cloned()
            .collect();
        let debt = carry.next_debt(self.capacity(unit_cap), planned.total_units);

        let mut schedule = self.schedule.clone();
        schedule.push(planned);

        Self {
            quarter: self.quarter + 1,
            start_quarter: self.start_quarter,
            completed,
            remaining,
            debt,
            schedule,
            score: self.score + score,
        }
    }

    /// Consume the state, returning the planned quarters
    #[must_use]
    pub fn into_schedule(self) -> Vec<PlannedQuarter> {
        self.schedule
    }
}
