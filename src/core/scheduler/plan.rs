//! Scheduler output

use crate::core::models::{quarter_label, Quarter};
use std::fmt;

/// A single quarter of a plan with its assigned courses
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuarter {
    /// Absolute quarter index (0 = year 1 Fall)
    pub index: usize,
    /// Offering slot of this quarter
    pub offering: Quarter,
    /// Course names, in requirement order
    pub courses: Vec<String>,
    /// Total units of the assigned courses
    pub total_units: f32,
}

impl PlannedQuarter {
    /// Create a new empty quarter
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            offering: Quarter::from_index(index),
            courses: Vec::new(),
            total_units: 0.0,
        }
    }

    /// Add a course to the quarter
    pub fn add_course(&mut self, name: String, units: f32) {
        self.courses.push(name);
        self.total_units += units;
    }

    /// Whether no course is assigned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Complete quarter-by-quarter plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterPlan {
    /// Absolute index of the first quarter
    pub start_quarter: usize,
    /// Consecutive quarters starting at `start_quarter`
    pub quarters: Vec<PlannedQuarter>,
}

impl QuarterPlan {
    /// Create an empty plan starting at `start_quarter`
    #[must_use]
    pub const fn new(start_quarter: usize) -> Self {
        Self {
            start_quarter,
            quarters: Vec::new(),
        }
    }

    /// Number of quarters in the plan (empty quarters included)
    #[must_use]
    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    /// Whether the plan has no quarters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    /// Ordered list of ordered course-name lists, one entry per quarter
    #[must_use]
    pub fn to_names(&self) -> Vec<Vec<String>> {
        self.quarters.iter().map(|q| q.courses.clone()).collect()
    }

    /// Absolute quarter index in which `course` is scheduled
    #[must_use]
    pub fn quarter_of(&self, course: &str) -> Option<usize> {
        self.quarters
            .iter()
            .find(|q| q.courses.iter().any(|c| c == course))
            .map(|q| q.index)
    }

    /// Total units across all quarters
    #[must_use]
    pub fn total_units(&self) -> f32 {
        self.quarters.iter().map(|q| q.total_units).sum()
    }

    /// Number of scheduled courses
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.quarters.iter().map(|q| q.courses.len()).sum()
    }
}

impl fmt::Display for QuarterPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quarter plan ({} quarters):", self.quarters.len())?;
        for quarter in &self.quarters {
            let courses = if quarter.is_empty() {
                "(none)".to_string()
            } else {
                quarter.courses.join(", ")
            };
            writeln!(
                f,
                "  {} ({} units): {courses}",
                quarter_label(quarter.index),
                quarter.total_units
            )?;
        }
        Ok(())
    }
}

/// Counters collected during a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States expanded
    pub expansions: usize,
    /// States cut by the lower bound
    pub bound_prunes: usize,
    /// States cut because an equivalent state was seen earlier
    pub memo_prunes: usize,
    /// Complete plans found (improving or not)
    pub complete_plans: usize,
}

/// Outcome of a successful search
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleResult {
    /// Shortest plan found
    pub plan: QuarterPlan,
    /// Lower bound on plan length computed before searching
    pub best_bound: usize,
    /// `false` if the search stopped early (cancelled or out of budget)
    pub exhaustive: bool,
    /// Search counters
    pub stats: SearchStats,
}

impl ScheduleResult {
    /// Split into the course-name schedule and the lower bound
    #[must_use]
    pub fn into_parts(self) -> (Vec<Vec<String>>, usize) {
        (self.plan.to_names(), self.best_bound)
    }

    /// Whether the plan length matches the lower bound
    #[must_use]
    pub fn is_provably_shortest(&self) -> bool {
        self.plan.len() == self.best_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> QuarterPlan {
        let mut plan = QuarterPlan::new(3);
        let mut first = PlannedQuarter::new(3);
        first.add_course("a".to_string(), 4.0);
        let mut second = PlannedQuarter::new(4);
        second.add_course("b".to_string(), 4.0);
        second.add_course("e".to_string(), 3.5);
        plan.quarters.push(first);
        plan.quarters.push(second);
        plan
    }

    #[test]
    fn test_planned_quarter_offering() {
        let quarter = PlannedQuarter::new(4);
        assert_eq!(quarter.offering, Quarter::Winter);
        assert!(quarter.is_empty());
    }

    #[test]
    fn test_plan_queries() {
        let plan = sample_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.course_count(), 3);
        assert_eq!(plan.quarter_of("e"), Some(4));
        assert_eq!(plan.quarter_of("z"), None);
        assert!((plan.total_units() - 11.5).abs() < f32::EPSILON);
        assert_eq!(
            plan.to_names(),
            vec![vec!["a".to_string()], vec!["b".to_string(), "e".to_string()]]
        );
    }

    #[test]
    fn test_plan_display() {
        let text = sample_plan().to_string();
        assert!(text.contains("Quarter plan (2 quarters)"));
        assert!(text.contains("year 2 Fall (4 units): a"));
        assert!(text.contains("year 2 Winter (7.5 units): b, e"));
    }

    #[test]
    fn test_result_parts() {
        let result = ScheduleResult {
            plan: sample_plan(),
            best_bound: 2,
            exhaustive: true,
            stats: SearchStats::default(),
        };
        assert!(result.is_provably_shortest());
        let (names, bound) = result.into_parts();
        assert_eq!(names.len(), 2);
        assert_eq!(bound, 2);
    }
}
