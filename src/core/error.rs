//! Scheduling errors and data-quality warnings

use crate::core::scheduler::QuarterPlan;
use thiserror::Error;

/// A course name referenced by a prerequisite or requirement but absent from
/// the graph
///
/// Never a scheduling failure: such names are treated as already satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown course '{course}'{}", owner_suffix(.referenced_by))]
pub struct UnknownCourseReference {
    /// The missing course name
    pub course: String,
    /// Course or requirement group that mentions it
    pub referenced_by: Option<String>,
}

/// Reasons the scheduler could not produce a plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// `derive_satisfy_edges` has not run since the graph was last changed
    #[error("course graph is not finalized; call derive_satisfy_edges() first")]
    GraphNotFinalized,

    /// A scheduler setting is out of range (e.g. a non-positive unit cap)
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// A required course has a non-positive or non-finite unit cost
    #[error("course '{course}' has invalid units {units}")]
    InvalidUnits {
        /// Course name
        course: String,
        /// Offending unit value
        units: f32,
    },

    /// A required course alone exceeds the per-quarter unit cap
    #[error("course '{course}' needs {units} units but a quarter allows {unit_cap}")]
    UncapacitatedCourse {
        /// Course name
        course: String,
        /// Units of the course
        units: f32,
        /// Per-quarter cap
        unit_cap: f32,
    },

    /// Required courses depend on each other with no way out through an
    /// alternative
    #[error("prerequisite cycle among: {}", .courses.join(", "))]
    PrerequisiteCycle {
        /// Courses on or behind the cycle, in requirement order
        courses: Vec<String>,
    },

    /// No complete plan exists within the quarter ceiling
    #[error(
        "no complete schedule within {max_quarters} quarters (lower bound {best_bound}){}",
        unschedulable_suffix(.unschedulable)
    )]
    SchedulingInfeasible {
        /// Quarter ceiling used for the search
        max_quarters: usize,
        /// Lower bound on the number of quarters needed
        best_bound: usize,
        /// Required courses that can never become eligible
        unschedulable: Vec<String>,
        /// Deepest partial plan reached, for diagnostics
        partial: Option<Box<QuarterPlan>>,
    },

    /// The search was cancelled or ran out of budget before finding any plan
    #[error("search aborted after {expansions} expansions without a complete schedule")]
    SearchAborted {
        /// States expanded before stopping
        expansions: usize,
    },
}

fn owner_suffix(referenced_by: &Option<String>) -> String {
    referenced_by
        .as_ref()
        .map(|owner| format!(" (referenced by {owner})"))
        .unwrap_or_default()
}

fn unschedulable_suffix(courses: &[String]) -> String {
    if courses.is_empty() {
        String::new()
    } else {
        format!("; never schedulable: {}", courses.join(", "))
    }
}

/// Convenience alias for scheduler results
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_display() {
        let with_owner = UnknownCourseReference {
            course: "AP CALCULUS BC".to_string(),
            referenced_by: Some("MATH 2B".to_string()),
        };
        assert_eq!(
            with_owner.to_string(),
            "unknown course 'AP CALCULUS BC' (referenced by MATH 2B)"
        );

        let bare = UnknownCourseReference {
            course: "k".to_string(),
            referenced_by: None,
        };
        assert_eq!(bare.to_string(), "unknown course 'k'");
    }

    #[test]
    fn test_error_messages() {
        let cycle = ScheduleError::PrerequisiteCycle {
            courses: vec!["x".to_string(), "y".to_string()],
        };
        assert_eq!(cycle.to_string(), "prerequisite cycle among: x, y");

        let infeasible = ScheduleError::SchedulingInfeasible {
            max_quarters: 20,
            best_bound: 3,
            unschedulable: vec!["x".to_string()],
            partial: None,
        };
        assert!(infeasible.to_string().contains("never schedulable: x"));
    }
}
