//! Course model

use super::quarter::Quarter;
use super::requisite::{CompletionRecord, OrSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Weekly meeting pattern of a course
///
/// Carried for loaders that have it; the planner does not evaluate time
/// conflicts (see [`Course::conflicts_with`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    /// Weekdays as 1-5 (Monday-Friday)
    pub weekdays: BTreeSet<u8>,
    /// Start time in minutes after midnight
    pub start_minute: u16,
    /// End time in minutes after midnight
    pub end_minute: u16,
}

/// Represents a course in a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Quarters in which the course is offered, every year
    pub quarters: BTreeSet<Quarter>,

    /// Credit units (can be fractional)
    pub units: f32,

    /// Prerequisites: every OR-set must have at least one completed member
    #[serde(default)]
    pub prereq: Vec<OrSet>,

    /// Courses that list this one in an OR-set (derived by the graph)
    #[serde(skip)]
    satisfy: BTreeSet<String>,

    /// Optional meeting pattern (inactive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingTime>,
}

impl Course {
    /// Create a new course with no prerequisites
    ///
    /// # Arguments
    /// * `units` - Credit units
    /// * `quarters` - Offering quarters
    #[must_use]
    pub fn new(units: f32, quarters: impl IntoIterator<Item = Quarter>) -> Self {
        Self {
            quarters: quarters.into_iter().collect(),
            units,
            prereq: Vec::new(),
            satisfy: BTreeSet::new(),
            meeting: None,
        }
    }

    /// Builder form of [`add_prereq`](Self::add_prereq)
    #[must_use]
    pub fn with_prereq(mut self, or_set: OrSet) -> Self {
        self.add_prereq(or_set);
        self
    }

    /// Attach a meeting pattern
    #[must_use]
    pub fn with_meeting(mut self, meeting: MeetingTime) -> Self {
        self.meeting = Some(meeting);
        self
    }

    /// Check whether the prerequisites are met
    ///
    /// Every OR-set needs one member that is either completed (meeting its
    /// minimum mark, best-effort) or unknown to the catalog. Unknown names
    /// (AP exams, courses outside the catalog) are treated as satisfied.
    ///
    /// # Arguments
    /// * `completed` - Courses completed so far
    /// * `is_known` - Whether a name exists in the catalog
    pub fn is_satisfied_by<F>(&self, completed: &CompletionRecord, is_known: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.prereq.iter().all(|or_set| {
            or_set
                .iter()
                .any(|member| !is_known(&member.course) || completed.meets(member))
        })
    }

    /// Whether the course is offered in `quarter`
    #[must_use]
    pub fn offered_in(&self, quarter: Quarter) -> bool {
        self.quarters.contains(&quarter)
    }

    /// Add a prerequisite OR-set
    ///
    /// # Returns
    /// `false` if the set is empty or an equal set is already present
    pub fn add_prereq(&mut self, or_set: OrSet) -> bool {
        if or_set.is_empty() || self.prereq.contains(&or_set) {
            return false;
        }
        self.prereq.push(or_set);
        true
    }

    /// Record that `course` lists this course as a prerequisite alternative
    pub fn add_satisfy(&mut self, course: impl Into<String>) -> bool {
        self.satisfy.insert(course.into())
    }

    pub(crate) fn clear_satisfy(&mut self) {
        self.satisfy.clear();
    }

    /// Drop every OR-set that mentions `course`
    ///
    /// Other OR-sets are left alone even if still unmet.
    ///
    /// # Returns
    /// `true` if no prerequisites remain
    pub fn remove_prereq_membership(&mut self, course: &str) -> bool {
        self.prereq.retain(|or_set| !or_set.contains(course));
        self.prereq.is_empty()
    }

    /// Offering quarters
    #[must_use]
    pub const fn quarters(&self) -> &BTreeSet<Quarter> {
        &self.quarters
    }

    /// Credit units
    #[must_use]
    pub const fn units(&self) -> f32 {
        self.units
    }

    /// Whether any prerequisites are listed
    #[must_use]
    pub fn has_prereq(&self) -> bool {
        !self.prereq.is_empty()
    }

    /// Prerequisite OR-sets in authored order
    #[must_use]
    pub fn prereq(&self) -> &[OrSet] {
        &self.prereq
    }

    /// Courses this one helps unlock
    #[must_use]
    pub const fn satisfy(&self) -> &BTreeSet<String> {
        &self.satisfy
    }

    /// Time conflict with another course
    ///
    /// Meeting times are not evaluated yet, so courses never conflict.
    #[must_use]
    pub const fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quarters: Vec<String> = self.quarters.iter().map(ToString::to_string).collect();
        let prereq: Vec<String> = self.prereq.iter().map(ToString::to_string).collect();
        writeln!(f, "units: {}", self.units)?;
        writeln!(f, "quarters: {}", quarters.join(", "))?;
        if prereq.is_empty() {
            writeln!(f, "prereq: (none)")?;
        } else {
            writeln!(f, "prereq: {}", prereq.join(" AND "))?;
        }
        let satisfy: Vec<&str> = self.satisfy.iter().map(String::as_str).collect();
        write!(f, "satisfy: {}", satisfy.join(", "))
    }
}
