//! Degree requirement table

use super::graph::CourseGraph;
use crate::core::error::UnknownCourseReference;
use serde::{Deserialize, Serialize};

/// A named group of required courses (e.g. "Lower-division core")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementGroup {
    /// Group name
    pub name: String,

    /// Required course names in listed order
    pub courses: Vec<String>,
}

impl RequirementGroup {
    /// Create a new empty group
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            courses: Vec::new(),
        }
    }

    /// Add a course to the group
    ///
    /// # Returns
    /// `false` if the course was already listed in this group
    pub fn add_course(&mut self, course: impl Into<String>) -> bool {
        let course = course.into();
        if self.courses.contains(&course) {
            return false;
        }
        self.courses.push(course);
        true
    }

    /// Remove a course from the group
    ///
    /// # Returns
    /// `true` if the course was removed, `false` if it wasn't listed
    pub fn remove_course(&mut self, course: &str) -> bool {
        if let Some(pos) = self.courses.iter().position(|c| c == course) {
            self.courses.remove(pos);
            true
        } else {
            false
        }
    }
}

/// Ordered requirement groups whose union is the set of courses to schedule
///
/// Insertion order matters: it is the scheduler's tie-break order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementTable {
    groups: Vec<RequirementGroup>,
}

impl RequirementTable {
    /// Create a new empty table
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Append a group, or extend an existing group with the same name
    pub fn add_group<I, S>(&mut self, name: &str, courses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let idx = if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            idx
        } else {
            self.groups.push(RequirementGroup::new(name));
            self.groups.len() - 1
        };
        for course in courses {
            self.groups[idx].add_course(course);
        }
    }

    /// Builder form of [`add_group`](Self::add_group)
    #[must_use]
    pub fn with_group<I, S>(mut self, name: &str, courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_group(name, courses);
        self
    }

    /// Groups in insertion order
    #[must_use]
    pub fn groups(&self) -> &[RequirementGroup] {
        &self.groups
    }

    /// Union of all groups, first occurrence wins the position
    #[must_use]
    pub fn required_courses(&self) -> Vec<String> {
        let mut union: Vec<String> = Vec::new();
        for course in self.groups.iter().flat_map(|g| g.courses.iter()) {
            if !union.contains(course) {
                union.push(course.clone());
            }
        }
        union
    }

    /// Name of the first group listing `course`
    #[must_use]
    pub fn group_of(&self, course: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.courses.iter().any(|c| c == course))
            .map(|g| g.name.as_str())
    }

    /// Number of distinct required courses
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.required_courses().len()
    }

    /// Whether no courses are required
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.courses.is_empty())
    }

    /// Required courses that are missing from `graph`
    #[must_use]
    pub fn unknown_courses(&self, graph: &CourseGraph) -> Vec<UnknownCourseReference> {
        self.required_courses()
            .into_iter()
            .filter(|course| !graph.contains(course))
            .map(|course| UnknownCourseReference {
                referenced_by: self.group_of(&course).map(ToString::to_string),
                course,
            })
            .collect()
    }
}
