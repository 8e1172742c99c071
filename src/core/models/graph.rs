//! Course graph with AND/OR prerequisite edges

use super::course::Course;
use super::requisite::{CompletionRecord, OrSet};
use crate::core::error::UnknownCourseReference;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A catalog of courses keyed by unique name
///
/// Prerequisite edges live on each [`Course`] as OR-sets; the reverse view
/// (`satisfy`) is derived in one pass by [`derive_satisfy_edges`]. The graph
/// remembers whether it has been mutated since that pass, and the scheduler
/// only accepts a finalized graph.
///
/// OR-set members may name courses that are not in the graph; such names are
/// kept, never become edges, and count as satisfied.
///
/// [`derive_satisfy_edges`]: CourseGraph::derive_satisfy_edges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseGraph {
    /// Maps course name -> course
    courses: HashMap<String, Course>,

    /// Course names in insertion order
    order: Vec<String>,

    /// Whether `satisfy` sets match the current prerequisites
    #[serde(skip)]
    finalized: bool,
}

impl CourseGraph {
    /// Create a new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course vertex
    ///
    /// # Returns
    /// `true` if the course was added, `false` if the name already exists
    pub fn add_course(&mut self, name: impl Into<String>, course: Course) -> bool {
        let name = name.into();
        if self.courses.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.courses.insert(name, course);
        self.finalized = false;
        true
    }

    /// Add several courses; existing names are skipped
    ///
    /// # Returns
    /// The number of courses actually added
    pub fn add_courses<I, S>(&mut self, courses: I) -> usize
    where
        I: IntoIterator<Item = (S, Course)>,
        S: Into<String>,
    {
        courses
            .into_iter()
            .map(|(name, course)| self.add_course(name, course))
            .filter(|added| *added)
            .count()
    }

    /// Remove a course vertex
    ///
    /// OR-sets of other courses that mention it are left untouched; the name
    /// simply becomes unknown to the graph.
    pub fn remove_course(&mut self, name: &str) -> Option<Course> {
        let removed = self.courses.remove(name)?;
        self.order.retain(|n| n != name);
        self.finalized = false;
        Some(removed)
    }

    /// Add a prerequisite OR-set to an existing course
    ///
    /// Members of `or_set` need not exist in the graph.
    ///
    /// # Returns
    /// `false` if `name` is not in the graph (nothing changes)
    pub fn add_prereq_edge(&mut self, name: &str, or_set: OrSet) -> bool {
        match self.courses.get_mut(name) {
            Some(course) => {
                if course.add_prereq(or_set) {
                    self.finalized = false;
                }
                true
            }
            None => false,
        }
    }

    /// Rebuild every `satisfy` set from the current prerequisites
    ///
    /// For each course, each OR-set and each member present in the graph, the
    /// owning course is added to that member's `satisfy` set. Sets are cleared
    /// first, so running this twice gives the same result as running it once.
    pub fn derive_satisfy_edges(&mut self) {
        for course in self.courses.values_mut() {
            course.clear_satisfy();
        }

        let mut edges: Vec<(String, String)> = Vec::new();
        for name in &self.order {
            let Some(course) = self.courses.get(name) else {
                continue;
            };
            for or_set in course.prereq() {
                for member in or_set.names() {
                    if self.courses.contains_key(member) {
                        edges.push((member.to_string(), name.clone()));
                    }
                }
            }
        }

        for (member, owner) in edges {
            if let Some(course) = self.courses.get_mut(&member) {
                course.add_satisfy(owner);
            }
        }
        self.finalized = true;
    }

    /// Whether `derive_satisfy_edges` has run since the last mutation
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Check if a course exists in the graph
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.courses.contains_key(name)
    }

    /// Get a course by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Course> {
        self.courses.get(name)
    }

    /// Get the prerequisite OR-sets of a course, or None if not found
    #[must_use]
    pub fn get_prereq(&self, name: &str) -> Option<&[OrSet]> {
        self.courses.get(name).map(Course::prereq)
    }

    /// Get the courses a course helps unlock, or None if not found
    #[must_use]
    pub fn get_satisfy(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.courses.get(name).map(Course::satisfy)
    }

    /// Whether `name` exists and its prerequisites are met by `completed`
    #[must_use]
    pub fn prerequisites_met(&self, name: &str, completed: &CompletionRecord) -> bool {
        self.courses
            .get(name)
            .is_some_and(|course| course.is_satisfied_by(completed, |n| self.contains(n)))
    }

    /// Iterate over `(name, course)` pairs in insertion order
    pub fn courses(&self) -> impl Iterator<Item = (&str, &Course)> {
        self.order
            .iter()
            .filter_map(|name| self.courses.get(name).map(|c| (name.as_str(), c)))
    }

    /// Course names in insertion order
    #[must_use]
    pub fn course_names(&self) -> &[String] {
        &self.order
    }

    /// Get the number of courses in the graph
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no courses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// List OR-set members that name courses missing from the graph
    ///
    /// These are satisfied automatically during scheduling; the list is a
    /// data-quality report for loaders.
    #[must_use]
    pub fn unknown_references(&self) -> Vec<UnknownCourseReference> {
        let mut unknown = Vec::new();
        for (name, course) in self.courses() {
            for or_set in course.prereq() {
                for member in or_set.names() {
                    if !self.contains(member) {
                        unknown.push(UnknownCourseReference {
                            course: member.to_string(),
                            referenced_by: Some(name.to_string()),
                        });
                    }
                }
            }
        }
        unknown
    }
}

impl<S: Into<String>> FromIterator<(S, Course)> for CourseGraph {
    fn from_iter<T: IntoIterator<Item = (S, Course)>>(iter: T) -> Self {
        let mut graph = Self::new();
        graph.add_courses(iter);
        graph
    }
}

impl std::fmt::Display for CourseGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Course graph ({} courses):", self.order.len())?;
        writeln!(f)?;

        // Sort courses for consistent output
        let mut sorted = self.order.clone();
        sorted.sort();

        for name in sorted {
            if let Some(course) = self.courses.get(&name) {
                if course.has_prereq() {
                    let sets: Vec<String> = course.prereq().iter().map(ToString::to_string).collect();
                    writeln!(f, "  {name} ← {}", sets.join(" AND "))?;
                } else {
                    writeln!(f, "  {name} ← (no prerequisites)")?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Quarter;

    /// a -> b -> c, d needs (a|c) & k & e, k unknown
    fn sample_graph() -> CourseGraph {
        let mut graph = CourseGraph::new();
        graph.add_course("a", Course::new(4.0, [Quarter::Fall]));
        graph.add_course("b", Course::new(4.0, [Quarter::Winter]));
        graph.add_course("c", Course::new(2.0, [Quarter::Winter, Quarter::Spring]));
        graph.add_course("d", Course::new(1.5, [Quarter::Winter, Quarter::Spring]));
        graph.add_course("e", Course::new(3.5, [Quarter::Winter, Quarter::Spring]));
        graph.add_prereq_edge("b", OrSet::any_of(["a"]));
        graph.add_prereq_edge("c", OrSet::any_of(["b"]));
        graph.add_prereq_edge("d", OrSet::any_of(["a", "c"]));
        graph.add_prereq_edge("d", OrSet::any_of(["k"]));
        graph.add_prereq_edge("d", OrSet::any_of(["e"]));
        graph
    }

    #[test]
    fn test_graph_creation() {
        let graph = CourseGraph::new();
        assert_eq!(graph.len(), 0);
        assert!(graph.is_empty());
        assert!(!graph.is_finalized());
    }

    #[test]
    fn test_add_course_rejects_duplicates() {
        let mut graph = CourseGraph::new();
        assert!(graph.add_course("a", Course::new(4.0, [Quarter::Fall])));
        assert!(!graph.add_course("a", Course::new(2.0, [Quarter::Spring])));
        assert_eq!(graph.len(), 1);
        assert!(graph.get("a").is_some_and(|c| c.offered_in(Quarter::Fall)));
    }

    #[test]
    fn test_add_courses_counts_new_names() {
        let mut graph = CourseGraph::new();
        let added = graph.add_courses([
            ("a", Course::new(4.0, [Quarter::Fall])),
            ("b", Course::new(4.0, [Quarter::Winter])),
            ("a", Course::new(1.0, [Quarter::Spring])),
        ]);
        assert_eq!(added, 2);
        assert_eq!(graph.course_names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_prereq_edge_needs_existing_course() {
        let mut graph = sample_graph();
        assert!(!graph.add_prereq_edge("zzz", OrSet::any_of(["a"])));
        assert!(!graph.contains("zzz"));
        assert_eq!(graph.get_prereq("d").map(<[OrSet]>::len), Some(3));
    }

    #[test]
    fn test_derive_satisfy_edges() {
        let mut graph = sample_graph();
        graph.derive_satisfy_edges();

        let satisfy_a: Vec<&str> = graph
            .get_satisfy("a")
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(satisfy_a, vec!["b", "d"]);
        assert_eq!(graph.get_satisfy("c").map(BTreeSet::len), Some(1));
        assert!(graph.get_satisfy("d").is_some_and(BTreeSet::is_empty));
        // Unknown names never become vertices
        assert!(graph.get_satisfy("k").is_none());
        assert!(graph.is_finalized());
    }

    #[test]
    fn test_derive_satisfy_edges_is_idempotent() {
        let mut graph = sample_graph();
        graph.derive_satisfy_edges();
        let once: Vec<BTreeSet<String>> = graph.courses().map(|(_, c)| c.satisfy().clone()).collect();
        graph.derive_satisfy_edges();
        let twice: Vec<BTreeSet<String>> = graph.courses().map(|(_, c)| c.satisfy().clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mutation_clears_finalized() {
        let mut graph = sample_graph();
        graph.derive_satisfy_edges();
        graph.add_prereq_edge("e", OrSet::any_of(["a"]));
        assert!(!graph.is_finalized());
        graph.derive_satisfy_edges();
        assert!(graph.get_satisfy("a").is_some_and(|s| s.contains("e")));
    }

    #[test]
    fn test_remove_course_leaves_references_unknown() {
        let mut graph = sample_graph();
        assert!(graph.remove_course("a").is_some());
        assert!(graph.remove_course("a").is_none());
        graph.derive_satisfy_edges();

        // b's only prerequisite is now an unknown name
        assert!(graph.prerequisites_met("b", &CompletionRecord::new()));
        assert!(graph.unknown_references().iter().any(|r| r.course == "a"));
    }

    #[test]
    fn test_prerequisites_met() {
        let mut graph = sample_graph();
        graph.derive_satisfy_edges();
        let done: CompletionRecord = ["a", "e"].into_iter().collect();
        assert!(graph.prerequisites_met("d", &done));
        assert!(!graph.prerequisites_met("c", &done));
        assert!(!graph.prerequisites_met("missing", &done));
    }

    #[test]
    fn test_unknown_references() {
        let graph = sample_graph();
        let unknown = graph.unknown_references();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].course, "k");
        assert_eq!(unknown[0].referenced_by.as_deref(), Some("d"));
    }

    #[test]
    fn test_graph_display() {
        let graph = sample_graph();
        let display = format!("{graph}");
        assert!(display.contains("Course graph (5 courses)"));
        assert!(display.contains("a ← (no prerequisites)"));
        assert!(display.contains("d ← (a OR c) AND (k) AND (e)"));
    }
}
