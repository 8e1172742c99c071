//! Prerequisite alternatives and completion records
//!
//! A prerequisite slot is an [`OrSet`]: any one of its [`Requisite`] members
//! satisfies it. Members may carry a minimum grade or exam score, checked
//! against the mark stored in a [`CompletionRecord`] on a best-effort basis.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Letter grade, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// F
    #[serde(rename = "F")]
    F,
    /// D-
    #[serde(rename = "D-")]
    DMinus,
    /// D
    #[serde(rename = "D")]
    D,
    /// D+
    #[serde(rename = "D+")]
    DPlus,
    /// C-
    #[serde(rename = "C-")]
    CMinus,
    /// C
    #[serde(rename = "C")]
    C,
    /// C+
    #[serde(rename = "C+")]
    CPlus,
    /// B-
    #[serde(rename = "B-")]
    BMinus,
    /// B
    #[serde(rename = "B")]
    B,
    /// B+
    #[serde(rename = "B+")]
    BPlus,
    /// A-
    #[serde(rename = "A-")]
    AMinus,
    /// A
    #[serde(rename = "A")]
    A,
    /// A+
    #[serde(rename = "A+")]
    APlus,
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let grade = match s.trim().to_ascii_uppercase().as_str() {
            "A+" => Self::APlus,
            "A" => Self::A,
            "A-" => Self::AMinus,
            "B+" => Self::BPlus,
            "B" => Self::B,
            "B-" => Self::BMinus,
            "C+" => Self::CPlus,
            "C" => Self::C,
            "C-" => Self::CMinus,
            "D+" => Self::DPlus,
            "D" => Self::D,
            "D-" => Self::DMinus,
            "F" => Self::F,
            other => return Err(format!("Unknown letter grade: '{other}'")),
        };
        Ok(grade)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::DMinus => "D-",
            Self::F => "F",
        };
        f.write_str(text)
    }
}

/// A grade or score threshold, also used to record what was achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumMark {
    /// Letter grade (e.g. "min grade = C")
    Grade(Grade),
    /// Exam score (e.g. "AP CALCULUS BC, min score = 4")
    Score(u8),
}

impl MinimumMark {
    /// Whether `achieved` meets this threshold
    ///
    /// Evaluation is best-effort: a missing mark, or a mark of the other kind
    /// (a grade against a score threshold), counts as meeting it.
    #[must_use]
    pub fn is_met_by(&self, achieved: Option<&Self>) -> bool {
        match (self, achieved) {
            (Self::Grade(min), Some(Self::Grade(got))) => got >= min,
            (Self::Score(min), Some(Self::Score(got))) => got >= min,
            _ => true,
        }
    }
}

impl fmt::Display for MinimumMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grade(grade) => write!(f, "min grade = {grade}"),
            Self::Score(score) => write!(f, "min score = {score}"),
        }
    }
}

/// One alternative inside an OR-set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requisite {
    /// Course name (e.g. "I&C SCI 46")
    pub course: String,

    /// Optional minimum grade or score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<MinimumMark>,
}

impl Requisite {
    /// Requisite satisfied by any completion of `course`
    #[must_use]
    pub fn new(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            minimum: None,
        }
    }

    /// Attach a minimum grade or score
    #[must_use]
    pub fn with_minimum(mut self, minimum: MinimumMark) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

impl From<&str> for Requisite {
    fn from(course: &str) -> Self {
        Self::new(course)
    }
}

impl From<String> for Requisite {
    fn from(course: String) -> Self {
        Self::new(course)
    }
}

impl fmt::Display for Requisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.minimum {
            Some(minimum) => write!(f, "{} ({minimum})", self.course),
            None => f.write_str(&self.course),
        }
    }
}

/// A set of alternative courses, any one of which satisfies the slot
///
/// Members are kept sorted by course name and unique by course name, so two
/// OR-sets with the same members compare equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Requisite>", into = "Vec<Requisite>")]
pub struct OrSet {
    members: Vec<Requisite>,
}

impl OrSet {
    /// Create an empty OR-set
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// OR-set over plain course names with no grade qualifiers
    pub fn any_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(Requisite::new)
            .collect()
    }

    /// Insert a member
    ///
    /// # Returns
    /// `false` if a member for the same course already exists (it is kept)
    pub fn insert(&mut self, requisite: Requisite) -> bool {
        match self
            .members
            .binary_search_by(|m| m.course.as_str().cmp(requisite.course.as_str()))
        {
            Ok(_) => false,
            Err(pos) => {
                self.members.insert(pos, requisite);
                true
            }
        }
    }

    /// Whether `course` is one of the alternatives
    #[must_use]
    pub fn contains(&self, course: &str) -> bool {
        self.get(course).is_some()
    }

    /// Member for `course`, if any
    #[must_use]
    pub fn get(&self, course: &str) -> Option<&Requisite> {
        self.members
            .binary_search_by(|m| m.course.as_str().cmp(course))
            .ok()
            .map(|idx| &self.members[idx])
    }

    /// Iterate over members in course-name order
    pub fn iter(&self) -> std::slice::Iter<'_, Requisite> {
        self.members.iter()
    }

    /// Iterate over member course names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.course.as_str())
    }

    /// Number of alternatives
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no alternatives
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<R: Into<Requisite>> FromIterator<R> for OrSet {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        let mut set = Self::new();
        for requisite in iter {
            set.insert(requisite.into());
        }
        set
    }
}

impl From<Vec<Requisite>> for OrSet {
    fn from(members: Vec<Requisite>) -> Self {
        members.into_iter().collect()
    }
}

impl From<OrSet> for Vec<Requisite> {
    fn from(set: OrSet) -> Self {
        set.members
    }
}

impl<'a> IntoIterator for &'a OrSet {
    type Item = &'a Requisite;
    type IntoIter = std::slice::Iter<'a, Requisite>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for OrSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.members.iter().map(ToString::to_string).collect();
        write!(f, "({})", parts.join(" OR "))
    }
}

/// Courses completed so far, with the mark achieved when known
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionRecord {
    marks: HashMap<String, Option<MinimumMark>>,
}

impl CompletionRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completion without a mark
    pub fn complete(&mut self, course: impl Into<String>) {
        self.marks.entry(course.into()).or_insert(None);
    }

    /// Record a completion with the achieved grade or score
    pub fn complete_with(&mut self, course: impl Into<String>, mark: MinimumMark) {
        self.marks.insert(course.into(), Some(mark));
    }

    /// Whether `course` has been completed
    #[must_use]
    pub fn contains(&self, course: &str) -> bool {
        self.marks.contains_key(course)
    }

    /// Mark recorded for `course`, if it was completed with one
    #[must_use]
    pub fn mark(&self, course: &str) -> Option<&MinimumMark> {
        self.marks.get(course).and_then(Option::as_ref)
    }

    /// Whether this record satisfies a single requisite member
    #[must_use]
    pub fn meets(&self, requisite: &Requisite) -> bool {
        self.marks.get(&requisite.course).is_some_and(|achieved| {
            requisite
                .minimum
                .as_ref()
                .is_none_or(|minimum| minimum.is_met_by(achieved.as_ref()))
        })
    }

    /// Iterate over completed course names (unordered)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.marks.keys().map(String::as_str)
    }

    /// Number of completed courses
    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether nothing has been completed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CompletionRecord {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut record = Self::new();
        for course in iter {
            record.complete(course);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_parse_and_order() {
        assert_eq!("b+".parse::<Grade>(), Ok(Grade::BPlus));
        assert_eq!(" C ".parse::<Grade>(), Ok(Grade::C));
        assert!("E".parse::<Grade>().is_err());
        assert!(Grade::A > Grade::AMinus);
        assert!(Grade::CMinus < Grade::C);
        assert_eq!(Grade::DPlus.to_string(), "D+");
    }

    #[test]
    fn test_minimum_mark_best_effort() {
        let min_c = MinimumMark::Grade(Grade::C);
        assert!(min_c.is_met_by(None));
        assert!(min_c.is_met_by(Some(&MinimumMark::Grade(Grade::B))));
        assert!(!min_c.is_met_by(Some(&MinimumMark::Grade(Grade::CMinus))));
        // Different kinds cannot be compared and count as met
        assert!(min_c.is_met_by(Some(&MinimumMark::Score(1))));

        let min_four = MinimumMark::Score(4);
        assert!(min_four.is_met_by(Some(&MinimumMark::Score(5))));
        assert!(!min_four.is_met_by(Some(&MinimumMark::Score(3))));
    }

    #[test]
    fn test_or_set_is_order_insensitive() {
        let first = OrSet::any_of(["CSE 46", "I&C SCI 46"]);
        let second = OrSet::any_of(["I&C SCI 46", "CSE 46", "CSE 46"]);
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
        assert_eq!(first.names().collect::<Vec<_>>(), vec!["CSE 46", "I&C SCI 46"]);
    }

    #[test]
    fn test_or_set_insert_keeps_first_member() {
        let mut set = OrSet::new();
        assert!(set.insert(Requisite::new("MATH 2B").with_minimum(MinimumMark::Grade(Grade::C))));
        assert!(!set.insert(Requisite::new("MATH 2B")));
        assert_eq!(
            set.get("MATH 2B").and_then(|r| r.minimum),
            Some(MinimumMark::Grade(Grade::C))
        );
    }

    #[test]
    fn test_or_set_display() {
        let set: OrSet = vec![
            Requisite::new("AP CALCULUS BC").with_minimum(MinimumMark::Score(4)),
            Requisite::new("MATH 2B"),
        ]
        .into();
        assert_eq!(set.to_string(), "(AP CALCULUS BC (min score = 4) OR MATH 2B)");
    }

    #[test]
    fn test_completion_record_meets() {
        let mut record = CompletionRecord::new();
        record.complete("MATH 2B");
        record.complete_with("CSE 46", MinimumMark::Grade(Grade::D));

        assert!(record.meets(&Requisite::new("MATH 2B")));
        assert!(record.meets(&Requisite::new("MATH 2B").with_minimum(MinimumMark::Grade(Grade::A))));
        assert!(!record.meets(&Requisite::new("CSE 46").with_minimum(MinimumMark::Grade(Grade::C))));
        assert!(!record.meets(&Requisite::new("I&C SCI 46")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_complete_does_not_erase_mark() {
        let mut record = CompletionRecord::new();
        record.complete_with("STATS 67", MinimumMark::Grade(Grade::B));
        record.complete("STATS 67");
        assert_eq!(record.mark("STATS 67"), Some(&MinimumMark::Grade(Grade::B)));
    }
}
