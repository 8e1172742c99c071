//! Data models for the planner

pub mod course;
pub mod graph;
pub mod quarter;
pub mod requirements;
pub mod requisite;

pub use course::{Course, MeetingTime};
pub use graph::CourseGraph;
pub use quarter::{quarter_label, Quarter, QUARTERS_PER_YEAR};
pub use requirements::{RequirementGroup, RequirementTable};
pub use requisite::{CompletionRecord, Grade, MinimumMark, OrSet, Requisite};
