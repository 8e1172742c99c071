//! Prerequisite-aware quarter planning
//!
//! Courses form a graph whose prerequisites are an AND of OR-sets. The
//! [`Scheduler`](crate::core::scheduler::Scheduler) packs a table of required courses
//! into consecutive quarters under a unit cap and reports the plan with a
//! lower bound on its length.

pub mod core;
pub mod shared;

pub use crate::core::{config, error, models, scheduler};
pub use shared::*;
