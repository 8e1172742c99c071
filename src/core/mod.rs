//! Core planning functionality: course models, the scheduler and configuration

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;

/// Returns the current version of the `quarter-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
