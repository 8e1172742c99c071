//! Shared module for functionality used across the crate

pub mod logger;

/// Returns the current version of the `quarter-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
