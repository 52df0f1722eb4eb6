//! Command implementations
//!
//! Each command returns the process exit code it wants; only unexpected
//! faults surface as errors.

pub mod build;
pub mod completions;
pub mod run;
pub mod version;
