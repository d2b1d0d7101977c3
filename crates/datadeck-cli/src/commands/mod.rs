//! CLI command implementations.

pub mod pipelines;
pub mod schedule;
