//! Core domain types and traits for the Datadeck pipeline console.
//!
//! This crate contains:
//! - Deployment identifiers and common types
//! - Pipeline aggregate, lock and last-run records
//! - Schedule value objects (manual / daily / weekly)
//! - The `PipelineApi` collaborator trait consumed by the console
//! - Error types

pub mod api;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod schedule;

pub use api::PipelineApi;
pub use error::{Error, Result};
pub use id::DeploymentId;
