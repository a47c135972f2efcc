//! Candidate-to-job compatibility scoring and application lifecycle for recruiting
//! workflows.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
