//! Centralized error types for the harvest pipeline.

pub mod types;

pub use types::{FetchError, HarvestError, IndexError, LoadError, TransformError};
