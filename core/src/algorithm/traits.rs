//! Core algorithm trait definitions
//!
//! Every solver in the crate exposes the same small surface: a stable name,
//! a category used for grouping, a human readable description and a string
//! keyed parameter interface so callers can tune limits without depending on
//! solver specific builder methods.

use std::collections::HashMap;
use std::fmt::Debug;

/// Comprehensive error types for algorithm configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Main algorithm trait
///
/// # Invariants
/// - Parameters set through `set_parameter` are observable through
///   `get_parameter` and `get_parameters` until overwritten.
/// - A rejected parameter leaves the previous configuration untouched.
pub trait Algorithm: Debug + Send + Sync {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g. max_flow)
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description with complexity guarantees
    fn description(&self) -> &'static str;

    /// Sets algorithm parameter with validation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<&str>;

    /// Snapshot of every parameter currently set
    fn get_parameters(&self) -> HashMap<String, String>;
}
