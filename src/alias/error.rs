//! Alias resolution errors.

use thiserror::Error;

/// Error returned when alias resolution fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// An alias references a path that doesn't exist in the tree.
    #[error("token '{path}' aliases non-existent token '{target}'")]
    Unresolved { path: String, target: String },

    /// Resolution of `target` was re-entered while already in flight.
    #[error("circular alias: '{path}' -> '{target}'")]
    Circular { path: String, target: String },

    /// The alias chain starting at `path` is longer than `max_depth` hops.
    #[error("alias chain for '{path}' exceeds maximum depth of {max_depth}")]
    MaxDepthExceeded { path: String, max_depth: usize },
}
