//! Token trees and the pure operations over them.
//!
//! This module provides:
//!
//! - [`TokenValue`]: A single design value (string, number, bool, array or subtree)
//! - [`TokenTree`]: A nested, string-keyed collection of token values
//! - [`merge`]: Deep-merge of two trees, override wins
//! - [`diff`]: Leaf-level comparison of two trees
//!
//! Trees are addressed with dot-paths: `colors.blue.500` walks the `colors`
//! subtree, then `blue`, then reads the `500` leaf.

mod diff;
mod merge;
mod tree;
mod value;

pub use diff::{diff, TokenChange};
pub use merge::merge;
pub use tree::TokenTree;
pub use value::TokenValue;

/// Separator between segments of a token path.
pub const PATH_SEPARATOR: char = '.';

/// Joins a parent path and a key into a dot-path.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, PATH_SEPARATOR, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path_root() {
        assert_eq!(join_path("", "colors"), "colors");
    }

    #[test]
    fn test_join_path_nested() {
        assert_eq!(join_path("colors.blue", "500"), "colors.blue.500");
    }
}
