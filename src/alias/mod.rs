//! Alias references between tokens.
//!
//! A string token whose entire value is `{<dot-path>}` is an alias: it stands
//! for the resolved value found at that path in the same tree.
//!
//! ```rust
//! use themekit::{resolve_aliases, TokenTree, DEFAULT_MAX_DEPTH};
//!
//! let tree = TokenTree::from_json(r##"{
//!     "palette": { "blue": "#0066ff" },
//!     "colors": { "primary": "{palette.blue}", "link": "{colors.primary}" }
//! }"##).unwrap();
//!
//! let resolved = resolve_aliases(&tree, DEFAULT_MAX_DEPTH).unwrap();
//! assert_eq!(resolved.get_path("colors.link").unwrap().as_str(), Some("#0066ff"));
//! ```
//!
//! Resolution fails with [`AliasError`] when a target is missing, when
//! references form a cycle, or when a chain is longer than the depth bound.

mod error;
mod resolver;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::tokens::{join_path, TokenTree, TokenValue};

pub use error::AliasError;
pub use resolver::{resolve_aliases, DEFAULT_MAX_DEPTH};

static ALIAS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([^}]+)\}$").unwrap());

/// Returns the target path if `s` is an alias reference.
pub fn parse_alias(s: &str) -> Option<&str> {
    ALIAS_PATTERN
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns true if the value is an alias reference.
pub fn is_alias(value: &TokenValue) -> bool {
    alias_path(value).is_some()
}

/// Returns the dot-path an alias value points at.
pub fn alias_path(value: &TokenValue) -> Option<&str> {
    value.as_str().and_then(parse_alias)
}

/// An alias found in a tree, as reported by [`find_aliases`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRef {
    /// Where the alias lives.
    pub path: String,
    /// The raw alias text, braces included.
    pub alias: String,
    /// The dot-path it points at.
    pub target: String,
}

/// Lists every alias leaf in the tree without resolving anything.
pub fn find_aliases(tree: &TokenTree) -> Vec<AliasRef> {
    let mut found = Vec::new();
    collect_aliases(tree, "", &mut found);
    found
}

fn collect_aliases(tree: &TokenTree, prefix: &str, found: &mut Vec<AliasRef>) {
    for (key, value) in tree {
        let path = join_path(prefix, key);
        match value {
            TokenValue::Tree(subtree) => collect_aliases(subtree, &path, found),
            TokenValue::String(s) => {
                if let Some(target) = parse_alias(s) {
                    found.push(AliasRef {
                        path,
                        alias: s.clone(),
                        target: target.to_string(),
                    });
                }
            }
            TokenValue::Bool(_) | TokenValue::Number(_) | TokenValue::Array(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_alias() {
        assert_eq!(parse_alias("{colors.blue500}"), Some("colors.blue500"));
        assert_eq!(parse_alias("{a}"), Some("a"));
    }

    #[test]
    fn test_parse_alias_rejects_partial_matches() {
        assert_eq!(parse_alias("{}"), None);
        assert_eq!(parse_alias("prefix {a}"), None);
        assert_eq!(parse_alias("{a} suffix"), None);
        assert_eq!(parse_alias("{a}{b}"), None);
        assert_eq!(parse_alias("#fff"), None);
    }

    #[test]
    fn test_is_alias_only_for_strings() {
        assert!(is_alias(&TokenValue::from("{a.b}")));
        assert!(!is_alias(&TokenValue::from(3)));
        assert!(!is_alias(&TokenValue::from(vec![TokenValue::from("{a}")])));
    }

    #[test]
    fn test_alias_path() {
        assert_eq!(alias_path(&TokenValue::from("{spacing.md}")), Some("spacing.md"));
        assert_eq!(alias_path(&TokenValue::from("16px")), None);
    }

    #[test]
    fn test_find_aliases_lists_leaves_verbatim() {
        let tree = TokenTree::from_value(json!({
            "a": "{b}",
            "b": "{a}",
            "nested": {"x": "{missing.path}", "y": "plain"},
            "list": ["{a}"]
        }))
        .unwrap();

        let found = find_aliases(&tree);
        assert_eq!(
            found,
            vec![
                AliasRef {
                    path: "a".into(),
                    alias: "{b}".into(),
                    target: "b".into()
                },
                AliasRef {
                    path: "b".into(),
                    alias: "{a}".into(),
                    target: "a".into()
                },
                AliasRef {
                    path: "nested.x".into(),
                    alias: "{missing.path}".into(),
                    target: "missing.path".into()
                },
            ]
        );
    }
}
