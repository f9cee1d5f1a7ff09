//! Nested token collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::TokenValue;
use super::{join_path, PATH_SEPARATOR};
use crate::error::Error;

/// A nested, string-keyed collection of design tokens.
///
/// Keys are unique within a level. Iteration order is sorted by key so that
/// diagnostics and generated output are deterministic.
///
/// # Example
///
/// ```rust
/// use themekit::{TokenTree, TokenValue};
///
/// let tree = TokenTree::from_json(r##"{
///     "colors": { "primary": "#0066ff" },
///     "spacing": { "md": 16 }
/// }"##).unwrap();
///
/// assert_eq!(tree.get_path("colors.primary"), Some(&TokenValue::from("#0066ff")));
/// assert_eq!(tree.get_path("spacing.lg"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenTree(BTreeMap<String, TokenValue>);

impl TokenTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a tree from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTokens`] if the document is not an object, or
    /// a parse error if it is not valid JSON or contains `null`.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        Self::from_value(value)
    }

    /// Parses a tree from YAML text.
    pub fn from_yaml(source: &str) -> Result<Self, Error> {
        let value: serde_json::Value = serde_yaml::from_str(source)?;
        Self::from_value(value)
    }

    /// Converts a JSON value into a tree.
    ///
    /// This is where the structural check lives: anything other than an
    /// object at the top level is rejected.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        if !value.is_object() {
            return Err(Error::InvalidTokens(format!(
                "expected an object of tokens, found {}",
                json_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Converts the tree into a JSON value.
    pub fn to_json_value(&self) -> serde_json::Value {
        // A tree holds no non-string keys and no non-finite floats, so this cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the direct child with the given key.
    pub fn get(&self, key: &str) -> Option<&TokenValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a direct child, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TokenValue>) -> Option<TokenValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<TokenValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TokenValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Looks up a value by dot-path.
    ///
    /// Returns `None` as soon as a segment is missing or a non-tree value is
    /// reached before the last segment.
    pub fn get_path(&self, path: &str) -> Option<&TokenValue> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_tree()?.0.get(segment)?;
        }
        Some(current)
    }

    /// Sets a value at a dot-path, creating intermediate trees as needed.
    ///
    /// An intermediate segment holding a non-tree value is replaced by a tree.
    pub fn set_path(&mut self, path: &str, value: impl Into<TokenValue>) {
        let value = value.into();
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.0.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let child = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| TokenValue::Tree(TokenTree::new()));
                if !child.is_tree() {
                    *child = TokenValue::Tree(TokenTree::new());
                }
                if let TokenValue::Tree(subtree) = child {
                    subtree.set_path(rest, value);
                }
            }
        }
    }

    /// Returns every leaf (non-tree value) with its full dot-path.
    ///
    /// Arrays count as leaves. Empty subtrees contribute nothing.
    pub fn leaves(&self) -> Vec<(String, &TokenValue)> {
        let mut out = Vec::new();
        collect_leaves(self, "", &mut out);
        out
    }
}

fn collect_leaves<'a>(tree: &'a TokenTree, prefix: &str, out: &mut Vec<(String, &'a TokenValue)>) {
    for (key, value) in &tree.0 {
        let path = join_path(prefix, key);
        match value {
            TokenValue::Tree(subtree) => collect_leaves(subtree, &path, out),
            _ => out.push((path, value)),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<K: Into<String>, V: Into<TokenValue>> FromIterator<(K, V)> for TokenTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a TokenTree {
    type Item = (&'a String, &'a TokenValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, TokenValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for TokenTree {
    type Item = (String, TokenValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, TokenValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_value(value).unwrap()
    }

    #[test]
    fn test_get_path_nested() {
        let t = tree(json!({"colors": {"blue": {"500": "#3b82f6"}}}));
        assert_eq!(t.get_path("colors.blue.500"), Some(&TokenValue::from("#3b82f6")));
        assert!(t.get_path("colors.blue").unwrap().is_tree());
    }

    #[test]
    fn test_get_path_missing_segment() {
        let t = tree(json!({"colors": {"blue": "#00f"}}));
        assert_eq!(t.get_path("colors.red"), None);
        assert_eq!(t.get_path("sizes"), None);
    }

    #[test]
    fn test_get_path_through_leaf() {
        let t = tree(json!({"colors": {"blue": "#00f"}}));
        assert_eq!(t.get_path("colors.blue.light"), None);
    }

    #[test]
    fn test_set_path_creates_intermediate_trees() {
        let mut t = TokenTree::new();
        t.set_path("spacing.sm", 4);
        t.set_path("spacing.md", 8);
        assert_eq!(t, tree(json!({"spacing": {"sm": 4, "md": 8}})));
    }

    #[test]
    fn test_set_path_replaces_leaf_intermediate() {
        let mut t = tree(json!({"radius": "4px"}));
        t.set_path("radius.sm", "2px");
        assert_eq!(t, tree(json!({"radius": {"sm": "2px"}})));
    }

    #[test]
    fn test_leaves_flatten_with_paths() {
        let t = tree(json!({"a": {"b": 1, "c": {"d": "x"}}, "e": [1, 2], "f": {}}));
        let paths: Vec<String> = t.leaves().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.b", "a.c.d", "e"]);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let result = TokenTree::from_json("[1, 2]");
        assert!(matches!(result, Err(Error::InvalidTokens(_))));
    }

    #[test]
    fn test_from_yaml() {
        let t = TokenTree::from_yaml("colors:\n  primary: '#fff'\nspacing:\n  md: 16\n").unwrap();
        assert_eq!(t.get_path("colors.primary"), Some(&TokenValue::from("#fff")));
        assert_eq!(t.get_path("spacing.md"), Some(&TokenValue::from(16)));
    }

    #[test]
    fn test_from_iterator() {
        let t: TokenTree = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(t.len(), 2);
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_json_round_trip_value() {
        let source = json!({"a": {"b": [1, "two", true]}});
        assert_eq!(tree(source.clone()).to_json_value(), source);
    }
}
