//! Token values.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::tree::TokenTree;

/// A single design value.
///
/// Token values form a closed set: every recursive walk over a tree matches
/// on these variants exhaustively. String values may be alias references
/// (`"{colors.primary}"`), see [`crate::alias`].
///
/// # Example
///
/// ```rust
/// use themekit::TokenValue;
///
/// let size = TokenValue::from(16);
/// let color = TokenValue::from("#0066ff");
/// let alias = TokenValue::from("{colors.primary}");
///
/// assert_eq!(size.to_string(), "16");
/// assert_eq!(color.as_str(), Some("#0066ff"));
/// assert!(themekit::is_alias(&alias));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Bool(bool),
    Number(Number),
    String(String),
    /// Arrays are leaves: they are never merged element-wise nor walked for aliases.
    Array(Vec<TokenValue>),
    Tree(TokenTree),
}

impl TokenValue {
    /// Returns the string content for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the subtree for tree values.
    pub fn as_tree(&self) -> Option<&TokenTree> {
        match self {
            TokenValue::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns true for nested trees.
    pub fn is_tree(&self) -> bool {
        matches!(self, TokenValue::Tree(_))
    }

    /// Human-readable name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenValue::Bool(_) => "boolean",
            TokenValue::Number(_) => "number",
            TokenValue::String(_) => "string",
            TokenValue::Array(_) => "array",
            TokenValue::Tree(_) => "tree",
        }
    }
}

impl std::fmt::Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::Bool(b) => write!(f, "{}", b),
            TokenValue::Number(n) => write!(f, "{}", n),
            TokenValue::String(s) => write!(f, "{}", s),
            TokenValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            TokenValue::Tree(tree) => {
                let json = serde_json::to_string(tree).map_err(|_| std::fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl From<&str> for TokenValue {
    fn from(s: &str) -> Self {
        TokenValue::String(s.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(s: String) -> Self {
        TokenValue::String(s)
    }
}

impl From<bool> for TokenValue {
    fn from(b: bool) -> Self {
        TokenValue::Bool(b)
    }
}

impl From<i64> for TokenValue {
    fn from(n: i64) -> Self {
        TokenValue::Number(n.into())
    }
}

impl From<i32> for TokenValue {
    fn from(n: i32) -> Self {
        TokenValue::Number(n.into())
    }
}

impl From<u64> for TokenValue {
    fn from(n: u64) -> Self {
        TokenValue::Number(n.into())
    }
}

impl From<Vec<TokenValue>> for TokenValue {
    fn from(items: Vec<TokenValue>) -> Self {
        TokenValue::Array(items)
    }
}

impl From<TokenTree> for TokenValue {
    fn from(tree: TokenTree) -> Self {
        TokenValue::Tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(TokenValue::from("#fff").to_string(), "#fff");
        assert_eq!(TokenValue::from(4).to_string(), "4");
        assert_eq!(TokenValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_display_array() {
        let value = TokenValue::from(vec![TokenValue::from("Inter"), TokenValue::from("sans-serif")]);
        assert_eq!(value.to_string(), "Inter, sans-serif");
    }

    #[test]
    fn test_deserialize_variants() {
        let value: TokenValue = serde_json::from_str(r#"{"a": [1, "x"], "b": false}"#).unwrap();
        let tree = value.as_tree().unwrap();
        assert_eq!(tree.get("b"), Some(&TokenValue::Bool(false)));
        assert_eq!(tree.get("a").map(TokenValue::kind), Some("array"));
    }

    #[test]
    fn test_float_round_trips_as_number() {
        let value: TokenValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(value.kind(), "number");
        assert_eq!(serde_json::to_string(&value).unwrap(), "1.5");
    }

    #[test]
    fn test_null_is_rejected() {
        let result: Result<TokenValue, _> = serde_json::from_str("null");
        assert!(result.is_err());
    }
}
