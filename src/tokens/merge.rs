//! Deep merge of token trees.

use super::tree::TokenTree;
use super::value::TokenValue;

/// Deep-merges `overrides` on top of `base`, returning a new tree.
///
/// For every key in `overrides`:
///
/// - if both sides hold a subtree, the subtrees are merged key-wise;
/// - otherwise the override value replaces the base value wholesale.
///
/// Arrays are leaves and are replaced, never merged element-wise. Neither
/// input is modified.
///
/// # Example
///
/// ```rust
/// use themekit::{merge, TokenTree};
///
/// let base = TokenTree::from_json(r##"{"colors": {"bg": "#fff", "fg": "#000"}}"##).unwrap();
/// let dark = TokenTree::from_json(r##"{"colors": {"bg": "#111"}}"##).unwrap();
///
/// let merged = merge(&base, &dark);
/// assert_eq!(merged.get_path("colors.bg").unwrap().as_str(), Some("#111"));
/// assert_eq!(merged.get_path("colors.fg").unwrap().as_str(), Some("#000"));
/// ```
pub fn merge(base: &TokenTree, overrides: &TokenTree) -> TokenTree {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match (merged.get(key), value) {
            (Some(TokenValue::Tree(base_child)), TokenValue::Tree(override_child)) => {
                TokenValue::Tree(merge(base_child, override_child))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
