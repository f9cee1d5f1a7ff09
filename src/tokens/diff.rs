//! Leaf-level comparison of token trees.

use std::collections::BTreeMap;

use serde::Serialize;

use super::tree::TokenTree;
use super::value::TokenValue;

/// A single difference between two token trees, keyed by leaf path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenChange {
    /// The path exists only in the newer tree.
    Added { path: String, value: TokenValue },
    /// The path exists only in the older tree.
    Removed { path: String, value: TokenValue },
    /// The path exists in both trees with different values.
    Changed {
        path: String,
        from: TokenValue,
        to: TokenValue,
    },
}

impl TokenChange {
    pub fn path(&self) -> &str {
        match self {
            TokenChange::Added { path, .. }
            | TokenChange::Removed { path, .. }
            | TokenChange::Changed { path, .. } => path,
        }
    }
}

impl std::fmt::Display for TokenChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenChange::Added { path, value } => write!(f, "+ {}: {}", path, value),
            TokenChange::Removed { path, value } => write!(f, "- {}: {}", path, value),
            TokenChange::Changed { path, from, to } => write!(f, "~ {}: {} -> {}", path, from, to),
        }
    }
}

/// Compares two trees leaf by leaf.
///
/// Changes are returned sorted by path. A path that is a leaf on one side and
/// a subtree on the other shows up as the removal of the old leaves and the
/// addition of the new ones.
pub fn diff(old: &TokenTree, new: &TokenTree) -> Vec<TokenChange> {
    let old_leaves: BTreeMap<String, &TokenValue> = old.leaves().into_iter().collect();
    let new_leaves: BTreeMap<String, &TokenValue> = new.leaves().into_iter().collect();

    let mut changes = Vec::new();
    for (path, old_value) in &old_leaves {
        match new_leaves.get(path) {
            None => changes.push(TokenChange::Removed {
                path: path.clone(),
                value: (*old_value).clone(),
            }),
            Some(new_value) if new_value != old_value => changes.push(TokenChange::Changed {
                path: path.clone(),
                from: (*old_value).clone(),
                to: (*new_value).clone(),
            }),
            Some(_) => {}
        }
    }
    for (path, new_value) in &new_leaves {
        if !old_leaves.contains_key(path) {
            changes.push(TokenChange::Added {
                path: path.clone(),
                value: (*new_value).clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.path().cmp(b.path()));
    changes
}
