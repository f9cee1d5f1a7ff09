//! Alias resolution with cycle detection and a depth bound.

use std::collections::HashSet;

use super::error::AliasError;
use super::parse_alias;
use crate::tokens::{join_path, TokenTree, TokenValue};

/// Default bound on the number of alias hops followed for one value.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Resolves every alias in `tree`, returning a new tree of literal values.
///
/// Targets are always looked up in the input tree, never in the partially
/// resolved output, so the order in which keys are visited cannot change the
/// result. A target that is itself an alias is followed; a target that is a
/// subtree is returned with its own aliases resolved. Arrays are copied
/// untouched.
///
/// # Errors
///
/// - [`AliasError::Unresolved`] if a target path does not exist.
/// - [`AliasError::Circular`] if a path is reached again while it is still
///   being resolved.
/// - [`AliasError::MaxDepthExceeded`] if following a chain takes more than
///   `max_depth` hops.
pub fn resolve_aliases(tree: &TokenTree, max_depth: usize) -> Result<TokenTree, AliasError> {
    let mut resolver = Resolver {
        snapshot: tree,
        max_depth,
        resolving: HashSet::new(),
    };
    resolver.resolve_tree(tree, "", 0)
}

struct Resolver<'a> {
    snapshot: &'a TokenTree,
    max_depth: usize,
    /// Paths whose resolution is currently in flight.
    resolving: HashSet<String>,
}

impl Resolver<'_> {
    fn resolve_tree(&mut self, tree: &TokenTree, prefix: &str, depth: usize) -> Result<TokenTree, AliasError> {
        let mut out = TokenTree::new();
        for (key, value) in tree {
            let path = join_path(prefix, key);
            let entered = self.resolving.insert(path.clone());
            let resolved = self.resolve_value(value, &path, depth)?;
            if entered {
                self.resolving.remove(&path);
            }
            out.insert(key.clone(), resolved);
        }
        Ok(out)
    }

    /// Resolves the value stored at `path`, reached after `depth` hops.
    fn resolve_value(&mut self, value: &TokenValue, path: &str, depth: usize) -> Result<TokenValue, AliasError> {
        match value {
            TokenValue::Tree(subtree) => Ok(TokenValue::Tree(self.resolve_tree(subtree, path, depth)?)),
            TokenValue::String(s) => match parse_alias(s) {
                Some(target) => self.follow(path, target, depth + 1),
                None => Ok(value.clone()),
            },
            TokenValue::Bool(_) | TokenValue::Number(_) | TokenValue::Array(_) => Ok(value.clone()),
        }
    }

    fn follow(&mut self, path: &str, target: &str, depth: usize) -> Result<TokenValue, AliasError> {
        if depth > self.max_depth {
            return Err(AliasError::MaxDepthExceeded {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }
        if !self.resolving.insert(target.to_string()) {
            return Err(AliasError::Circular {
                path: path.to_string(),
                target: target.to_string(),
            });
        }

        let snapshot = self.snapshot;
        let value = snapshot
            .get_path(target)
            .ok_or_else(|| AliasError::Unresolved {
                path: path.to_string(),
                target: target.to_string(),
            })?;
        let resolved = self.resolve_value(value, target, depth)?;

        self.resolving.remove(target);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TokenTree {
        TokenTree::from_value(value).unwrap()
    }

    fn chain(hops: usize) -> TokenTree {
        let mut t = TokenTree::new();
        for i in 0..hops {
            t.insert(format!("t{}", i), format!("{{t{}}}", i + 1));
        }
        t.insert(format!("t{}", hops), "end");
        t
    }

    #[test]
    fn test_resolves_simple_alias() {
        let resolved = resolve_aliases(&tree(json!({"a": {"b": "#111"}, "c": "{a.b}"})), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(resolved, tree(json!({"a": {"b": "#111"}, "c": "#111"})));
    }

    #[test]
    fn test_resolves_alias_to_alias_regardless_of_key_order() {
        let t = tree(json!({"a": "{b}", "b": "{c}", "c": 4}));
        let resolved = resolve_aliases(&t, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(resolved, tree(json!({"a": 4, "b": 4, "c": 4})));
    }

    #[test]
    fn test_resolves_alias_to_subtree() {
        let t = tree(json!({
            "base": {"fg": "{ink}", "bg": "#fff"},
            "ink": "#000",
            "card": "{base}"
        }));
        let resolved = resolve_aliases(&t, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(resolved.get_path("card.fg"), Some(&TokenValue::from("#000")));
        assert_eq!(resolved.get_path("card.bg"), Some(&TokenValue::from("#fff")));
    }

    #[test]
    fn test_non_alias_values_copied() {
        let t = tree(json!({"n": 1.5, "b": true, "list": ["{n}", 2], "s": "not {an} alias"}));
        assert_eq!(resolve_aliases(&t, DEFAULT_MAX_DEPTH).unwrap(), t);
    }

    #[test]
    fn test_input_is_not_modified() {
        let t = tree(json!({"a": "{b}", "b": 1}));
        let before = t.clone();
        let _ = resolve_aliases(&t, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn test_circular_pair_fails() {
        let result = resolve_aliases(&tree(json!({"a": "{b}", "b": "{a}"})), DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(AliasError::Circular { .. })));
    }

    #[test]
    fn test_self_reference_fails() {
        let result = resolve_aliases(&tree(json!({"a": "{a}"})), DEFAULT_MAX_DEPTH);
        assert_eq!(
            result,
            Err(AliasError::Circular {
                path: "a".into(),
                target: "a".into()
            })
        );
    }

    #[test]
    fn test_reference_to_own_ancestor_fails() {
        let result = resolve_aliases(&tree(json!({"a": {"x": "{a}"}})), DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(AliasError::Circular { .. })));
    }

    #[test]
    fn test_long_cycle_is_circular_not_depth() {
        let t = tree(json!({"a": "{b}", "b": "{c}", "c": "{d}", "d": "{a}"}));
        let result = resolve_aliases(&t, DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(AliasError::Circular { .. })));
    }

    #[test]
    fn test_missing_target_fails() {
        let result = resolve_aliases(&tree(json!({"a": "{missing.path}"})), DEFAULT_MAX_DEPTH);
        assert_eq!(
            result,
            Err(AliasError::Unresolved {
                path: "a".into(),
                target: "missing.path".into()
            })
        );
    }

    #[test]
    fn test_chain_at_depth_bound_resolves() {
        let resolved = resolve_aliases(&chain(DEFAULT_MAX_DEPTH), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(resolved.get("t0"), Some(&TokenValue::from("end")));
    }

    #[test]
    fn test_chain_beyond_depth_bound_fails() {
        let result = resolve_aliases(&chain(DEFAULT_MAX_DEPTH + 1), DEFAULT_MAX_DEPTH);
        assert!(matches!(
            result,
            Err(AliasError::MaxDepthExceeded { max_depth: DEFAULT_MAX_DEPTH, .. })
        ));
    }

    #[test]
    fn test_zero_depth_rejects_any_alias() {
        let result = resolve_aliases(&tree(json!({"a": "{b}", "b": 1})), 0);
        assert!(matches!(result, Err(AliasError::MaxDepthExceeded { .. })));
        assert!(resolve_aliases(&tree(json!({"b": 1})), 0).is_ok());
    }
}
