//! Pattern-rule validation of token trees.
//!
//! Every rule visits every key at every level of the tree. Misses are
//! collected, never raised: a [`ValidationReport`] lists all violations in
//! rule order, then tree order.
//!
//! Severity does not partition the report. Warnings and errors land in the
//! same list and both make the report invalid; callers that only care about
//! errors filter with [`ValidationReport::with_severity`].
//!
//! ```rust
//! use themekit::{validate_tree, TokenTree, ValidationRule};
//!
//! let tokens = TokenTree::from_json(r##"{"colors": {"Primary": "#06f", "muted": "#999"}}"##).unwrap();
//! let rules = vec![ValidationRule::new("lowercase", "^[a-z0-9-]+$", "keys must be lowercase").unwrap()];
//!
//! let report = validate_tree(&tokens, &rules);
//! assert!(!report.is_valid());
//! assert_eq!(report.violations()[0].path, "colors.Primary");
//! ```

mod rule;

use serde::Serialize;

use crate::config::ValidationConfig;
use crate::error::Error;
use crate::tokens::{join_path, TokenTree, TokenValue};

pub use rule::{RuleDefinition, RuleTarget, Severity, ValidationRule, Violation};

/// The outcome of validating a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// True iff no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// One message per violation, in report order.
    pub fn errors(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }

    /// Violations of a single severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates arbitrary token data against `rules`.
///
/// Disabled validation always yields a valid, empty report.
///
/// # Errors
///
/// Returns [`Error::InvalidTokens`] if `tokens` is not a tree.
pub fn validate(
    tokens: &TokenValue,
    rules: &[ValidationRule],
    config: &ValidationConfig,
) -> Result<ValidationReport, Error> {
    if !config.enabled {
        return Ok(ValidationReport::default());
    }
    match tokens {
        TokenValue::Tree(tree) => Ok(validate_tree(tree, rules)),
        other => Err(Error::InvalidTokens(format!(
            "expected a tree of tokens, found {}",
            other.kind()
        ))),
    }
}

/// Validates a tree against `rules`, without consulting configuration.
pub fn validate_tree(tree: &TokenTree, rules: &[ValidationRule]) -> ValidationReport {
    let mut violations = Vec::new();
    for rule in rules {
        check_tree(rule, tree, "", &mut violations);
    }
    ValidationReport { violations }
}

fn check_tree(rule: &ValidationRule, tree: &TokenTree, prefix: &str, out: &mut Vec<Violation>) {
    for (key, value) in tree {
        let path = join_path(prefix, key);
        if let Some(violation) = rule.check(&path, key, value) {
            out.push(violation);
        }
        if let TokenValue::Tree(subtree) = value {
            check_tree(rule, subtree, &path, out);
        }
    }
}
