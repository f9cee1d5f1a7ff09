//! Error types for theme resolution and configuration.

use thiserror::Error;

use crate::alias::AliasError;

/// Errors raised by the token engine.
///
/// Rule violations are not errors: they are returned as data in a
/// [`ValidationReport`](crate::ValidationReport). The one exception is
/// [`Error::Validation`], raised when strict validation rejects a theme at
/// registration time.
#[derive(Debug, Error)]
pub enum Error {
    /// Switching to (or resolving) a theme that is not registered.
    #[error("theme '{name}' not found")]
    ThemeNotFound { name: String },

    /// Theme names must be non-empty.
    #[error("theme name must not be empty")]
    InvalidThemeName,

    /// Alias resolution failed.
    #[error(transparent)]
    Alias(#[from] AliasError),

    /// A theme's `extends` chain loops back on itself.
    #[error("theme inheritance cycle: {}", chain.join(" -> "))]
    ExtendsCycle { chain: Vec<String> },

    /// Tokens are not shaped like a token tree.
    #[error("invalid tokens: {0}")]
    InvalidTokens(String),

    /// Strict validation rejected a theme.
    #[error("theme '{theme}' failed validation with {} violation(s):\n  {}", errors.len(), errors.join("\n  "))]
    Validation { theme: String, errors: Vec<String> },

    /// A validation rule's pattern is not a valid regular expression.
    #[error("invalid pattern for rule '{name}': {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::ThemeNotFound {
            name: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "theme 'ghost' not found");
    }

    #[test]
    fn test_extends_cycle_display() {
        let err = Error::ExtendsCycle {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn test_validation_display_lists_errors() {
        let err = Error::Validation {
            theme: "dark".to_string(),
            errors: vec!["first".to_string(), "second".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dark"));
        assert!(msg.contains("2 violation(s)"));
        assert!(msg.contains("first"));
        assert!(msg.contains("second"));
    }

    #[test]
    fn test_alias_error_is_transparent() {
        let err: Error = AliasError::Unresolved {
            path: "a".to_string(),
            target: "missing".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            AliasError::Unresolved {
                path: "a".to_string(),
                target: "missing".to_string(),
            }
            .to_string()
        );
    }
}
