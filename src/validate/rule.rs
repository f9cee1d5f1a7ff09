//! Validation rule definitions.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::alias::is_alias;
use crate::error::Error;
use crate::tokens::TokenValue;

/// How serious a rule violation is.
///
/// Severity is informational: it is carried into each violation but does not
/// change whether a report is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a rule's pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    /// The key name at every level of the tree (naming rules).
    #[default]
    Key,
    /// The text of scalar leaf values (format and unit rules).
    ///
    /// Alias leaves and arrays are skipped.
    Value,
}

/// A named pattern rule applied to every key path of a token tree.
///
/// # Example
///
/// ```rust
/// use themekit::{RuleTarget, Severity, ValidationRule};
///
/// let kebab = ValidationRule::new("kebab-case", r"^[a-z0-9]+(-[a-z0-9]+)*$", "keys must be kebab-case")
///     .unwrap()
///     .with_severity(Severity::Warning);
///
/// let px = ValidationRule::new("px-units", r"^\d+px$", "spacing must be in px")
///     .unwrap()
///     .with_target(RuleTarget::Value);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationRule {
    name: String,
    pattern: Regex,
    message: String,
    severity: Severity,
    target: RuleTarget,
}

impl ValidationRule {
    /// Creates a key rule with error severity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] if `pattern` is not a valid regex.
    pub fn new(name: &str, pattern: &str, message: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidRule {
            name: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
            message: message.to_string(),
            severity: Severity::Error,
            target: RuleTarget::Key,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_target(mut self, target: RuleTarget) -> Self {
        self.target = target;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn target(&self) -> RuleTarget {
        self.target
    }

    /// Built-in rules used when configuration supplies none.
    ///
    /// - `key-no-dots`: a dot in a key makes its path ambiguous.
    /// - `key-no-whitespace`: keys must not contain whitespace.
    pub fn defaults() -> Vec<ValidationRule> {
        vec![
            ValidationRule {
                name: "key-no-dots".to_string(),
                pattern: Regex::new(r"^[^.]+$").unwrap(),
                message: "token keys must not contain dots".to_string(),
                severity: Severity::Error,
                target: RuleTarget::Key,
            },
            ValidationRule {
                name: "key-no-whitespace".to_string(),
                pattern: Regex::new(r"^\S+$").unwrap(),
                message: "token keys must not contain whitespace".to_string(),
                severity: Severity::Warning,
                target: RuleTarget::Key,
            },
        ]
    }

    /// Checks one `(path, key, value)` triple, returning a violation on a miss.
    pub fn check(&self, path: &str, key: &str, value: &TokenValue) -> Option<Violation> {
        let subject = match self.target {
            RuleTarget::Key => key.to_string(),
            RuleTarget::Value => match value {
                TokenValue::Tree(_) | TokenValue::Array(_) => return None,
                _ if is_alias(value) => return None,
                _ => value.to_string(),
            },
        };
        if self.pattern.is_match(&subject) {
            return None;
        }
        Some(Violation {
            rule: self.name.clone(),
            path: path.to_string(),
            severity: self.severity,
            message: self.message.clone(),
        })
    }
}

/// A rule as written in configuration.
///
/// Every field is optional so that a partially written rule can be skipped
/// instead of failing the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub target: RuleTarget,
}

impl RuleDefinition {
    /// Compiles the definition.
    ///
    /// Returns `Ok(None)` for an incomplete definition (no name or no pattern).
    pub fn compile(&self) -> Result<Option<ValidationRule>, Error> {
        let (Some(name), Some(pattern)) = (&self.name, &self.pattern) else {
            tracing::warn!(name = ?self.name, pattern = ?self.pattern, "skipping incomplete validation rule");
            return Ok(None);
        };
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("does not match pattern {}", pattern));
        let rule = ValidationRule::new(name, pattern, &message)?
            .with_severity(self.severity)
            .with_target(self.target);
        Ok(Some(rule))
    }
}

/// A single rule miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: String,
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} at '{}' (rule: {})",
            self.severity, self.message, self.path, self.rule
        )
    }
}
