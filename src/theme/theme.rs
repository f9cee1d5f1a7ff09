//! Theme struct for building named token collections.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tokens::{TokenTree, TokenValue};

/// A named collection of tokens, optionally extending another theme.
///
/// Themes provide a fluent builder API. A theme's effective tokens are its
/// parent's resolved tokens with its own tokens merged on top.
///
/// # Example
///
/// ```rust
/// use themekit::Theme;
///
/// let light = Theme::new("light")
///     // Primitive layer - concrete values
///     .add("palette.gray.900", "#111")
///     .add("palette.white", "#fff")
///     // Semantic layer - aliases to primitives
///     .add("colors.bg", "{palette.white}")
///     .add("colors.fg", "{palette.gray.900}");
///
/// let dark = Theme::new("dark")
///     .extending("light")
///     .add("colors.bg", "{palette.gray.900}")
///     .add("colors.fg", "{palette.white}");
///
/// assert_eq!(dark.extends(), Some("light"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    name: String,
    #[serde(default)]
    tokens: TokenTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
}

impl Theme {
    /// Creates an empty theme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: TokenTree::new(),
            extends: None,
        }
    }

    /// Creates a theme from an existing token tree.
    pub fn from_tokens(name: impl Into<String>, tokens: TokenTree) -> Self {
        Self {
            name: name.into(),
            tokens,
            extends: None,
        }
    }

    /// Parses a theme definition (`name`, `tokens`, `extends`) from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses a theme definition (`name`, `tokens`, `extends`) from JSON.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }

    /// Sets the parent theme, returning the updated theme for chaining.
    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Sets a token at a dot-path, returning the updated theme for chaining.
    ///
    /// The value can be any literal or an alias string such as
    /// `"{colors.primary}"`.
    pub fn add<V: Into<TokenValue>>(mut self, path: &str, value: V) -> Self {
        self.tokens.set_path(path, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the theme's own tokens, before inheritance and aliasing.
    pub fn tokens(&self) -> &TokenTree {
        &self.tokens
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }
}
