//! Configuration for a [`ThemeKit`](crate::ThemeKit).
//!
//! Configuration is an explicitly constructed value handed to the kit at
//! construction time. It can be built in code or parsed from YAML or JSON:
//!
//! ```rust
//! use themekit::ThemeKitConfig;
//!
//! let config = ThemeKitConfig::from_yaml(r#"
//! defaultTheme: light
//! aliasing:
//!   enabled: true
//! persistence:
//!   storage: session
//! validation:
//!   strict: true
//!   rules:
//!     - name: lowercase
//!       pattern: "^[a-z0-9-]+$"
//!       message: keys must be lowercase
//! "#).unwrap();
//!
//! assert_eq!(config.default_theme, "light");
//! assert!(config.aliasing.enabled);
//! assert_eq!(config.aliasing.max_depth, 10);
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! documented on each type.
//!
//! A `tokens:` object is always one tree, registered under `defaultTheme`,
//! even when its top-level keys look like theme names. Named themes go under
//! `themes:`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::alias::DEFAULT_MAX_DEPTH;
use crate::error::Error;
use crate::theme::Theme;
use crate::tokens::TokenTree;
use crate::validate::{RuleDefinition, ValidationRule};

/// Name the single-tree form of `tokens` is registered under by default.
pub const DEFAULT_THEME_NAME: &str = "default";

/// Storage key the active theme name is persisted under by default.
pub const DEFAULT_PERSISTENCE_KEY: &str = "themekit-theme";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeKitConfig {
    /// Tokens to bootstrap the registry with.
    pub tokens: Option<TokenSource>,
    /// Additional themes to register after `tokens`, in order.
    pub themes: Vec<Theme>,
    /// Name for single-tree `tokens`, and the preferred initial theme.
    pub default_theme: String,
    pub aliasing: AliasingConfig,
    pub persistence: PersistenceConfig,
    pub validation: ValidationConfig,
    pub cli: CliConfig,
}

impl Default for ThemeKitConfig {
    fn default() -> Self {
        Self {
            tokens: None,
            themes: Vec::new(),
            default_theme: DEFAULT_THEME_NAME.to_string(),
            aliasing: AliasingConfig::default(),
            persistence: PersistenceConfig::default(),
            validation: ValidationConfig::default(),
            cli: CliConfig::default(),
        }
    }
}

impl ThemeKitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml(source: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses configuration from JSON text.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(source)?)
    }

    /// Sets the bootstrap tokens.
    pub fn tokens(mut self, tokens: impl Into<TokenSource>) -> Self {
        self.tokens = Some(tokens.into());
        self
    }

    /// Adds a theme to register at construction.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.themes.push(theme);
        self
    }

    pub fn default_theme(mut self, name: impl Into<String>) -> Self {
        self.default_theme = name.into();
        self
    }

    /// Enables alias resolution.
    pub fn aliasing(mut self, enabled: bool) -> Self {
        self.aliasing.enabled = enabled;
        self
    }

    /// Enables or disables persistence of the active theme name.
    pub fn persistence(mut self, enabled: bool) -> Self {
        self.persistence.enabled = enabled;
        self
    }

    pub fn storage(mut self, storage: StorageKind) -> Self {
        self.persistence.storage = storage;
        self
    }

    /// Enables or disables validation at registration time.
    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation.enabled = enabled;
        self
    }

    /// Makes validation violations fatal to registration.
    pub fn strict(mut self, strict: bool) -> Self {
        self.validation.strict = strict;
        self
    }
}

/// Bootstrap tokens.
///
/// In YAML/JSON, a string is read as [`TokenSource::Path`] and an object as
/// [`TokenSource::Tree`], so `{light: {..}, dark: {..}}` is one theme whose
/// top-level groups are `light` and `dark`. Multiple named themes are
/// configured through [`ThemeKitConfig::themes`] or built in code with
/// [`TokenSource::Themes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenSource {
    /// A file path. The engine does no file I/O, so this is only warned about.
    Path(String),
    /// A single tree, registered under `default_theme`.
    Tree(TokenTree),
    /// One tree per theme name.
    #[serde(skip_deserializing)]
    Themes(BTreeMap<String, TokenTree>),
}

impl From<TokenTree> for TokenSource {
    fn from(tree: TokenTree) -> Self {
        TokenSource::Tree(tree)
    }
}

impl From<BTreeMap<String, TokenTree>> for TokenSource {
    fn from(themes: BTreeMap<String, TokenTree>) -> Self {
        TokenSource::Themes(themes)
    }
}

/// Alias resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AliasingConfig {
    /// Off by default: alias strings are left intact.
    pub enabled: bool,
    /// Maximum alias hops followed for one value. Defaults to 10.
    pub max_depth: usize,
}

impl Default for AliasingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where the active theme name is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// A JSON file at `persistence.path` that outlives the process.
    #[default]
    Local,
    /// In-memory, lives as long as the kit.
    Session,
    /// Supplied by the caller through the kit builder.
    Custom,
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub key: String,
    pub storage: StorageKind,
    /// File used by [`StorageKind::Local`]. Without one, the name is only
    /// kept in memory for the life of the kit.
    pub path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: DEFAULT_PERSISTENCE_KEY.to_string(),
            storage: StorageKind::Local,
            path: None,
        }
    }
}

/// Validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
    /// Reject themes with violations at registration instead of logging them.
    pub strict: bool,
    /// Rule definitions. When empty, [`ValidationRule::defaults`] apply.
    pub rules: Vec<RuleDefinition>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict: false,
            rules: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Compiles the configured rules, skipping incomplete definitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] for a rule whose pattern does not compile.
    pub fn compile_rules(&self) -> Result<Vec<ValidationRule>, Error> {
        if self.rules.is_empty() {
            return Ok(ValidationRule::defaults());
        }
        let mut rules = Vec::with_capacity(self.rules.len());
        for definition in &self.rules {
            if let Some(rule) = definition.compile()? {
                rules.push(rule);
            }
        }
        Ok(rules)
    }
}

/// Serialization format for command-line output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Defaults for the `themekit` command-line tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub format: OutputFormat,
    /// Theme resolved when none is given on the command line.
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ThemeKitConfig::default();
        assert_eq!(config.default_theme, "default");
        assert!(!config.aliasing.enabled);
        assert_eq!(config.aliasing.max_depth, 10);
        assert!(config.persistence.enabled);
        assert_eq!(config.persistence.storage, StorageKind::Local);
        assert!(config.validation.enabled);
        assert!(!config.validation.strict);
        assert!(config.tokens.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ThemeKitConfig::from_yaml("{}").unwrap(), ThemeKitConfig::default());
    }

    #[test]
    fn test_tokens_object_is_tree() {
        let config = ThemeKitConfig::from_json(r##"{"tokens": {"colors": {"bg": "#fff"}}}"##).unwrap();
        assert!(matches!(config.tokens, Some(TokenSource::Tree(_))));
    }

    #[test]
    fn test_tokens_object_keyed_by_theme_names_is_still_one_tree() {
        let config = ThemeKitConfig::from_yaml(
            "tokens:\n  light: { bg: '#fff' }\n  dark: { bg: '#000' }\n",
        )
        .unwrap();
        match config.tokens {
            Some(TokenSource::Tree(tree)) => {
                assert!(tree.get_path("light.bg").is_some());
                assert!(tree.get_path("dark.bg").is_some());
            }
            other => panic!("expected a single tree, got {other:?}"),
        }
    }

    #[test]
    fn test_tokens_string_is_path() {
        let config = ThemeKitConfig::from_yaml("tokens: ./tokens.json").unwrap();
        assert_eq!(config.tokens, Some(TokenSource::Path("./tokens.json".into())));
    }

    #[test]
    fn test_themes_with_extends() {
        let config = ThemeKitConfig::from_yaml(
            r##"
themes:
  - name: light
    tokens:
      bg: "#fff"
  - name: dark
    extends: light
    tokens:
      bg: "#000"
"##,
        )
        .unwrap();
        assert_eq!(config.themes.len(), 2);
        assert_eq!(config.themes[1].extends(), Some("light"));
    }

    #[test]
    fn test_camel_case_keys() {
        let config = ThemeKitConfig::from_yaml(
            "defaultTheme: brand\naliasing:\n  maxDepth: 3\npersistence:\n  key: my-key\n  storage: custom\n",
        )
        .unwrap();
        assert_eq!(config.default_theme, "brand");
        assert_eq!(config.aliasing.max_depth, 3);
        assert_eq!(config.persistence.key, "my-key");
        assert_eq!(config.persistence.storage, StorageKind::Custom);
    }

    #[test]
    fn test_compile_rules_defaults_when_empty() {
        let rules = ValidationConfig::default().compile_rules().unwrap();
        assert_eq!(rules.len(), ValidationRule::defaults().len());
    }

    #[test]
    fn test_compile_rules_skips_incomplete() {
        let config = ValidationConfig {
            rules: vec![
                RuleDefinition {
                    name: Some("ok".into()),
                    pattern: Some("^a".into()),
                    ..Default::default()
                },
                RuleDefinition {
                    pattern: Some("^b".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let rules = config.compile_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "ok");
    }

    #[test]
    fn test_compile_rules_rejects_bad_pattern() {
        let config = ValidationConfig {
            rules: vec![RuleDefinition {
                name: Some("bad".into()),
                pattern: Some("(".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(config.compile_rules(), Err(Error::InvalidRule { .. })));
    }

    #[test]
    fn test_builder_methods() {
        let config = ThemeKitConfig::new()
            .default_theme("light")
            .aliasing(true)
            .persistence(false)
            .storage(StorageKind::Session)
            .strict(true);
        assert_eq!(config.default_theme, "light");
        assert!(config.aliasing.enabled);
        assert!(!config.persistence.enabled);
        assert_eq!(config.persistence.storage, StorageKind::Session);
        assert!(config.validation.strict);
    }
}
