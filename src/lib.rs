//! # themekit - design tokens, themes and aliases
//!
//! `themekit` manages design tokens: nested key/value trees of colors,
//! spacing, typography and similar values. Tokens are grouped into named
//! themes that can extend one another, may reference each other through
//! aliases, and are checked against naming and format rules.
//!
//! ## Core Concepts
//!
//! - [`TokenTree`]: A nested, string-keyed tree of [`TokenValue`]s, addressed with dot-paths
//! - Aliases: a string token `"{colors.primary}"` stands for the value at that path
//! - [`Theme`]: A named token tree, optionally extending a parent theme
//! - [`ThemeRegistry`]: Resolves themes (inheritance, then aliases) and caches the result
//! - [`ThemeKit`]: The active theme, persistence of its name, and change listeners
//!
//! ## Quick Start
//!
//! ```rust
//! use themekit::{Theme, ThemeKit, ThemeKitConfig};
//!
//! let config = ThemeKitConfig::new()
//!     .aliasing(true)
//!     .persistence(false)
//!     .theme(
//!         Theme::new("light")
//!             .add("palette.white", "#ffffff")
//!             .add("palette.gray", "#1f2933")
//!             .add("colors.bg", "{palette.white}")
//!             .add("colors.fg", "{palette.gray}"),
//!     )
//!     .theme(
//!         Theme::new("dark")
//!             .extending("light")
//!             .add("colors.bg", "{palette.gray}")
//!             .add("colors.fg", "{palette.white}"),
//!     );
//!
//! let mut kit = ThemeKit::new(config).unwrap();
//! assert_eq!(kit.get_token("colors.bg", None).unwrap().unwrap().as_str(), Some("#ffffff"));
//!
//! kit.switch("dark", None).unwrap();
//! assert_eq!(kit.get_token("colors.bg", None).unwrap().unwrap().as_str(), Some("#1f2933"));
//! ```
//!
//! ## Building Blocks
//!
//! The pure operations are usable on their own:
//!
//! ```rust
//! use themekit::{diff, merge, TokenTree};
//!
//! let base = TokenTree::from_json(r##"{"colors": {"bg": "#fff", "fg": "#000"}}"##).unwrap();
//! let overrides = TokenTree::from_json(r##"{"colors": {"bg": "#111"}}"##).unwrap();
//!
//! let merged = merge(&base, &overrides);
//! assert_eq!(merged.get_path("colors.fg").unwrap().as_str(), Some("#000"));
//!
//! let changes = diff(&base, &merged);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].path(), "colors.bg");
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]. Swallowed failures (storage errors,
//! non-strict validation violations, failed prefetches) are emitted at
//! `warn`; cache and activation activity at `debug`. Install a subscriber to
//! see them.

pub mod alias;
pub mod config;
pub mod error;
pub mod kit;
pub mod persistence;
pub mod theme;
pub mod tokens;
pub mod validate;

pub use alias::{
    alias_path, find_aliases, is_alias, resolve_aliases, AliasError, AliasRef, DEFAULT_MAX_DEPTH,
};
pub use config::{
    AliasingConfig, PersistenceConfig, StorageKind, ThemeKitConfig, TokenSource, ValidationConfig,
};
pub use error::Error;
pub use kit::{Subscription, ThemeKit, ThemeKitBuilder};
pub use persistence::{FileStorage, MemoryStorage, StorageError, ThemeStorage};
pub use theme::{Theme, ThemeRegistry};
pub use tokens::{diff, merge, TokenChange, TokenTree, TokenValue};
pub use validate::{
    validate, validate_tree, RuleDefinition, RuleTarget, Severity, ValidationReport,
    ValidationRule, Violation,
};
