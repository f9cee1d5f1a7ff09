//! The theme kit: registry, active theme, persistence and change listeners.
//!
//! [`ThemeKit`] is the entry point most callers want. It wraps a
//! [`ThemeRegistry`] and adds the stateful parts:
//!
//! - an active theme, chosen at construction and changed with [`ThemeKit::switch`]
//! - persistence of the active theme's name through a [`ThemeStorage`]
//! - listeners notified after every successful switch
//! - validation of themes as they are registered
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use themekit::{Theme, ThemeKit, ThemeKitConfig};
//!
//! let config = ThemeKitConfig::new()
//!     .aliasing(true)
//!     .persistence(false)
//!     .theme(
//!         Theme::new("light")
//!             .add("palette.ink", "#111")
//!             .add("palette.paper", "#eee")
//!             .add("colors.fg", "{palette.ink}"),
//!     )
//!     .theme(Theme::new("dark").extending("light").add("colors.fg", "{palette.paper}"));
//! let mut kit = ThemeKit::new(config).unwrap();
//! assert_eq!(kit.current_theme(), Some("light"));
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let subscription = kit.subscribe(move |name, _tokens| sink.borrow_mut().push(name.to_string()));
//!
//! kit.switch("dark", None).unwrap();
//! assert_eq!(kit.get_token("colors.fg", None).unwrap().unwrap().as_str(), Some("#eee"));
//! assert_eq!(*seen.borrow(), vec!["dark"]);
//!
//! subscription.unsubscribe();
//! ```
//!
//! # Failure policy
//!
//! Lookups and resolution failures are returned to the caller. Storage
//! failures are logged with `tracing` and otherwise ignored: a switch succeeds
//! even when its name cannot be persisted. Listeners run in subscription
//! order; a panicking listener unwinds through `switch`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::{ThemeKitConfig, TokenSource};
use crate::error::Error;
use crate::persistence::{storage_for, ThemeStorage};
use crate::theme::{Theme, ThemeRegistry};
use crate::tokens::{TokenTree, TokenValue};
use crate::validate::{self, ValidationReport, ValidationRule};

type Listener = Rc<dyn Fn(&str, &TokenTree)>;
type ListenerList = RefCell<Vec<(u64, Listener)>>;

/// Handle returned by [`ThemeKit::subscribe`].
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    /// Removes the listener. Does nothing if the kit is gone.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Builder for a [`ThemeKit`] with a caller-supplied store.
pub struct ThemeKitBuilder {
    config: ThemeKitConfig,
    storage: Option<Box<dyn ThemeStorage>>,
}

impl ThemeKitBuilder {
    /// Uses `storage` to persist the active theme name.
    ///
    /// A supplied store takes precedence over `persistence.storage`. It is
    /// still unused when persistence is disabled.
    pub fn storage(mut self, storage: impl ThemeStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn build(self) -> Result<ThemeKit, Error> {
        let ThemeKitBuilder { config, storage } = self;
        let storage = match storage {
            Some(storage) if config.persistence.enabled => Some(storage),
            Some(_) => None,
            None => storage_for(&config.persistence),
        };
        ThemeKit::with_storage(config, storage)
    }
}

/// Themes, the active theme and its observers.
pub struct ThemeKit {
    config: ThemeKitConfig,
    registry: ThemeRegistry,
    rules: Vec<ValidationRule>,
    storage: Option<Box<dyn ThemeStorage>>,
    listeners: Rc<ListenerList>,
    next_listener: Cell<u64>,
    active: Option<String>,
    /// Resolved tokens of an active theme that is not registered.
    ephemeral: Option<Rc<TokenTree>>,
}

impl ThemeKit {
    /// Creates a kit using the store selected by `config.persistence`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRule`] if a configured rule does not compile.
    /// - [`Error::Validation`] if strict validation rejects a bootstrap theme.
    /// - [`Error::InvalidThemeName`] if a bootstrap theme has an empty name.
    pub fn new(config: ThemeKitConfig) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    pub fn builder(config: ThemeKitConfig) -> ThemeKitBuilder {
        ThemeKitBuilder {
            config,
            storage: None,
        }
    }

    fn with_storage(
        config: ThemeKitConfig,
        storage: Option<Box<dyn ThemeStorage>>,
    ) -> Result<Self, Error> {
        let mut kit = ThemeKit {
            rules: config.validation.compile_rules()?,
            registry: ThemeRegistry::with_aliasing(config.aliasing),
            storage,
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
            active: None,
            ephemeral: None,
            config,
        };
        kit.bootstrap()?;
        kit.active = kit.initial_theme();
        tracing::debug!(themes = kit.registry.len(), active = ?kit.active, "theme kit ready");
        Ok(kit)
    }

    fn bootstrap(&mut self) -> Result<(), Error> {
        match self.config.tokens.clone() {
            None => {}
            Some(TokenSource::Path(path)) => {
                tracing::warn!(path = %path, "token paths are not loaded; parse the file and pass its tokens instead");
            }
            Some(TokenSource::Tree(tree)) => {
                let name = self.config.default_theme.clone();
                self.insert_theme(Theme::from_tokens(name, tree))?;
            }
            Some(TokenSource::Themes(themes)) => {
                for (name, tree) in themes {
                    self.insert_theme(Theme::from_tokens(name, tree))?;
                }
            }
        }
        for theme in self.config.themes.clone() {
            self.insert_theme(theme)?;
        }
        Ok(())
    }

    /// Persisted name if registered, else the default theme, else the first.
    fn initial_theme(&self) -> Option<String> {
        let persisted = self.storage.as_ref().and_then(|storage| {
            match storage.get(&self.config.persistence.key) {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read persisted theme");
                    None
                }
            }
        });
        if let Some(name) = persisted {
            if self.registry.contains(&name) {
                return Some(name);
            }
            tracing::debug!(theme = %name, "persisted theme is not registered");
        }
        if self.registry.contains(&self.config.default_theme) {
            return Some(self.config.default_theme.clone());
        }
        self.registry.first().map(str::to_string)
    }

    /// Validates and registers, without touching the active theme.
    fn insert_theme(&mut self, theme: Theme) -> Result<(), Error> {
        if self.config.validation.enabled {
            let report = validate::validate_tree(theme.tokens(), &self.rules);
            if !report.is_valid() {
                if self.config.validation.strict {
                    return Err(Error::Validation {
                        theme: theme.name().to_string(),
                        errors: report.errors(),
                    });
                }
                for violation in report.violations() {
                    tracing::warn!(theme = %theme.name(), "{}", violation);
                }
            }
        }
        self.registry.register(theme)?;
        Ok(())
    }

    /// Registers a theme, replacing any theme with the same name.
    ///
    /// When no theme is active, the new theme becomes active. When the active
    /// theme is an unregistered one from [`switch`](Self::switch) with the
    /// same name, the registered tokens take its place and listeners are
    /// notified. If they fail to resolve, nothing is active.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidThemeName`] if the name is empty.
    /// - [`Error::Validation`] if strict validation rejects the tokens.
    pub fn register_theme(&mut self, theme: Theme) -> Result<(), Error> {
        let name = theme.name().to_string();
        self.insert_theme(theme)?;
        if self.ephemeral.is_some() && self.active.as_deref() == Some(name.as_str()) {
            self.active = None;
            self.ephemeral = None;
            self.activate(&name);
        } else if self.active.is_none() {
            self.activate(&name);
        }
        Ok(())
    }

    /// Registers themes in order, stopping at the first failure.
    pub fn register_themes(&mut self, themes: impl IntoIterator<Item = Theme>) -> Result<(), Error> {
        for theme in themes {
            self.register_theme(theme)?;
        }
        Ok(())
    }

    /// Removes a theme.
    ///
    /// If it was active, the first remaining theme in registration order
    /// that resolves becomes active and listeners are notified. Themes that
    /// fail to resolve are skipped. When none is left, nothing is active and
    /// the persisted name is cleared.
    pub fn unregister_theme(&mut self, name: &str) -> Option<Theme> {
        let removed = self.registry.unregister(name)?;
        let was_active = self.active.as_deref() == Some(name) && self.ephemeral.is_none();
        if was_active {
            self.active = None;
            let remaining: Vec<String> = self.registry.names().map(str::to_string).collect();
            if !remaining.iter().any(|next| self.activate(next)) {
                self.forget_persisted();
            }
        }
        Some(removed)
    }

    /// Makes `name` the active theme.
    ///
    /// A registered theme is used when one exists. Otherwise `custom_tokens`,
    /// if given, are resolved as an unregistered theme named `name`; it is
    /// neither registered nor cached.
    ///
    /// On success the name is persisted and every listener is called with the
    /// resolved tokens.
    ///
    /// # Errors
    ///
    /// - [`Error::ThemeNotFound`] if `name` is not registered and no custom
    ///   tokens were given. Nothing changes.
    /// - Resolution errors, also leaving everything unchanged.
    pub fn switch(&mut self, name: &str, custom_tokens: Option<TokenTree>) -> Result<Rc<TokenTree>, Error> {
        let (resolved, ephemeral) = if self.registry.contains(name) {
            (self.registry.resolve(name)?, false)
        } else if let Some(tokens) = custom_tokens {
            let theme = Theme::from_tokens(name, tokens);
            (self.registry.resolve_theme(&theme)?, true)
        } else {
            return Err(Error::ThemeNotFound {
                name: name.to_string(),
            });
        };

        self.active = Some(name.to_string());
        self.ephemeral = ephemeral.then(|| Rc::clone(&resolved));
        self.persist(name);
        tracing::debug!(theme = %name, ephemeral, "switched theme");
        self.notify(name, &resolved);
        Ok(resolved)
    }

    /// Activates a registered theme, logging rather than returning failures.
    ///
    /// On failure the active theme is left as it was.
    fn activate(&mut self, name: &str) -> bool {
        match self.switch(name, None) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(theme = %name, error = %err, "failed to activate theme");
                false
            }
        }
    }

    fn persist(&mut self, name: &str) {
        let key = &self.config.persistence.key;
        if let Some(storage) = self.storage.as_mut() {
            if let Err(err) = storage.set(key, name) {
                tracing::warn!(theme = %name, error = %err, "failed to persist active theme");
            }
        }
    }

    fn forget_persisted(&mut self) {
        let key = &self.config.persistence.key;
        if let Some(storage) = self.storage.as_mut() {
            if let Err(err) = storage.remove(key) {
                tracing::warn!(error = %err, "failed to clear persisted theme");
            }
        }
    }

    fn notify(&self, name: &str, tokens: &TokenTree) {
        // Snapshot so listeners may subscribe or unsubscribe while notified.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(name, tokens);
        }
    }

    /// Registers a listener called after every successful switch.
    pub fn subscribe(&self, listener: impl Fn(&str, &TokenTree) + 'static) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Name of the active theme.
    pub fn current_theme(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Resolved tokens of the active theme.
    pub fn current_tokens(&self) -> Result<Option<Rc<TokenTree>>, Error> {
        if let Some(tokens) = &self.ephemeral {
            return Ok(Some(Rc::clone(tokens)));
        }
        match &self.active {
            Some(name) => self.registry.resolve(name).map(Some),
            None => Ok(None),
        }
    }

    /// Looks up a dot-path in the resolved tokens of `theme`, or of the active
    /// theme when `None`.
    ///
    /// Returns `Ok(None)` when a path segment is missing or no theme is active.
    pub fn get_token(&self, path: &str, theme: Option<&str>) -> Result<Option<TokenValue>, Error> {
        let active_ephemeral = self.ephemeral.is_some() && self.active.as_deref() == theme;
        match theme {
            Some(name) if !active_ephemeral => self.registry.get_token(path, name),
            _ => Ok(self
                .current_tokens()?
                .and_then(|tokens| tokens.get_path(path).cloned())),
        }
    }

    /// Resolves a registered theme by name.
    pub fn resolve_tokens(&self, name: &str) -> Result<Rc<TokenTree>, Error> {
        self.registry.resolve(name)
    }

    /// Resolves any theme, registered or not.
    pub fn resolve_theme(&self, theme: &Theme) -> Result<Rc<TokenTree>, Error> {
        self.registry.resolve_theme(theme)
    }

    /// Warms the cache. See [`ThemeRegistry::prefetch`].
    pub fn prefetch_themes(&self, names: Option<&[&str]>) -> Vec<(String, Error)> {
        self.registry.prefetch(names)
    }

    /// Validates tokens against the configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTokens`] if `tokens` is not a tree.
    pub fn validate(&self, tokens: &TokenValue) -> Result<ValidationReport, Error> {
        validate::validate(tokens, &self.rules, &self.config.validation)
    }

    /// Registered theme names in registration order.
    pub fn themes(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    pub fn has_theme(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.registry.get(name)
    }

    pub fn config(&self) -> &ThemeKitConfig {
        &self.config
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    /// The compiled validation rules.
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKind;
    use crate::persistence::MemoryStorage;
    use std::collections::BTreeMap;

    fn tree(json: &str) -> TokenTree {
        TokenTree::from_json(json).unwrap()
    }

    fn quiet() -> ThemeKitConfig {
        ThemeKitConfig::new().persistence(false)
    }

    #[test]
    fn test_empty_kit_has_no_active_theme() {
        let kit = ThemeKit::new(quiet()).unwrap();
        assert_eq!(kit.current_theme(), None);
        assert!(kit.current_tokens().unwrap().is_none());
        assert_eq!(kit.get_token("anything", None).unwrap(), None);
        assert!(kit.themes().is_empty());
    }

    #[test]
    fn test_bootstrap_single_tree_uses_default_theme_name() {
        let kit = ThemeKit::new(quiet().tokens(tree(r##"{"bg": "#fff"}"##))).unwrap();
        assert_eq!(kit.themes(), vec!["default"]);
        assert_eq!(kit.current_theme(), Some("default"));
    }

    #[test]
    fn test_bootstrap_theme_map() {
        let mut themes = BTreeMap::new();
        themes.insert("light".to_string(), tree(r##"{"bg": "#fff"}"##));
        themes.insert("dark".to_string(), tree(r##"{"bg": "#000"}"##));

        let kit = ThemeKit::new(quiet().tokens(themes)).unwrap();
        assert!(kit.has_theme("light"));
        assert!(kit.has_theme("dark"));
        // No "default" theme: the first registered wins.
        assert_eq!(kit.current_theme(), kit.themes().first().copied());
    }

    #[test]
    fn test_bootstrap_path_is_only_warned_about() {
        let kit = ThemeKit::new(quiet().tokens(TokenSource::Path("tokens.json".into()))).unwrap();
        assert!(kit.themes().is_empty());
    }

    #[test]
    fn test_default_theme_preferred_over_first() {
        let config = quiet()
            .default_theme("dark")
            .theme(Theme::new("light"))
            .theme(Theme::new("dark"));
        let kit = ThemeKit::new(config).unwrap();
        assert_eq!(kit.current_theme(), Some("dark"));
    }

    #[test]
    fn test_strict_bootstrap_rejects_invalid_theme() {
        let config = quiet().strict(true).theme(Theme::new("bad").add("brand color", "#000"));
        assert!(matches!(ThemeKit::new(config), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_non_strict_registration_keeps_invalid_theme() {
        let mut kit = ThemeKit::new(quiet()).unwrap();
        kit.register_theme(Theme::new("loose").add("brand color", "#000")).unwrap();
        assert!(kit.has_theme("loose"));
    }

    #[test]
    fn test_disabled_validation_skips_rules() {
        let mut kit = ThemeKit::new(quiet().validation(false).strict(true)).unwrap();
        kit.register_theme(Theme::new("loose").add("brand color", "#000")).unwrap();
        assert!(kit.has_theme("loose"));
    }

    #[test]
    fn test_builder_storage_is_used() {
        let mut storage = MemoryStorage::new();
        storage.set("themekit-theme", "dark").unwrap();

        let config = ThemeKitConfig::new()
            .storage(StorageKind::Custom)
            .theme(Theme::new("light"))
            .theme(Theme::new("dark"));
        let kit = ThemeKit::builder(config).storage(storage).build().unwrap();
        assert_eq!(kit.current_theme(), Some("dark"));
    }

    #[test]
    fn test_builder_storage_ignored_when_persistence_disabled() {
        let mut storage = MemoryStorage::new();
        storage.set("themekit-theme", "dark").unwrap();

        let config = quiet().theme(Theme::new("light")).theme(Theme::new("dark"));
        let kit = ThemeKit::builder(config).storage(storage).build().unwrap();
        assert_eq!(kit.current_theme(), Some("light"));
    }

    #[test]
    fn test_invalid_rule_fails_construction() {
        let config: ThemeKitConfig =
            ThemeKitConfig::from_yaml("validation:\n  rules:\n    - name: bad\n      pattern: \"(\"\n").unwrap();
        assert!(matches!(ThemeKit::new(config), Err(Error::InvalidRule { .. })));
    }

    #[test]
    fn test_unsubscribe_after_kit_dropped() {
        let kit = ThemeKit::new(quiet()).unwrap();
        let subscription = kit.subscribe(|_, _| {});
        drop(kit);
        subscription.unsubscribe();
    }
}
