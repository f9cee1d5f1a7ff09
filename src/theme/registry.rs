//! Theme registry with a resolution cache.
//!
//! This module provides [`ThemeRegistry`], which owns a set of named themes
//! and turns them into fully resolved token trees.
//!
//! # Resolution
//!
//! Resolving a theme runs two phases:
//!
//! 1. **Inheritance**: if the theme `extends` a registered theme, the parent is
//!    resolved first (recursively) and the theme's own tokens are merged on top.
//!    An `extends` naming a theme that is not registered is ignored.
//! 2. **Aliasing**: when enabled, aliases in the merged tree are resolved.
//!
//! # Caching
//!
//! Resolved trees of registered themes are cached by name and shared as
//! `Rc<TokenTree>`: a cache hit hands out the same allocation again.
//!
//! Registering or unregistering a theme evicts its cache entry together with
//! the entries of every theme that extends it, directly or transitively.
//! [`ThemeRegistry::invalidate`] with no name clears the whole cache.
//!
//! # Thread Safety
//!
//! The registry is single-threaded: the cache lives in a `RefCell` and
//! results are shared through `Rc`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::theme::Theme;
use crate::alias::resolve_aliases;
use crate::config::AliasingConfig;
use crate::error::Error;
use crate::tokens::{merge, TokenTree, TokenValue};

/// Registry of named themes and their resolved tokens.
///
/// # Example
///
/// ```rust
/// use themekit::{Theme, ThemeRegistry};
/// use themekit::config::AliasingConfig;
///
/// let mut registry = ThemeRegistry::with_aliasing(AliasingConfig { enabled: true, max_depth: 10 });
/// registry.register(Theme::new("light").add("palette.ink", "#111").add("colors.fg", "{palette.ink}")).unwrap();
/// registry.register(Theme::new("dark").extending("light").add("palette.ink", "#eee")).unwrap();
///
/// let dark = registry.resolve("dark").unwrap();
/// assert_eq!(dark.get_path("palette.ink").unwrap().as_str(), Some("#eee"));
/// // The parent's alias was resolved before the child was merged on top.
/// assert_eq!(dark.get_path("colors.fg").unwrap().as_str(), Some("#111"));
/// ```
#[derive(Debug, Default)]
pub struct ThemeRegistry {
    themes: HashMap<String, Theme>,
    /// Theme names in registration order.
    order: Vec<String>,
    cache: RefCell<HashMap<String, Rc<TokenTree>>>,
    aliasing: AliasingConfig,
}

impl ThemeRegistry {
    /// Creates an empty registry with aliasing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given alias settings.
    pub fn with_aliasing(aliasing: AliasingConfig) -> Self {
        Self {
            aliasing,
            ..Self::default()
        }
    }

    pub fn aliasing(&self) -> AliasingConfig {
        self.aliasing
    }

    /// Registers a theme, replacing any theme with the same name.
    ///
    /// Returns the replaced theme, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThemeName`] if the name is empty.
    pub fn register(&mut self, theme: Theme) -> Result<Option<Theme>, Error> {
        if theme.name().is_empty() {
            return Err(Error::InvalidThemeName);
        }
        let name = theme.name().to_string();
        let previous = self.themes.insert(name.clone(), theme);
        if previous.is_none() {
            self.order.push(name.clone());
        }
        // Evict after inserting so that themes extending a newly added name
        // (previously resolved without their parent) are evicted too.
        self.invalidate(Some(&name));
        tracing::debug!(theme = %name, replaced = previous.is_some(), "registered theme");
        Ok(previous)
    }

    /// Registers themes in order. Stops at the first invalid theme.
    pub fn register_all(&mut self, themes: impl IntoIterator<Item = Theme>) -> Result<(), Error> {
        for theme in themes {
            self.register(theme)?;
        }
        Ok(())
    }

    /// Removes a theme, evicting its cache entry and those of its dependents.
    pub fn unregister(&mut self, name: &str) -> Option<Theme> {
        if !self.themes.contains_key(name) {
            return None;
        }
        self.invalidate(Some(name));
        self.order.retain(|n| n != name);
        tracing::debug!(theme = %name, "unregistered theme");
        self.themes.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Returns theme names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Returns the earliest registered theme still present.
    pub fn first(&self) -> Option<&str> {
        self.order.first().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Removes every theme and clears the cache.
    pub fn clear(&mut self) {
        self.themes.clear();
        self.order.clear();
        self.cache.borrow_mut().clear();
    }

    /// Returns true if a resolved tree is cached for `name`.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }

    /// Evicts cached resolutions.
    ///
    /// With a name, evicts that theme and every theme extending it. With
    /// `None`, clears the whole cache.
    pub fn invalidate(&self, name: Option<&str>) {
        let mut cache = self.cache.borrow_mut();
        match name {
            None => cache.clear(),
            Some(name) => {
                for evicted in self.dependents(name) {
                    cache.remove(&evicted);
                }
            }
        }
    }

    /// `name` plus every registered theme whose `extends` chain reaches it.
    fn dependents(&self, name: &str) -> HashSet<String> {
        let mut affected = HashSet::from([name.to_string()]);
        loop {
            let added: Vec<String> = self
                .themes
                .values()
                .filter(|t| !affected.contains(t.name()))
                .filter(|t| t.extends().is_some_and(|parent| affected.contains(parent)))
                .map(|t| t.name().to_string())
                .collect();
            if added.is_empty() {
                return affected;
            }
            affected.extend(added);
        }
    }

    /// Resolves a registered theme by name, using the cache.
    ///
    /// # Errors
    ///
    /// - [`Error::ThemeNotFound`] if no theme has this name.
    /// - [`Error::ExtendsCycle`] if the inheritance chain loops.
    /// - [`Error::Alias`] if alias resolution fails.
    pub fn resolve(&self, name: &str) -> Result<Rc<TokenTree>, Error> {
        self.resolve_named(name, &mut Vec::new())
    }

    /// Resolves any theme.
    ///
    /// A theme equal to the registered theme of the same name goes through the
    /// cache. Any other theme is resolved on the spot and not cached.
    pub fn resolve_theme(&self, theme: &Theme) -> Result<Rc<TokenTree>, Error> {
        if self.themes.get(theme.name()) == Some(theme) {
            return self.resolve(theme.name());
        }
        Ok(Rc::new(self.compute(theme, &mut Vec::new())?))
    }

    /// Looks up a dot-path in a theme's resolved tokens.
    ///
    /// Returns `Ok(None)` if any segment of the path is missing.
    pub fn get_token(&self, path: &str, name: &str) -> Result<Option<TokenValue>, Error> {
        Ok(self.resolve(name)?.get_path(path).cloned())
    }

    /// Resolves themes ahead of time to warm the cache.
    ///
    /// Resolves `names`, or every registered theme when `None`. A failure does
    /// not stop the batch: each failing theme is logged and returned with its
    /// error.
    pub fn prefetch(&self, names: Option<&[&str]>) -> Vec<(String, Error)> {
        let names: Vec<String> = match names {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => self.order.clone(),
        };
        let mut failures = Vec::new();
        for name in names {
            if let Err(err) = self.resolve(&name) {
                tracing::warn!(theme = %name, error = %err, "failed to prefetch theme");
                failures.push((name, err));
            }
        }
        failures
    }

    fn resolve_named(&self, name: &str, chain: &mut Vec<String>) -> Result<Rc<TokenTree>, Error> {
        let cached = self.cache.borrow().get(name).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let theme = self.themes.get(name).ok_or_else(|| Error::ThemeNotFound {
            name: name.to_string(),
        })?;
        let resolved = Rc::new(self.compute(theme, chain)?);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&resolved));
        Ok(resolved)
    }

    /// Merges a theme over its parent and resolves aliases.
    ///
    /// `chain` holds the names of themes whose resolution is in progress.
    fn compute(&self, theme: &Theme, chain: &mut Vec<String>) -> Result<TokenTree, Error> {
        chain.push(theme.name().to_string());

        let merged = match theme.extends() {
            Some(parent) if chain.iter().any(|n| n == parent) => {
                let mut cycle = chain.clone();
                cycle.push(parent.to_string());
                return Err(Error::ExtendsCycle { chain: cycle });
            }
            Some(parent) if self.themes.contains_key(parent) => {
                let base = self.resolve_named(parent, chain)?;
                merge(&base, theme.tokens())
            }
            Some(parent) => {
                tracing::debug!(theme = %theme.name(), parent = %parent, "ignoring unknown parent theme");
                theme.tokens().clone()
            }
            None => theme.tokens().clone(),
        };

        chain.pop();

        if !self.aliasing.enabled {
            return Ok(merged);
        }
        Ok(resolve_aliases(&merged, self.aliasing.max_depth)?)
    }
}
