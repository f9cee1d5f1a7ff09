//! Named themes and their resolution.
//!
//! - [`Theme`]: a name, its own tokens, and an optional parent to extend
//! - [`ThemeRegistry`]: owns themes and caches their resolved token trees

mod registry;
#[allow(clippy::module_inception)]
mod theme;

pub use registry::ThemeRegistry;
pub use theme::Theme;
