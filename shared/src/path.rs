//! Physical path values.
//!
//! [`SystemPath`] owns a fully normalized physical path. It is immutable,
//! compares and hashes by its string, and borrows as `str` so caches keyed
//! by `SystemPath` can be queried with plain strings.
//!
//! [`PathResolver`] is the injected path factory: it carries the backend
//! explicitly instead of reading the process-wide selection.
//!
//! ```
//! use egg_shared::{Backend, PathResolver};
//!
//! let resolver = PathResolver::new(Backend::Cdrom);
//! let path = resolver.resolve("assets/sounds/vine_boom.adpcm");
//! assert_eq!(path, "cdrom0:\\ASSETS\\SOUNDS\\VINE_BOO.ADP");
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::backend::{Backend, active_backend};
use crate::fixed_path::FixedPath;
use crate::normalize::normalize;

/// An owned, normalized physical path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemPath {
    path: String,
}

impl SystemPath {
    /// Build a path using the process-wide backend.
    ///
    /// With `convert` false the string is stored verbatim, for paths that are
    /// already physical.
    ///
    /// # Panics
    ///
    /// Panics if `convert` is true and no backend has been selected.
    pub fn new(path: &str, convert: bool) -> Self {
        if convert {
            Self::from_logical(path, active_backend())
        } else {
            Self::verbatim(path)
        }
    }

    /// Normalize a logical path for an explicit backend.
    pub fn from_logical(logical: &str, backend: Backend) -> Self {
        Self {
            path: normalize(logical, backend),
        }
    }

    /// Wrap an already physical path without touching it.
    pub fn verbatim(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn into_string(self) -> String {
        self.path
    }

    /// Backend named by the path prefix, if any.
    pub fn backend(&self) -> Option<Backend> {
        Backend::from_system_path(&self.path)
    }

    /// Text after the backend prefix and separator.
    pub fn relative(&self) -> Option<&str> {
        let backend = self.backend()?;
        self.path.get(backend.descriptor().root_len()..)
    }

    /// Last component of the path (empty for a backend root).
    pub fn file_name(&self) -> &str {
        let relative = self.relative().unwrap_or(&self.path);
        relative
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(relative)
    }

    /// Append an already physical component.
    ///
    /// The separator is the backend's, or `/` for verbatim paths without a
    /// known prefix. A trailing separator on `self` is not doubled.
    pub fn join(&self, component: &str) -> Self {
        let separator = self
            .backend()
            .map_or('/', |backend| backend.descriptor().separator);

        let mut path = String::with_capacity(self.path.len() + 1 + component.len());
        path.push_str(&self.path);
        if !path.is_empty() && !path.ends_with(separator) {
            path.push(separator);
        }
        path.push_str(component);
        Self { path }
    }
}

impl Deref for SystemPath {
    type Target = str;

    fn deref(&self) -> &str {
        &self.path
    }
}

impl AsRef<str> for SystemPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl Borrow<str> for SystemPath {
    fn borrow(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for SystemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<SystemPath> for String {
    fn from(path: SystemPath) -> Self {
        path.path
    }
}

impl From<FixedPath> for SystemPath {
    fn from(path: FixedPath) -> Self {
        Self::verbatim(path.as_str())
    }
}

impl From<&FixedPath> for SystemPath {
    fn from(path: &FixedPath) -> Self {
        Self::verbatim(path.as_str())
    }
}

impl PartialEq<str> for SystemPath {
    fn eq(&self, other: &str) -> bool {
        self.path == other
    }
}

impl PartialEq<&str> for SystemPath {
    fn eq(&self, other: &&str) -> bool {
        self.path == *other
    }
}

/// Path factory bound to one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathResolver {
    backend: Backend,
}

impl PathResolver {
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Resolver for the process-wide backend.
    ///
    /// # Panics
    ///
    /// Panics if no backend has been selected.
    pub fn active() -> Self {
        Self::new(active_backend())
    }

    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Normalize a logical path.
    pub fn resolve(&self, logical: &str) -> SystemPath {
        SystemPath::from_logical(logical, self.backend)
    }

    /// Normalize when `convert` is set, otherwise keep `path` verbatim.
    pub fn path(&self, path: &str, convert: bool) -> SystemPath {
        if convert {
            self.resolve(path)
        } else {
            SystemPath::verbatim(path)
        }
    }

    /// Root directory of the backend (`host0:/`, `cdrom0:\`, ...).
    pub fn root(&self) -> SystemPath {
        self.resolve("")
    }

    /// Whether `path` carries this resolver's backend prefix.
    pub fn owns(&self, path: &SystemPath) -> bool {
        path.backend() == Some(self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::set_active_backend;
    use crate::fixed_path;
    use std::collections::HashMap;

    #[test]
    fn test_new_converts_with_active_backend() {
        set_active_backend(Backend::Host).unwrap();
        let path = SystemPath::new("assets/sounds/vine-boom.adpcm", true);
        assert_eq!(path, "host0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM");
        assert_eq!(PathResolver::active().backend(), Backend::Host);
    }

    #[test]
    fn test_new_without_conversion_is_verbatim() {
        let path = SystemPath::new("cdrom0:\\SYSTEM.CNF;1", false);
        assert_eq!(path.as_str(), "cdrom0:\\SYSTEM.CNF;1");
    }

    #[test]
    fn test_equality_and_hash_by_value() {
        let resolver = PathResolver::new(Backend::Rom);
        let a = resolver.resolve("data/level.bin");
        let b = resolver.resolve("/DATA/LEVEL.BIN");
        assert_eq!(a, b);

        let mut cache = HashMap::new();
        cache.insert(a, 42);
        assert_eq!(cache.get(&b), Some(&42));
        assert_eq!(cache.get("rom0:/DATA/LEVEL.BIN"), Some(&42));
    }

    #[test]
    fn test_string_views() {
        let path = PathResolver::new(Backend::Cdrom).resolve("a/b.c");
        let view: &str = &path;
        assert_eq!(view, "cdrom0:\\A\\B.C");
        assert!(path.ends_with("B.C"));
        assert_eq!(path.to_string(), "cdrom0:\\A\\B.C");

        let owned: String = path.into();
        assert_eq!(owned, "cdrom0:\\A\\B.C");
    }

    #[test]
    fn test_relative_and_file_name() {
        let path = PathResolver::new(Backend::Cdrom).resolve("assets/sounds/vine_boom.adpcm");
        assert_eq!(path.backend(), Some(Backend::Cdrom));
        assert_eq!(path.relative(), Some("ASSETS\\SOUNDS\\VINE_BOO.ADP"));
        assert_eq!(path.file_name(), "VINE_BOO.ADP");

        let root = PathResolver::new(Backend::Host).root();
        assert_eq!(root, "host0:/");
        assert_eq!(root.file_name(), "");

        let verbatim = SystemPath::verbatim("scratch/file.bin");
        assert_eq!(verbatim.relative(), None);
        assert_eq!(verbatim.file_name(), "file.bin");
    }

    #[test]
    fn test_join_uses_backend_separator() {
        let cdrom = PathResolver::new(Backend::Cdrom);
        assert_eq!(cdrom.resolve("assets").join("LOGO.TEX"), "cdrom0:\\ASSETS\\LOGO.TEX");
        assert_eq!(cdrom.root().join("SYSTEM.CNF"), "cdrom0:\\SYSTEM.CNF");

        let rom = PathResolver::new(Backend::Rom);
        assert_eq!(rom.resolve("a").join("B"), "rom0:/A/B");
    }

    #[test]
    fn test_path_flag_and_ownership() {
        let resolver = PathResolver::new(Backend::Rom);
        let converted = resolver.path("x/y", true);
        let raw = resolver.path("x/y", false);
        assert_eq!(converted, "rom0:/X/Y");
        assert_eq!(raw, "x/y");
        assert!(resolver.owns(&converted));
        assert!(!resolver.owns(&raw));
    }

    #[test]
    fn test_from_fixed_path() {
        let fixed = fixed_path!(Backend::Cdrom, "movies/intro.pss");
        let path = SystemPath::from(fixed);
        assert_eq!(path, PathResolver::new(Backend::Cdrom).resolve("movies/intro.pss"));
    }
}
