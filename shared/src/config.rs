//! Configuration management (`egg.toml`)
//!
//! The surrounding application owns where the file lives; this module only
//! defines its shape and how the `[filesystem]` section selects a backend.
//!
//! ```toml
//! [filesystem]
//! backend = "host"
//! root = "assets"
//! max_file_bytes = 536870912
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, set_active_backend};
use crate::error::BackendError;
use crate::fs::MAX_FILE_BYTES;
use crate::path::PathResolver;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage backend settings
    #[serde(default)]
    pub filesystem: FilesystemConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Backend to select at startup (no default: it must be chosen)
    #[serde(default)]
    pub backend: Option<Backend>,
    /// Host directory backing the backend: the asset tree for host, an
    /// extracted disc image for cdrom, the ROM source tree for rom
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Largest file a single read may load (default: 512 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_file_bytes() -> u64 {
    MAX_FILE_BYTES
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            backend: None,
            root: default_root(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl FilesystemConfig {
    /// Configured backend, or an error if none was set.
    pub fn backend(&self) -> Result<Backend, BackendError> {
        self.backend.ok_or(BackendError::NotConfigured)
    }

    /// Resolver for the configured backend, without touching global state.
    pub fn resolver(&self) -> Result<PathResolver, BackendError> {
        self.backend().map(PathResolver::new)
    }

    /// Publish the configured backend process-wide and return its resolver.
    ///
    /// Call once during startup, before any worker converts paths.
    pub fn select_backend(&self) -> Result<PathResolver, BackendError> {
        let backend = self.backend()?;
        set_active_backend(backend)?;
        Ok(PathResolver::new(backend))
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.filesystem.backend, None);
        assert_eq!(config.filesystem.max_file_bytes, MAX_FILE_BYTES);
        assert_eq!(
            config.filesystem.resolver(),
            Err(BackendError::NotConfigured)
        );
    }

    #[test]
    fn test_parse_filesystem_section() {
        let config = Config::from_toml_str(
            r#"
            [filesystem]
            backend = "cdrom"
            root = "build/disc"
            max_file_bytes = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.filesystem.backend, Some(Backend::Cdrom));
        assert_eq!(config.filesystem.root, PathBuf::from("build/disc"));
        assert_eq!(config.filesystem.max_file_bytes, 1024);
        assert_eq!(
            config.filesystem.resolver().unwrap().backend(),
            Backend::Cdrom
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Config::from_toml_str("[filesystem]\nbackend = \"floppy\"").is_err());
    }

    #[test]
    fn test_select_backend_publishes_host() {
        let config = Config::from_toml_str("[filesystem]\nbackend = \"host\"").unwrap();
        let resolver = config.filesystem.select_backend().unwrap();
        assert_eq!(resolver.backend(), Backend::Host);
        assert_eq!(crate::backend::active_backend(), Backend::Host);
    }

    #[test]
    fn test_load_and_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("egg.toml");

        let mut config = Config::default();
        config.filesystem.backend = Some(Backend::Rom);
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }
}
