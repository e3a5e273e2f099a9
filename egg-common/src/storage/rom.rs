//! In-memory `rom0:` storage.
//!
//! A ROM image is a flat table of physical path to file bytes. Directories
//! are not stored; they exist implicitly as prefixes of file paths.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use egg_shared::{Backend, SystemPath, read_file_with_limit};
use hashbrown::HashSet;
use tracing::debug;
use walkdir::WalkDir;

use super::{DirEntry, Storage};

/// Read-only file table for the `rom0:` backend.
#[derive(Debug, Clone, Default)]
pub struct RomStorage {
    files: BTreeMap<SystemPath, Arc<[u8]>>,
}

impl RomStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under its logical path; returns the physical path.
    pub fn insert(&mut self, logical: &str, bytes: impl Into<Arc<[u8]>>) -> SystemPath {
        let path = SystemPath::from_logical(logical, Backend::Rom);
        self.files.insert(path.clone(), bytes.into());
        path
    }

    /// Build an image from every file under `root`, keyed by its path
    /// relative to `root`.
    pub fn from_directory(root: &Path, max_file_bytes: u64) -> Result<Self> {
        let mut rom = Self::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).with_context(|| {
                format!("{} is outside {}", entry.path().display(), root.display())
            })?;
            let logical = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let mut bytes = Vec::new();
            read_file_with_limit(entry.path(), max_file_bytes, &mut bytes)?;
            rom.insert(&logical, bytes);
        }

        debug!("Built ROM image with {} files from {}", rom.len(), root.display());
        Ok(rom)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Storage for RomStorage {
    fn backend(&self) -> Backend {
        Backend::Rom
    }

    fn load_file(&self, path: &SystemPath, out: &mut Vec<u8>) -> bool {
        match self.files.get(path) {
            Some(bytes) => {
                out.clear();
                out.extend_from_slice(bytes);
                true
            }
            None => {
                debug!("{} not in ROM image", path);
                false
            }
        }
    }

    fn file_exists(&self, path: &SystemPath) -> bool {
        self.files.contains_key(path)
    }

    fn iterate_dir(&self, dir: &SystemPath, visitor: &mut dyn FnMut(&DirEntry), recursive: bool) {
        if dir.backend() != Some(Backend::Rom) {
            debug!("{} is not a rom path", dir);
            return;
        }

        let mut prefix = dir.as_str().to_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        let mut seen_dirs = HashSet::new();
        let range = (Bound::Included(prefix.as_str()), Bound::Unbounded);
        'files: for key in self
            .files
            .range::<str, _>(range)
            .map(|(key, _)| key.as_str())
            .take_while(|key| key.starts_with(prefix.as_str()))
        {
            let rest = &key[prefix.len()..];
            for (index, _) in rest.match_indices('/') {
                let dir_path = &key[..prefix.len() + index];
                if seen_dirs.insert(dir_path) {
                    visitor(&DirEntry {
                        path: SystemPath::verbatim(dir_path),
                        is_dir: true,
                    });
                }
                if !recursive {
                    continue 'files;
                }
            }

            visitor(&DirEntry {
                path: SystemPath::verbatim(key),
                is_dir: false,
            });
        }
    }
}
