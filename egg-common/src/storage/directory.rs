//! Storage backed by a host directory.
//!
//! The directory holds files under their authored names (`vine-boom.adpcm`),
//! while requests arrive as physical paths (`VINE_BOO.ADP`). Each requested
//! component is matched against the directory listing by normalizing the
//! on-disk name with the backend's rules, so the same tree serves both the
//! full-name `host0:` backend and the 8.3 `cdrom0:` backend.
//!
//! When two on-disk names normalize to the same physical name the first one
//! in directory order wins.

use std::path::{Path, PathBuf};

use egg_shared::{Backend, MAX_FILE_BYTES, SystemPath, normalize_component, read_file_with_limit};
use tracing::debug;
use walkdir::WalkDir;

use super::{DirEntry, Storage};

/// A host directory exposed through one backend's naming rules.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
    backend: Backend,
    max_file_bytes: u64,
}

impl DirectoryStorage {
    /// Serve `root` as the `host0:` tree.
    pub fn host(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into(), Backend::Host)
    }

    /// Serve `root` as an extracted `cdrom0:` disc image.
    pub fn cdrom(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into(), Backend::Cdrom)
    }

    fn new(root: PathBuf, backend: Backend) -> Self {
        Self {
            root,
            backend,
            max_file_bytes: MAX_FILE_BYTES,
        }
    }

    /// Cap on a single file read.
    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file, creating parent directories. Host storage only.
    ///
    /// Existing entries are matched the same way reads match them, so
    /// rewriting a path replaces the file it would load.
    pub fn write_file(&self, path: &SystemPath, bytes: &[u8]) -> bool {
        if self.backend != Backend::Host {
            debug!("Refusing to write {}: {} storage is read-only", path, self.backend);
            return false;
        }

        let Some(components) = self.components(path) else {
            return false;
        };
        let Some((file_name, dirs)) = components.split_last() else {
            debug!("Refusing to write {}: path names no file", path);
            return false;
        };

        let mut current = self.root.clone();
        for dir in dirs {
            current = match self.match_child(&current, dir, false) {
                Some(existing) => existing,
                None => current.join(dir),
            };
        }

        if let Err(err) = std::fs::create_dir_all(&current) {
            debug!("Failed to create {}: {}", current.display(), err);
            return false;
        }

        let target = self
            .match_child(&current, file_name, true)
            .unwrap_or_else(|| current.join(file_name));
        match std::fs::write(&target, bytes) {
            Ok(()) => true,
            Err(err) => {
                debug!("Failed to write {}: {}", target.display(), err);
                false
            }
        }
    }

    /// Physical components of `path`, or `None` for another backend's path
    /// or one that names `.` or `..`.
    fn components<'p>(&self, path: &'p SystemPath) -> Option<Vec<&'p str>> {
        if path.backend() != Some(self.backend) {
            debug!("{} is not a {} path", path, self.backend);
            return None;
        }
        let separator = self.backend.descriptor().separator;
        let relative = path.relative()?;
        let components: Vec<&str> = relative.split(separator).filter(|c| !c.is_empty()).collect();
        if components.iter().any(|c| *c == "." || *c == "..") {
            debug!("Rejecting {}: relative components escape the storage root", path);
            return None;
        }
        Some(components)
    }

    /// Host location of `path`, if every component matches an entry under
    /// the root.
    fn locate(&self, path: &SystemPath) -> Option<PathBuf> {
        let components = self.components(path)?;
        let last = components.len().checked_sub(1);
        let mut current = self.root.clone();
        for (index, component) in components.into_iter().enumerate() {
            current = self.match_child(&current, component, Some(index) == last)?;
        }
        (current.starts_with(&self.root) && current.exists()).then_some(current)
    }

    /// Entry of `dir` whose physical name is `component`.
    ///
    /// Short-name backends shorten the last component of a path even when it
    /// names a directory, so for `is_last` a directory also matches by its
    /// shortened form.
    fn match_child(&self, dir: &Path, component: &str, is_last: bool) -> Option<PathBuf> {
        let exact = dir.join(component);
        if exact.exists() {
            return Some(exact);
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Failed to list {}: {}", dir.display(), err);
                return None;
            }
        };

        entries.filter_map(Result::ok).find_map(|entry| {
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            let name = entry.file_name();
            let name = name.to_str()?;
            let matches = self.physical_name(name, is_file) == component
                || (is_last && !is_file && self.physical_name(name, true) == component);
            matches.then(|| entry.path())
        })
    }

    fn physical_name(&self, name: &str, is_file: bool) -> String {
        normalize_component(name, self.backend, is_file)
    }
}

impl Storage for DirectoryStorage {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn load_file(&self, path: &SystemPath, out: &mut Vec<u8>) -> bool {
        let Some(host_path) = self.locate(path) else {
            debug!("{} not found under {}", path, self.root.display());
            return false;
        };

        match read_file_with_limit(&host_path, self.max_file_bytes, out) {
            Ok(()) => true,
            Err(err) => {
                debug!("Failed to load {}: {:#}", path, err);
                false
            }
        }
    }

    fn file_exists(&self, path: &SystemPath) -> bool {
        self.locate(path).is_some_and(|host_path| host_path.is_file())
    }

    fn iterate_dir(&self, dir: &SystemPath, visitor: &mut dyn FnMut(&DirEntry), recursive: bool) {
        let Some(host_dir) = self.locate(dir) else {
            debug!("{} not found under {}", dir, self.root.display());
            return;
        };

        let max_depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(&host_dir).min_depth(1).max_depth(max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Skipping unreadable entry under {}: {}", dir, err);
                    continue;
                }
            };
            // Spell entries from the root, so a directory reached through its
            // shortened name still reports children that load.
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };

            let is_dir = entry.file_type().is_dir();
            let depth = relative.components().count();
            let mut path = SystemPath::from_logical("", self.backend);
            for (index, component) in relative.components().enumerate() {
                let name = component.as_os_str().to_string_lossy();
                let is_file = index + 1 == depth && !is_dir;
                path = path.join(&self.physical_name(&name, is_file));
            }

            visitor(&DirEntry { path, is_dir });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::list_dir;
    use egg_shared::PathResolver;
    use std::collections::HashSet;
    use std::fs;

    const HOST: PathResolver = PathResolver::new(Backend::Host);
    const CDROM: PathResolver = PathResolver::new(Backend::Cdrom);

    fn asset_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let sounds = dir.path().join("assets").join("sounds");
        fs::create_dir_all(&sounds).unwrap();
        fs::write(sounds.join("vine-boom.adpcm"), b"boom").unwrap();
        fs::write(dir.path().join("assets").join("logo.tex"), b"logo").unwrap();
        fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        dir
    }

    #[test]
    fn test_host_loads_by_normalized_name() {
        let dir = asset_tree();
        let storage = DirectoryStorage::host(dir.path());

        let mut out = Vec::new();
        let path = HOST.resolve("assets/sounds/vine-boom.adpcm");
        assert_eq!(path, "host0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM");
        assert!(storage.load_file(&path, &mut out));
        assert_eq!(out, b"boom");
        assert!(storage.file_exists(&path));
    }

    #[test]
    fn test_cdrom_loads_short_names() {
        let dir = asset_tree();
        let storage = DirectoryStorage::cdrom(dir.path());

        let mut out = Vec::new();
        let path = CDROM.resolve("assets/sounds/vine_boom.adpcm");
        assert_eq!(path, "cdrom0:\\ASSETS\\SOUNDS\\VINE_BOO.ADP");
        assert!(storage.load_file(&path, &mut out));
        assert_eq!(out, b"boom");
    }

    #[test]
    fn test_missing_and_foreign_paths() {
        let dir = asset_tree();
        let storage = DirectoryStorage::host(dir.path());
        let mut out = vec![1, 2, 3];

        assert!(!storage.load_file(&HOST.resolve("assets/missing.tex"), &mut out));
        assert!(!storage.load_file(&CDROM.resolve("readme.txt"), &mut out));
        assert!(!storage.file_exists(&HOST.resolve("nope")));
        // Directories exist but are not files.
        assert!(!storage.file_exists(&HOST.resolve("assets")));
    }

    #[test]
    fn test_size_cap_is_enforced() {
        let dir = asset_tree();
        let storage = DirectoryStorage::host(dir.path()).with_max_file_bytes(3);
        let mut out = Vec::new();
        assert!(!storage.load_file(&HOST.resolve("readme.txt"), &mut out));
        assert!(!storage.load_file(&HOST.resolve("assets/sounds/vine-boom.adpcm"), &mut out));

        let storage = storage.with_max_file_bytes(4);
        assert!(storage.load_file(&HOST.resolve("assets/sounds/vine-boom.adpcm"), &mut out));
    }

    #[test]
    fn test_iterate_non_recursive() {
        let dir = asset_tree();
        let storage = DirectoryStorage::host(dir.path());

        let entries: HashSet<_> = list_dir(&storage, &HOST.root(), false).into_iter().collect();
        let expected: HashSet<_> = [
            DirEntry { path: SystemPath::verbatim("host0:/ASSETS"), is_dir: true },
            DirEntry { path: SystemPath::verbatim("host0:/README.TXT"), is_dir: false },
        ]
        .into_iter()
        .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_iterate_recursive_visits_each_entry_once() {
        let dir = asset_tree();
        let storage = DirectoryStorage::cdrom(dir.path());

        let entries = list_dir(&storage, &CDROM.root(), true);
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        let unique: HashSet<&str> = paths.iter().copied().collect();
        assert_eq!(paths.len(), unique.len());
        assert_eq!(
            unique,
            HashSet::from([
                "cdrom0:\\ASSETS",
                "cdrom0:\\ASSETS\\SOUNDS",
                "cdrom0:\\ASSETS\\SOUNDS\\VINE_BOO.ADP",
                "cdrom0:\\ASSETS\\LOGO.TEX",
                "cdrom0:\\README.TXT",
            ])
        );

        // Pre-order: a directory is reported before anything inside it.
        let position = |p: &str| paths.iter().position(|x| *x == p).unwrap();
        assert!(position("cdrom0:\\ASSETS") < position("cdrom0:\\ASSETS\\SOUNDS"));
        assert!(position("cdrom0:\\ASSETS\\SOUNDS") < position("cdrom0:\\ASSETS\\SOUNDS\\VINE_BOO.ADP"));

        // Every reported file loads through the same storage.
        let mut out = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            assert!(storage.load_file(&entry.path, &mut out), "{}", entry.path);
        }
    }

    #[test]
    fn test_iterate_subdirectory() {
        let dir = asset_tree();
        let storage = DirectoryStorage::host(dir.path());

        let entries = list_dir(&storage, &HOST.resolve("assets/sounds"), false);
        assert_eq!(
            entries,
            vec![DirEntry {
                path: SystemPath::verbatim("host0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM"),
                is_dir: false,
            }]
        );

        assert!(list_dir(&storage, &HOST.resolve("missing"), true).is_empty());
    }

    #[test]
    fn test_write_file_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirectoryStorage::host(dir.path());

        let path = HOST.resolve("build/levels/castle.level");
        assert!(storage.write_file(&path, b"level bytes"));
        assert!(storage.file_exists(&path));

        let mut out = Vec::new();
        assert!(storage.load_file(&path, &mut out));
        assert_eq!(out, b"level bytes");

        // Overwrite goes to the same file.
        assert!(storage.write_file(&path, b"v2"));
        assert!(storage.load_file(&path, &mut out));
        assert_eq!(out, b"v2");
    }

    #[test]
    fn test_cdrom_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirectoryStorage::cdrom(dir.path());
        assert!(!storage.write_file(&CDROM.resolve("save.dat"), b"x"));
    }

    #[test]
    fn test_paths_cannot_leave_the_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(outer.path().join("SECRET.TXT"), b"outside").unwrap();
        fs::write(root.join("inside.txt"), b"inside").unwrap();

        let storage = DirectoryStorage::host(&root);
        let mut out = Vec::new();

        let escape = HOST.resolve("../secret.txt");
        assert_eq!(escape, "host0:/../SECRET.TXT");
        assert!(!storage.load_file(&escape, &mut out));
        assert!(!storage.file_exists(&escape));
        assert!(!storage.load_file(&HOST.resolve("assets/../../secret.txt"), &mut out));
        assert!(!storage.load_file(&HOST.resolve("./inside.txt"), &mut out));
        assert!(list_dir(&storage, &HOST.resolve(".."), true).is_empty());
        assert!(!storage.write_file(&HOST.resolve("../planted.txt"), b"x"));
        assert!(!outer.path().join("PLANTED.TXT").exists());

        assert!(storage.load_file(&HOST.resolve("inside.txt"), &mut out));
        assert_eq!(out, b"inside");
    }

    #[test]
    fn test_cdrom_lists_directory_with_long_name() {
        let dir = tempfile::tempdir().unwrap();
        let backgrounds = dir.path().join("backgrounds");
        fs::create_dir_all(&backgrounds).unwrap();
        fs::write(backgrounds.join("sky.tex"), b"sky").unwrap();
        let storage = DirectoryStorage::cdrom(dir.path());

        let requested = CDROM.resolve("backgrounds");
        assert_eq!(requested, "cdrom0:\\BACKGROU");

        let entries = list_dir(&storage, &requested, false);
        assert_eq!(
            entries,
            vec![DirEntry {
                path: SystemPath::verbatim("cdrom0:\\BACKGROUNDS\\SKY.TEX"),
                is_dir: false,
            }]
        );

        // Reported children load, and full-length directory names still
        // work in the middle of a path.
        let mut out = Vec::new();
        assert!(storage.load_file(&entries[0].path, &mut out));
        assert_eq!(out, b"sky");
        assert!(storage.file_exists(&CDROM.resolve("backgrounds/sky.tex")));
    }
}
