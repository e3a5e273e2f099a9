//! Storage backends
//!
//! [`Storage`] is the seam between the engine and whatever holds the bytes.
//! Every operation takes a physical [`SystemPath`] for the storage's own
//! backend; a path with another prefix simply does not exist there.
//!
//! Implementations:
//! - [`DirectoryStorage`] - a host directory, either as the `host0:` tree or
//!   as an extracted `cdrom0:` disc image with 8.3 names
//! - [`RomStorage`] - an in-memory `rom0:` file table

mod aligned;
mod directory;
mod rom;

pub use aligned::{AlignedBuffer, MAX_ALIGNMENT};
pub use directory::DirectoryStorage;
pub use rom::RomStorage;

use anyhow::{Context, Result};
use egg_shared::{Backend, FilesystemConfig, SystemPath};

/// One entry reported by [`Storage::iterate_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirEntry {
    /// Full physical path of the entry
    pub path: SystemPath,
    pub is_dir: bool,
}

/// Abstract file storage.
///
/// Failures are reported as `false` / no callbacks and logged at debug
/// level; callers decide whether a missing file is an error.
pub trait Storage: Send + Sync {
    /// Backend whose paths this storage understands.
    fn backend(&self) -> Backend;

    /// Replace `out` with the file contents. Returns `false` if the file
    /// is missing or unreadable.
    fn load_file(&self, path: &SystemPath, out: &mut Vec<u8>) -> bool;

    /// Like [`load_file`](Self::load_file), into a buffer whose base honors
    /// the buffer's alignment, so the bytes can be viewed as a blob.
    fn load_file_aligned(&self, path: &SystemPath, out: &mut AlignedBuffer) -> bool {
        let mut bytes = Vec::new();
        if !self.load_file(path, &mut bytes) {
            return false;
        }
        out.fill_from(&bytes);
        true
    }

    fn file_exists(&self, path: &SystemPath) -> bool;

    /// Visit the entries under `dir` in pre-order, descending into
    /// subdirectories when `recursive` is set. Each entry is visited once.
    fn iterate_dir(&self, dir: &SystemPath, visitor: &mut dyn FnMut(&DirEntry), recursive: bool);
}

/// Collect [`Storage::iterate_dir`] output into a list.
pub fn list_dir(storage: &dyn Storage, dir: &SystemPath, recursive: bool) -> Vec<DirEntry> {
    let mut entries = Vec::new();
    storage.iterate_dir(dir, &mut |entry| entries.push(entry.clone()), recursive);
    entries
}

/// Open the storage described by the `[filesystem]` config section.
pub fn open_storage(config: &FilesystemConfig) -> Result<Box<dyn Storage>> {
    let backend = config.backend()?;
    let storage: Box<dyn Storage> = match backend {
        Backend::Host => Box::new(
            DirectoryStorage::host(&config.root).with_max_file_bytes(config.max_file_bytes),
        ),
        Backend::Cdrom => Box::new(
            DirectoryStorage::cdrom(&config.root).with_max_file_bytes(config.max_file_bytes),
        ),
        Backend::Rom => Box::new(
            RomStorage::from_directory(&config.root, config.max_file_bytes).with_context(|| {
                format!("Failed to build ROM image from {}", config.root.display())
            })?,
        ),
    };

    tracing::info!("Opened {} storage at {}", backend, config.root.display());
    Ok(storage)
}
