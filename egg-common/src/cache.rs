//! Loaded-file cache keyed by physical path.

use std::sync::Arc;

use egg_shared::SystemPath;
use hashbrown::HashMap;
use tracing::debug;

use crate::storage::{AlignedBuffer, Storage};

/// Keeps blob-aligned file contents alive between requests.
///
/// Lookups accept any `&str`, so callers holding a [`SystemPath`] or a
/// plain string hit the same entry.
pub struct FileCache {
    storage: Arc<dyn Storage>,
    files: HashMap<SystemPath, Arc<AlignedBuffer>>,
}

impl FileCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            files: HashMap::new(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Cached contents of `path`, loading them on first use.
    pub fn load(&mut self, path: &SystemPath) -> Option<Arc<AlignedBuffer>> {
        if let Some(buffer) = self.files.get(path.as_str()) {
            return Some(Arc::clone(buffer));
        }

        let mut buffer = AlignedBuffer::for_blob();
        if !self.storage.load_file_aligned(path, &mut buffer) {
            return None;
        }

        debug!("Cached {} ({} bytes)", path, buffer.len());
        let buffer = Arc::new(buffer);
        self.files.insert(path.clone(), Arc::clone(&buffer));
        Some(buffer)
    }

    /// Cached contents, without touching storage.
    pub fn get(&self, path: &str) -> Option<Arc<AlignedBuffer>> {
        self.files.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Drop one entry. Buffers still held by callers stay valid.
    pub fn evict(&mut self, path: &str) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
