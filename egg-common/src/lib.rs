//! Storage backends and blob formats for the Egg runtime.
//!
//! - [`storage`] - the [`Storage`] trait and its directory / ROM backends
//! - [`blob`] - relocatable blobs addressed with 32-bit offsets
//! - [`formats`] - asset references, asset tables and level files
//! - [`references`] - gathering the assets a blob depends on
//! - [`cache`] - loaded-file cache
//! - [`loader`] - level loading and dependency closure
//!
//! Path rules and backend selection live in `egg-shared`.

pub mod blob;
pub mod cache;
pub mod formats;
pub mod loader;
pub mod references;
pub mod storage;

pub use blob::{BLOB_ALIGNMENT, Blob, BlobBuilder, BlobError, OffsetArray, OffsetPointer};
pub use cache::FileCache;
pub use formats::AssetReference;
pub use loader::{LoadError, collect_level_references, dependency_closure, load_blob};
pub use references::{CollectReferences, ReferenceSet, collect_references};
pub use storage::{
    AlignedBuffer, DirEntry, DirectoryStorage, RomStorage, Storage, list_dir, open_storage,
};
