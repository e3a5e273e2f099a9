//! Level loading and dependency discovery.
//!
//! Ties storage, blob views and reference collection together: load a level,
//! collect the assets it names, and resolve them through the asset table to
//! the physical paths the active backend must provide.

use std::collections::BTreeSet;

use egg_shared::{PathResolver, SystemPath};
use thiserror::Error;
use tracing::debug;

use crate::blob::BlobError;
use crate::formats::{AssetReference, AssetTableView, LevelView};
use crate::references::ReferenceSet;
use crate::storage::{AlignedBuffer, Storage};

/// Errors raised while loading blobs from storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Storage could not provide the file
    #[error("failed to read {0}")]
    Read(SystemPath),

    /// The file was read but is not a valid blob
    #[error("invalid blob {path}: {source}")]
    Blob {
        path: SystemPath,
        #[source]
        source: BlobError,
    },

    /// The asset table itself is corrupt
    #[error("invalid asset table: {0}")]
    Table(#[source] BlobError),

    /// A blob names an asset the asset table does not list
    #[error("asset {0} is not listed in the asset table")]
    UnresolvedReference(AssetReference),
}

/// Read `path` into a blob-aligned buffer.
pub fn load_blob(storage: &dyn Storage, path: &SystemPath) -> Result<AlignedBuffer, LoadError> {
    let mut buffer = AlignedBuffer::for_blob();
    if !storage.load_file_aligned(path, &mut buffer) {
        return Err(LoadError::Read(path.clone()));
    }
    Ok(buffer)
}

/// Add the references of the level at `path` to `out`.
pub fn collect_level_references(
    storage: &dyn Storage,
    path: &SystemPath,
    out: &mut ReferenceSet,
) -> Result<(), LoadError> {
    let buffer = load_blob(storage, path)?;
    let blob_error = |source| LoadError::Blob {
        path: path.clone(),
        source,
    };

    let level = LevelView::parse(buffer.blob()).map_err(blob_error)?;
    let before = out.len();
    level.collect_references(out).map_err(blob_error)?;
    debug!(
        "{}: {} meshes, {} new references",
        path,
        level.mesh_count(),
        out.len() - before
    );
    Ok(())
}

/// Every file needed to show `levels`: the levels themselves plus each
/// asset they reference, as physical paths for `resolver`'s backend.
pub fn dependency_closure(
    storage: &dyn Storage,
    table: &AssetTableView<'_>,
    resolver: &PathResolver,
    levels: &[SystemPath],
) -> Result<BTreeSet<SystemPath>, LoadError> {
    let mut references = ReferenceSet::new();
    for level in levels {
        collect_level_references(storage, level, &mut references)?;
    }

    let mut files: BTreeSet<SystemPath> = levels.iter().cloned().collect();
    for reference in references {
        let path = table
            .system_path(reference, resolver)
            .map_err(LoadError::Table)?
            .ok_or(LoadError::UnresolvedReference(reference))?;
        files.insert(path);
    }
    Ok(files)
}
