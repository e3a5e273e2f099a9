//! Reference collection
//!
//! Walks a blob record and gathers every [`AssetReference`] reachable from
//! it, so loaders can request dependencies before the record is used.
//! Records opt in by implementing [`CollectReferences`]; offset containers
//! forward to their elements, so nesting composes without extra code.

use bytemuck::Pod;
use hashbrown::HashSet;

use crate::blob::{Blob, BlobError, OffsetArray, OffsetPointer};
use crate::formats::AssetReference;

/// Set of distinct references gathered from one or more records.
pub type ReferenceSet = HashSet<AssetReference>;

/// A blob record that can name other assets.
pub trait CollectReferences {
    /// Insert every reference reachable from `self` into `out`.
    ///
    /// `blob` is the blob that contains `self`; offsets are resolved
    /// against it.
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError>;
}

impl CollectReferences for AssetReference {
    fn collect_references(&self, _blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        out.insert(*self);
        Ok(())
    }
}

impl<T: CollectReferences> CollectReferences for [T] {
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.iter()
            .try_for_each(|item| item.collect_references(blob, out))
    }
}

impl<T: Pod + CollectReferences> CollectReferences for OffsetArray<T> {
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.view(blob)?.collect_references(blob, out)
    }
}

impl<T: Pod + CollectReferences> CollectReferences for OffsetPointer<T> {
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.resolve(blob)?.collect_references(blob, out)
    }
}

/// Gather the references of `record` into `out`.
///
/// Existing contents of `out` are kept, so one set can accumulate several
/// records. Collecting the same record twice leaves the set unchanged.
pub fn collect_references<R>(out: &mut ReferenceSet, blob: &Blob<'_>, record: &R) -> Result<(), BlobError>
where
    R: CollectReferences + ?Sized,
{
    record.collect_references(blob, out)
}
