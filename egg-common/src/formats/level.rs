//! Level file blob.
//!
//! A level places meshes in the world. Transforms and mesh references are
//! parallel arrays: mesh `i` uses `mesh_transforms[i]` and `mesh_files[i]`.
//!
//! # Layout
//! ```text
//! 0x00: LevelFileHeader
//!         meshes.mesh_transforms  OffsetArray<Matrix>          8 bytes
//!         meshes.mesh_files       OffsetArray<AssetReference>  8 bytes
//! var:  transforms  64 bytes each, column-major f32
//! var:  mesh files   8 bytes each
//! ```

use bytemuck::{Pod, Zeroable};
use egg_shared::Matrix;

use super::AssetReference;
use crate::blob::{Blob, BlobBuilder, BlobError, OffsetArray};
use crate::references::{CollectReferences, ReferenceSet};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LevelMeshes {
    pub mesh_transforms: OffsetArray<Matrix>,
    pub mesh_files: OffsetArray<AssetReference>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LevelFileHeader {
    pub meshes: LevelMeshes,
}

impl CollectReferences for LevelMeshes {
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.mesh_files.collect_references(blob, out)
    }
}

impl CollectReferences for LevelFileHeader {
    fn collect_references(&self, blob: &Blob<'_>, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.meshes.collect_references(blob, out)
    }
}

/// One placed mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMesh<'a> {
    pub transform: &'a Matrix,
    pub file: AssetReference,
}

/// Writes a level blob.
#[derive(Debug, Clone, Default)]
pub struct LevelBuilder {
    transforms: Vec<Matrix>,
    files: Vec<AssetReference>,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, transform: Matrix, file: AssetReference) -> &mut Self {
        self.transforms.push(transform);
        self.files.push(file);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn build(&self) -> Result<Vec<u8>, BlobError> {
        let mut builder = BlobBuilder::<LevelFileHeader>::new();
        let meshes = LevelMeshes {
            mesh_transforms: builder.push_array(&self.transforms)?,
            mesh_files: builder.push_array(&self.files)?,
        };
        Ok(builder.finish(&LevelFileHeader { meshes }))
    }
}

/// Validated view over a loaded level.
#[derive(Debug, Clone, Copy)]
pub struct LevelView<'a> {
    blob: Blob<'a>,
    header: &'a LevelFileHeader,
    transforms: &'a [Matrix],
    files: &'a [AssetReference],
}

impl<'a> LevelView<'a> {
    /// Check every section and the parallel-array invariant.
    pub fn parse(blob: Blob<'a>) -> Result<Self, BlobError> {
        let header: &LevelFileHeader = blob.header()?;
        let transforms = header.meshes.mesh_transforms.view(&blob)?;
        let files = header.meshes.mesh_files.view(&blob)?;

        if transforms.len() != files.len() {
            return Err(BlobError::CountMismatch {
                expected: transforms.len(),
                found: files.len(),
            });
        }

        Ok(Self {
            blob,
            header,
            transforms,
            files,
        })
    }

    pub fn header(&self) -> &'a LevelFileHeader {
        self.header
    }

    pub fn blob(&self) -> Blob<'a> {
        self.blob
    }

    pub fn mesh_count(&self) -> usize {
        self.files.len()
    }

    pub fn mesh_transforms(&self) -> &'a [Matrix] {
        self.transforms
    }

    pub fn mesh_files(&self) -> &'a [AssetReference] {
        self.files
    }

    pub fn meshes(&self) -> impl Iterator<Item = LevelMesh<'a>> + 'a {
        self.transforms
            .iter()
            .zip(self.files.iter().copied())
            .map(|(transform, file)| LevelMesh { transform, file })
    }

    /// References of every placed mesh.
    pub fn collect_references(&self, out: &mut ReferenceSet) -> Result<(), BlobError> {
        self.header.collect_references(&self.blob, out)
    }
}
