//! Asset table blob: maps [`AssetReference`]s back to logical paths.
//!
//! # Layout
//! ```text
//! 0x00: AssetTableHeader   entries: OffsetArray<AssetTableEntry>
//! var:  path strings       UTF-8, not terminated
//! var:  entries            sorted by reference, 16 bytes each
//! ```

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use egg_shared::{PathResolver, SystemPath};

use super::AssetReference;
use crate::blob::{Blob, BlobBuilder, BlobError, OffsetArray};

/// One table row.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct AssetTableEntry {
    pub reference: AssetReference,
    /// Logical path as written by the tool
    pub path: OffsetArray<u8>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct AssetTableHeader {
    pub entries: OffsetArray<AssetTableEntry>,
}

/// Collects logical paths and writes the table blob.
#[derive(Debug, Clone, Default)]
pub struct AssetTableBuilder {
    paths: BTreeMap<AssetReference, String>,
}

impl AssetTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a logical path. Spellings that share a reference keep the
    /// first path added.
    pub fn add(&mut self, logical: &str) -> AssetReference {
        let reference = AssetReference::from_logical(logical);
        self.paths
            .entry(reference)
            .or_insert_with(|| logical.to_owned());
        reference
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn build(&self) -> Result<Vec<u8>, BlobError> {
        let mut builder = BlobBuilder::<AssetTableHeader>::new();

        let mut entries = Vec::with_capacity(self.paths.len());
        for (&reference, path) in &self.paths {
            entries.push(AssetTableEntry {
                reference,
                path: builder.push_str(path)?,
            });
        }

        let header = AssetTableHeader {
            entries: builder.push_array(&entries)?,
        };
        Ok(builder.finish(&header))
    }
}

/// Read-only view over a loaded asset table.
#[derive(Debug, Clone, Copy)]
pub struct AssetTableView<'a> {
    blob: Blob<'a>,
    entries: &'a [AssetTableEntry],
}

impl<'a> AssetTableView<'a> {
    pub fn parse(blob: Blob<'a>) -> Result<Self, BlobError> {
        let header: &AssetTableHeader = blob.header()?;
        let entries = header.entries.view(&blob)?;
        Ok(Self { blob, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logical path for `reference`, `Ok(None)` if it is not listed.
    pub fn resolve(&self, reference: AssetReference) -> Result<Option<&'a str>, BlobError> {
        match self
            .entries
            .binary_search_by_key(&reference, |entry| entry.reference)
        {
            Ok(index) => self.path_of(&self.entries[index]).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Physical path for `reference` under `resolver`'s backend.
    pub fn system_path(
        &self,
        reference: AssetReference,
        resolver: &PathResolver,
    ) -> Result<Option<SystemPath>, BlobError> {
        Ok(self.resolve(reference)?.map(|path| resolver.resolve(path)))
    }

    /// Every row, in reference order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(AssetReference, &'a str), BlobError>> + '_ {
        self.entries
            .iter()
            .map(|entry| Ok((entry.reference, self.path_of(entry)?)))
    }

    fn path_of(&self, entry: &AssetTableEntry) -> Result<&'a str, BlobError> {
        let bytes = entry.path.view(&self.blob)?;
        std::str::from_utf8(bytes).map_err(|_| BlobError::InvalidUtf8 {
            offset: entry.path.offset(),
        })
    }
}
