//! Relocatable blob layout
//!
//! A blob is one contiguous byte buffer: a fixed-size header at offset 0,
//! followed by the variable-length sections it points at. Sections are
//! addressed with [`OffsetArray`] / [`OffsetPointer`] values that store a
//! byte offset from the blob start, never an address, so a blob can be
//! copied anywhere and still resolve.
//!
//! # Design Principles
//!
//! - **On-disk bytes are the in-memory representation**: a loaded buffer
//!   is viewed in place with `bytemuck`, no parse pass
//! - **Bounds-checked views**: every offset is checked against the blob
//!   length before it is materialized
//! - **Writer lays out, reader trusts nothing**: [`BlobBuilder`] produces
//!   valid offsets; [`Blob`] still rejects corrupt ones
//!
//! # Layout
//! ```text
//! 0x00: header H (size_of::<H>() bytes)
//! var:  section 0 (aligned to align_of::<T0>())
//! var:  section 1 (aligned to align_of::<T1>())
//! ...
//! ```
//!
//! No magic bytes or version: the header type is determined by context
//! (which loader reads the file). Blobs are little-endian.

mod builder;
mod offset;


pub use builder::BlobBuilder;
pub use offset::{OffsetArray, OffsetPointer};

use std::mem::{align_of, size_of};

use bytemuck::Pod;
use thiserror::Error;

/// Alignment loaders use for blob buffers (one 128-bit quadword).
///
/// Every section type must have an alignment that divides this.
pub const BLOB_ALIGNMENT: usize = 16;

/// Errors raised while writing or viewing a blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    /// An offset reference points outside the blob
    #[error("corrupt blob: {len} bytes at offset {offset} exceed the {blob_len} byte blob")]
    OutOfBounds {
        offset: u32,
        len: usize,
        blob_len: usize,
    },

    /// A section is not aligned for its element type
    #[error("corrupt blob: offset {offset} is not aligned to {align} bytes")]
    Misaligned { offset: u32, align: usize },

    /// The blob no longer fits 32-bit offsets
    #[error("blob too large for 32-bit offsets ({len} bytes)")]
    TooLarge { len: usize },

    /// Parallel sections have different element counts
    #[error("corrupt blob: parallel sections hold {expected} and {found} elements")]
    CountMismatch { expected: usize, found: usize },

    /// A string section is not valid UTF-8
    #[error("corrupt blob: string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u32 },
}

/// Read-only view over a blob's bytes.
#[derive(Debug, Clone, Copy)]
pub struct Blob<'a> {
    bytes: &'a [u8],
}

impl<'a> Blob<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The header stored at offset 0.
    pub fn header<H: Pod>(&self) -> Result<&'a H, BlobError> {
        self.read(0)
    }

    /// Materialize a single element.
    pub fn pointee<T: Pod>(&self, pointer: OffsetPointer<T>) -> Result<&'a T, BlobError> {
        self.read(pointer.offset())
    }

    /// Materialize a run of elements.
    ///
    /// Empty arrays resolve to an empty slice regardless of their offset.
    pub fn array<T: Pod>(&self, array: OffsetArray<T>) -> Result<&'a [T], BlobError> {
        if array.is_empty() {
            return Ok(&[]);
        }

        let offset = array.offset();
        let len = array.len().checked_mul(size_of::<T>()).ok_or(BlobError::OutOfBounds {
            offset,
            len: usize::MAX,
            blob_len: self.bytes.len(),
        })?;

        let bytes = self.range(offset, len)?;
        bytemuck::try_cast_slice(bytes).map_err(|_| BlobError::Misaligned {
            offset,
            align: align_of::<T>(),
        })
    }

    fn read<T: Pod>(&self, offset: u32) -> Result<&'a T, BlobError> {
        let bytes = self.range(offset, size_of::<T>())?;
        bytemuck::try_from_bytes(bytes).map_err(|_| BlobError::Misaligned {
            offset,
            align: align_of::<T>(),
        })
    }

    fn range(&self, offset: u32, len: usize) -> Result<&'a [u8], BlobError> {
        let start = offset as usize;
        start
            .checked_add(len)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or(BlobError::OutOfBounds {
                offset,
                len,
                blob_len: self.bytes.len(),
            })
    }
}
