//! Offset references into a blob.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::{Pod, Zeroable};

use super::{Blob, BlobError};

/// `count` contiguous elements of `T` stored `offset` bytes from the start
/// of the containing blob.
///
/// Layout: 8 bytes, align 4.
/// ```text
/// 0x00: offset u32
/// 0x04: count  u32
/// ```
#[repr(C)]
pub struct OffsetArray<T> {
    offset: u32,
    count: u32,
    _marker: PhantomData<T>,
}

const _: () = assert!(size_of::<OffsetArray<u64>>() == 8);
const _: () = assert!(align_of::<OffsetArray<u64>>() == 4);

impl<T> OffsetArray<T> {
    pub const fn new(offset: u32, count: u32) -> Self {
        Self {
            offset,
            count,
            _marker: PhantomData,
        }
    }

    /// An array with no elements.
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Byte offset from the blob start.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        self.count as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<T: Pod> OffsetArray<T> {
    /// Resolve against the blob that contains this array.
    pub fn view<'a>(&self, blob: &Blob<'a>) -> Result<&'a [T], BlobError> {
        blob.array(*self)
    }

    /// Resolve one element; `Ok(None)` if `index` is past the end.
    pub fn get<'a>(&self, blob: &Blob<'a>, index: usize) -> Result<Option<&'a T>, BlobError> {
        Ok(self.view(blob)?.get(index))
    }
}

// SAFETY: OffsetArray is #[repr(C)] with two u32 fields and a zero-sized
// marker, so it has no padding and every bit pattern is valid.
unsafe impl<T: Pod> Zeroable for OffsetArray<T> {}
unsafe impl<T: Pod> Pod for OffsetArray<T> {}

impl<T> Clone for OffsetArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OffsetArray<T> {}

impl<T> Default for OffsetArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for OffsetArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.count == other.count
    }
}

impl<T> Eq for OffsetArray<T> {}

impl<T> Hash for OffsetArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.count.hash(state);
    }
}

impl<T> fmt::Debug for OffsetArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffsetArray")
            .field("offset", &self.offset)
            .field("count", &self.count)
            .finish()
    }
}

/// A single `T` stored `offset` bytes from the start of the containing blob.
///
/// Layout: 4 bytes, align 4.
#[repr(C)]
pub struct OffsetPointer<T> {
    offset: u32,
    _marker: PhantomData<T>,
}

const _: () = assert!(size_of::<OffsetPointer<u64>>() == 4);

impl<T> OffsetPointer<T> {
    pub const fn new(offset: u32) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    /// Byte offset from the blob start.
    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

impl<T: Pod> OffsetPointer<T> {
    /// Resolve against the blob that contains this pointer.
    pub fn resolve<'a>(&self, blob: &Blob<'a>) -> Result<&'a T, BlobError> {
        blob.pointee(*self)
    }
}

// SAFETY: OffsetPointer is #[repr(C)] with one u32 field and a zero-sized
// marker, so it has no padding and every bit pattern is valid.
unsafe impl<T: Pod> Zeroable for OffsetPointer<T> {}
unsafe impl<T: Pod> Pod for OffsetPointer<T> {}

impl<T> Clone for OffsetPointer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OffsetPointer<T> {}

impl<T> PartialEq for OffsetPointer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T> Eq for OffsetPointer<T> {}

impl<T> Hash for OffsetPointer<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl<T> fmt::Debug for OffsetPointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OffsetPointer").field(&self.offset).finish()
    }
}
