//! Blob writer used by offline tooling.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::Pod;

use super::{BlobError, OffsetArray, OffsetPointer};

/// Lays out a blob with header `H`.
///
/// The header slot is reserved up front and filled by [`finish`](Self::finish)
/// once every section offset is known. Sections are appended in call order,
/// each padded to the alignment of its element type.
#[derive(Debug)]
pub struct BlobBuilder<H> {
    bytes: Vec<u8>,
    _header: PhantomData<H>,
}

impl<H: Pod> BlobBuilder<H> {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; size_of::<H>()],
            _header: PhantomData,
        }
    }

    /// Bytes written so far, header slot included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append a section and return the array that addresses it.
    pub fn push_array<T: Pod>(&mut self, items: &[T]) -> Result<OffsetArray<T>, BlobError> {
        if items.is_empty() {
            return Ok(OffsetArray::empty());
        }

        let count = u32::try_from(items.len()).map_err(|_| BlobError::TooLarge { len: items.len() })?;
        let offset = self.append(bytemuck::cast_slice(items), align_of::<T>())?;
        Ok(OffsetArray::new(offset, count))
    }

    /// Append a single element.
    pub fn push<T: Pod>(&mut self, item: &T) -> Result<OffsetPointer<T>, BlobError> {
        let offset = self.append(bytemuck::bytes_of(item), align_of::<T>())?;
        Ok(OffsetPointer::new(offset))
    }

    /// Append UTF-8 text as a byte section.
    pub fn push_str(&mut self, text: &str) -> Result<OffsetArray<u8>, BlobError> {
        self.push_array(text.as_bytes())
    }

    /// Write the header and return the finished bytes.
    pub fn finish(mut self, header: &H) -> Vec<u8> {
        self.bytes[..size_of::<H>()].copy_from_slice(bytemuck::bytes_of(header));
        self.bytes
    }

    fn append(&mut self, data: &[u8], align: usize) -> Result<u32, BlobError> {
        let start = self.bytes.len().next_multiple_of(align);
        let end = start + data.len();
        if end > u32::MAX as usize {
            return Err(BlobError::TooLarge { len: end });
        }

        self.bytes.resize(start, 0);
        self.bytes.extend_from_slice(data);
        // `end` fits, so `start` does too.
        Ok(start as u32)
    }
}

impl<H: Pod> Default for BlobBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}
