//! Byte buffers with a guaranteed base alignment.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::blob::{BLOB_ALIGNMENT, Blob};

/// Largest alignment an [`AlignedBuffer`] can honor.
pub const MAX_ALIGNMENT: usize = 64;

const _: () = assert!(BLOB_ALIGNMENT.is_power_of_two() && BLOB_ALIGNMENT <= MAX_ALIGNMENT);

#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct Block([u8; MAX_ALIGNMENT]);

// SAFETY: Block is a single byte array whose size equals its alignment, so
// it has no padding and every bit pattern is valid.
unsafe impl Zeroable for Block {}
unsafe impl Pod for Block {}

/// Growable byte buffer whose first byte sits on an `alignment` boundary.
///
/// Backed by 64-byte aligned blocks, so any power-of-two alignment up to
/// [`MAX_ALIGNMENT`] holds for the whole lifetime of the buffer.
#[derive(Clone)]
pub struct AlignedBuffer {
    blocks: Vec<Block>,
    len: usize,
    alignment: usize,
}

impl AlignedBuffer {
    /// Empty buffer. `None` unless `alignment` is a power of two no larger
    /// than [`MAX_ALIGNMENT`].
    pub fn new(alignment: usize) -> Option<Self> {
        (alignment.is_power_of_two() && alignment <= MAX_ALIGNMENT).then(|| Self {
            blocks: Vec::new(),
            len: 0,
            alignment,
        })
    }

    /// Empty buffer aligned for blob views ([`BLOB_ALIGNMENT`]).
    pub fn for_blob() -> Self {
        Self {
            blocks: Vec::new(),
            len: 0,
            alignment: BLOB_ALIGNMENT,
        }
    }

    /// Aligned copy of `bytes`.
    pub fn from_bytes(bytes: &[u8], alignment: usize) -> Option<Self> {
        let mut buffer = Self::new(alignment)?;
        buffer.fill_from(bytes);
        Some(buffer)
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..self.len]
    }

    /// Resize to `len` bytes; bytes past the old length are zeroed.
    pub fn resize(&mut self, len: usize) {
        let old_len = self.len;
        self.blocks.resize(len.div_ceil(MAX_ALIGNMENT), Block::zeroed());
        self.len = len;
        if len > old_len {
            self.as_bytes_mut()[old_len..].fill(0);
        }
    }

    /// Replace the contents with a copy of `bytes`.
    pub fn fill_from(&mut self, bytes: &[u8]) {
        self.resize(bytes.len());
        self.as_bytes_mut().copy_from_slice(bytes);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }

    /// View the contents as a blob.
    pub fn blob(&self) -> Blob<'_> {
        Blob::new(self.as_bytes())
    }
}

impl AsRef<[u8]> for AlignedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_alignment() {
        assert!(AlignedBuffer::new(0).is_none());
        assert!(AlignedBuffer::new(12).is_none());
        assert!(AlignedBuffer::new(128).is_none());
        assert!(AlignedBuffer::new(16).is_some());
    }

    #[test]
    fn test_blob_buffer_uses_blob_alignment() {
        let mut buffer = AlignedBuffer::for_blob();
        assert_eq!(buffer.alignment(), BLOB_ALIGNMENT);
        assert!(buffer.is_empty());

        buffer.fill_from(&[3; 33]);
        assert_eq!(buffer.as_bytes().as_ptr() as usize % BLOB_ALIGNMENT, 0);
    }

    #[test]
    fn test_base_address_is_aligned() {
        for alignment in [1, 4, 16, 64] {
            let buffer = AlignedBuffer::from_bytes(&[7; 100], alignment).unwrap();
            assert_eq!(buffer.as_bytes().as_ptr() as usize % alignment, 0);
            assert_eq!(buffer.len(), 100);
        }
    }

    #[test]
    fn test_resize_zeroes_new_bytes() {
        let mut buffer = AlignedBuffer::from_bytes(&[0xAA; 10], 16).unwrap();
        buffer.resize(4);
        buffer.resize(12);
        assert_eq!(&buffer.as_bytes()[..4], &[0xAA; 4]);
        assert_eq!(&buffer.as_bytes()[4..], &[0; 8]);
    }

    #[test]
    fn test_fill_replaces_contents() {
        let mut buffer = AlignedBuffer::from_bytes(b"first contents", 16).unwrap();
        buffer.fill_from(b"two");
        assert_eq!(buffer.as_bytes(), b"two");
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
