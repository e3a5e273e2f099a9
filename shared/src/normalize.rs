//! Logical-to-physical path normalization.
//!
//! Developers write asset paths like `assets/sounds/vine-boom.adpcm`. Each
//! backend needs a different physical spelling:
//!
//! ```text
//! cdrom  cdrom0:\ASSETS\SOUNDS\VINE_BOO.ADP
//! host   host0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM
//! rom    rom0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM
//! ```
//!
//! The rules live in two `const fn`s, [`Segments::scan`] and [`map_byte`].
//! [`normalize`] (runtime, growable) and [`crate::FixedPath::from_logical`]
//! (compile time, fixed buffer) are both thin loops over them, so a path
//! baked into the binary is byte-for-byte what the runtime would produce.

use crate::backend::{Backend, BackendDescriptor};

/// Maximum stem length of an 8.3 filename.
pub const SHORT_STEM_LEN: usize = 8;

/// Maximum extension length of an 8.3 filename, including the dot.
pub const SHORT_EXTENSION_LEN: usize = 4;

#[inline]
const fn is_separator(byte: u8) -> bool {
    byte == b'/' || byte == b'\\'
}

#[inline]
const fn min(a: usize, b: usize) -> usize {
    if a < b { a } else { b }
}

/// Map one kept byte of a logical path to its physical form.
///
/// Separators become the backend separator, `-` becomes `_`, ASCII letters
/// are upper-cased and non-ASCII bytes become `_`.
#[inline]
pub const fn map_byte(byte: u8, separator: u8) -> u8 {
    match byte {
        b'/' | b'\\' => separator,
        b'-' => b'_',
        0x80..=0xFF => b'_',
        _ => byte.to_ascii_uppercase(),
    }
}

/// Byte ranges of a logical path that survive normalization.
///
/// The head covers everything up to the (possibly shortened) filename stem,
/// the extension range covers the kept part of the extension. For full-name
/// backends the extension range is empty and the head runs to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments {
    pub head_start: usize,
    pub head_end: usize,
    pub ext_start: usize,
    pub ext_end: usize,
}

impl Segments {
    /// Locate the kept ranges of `path`.
    ///
    /// Leading separators are skipped. The scan then walks back from the end
    /// until the last separator; the extension starts at the leftmost `.` of
    /// the filename. With `short_names` the stem keeps at most
    /// [`SHORT_STEM_LEN`] bytes and the extension at most
    /// [`SHORT_EXTENSION_LEN`].
    pub const fn scan(path: &[u8], short_names: bool) -> Self {
        let len = path.len();

        let mut head_start = 0;
        while head_start < len && is_separator(path[head_start]) {
            head_start += 1;
        }

        if !short_names {
            return Self {
                head_start,
                head_end: len,
                ext_start: len,
                ext_end: len,
            };
        }

        let mut filename_start = head_start;
        let mut ext_start = len;
        let mut i = len;
        while i > head_start {
            i -= 1;
            if is_separator(path[i]) {
                filename_start = i + 1;
                break;
            }
            if path[i] == b'.' {
                ext_start = i;
            }
        }

        Self {
            head_start,
            head_end: min(filename_start + SHORT_STEM_LEN, ext_start),
            ext_start,
            ext_end: ext_start + min(SHORT_EXTENSION_LEN, len - ext_start),
        }
    }

    /// Number of logical bytes kept.
    #[inline]
    pub const fn kept_len(&self) -> usize {
        (self.head_end - self.head_start) + (self.ext_end - self.ext_start)
    }

    /// Length of the physical path, prefix and separator included.
    #[inline]
    pub const fn output_len(&self, descriptor: &BackendDescriptor) -> usize {
        descriptor.root_len() + self.kept_len()
    }

    /// The kept logical bytes, in output order.
    pub fn kept<'a>(&self, path: &'a [u8]) -> impl Iterator<Item = u8> + 'a {
        path[self.head_start..self.head_end]
            .iter()
            .chain(&path[self.ext_start..self.ext_end])
            .copied()
    }
}

/// Normalize a logical path for `backend`.
///
/// Pure: the result depends only on `logical` and `backend`.
pub fn normalize(logical: &str, backend: Backend) -> String {
    let descriptor = backend.descriptor();
    let bytes = logical.as_bytes();
    let segments = Segments::scan(bytes, descriptor.short_names);
    let separator = descriptor.separator_byte();

    let mut out = String::with_capacity(segments.output_len(descriptor));
    out.push_str(descriptor.prefix);
    out.push(descriptor.separator);
    out.extend(
        segments
            .kept(bytes)
            .map(|byte| char::from(map_byte(byte, separator))),
    );
    out
}

/// Normalize a single path component, without prefix.
///
/// Short-name backends only shorten files; directory names keep their full
/// length, matching what [`normalize`] does to the components of a path.
pub fn normalize_component(name: &str, backend: Backend, is_file: bool) -> String {
    let descriptor = backend.descriptor();
    let bytes = name.as_bytes();
    let segments = Segments::scan(bytes, descriptor.short_names && is_file);
    let separator = descriptor.separator_byte();

    segments
        .kept(bytes)
        .map(|byte| char::from(map_byte(byte, separator)))
        .collect()
}
