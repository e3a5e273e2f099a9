//! Physical paths computed at compile time.
//!
//! Some paths must be known before the runtime has picked a backend, for
//! example boot files that are referenced from static tables. [`FixedPath`]
//! normalizes into a 256-byte buffer inside a `const fn`, so the result can
//! be stored in a `const` or `static`. Paths that would not fit are
//! rejected; through [`fixed_path!`](crate::fixed_path) that rejection is a
//! compile error.
//!
//! ```
//! use egg_shared::{Backend, FixedPath, fixed_path};
//!
//! const BOOT_LEVEL: FixedPath = fixed_path!(Backend::Cdrom, "levels/boot-sequence.level");
//! assert_eq!(BOOT_LEVEL.as_str(), "cdrom0:\\LEVELS\\BOOT_SEQ.LEV");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::backend::Backend;
use crate::error::PathError;
use crate::normalize::{Segments, map_byte};

/// Size of the fixed path buffer in bytes.
///
/// One byte is always left for a NUL terminator, so the longest fixed path
/// is `FIXED_PATH_CAPACITY - 1` bytes.
pub const FIXED_PATH_CAPACITY: usize = 256;

/// A normalized physical path stored inline.
#[derive(Clone, Copy)]
pub struct FixedPath {
    buf: [u8; FIXED_PATH_CAPACITY],
    len: usize,
    backend: Backend,
}

impl FixedPath {
    /// Normalize `logical` for `backend` into a fixed buffer.
    ///
    /// Applies exactly the rules of [`crate::normalize`].
    pub const fn from_logical(logical: &str, backend: Backend) -> Result<Self, PathError> {
        let descriptor = backend.descriptor();
        let bytes = logical.as_bytes();
        let segments = Segments::scan(bytes, descriptor.short_names);

        let len = segments.output_len(descriptor);
        if len >= FIXED_PATH_CAPACITY {
            return Err(PathError::TooLong {
                len,
                capacity: FIXED_PATH_CAPACITY,
            });
        }

        let separator = descriptor.separator_byte();
        let prefix = descriptor.prefix.as_bytes();
        let mut buf = [0u8; FIXED_PATH_CAPACITY];
        let mut n = 0;

        while n < prefix.len() {
            buf[n] = prefix[n];
            n += 1;
        }
        buf[n] = separator;
        n += 1;

        let mut i = segments.head_start;
        while i < segments.head_end {
            buf[n] = map_byte(bytes[i], separator);
            n += 1;
            i += 1;
        }

        let mut i = segments.ext_start;
        while i < segments.ext_end {
            buf[n] = map_byte(bytes[i], separator);
            n += 1;
            i += 1;
        }

        Ok(Self { buf, len: n, backend })
    }

    /// Backend this path was normalized for.
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest path length this type can hold.
    pub const fn max_len() -> usize {
        FIXED_PATH_CAPACITY - 1
    }

    pub const fn as_bytes(&self) -> &[u8] {
        self.buf.split_at(self.len).0
    }

    /// Path bytes followed by a NUL terminator, for C-style device APIs.
    pub const fn as_bytes_with_nul(&self) -> &[u8] {
        self.buf.split_at(self.len + 1).0
    }

    /// Path bytes after the backend prefix and separator.
    pub const fn relative_bytes(&self) -> &[u8] {
        self.as_bytes()
            .split_at(self.backend.descriptor().root_len())
            .1
    }

    pub const fn as_str(&self) -> &str {
        // Output bytes are always ASCII.
        match std::str::from_utf8(self.as_bytes()) {
            Ok(path) => path,
            Err(_) => "",
        }
    }

    /// Compare against a string; usable in `const` assertions.
    pub const fn eq_str(&self, other: &str) -> bool {
        let other = other.as_bytes();
        if other.len() != self.len {
            return false;
        }
        let mut i = 0;
        while i < other.len() {
            if self.buf[i] != other[i] {
                return false;
            }
            i += 1;
        }
        true
    }
}

/// Normalize a path literal at compile time.
///
/// Expands to a `const` block, so a path that does not fit in a
/// [`FixedPath`](crate::FixedPath) fails the build.
#[macro_export]
macro_rules! fixed_path {
    ($backend:expr, $path:expr $(,)?) => {
        const {
            match $crate::FixedPath::from_logical($path, $backend) {
                Ok(path) => path,
                Err(_) => panic!("normalized path does not fit in a fixed path buffer"),
            }
        }
    };
}

const _: () = assert!(
    fixed_path!(Backend::Cdrom, "/asdf-ggggg/sdkfjs.egg2").eq_str("cdrom0:\\ASDF_GGGGG\\SDKFJS.EGG")
);

impl PartialEq for FixedPath {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FixedPath {}

impl PartialEq<str> for FixedPath {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}

impl PartialEq<&str> for FixedPath {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(other)
    }
}

impl Hash for FixedPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl AsRef<str> for FixedPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for FixedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FixedPath").field(&self.as_str()).finish()
    }
}

impl fmt::Display for FixedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    const SAMPLES: &[&str] = &[
        "assets/sounds/vine_boom.adpcm",
        "/asdf-ggggg/sdkfjs.egg2",
        "levels\\world-1\\castle.level",
        "backup/archive.tar.gz",
        "readme",
        ".hidden",
        "",
        "caf\u{e9}/menu.txt",
    ];

    #[test]
    fn test_matches_runtime_normalizer() {
        for backend in Backend::ALL {
            for logical in SAMPLES {
                let fixed = FixedPath::from_logical(logical, backend).unwrap();
                assert_eq!(fixed.as_str(), normalize(logical, backend), "{logical}");
                assert_eq!(fixed.backend(), backend);
            }
        }
    }

    #[test]
    fn test_macro_evaluates_at_compile_time() {
        const PATH: FixedPath = fixed_path!(Backend::Host, "assets/sounds/vine-boom.adpcm");
        assert_eq!(PATH, "host0:/ASSETS/SOUNDS/VINE_BOOM.ADPCM");
        assert_eq!(PATH.relative_bytes(), b"ASSETS/SOUNDS/VINE_BOOM.ADPCM");
    }

    #[test]
    fn test_nul_terminated_bytes() {
        let path = FixedPath::from_logical("a.b", Backend::Rom).unwrap();
        assert_eq!(path.as_bytes_with_nul(), b"rom0:/A.B\0");
    }

    #[test]
    fn test_rejects_paths_that_do_not_fit() {
        // host0:/ is 7 bytes, so 248 logical bytes give 255 and fit exactly.
        let fits = "a".repeat(248);
        let path = FixedPath::from_logical(&fits, Backend::Host).unwrap();
        assert_eq!(path.len(), FixedPath::max_len());

        let too_long = "a".repeat(249);
        assert_eq!(
            FixedPath::from_logical(&too_long, Backend::Host),
            Err(PathError::TooLong {
                len: 256,
                capacity: FIXED_PATH_CAPACITY,
            })
        );
    }

    #[test]
    fn test_cdrom_truncation_keeps_long_paths_small() {
        // Only the filename is shortened, so a long filename still fits.
        let logical = format!("dir/{}.dat", "x".repeat(400));
        let path = FixedPath::from_logical(&logical, Backend::Cdrom).unwrap();
        assert_eq!(path.as_str(), "cdrom0:\\DIR\\XXXXXXXX.DAT");
    }

    #[test]
    fn test_eq_str() {
        let path = fixed_path!(Backend::Cdrom, "a/b.c");
        assert!(path.eq_str("cdrom0:\\A\\B.C"));
        assert!(!path.eq_str("cdrom0:\\A\\B.D"));
        assert!(!path.eq_str("cdrom0:\\A\\B.CC"));
    }
}
