//! Backend-independent asset references.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use egg_shared::{Backend, FixedPath, PathError, normalize};
use xxhash_rust::const_xxh3::xxh3_64;

/// Stable 64-bit name of an asset, stored in blobs in place of a path.
///
/// The value is the XXH3-64 hash of the asset's canonical name: the logical
/// path normalized with the full-name rules (`host0:`), without the prefix.
/// It is the same whichever backend later loads the asset; the asset table
/// maps it back to a path.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable,
)]
pub struct AssetReference(u64);

impl AssetReference {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Reference for a logical path.
    pub fn from_logical(logical: &str) -> Self {
        let path = normalize(logical, Backend::Host);
        let root = Backend::Host.descriptor().root_len();
        Self::from_canonical(&path.as_bytes()[root..])
    }

    /// Compile-time variant of [`from_logical`](Self::from_logical); fails
    /// for paths that do not fit a [`FixedPath`].
    pub const fn try_from_logical(logical: &str) -> Result<Self, PathError> {
        match FixedPath::from_logical(logical, Backend::Host) {
            Ok(path) => Ok(Self::from_canonical(path.relative_bytes())),
            Err(err) => Err(err),
        }
    }

    const fn from_canonical(name: &[u8]) -> Self {
        Self(xxh3_64(name))
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Asset reference for a path literal, computed at compile time.
///
/// ```
/// use egg_common::{asset, formats::AssetReference};
///
/// const LOGO: AssetReference = asset!("assets/logo.tex");
/// assert_eq!(LOGO, AssetReference::from_logical("/ASSETS/LOGO.TEX"));
/// ```
#[macro_export]
macro_rules! asset {
    ($path:expr $(,)?) => {
        const {
            match $crate::formats::AssetReference::try_from_logical($path) {
                Ok(reference) => reference,
                Err(_) => panic!("asset path does not fit in a fixed path buffer"),
            }
        }
    };
}
