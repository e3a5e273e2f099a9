//! Storage backend descriptors for the Egg runtime.
//!
//! Each backend (optical disc, host filesystem, ROM) has its own physical
//! path syntax. [`BackendDescriptor`] is the single source of truth for
//! those constants, and [`Backend::descriptor`] maps a backend to its
//! static instance.
//!
//! # Example
//!
//! ```
//! use egg_shared::{Backend, CDROM_BACKEND};
//!
//! assert_eq!(Backend::Cdrom.descriptor().prefix, "cdrom0:");
//! assert_eq!(CDROM_BACKEND.separator, '\\');
//! assert!(CDROM_BACKEND.short_names);
//! ```
//!
//! # Process-wide selection
//!
//! The runtime selects exactly one backend during startup with
//! [`set_active_backend`]. Code that cannot have a [`crate::PathResolver`]
//! injected reads it back with [`active_backend`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Physical path constants for one storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendDescriptor {
    /// Device prefix, without the trailing separator (e.g., "cdrom0:")
    pub prefix: &'static str,

    /// Separator between path components
    pub separator: char,

    /// Whether filenames are limited to 8.3 form
    pub short_names: bool,
}

impl BackendDescriptor {
    /// Create a new backend descriptor.
    pub const fn new(prefix: &'static str, separator: char, short_names: bool) -> Self {
        Self {
            prefix,
            separator,
            short_names,
        }
    }

    /// Separator as a single ASCII byte.
    #[inline]
    pub const fn separator_byte(&self) -> u8 {
        self.separator as u8
    }

    /// Length of `prefix` plus the one separator that always follows it.
    #[inline]
    pub const fn root_len(&self) -> usize {
        self.prefix.len() + 1
    }
}

/// Optical disc (ISO-9660 level 1): `cdrom0:\DIR\FILENAME.EXT`
pub const CDROM_BACKEND: BackendDescriptor = BackendDescriptor::new("cdrom0:", '\\', true);

/// Host filesystem used during development: `host0:/DIR/FILENAME.EXTENSION`
pub const HOST_BACKEND: BackendDescriptor = BackendDescriptor::new("host0:", '/', false);

/// ROM image: `rom0:/DIR/FILENAME.EXTENSION`
pub const ROM_BACKEND: BackendDescriptor = BackendDescriptor::new("rom0:", '/', false);

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Optical disc
    Cdrom,
    /// Host filesystem
    Host,
    /// ROM image
    Rom,
}

impl Backend {
    /// Every backend, in declaration order.
    pub const ALL: [Backend; 3] = [Backend::Cdrom, Backend::Host, Backend::Rom];

    /// Static path constants for this backend.
    pub const fn descriptor(self) -> &'static BackendDescriptor {
        match self {
            Backend::Cdrom => &CDROM_BACKEND,
            Backend::Host => &HOST_BACKEND,
            Backend::Rom => &ROM_BACKEND,
        }
    }

    /// Lowercase name used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Cdrom => "cdrom",
            Backend::Host => "host",
            Backend::Rom => "rom",
        }
    }

    /// Detect the backend a physical path belongs to from its prefix.
    pub fn from_system_path(path: &str) -> Option<Backend> {
        Backend::ALL.into_iter().find(|backend| {
            let descriptor = backend.descriptor();
            path.strip_prefix(descriptor.prefix)
                .is_some_and(|rest| rest.starts_with(descriptor.separator))
        })
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BackendError::Unknown(s.to_string()))
    }
}

static ACTIVE_BACKEND: OnceLock<Backend> = OnceLock::new();

/// Select the process-wide backend.
///
/// Must run during single-threaded startup, before any path conversion.
/// Selecting the backend that is already active is a no-op; selecting a
/// different one fails.
pub fn set_active_backend(backend: Backend) -> Result<(), BackendError> {
    let active = *ACTIVE_BACKEND.get_or_init(|| {
        tracing::info!("Selected {} filesystem backend", backend);
        backend
    });

    if active == backend {
        Ok(())
    } else {
        tracing::warn!(
            "Rejected switch to {} backend, {} is already active",
            backend,
            active
        );
        Err(BackendError::AlreadySelected {
            active,
            requested: backend,
        })
    }
}

/// The process-wide backend, if one has been selected.
pub fn try_active_backend() -> Option<Backend> {
    ACTIVE_BACKEND.get().copied()
}

/// The process-wide backend.
///
/// # Panics
///
/// Panics if no backend has been selected yet. Converting paths before
/// startup has chosen a backend is a configuration bug with no recovery.
pub fn active_backend() -> Backend {
    match try_active_backend() {
        Some(backend) => backend,
        None => panic!("filesystem backend used before one was selected"),
    }
}
