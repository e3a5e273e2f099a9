//! Shared types for the Egg runtime and its offline tools.
//!
//! This crate owns everything about asset paths:
//!
//! - [`backend`] - storage backend descriptors and process-wide selection
//! - [`normalize`] - logical-to-physical path rules
//! - [`fixed_path`] - the same rules evaluated at compile time
//! - [`path`] - [`SystemPath`] values and the [`PathResolver`] factory
//! - [`config`] - `egg.toml` configuration
//! - [`fs`] - size-capped host file reads
//! - [`math`] - POD math types stored in blobs

pub mod backend;
pub mod config;
pub mod error;
pub mod fixed_path;
pub mod fs;
pub mod math;
pub mod normalize;
pub mod path;

pub use backend::{
    Backend, BackendDescriptor, CDROM_BACKEND, HOST_BACKEND, ROM_BACKEND, active_backend,
    set_active_backend, try_active_backend,
};
pub use config::{Config, FilesystemConfig};
pub use error::{BackendError, PathError};
pub use fixed_path::{FIXED_PATH_CAPACITY, FixedPath};
pub use fs::{MAX_FILE_BYTES, read_file_with_limit};
pub use math::Matrix;
pub use normalize::{normalize, normalize_component};
pub use path::{PathResolver, SystemPath};
