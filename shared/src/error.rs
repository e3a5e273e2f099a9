//! Error types for backend selection and path construction.

use thiserror::Error;

use crate::backend::Backend;

/// Errors raised while selecting or naming a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// A different backend was already selected for this process
    #[error("cannot select {requested} backend, {active} is already active")]
    AlreadySelected { active: Backend, requested: Backend },

    /// Configuration did not name a backend
    #[error("no filesystem backend configured")]
    NotConfigured,

    /// Configuration named a backend that does not exist
    #[error("unknown filesystem backend '{0}' (expected cdrom, host or rom)")]
    Unknown(String),
}

/// Errors raised while building a fixed-capacity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    /// The normalized path does not fit the fixed buffer
    #[error("normalized path is {len} bytes, fixed path capacity is {capacity} bytes")]
    TooLong { len: usize, capacity: usize },
}
