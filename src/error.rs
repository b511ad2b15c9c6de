//! Crate-level *operational* failures.
//!
//! These are distinct from [`crate::report::ValidationError`]: an
//! [`OperationError`] means the requested operation itself could not be
//! carried out (bad I/O, a corrupt ZIP central directory, cancellation). A
//! finding the artifact expresses about itself is always recorded in a
//! [`crate::report::ValidationReport`] instead, never raised here.
//!
//! Grounded on the host codebase's layered-error convention: a narrow
//! per-subsystem error (here, [`zip::result::ZipError`] and
//! [`std::io::Error`]) feeds into one umbrella type via `#[from]`
//! (see `ebook/errors.rs` / `ebook/epub/errors.rs` in the teacher repo).

use thiserror::Error;

/// Alias for `Result<T, OperationError>`.
pub type OperationResult<T> = Result<T, OperationError>;

/// Unified operational-failure type for validation and repair entry points.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OperationError {
    /// Filesystem or stream I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source could not be opened as a ZIP (OCF) archive.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The operation was cancelled via a [`crate::CancellationToken`]
    /// before it could complete.
    #[error("operation cancelled")]
    Cancelled,
}
