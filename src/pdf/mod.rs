//! The PDF 1.x structural validation and repair pipeline.
//!
//! Thinner than [`crate::epub`]: [`validate`] runs a single byte-wise scan
//! over the header, trailer, cross-reference section, and catalog (see
//! [`validator`]), and [`repair`] automates only the three narrowly-scoped
//! fixes the format's trailer admits safely.

mod consts;
pub mod repair;
mod validator;

use crate::cancellation::CancellationToken;
use crate::error::OperationResult;
use crate::report::{FileType, ValidationReport};
use std::path::Path;
use std::time::Instant;

/// Options controlling a [`validate`] run.
#[derive(Clone, Debug, Default)]
pub struct PdfValidationOptions {
    cancellation: Option<CancellationToken>,
}

impl PdfValidationOptions {
    /// Default options: no cancellation handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cooperative cancellation handle.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Options accepted by [`repair::apply`].
#[derive(Clone, Debug, Default)]
pub struct PdfRepairOptions {
    output_path: Option<std::path::PathBuf>,
    replace_source: bool,
    cancellation: Option<CancellationToken>,
}

impl PdfRepairOptions {
    /// Default options: write to `<stem>_repaired.pdf` next to the source,
    /// never replacing it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the default `<stem>_repaired.pdf` output path.
    pub fn with_output_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// When `true`, the source file is replaced with the repaired output
    /// after a successful apply. Defaults to `false`.
    pub fn replace_source(mut self, replace: bool) -> Self {
        self.replace_source = replace;
        self
    }

    /// Attaches a cooperative cancellation handle.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Validates `source` (a filesystem path) against the PDF structural
/// checks: header, trailer, cross-reference section, and catalog.
pub fn validate(source: impl AsRef<Path>, options: &PdfValidationOptions) -> OperationResult<ValidationReport> {
    let path = source.as_ref();
    let bytes = std::fs::read(path)?;
    validate_bytes(&path.to_string_lossy(), bytes, options)
}

/// Like [`validate`], but for an in-memory byte buffer rather than a
/// filesystem path.
pub fn validate_bytes(
    label: &str,
    bytes: impl AsRef<[u8]>,
    options: &PdfValidationOptions,
) -> OperationResult<ValidationReport> {
    log::debug!("validating PDF {label}");
    if options.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
        return Err(crate::error::OperationError::Cancelled);
    }

    let start = Instant::now();
    let mut report = ValidationReport::new(label, FileType::Pdf);
    report.extend(validator::validate(label, bytes.as_ref()));
    report.set_duration(start.elapsed());

    log::debug!("finished validating PDF {label}: is_valid={}", report.is_valid());
    Ok(report)
}
