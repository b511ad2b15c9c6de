//! The EPUB 3.x (and legacy EPUB 2) validation and repair pipeline.
//!
//! `epub::validate` drives the container → package → navigation →
//! content/accessibility stages (see [`orchestrator`]) over a ZIP (OCF)
//! archive and returns one [`crate::report::ValidationReport`]. The
//! [`repair`] submodule previews and applies bit-exact ZIP rewrites
//! against that report.

mod accessibility;
mod consts;
mod container;
mod content;
mod navigation;
mod orchestrator;
pub mod repair;
mod package;

use crate::cancellation::CancellationToken;
use crate::error::OperationResult;
use crate::report::ValidationReport;
use orchestrator::{RunOptions, Stage};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Options controlling an [`validate`] run.
///
/// Builder-style, mirroring the host codebase's settings-struct
/// convention: start from [`Self::new`] and chain `with_*` calls.
#[derive(Clone, Debug, Default)]
pub struct EpubValidationOptions {
    with_accessibility: bool,
    cancellation: Option<CancellationToken>,
    lenient: bool,
}

impl EpubValidationOptions {
    /// Default options: no accessibility audit, no cancellation handle,
    /// lenient parsing (matches the nav parser's documented leniency).
    pub fn new() -> Self {
        Self { lenient: true, ..Self::default() }
    }

    /// Runs the accessibility audit (C6) over every non-nav spine item.
    pub fn with_accessibility(mut self, enabled: bool) -> Self {
        self.with_accessibility = enabled;
        self
    }

    /// Attaches a cooperative cancellation handle.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Controls whether unknown or non-fatal parser hiccups are tolerated
    /// rather than escalated. Defaults to `true`.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

/// Options accepted by [`repair::apply`].
#[derive(Clone, Debug, Default)]
pub struct EpubRepairOptions {
    output_path: Option<std::path::PathBuf>,
    replace_source: bool,
    cancellation: Option<CancellationToken>,
}

impl EpubRepairOptions {
    /// Default options: write to `<stem>_repaired.epub` next to the
    /// source, never replacing it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the default `<stem>_repaired.epub` output path.
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

/// Validates `source` (a filesystem path, or anything byte-seekable)
/// against the full EPUB pipeline: container → package → navigation →
/// spine content documents, plus an accessibility audit when requested.
pub fn validate(source: impl AsRef<Path>, options: &EpubValidationOptions) -> OperationResult<ValidationReport> {
    let path = source.as_ref();
    let file = File::open(path)?;
    validate_reader(&path.to_string_lossy(), file, options, Stage::Content)
}

/// Like [`validate`], but for an already-open, sized byte stream (e.g. an
/// in-memory buffer) rather than a filesystem path.
pub fn validate_bytes(
    label: &str,
    bytes: impl AsRef<[u8]>,
    options: &EpubValidationOptions,
) -> OperationResult<ValidationReport> {
    validate_reader(label, Cursor::new(bytes.as_ref().to_vec()), options, Stage::Content)
}

/// Runs only the container stage (C2): ZIP envelope, `mimetype`,
/// `META-INF/container.xml`.
pub fn validate_container_only(source: impl AsRef<Path>) -> OperationResult<ValidationReport> {
    let path = source.as_ref();
    let file = File::open(path)?;
    validate_reader(&path.to_string_lossy(), file, &EpubValidationOptions::new(), Stage::Container)
}

/// Runs only the container and package stages (C2–C3), skipping
/// navigation, content, and accessibility.
pub fn validate_metadata_only(source: impl AsRef<Path>) -> OperationResult<ValidationReport> {
    let path = source.as_ref();
    let file = File::open(path)?;
    validate_reader(&path.to_string_lossy(), file, &EpubValidationOptions::new(), Stage::Package)
}

fn validate_reader<R: Read + Seek>(
    label: &str,
    reader: R,
    options: &EpubValidationOptions,
    stop_after: Stage,
) -> OperationResult<ValidationReport> {
    log::debug!("validating EPUB {label}");
    let run_options = RunOptions {
        with_accessibility: options.with_accessibility,
        cancellation: options.cancellation.as_ref(),
        stop_after,
    };
    let report = orchestrator::run(label, reader, &run_options)?;
    log::debug!("finished validating EPUB {label}: is_valid={}", report.is_valid());
    Ok(report)
}
