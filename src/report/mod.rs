//! Report model shared by the EPUB and PDF pipelines (component C1).
//!
//! Grounded on the teacher's layered `thiserror` enums (`ebook/errors.rs`)
//! for the shape of "stable code + human message + structured detail", even
//! though these types are plain data rather than an error hierarchy — see
//! the "error taxonomy as data, not types" design note.

mod details;
mod error;
mod location;
mod repair;
mod severity;

pub use details::Details;
pub use error::ValidationError;
pub use location::ErrorLocation;
pub use repair::{RepairAction, RepairPreview, RepairResult, SafetyClass};
pub use severity::Severity;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The ebook container format a [`ValidationReport`] was produced for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// EPUB 3.x (and legacy EPUB 2) OCF container.
    Epub,
    /// A PDF document.
    Pdf,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Epub => "EPUB",
            Self::Pdf => "PDF",
        })
    }
}

/// The outcome of validating a single EPUB or PDF artifact.
///
/// # Invariants
/// - `is_valid() == errors().is_empty()` (i.e. no `error`/`critical` entry).
/// - `warnings()`/`info()` never affect [`Self::is_valid`].
/// - For every contained [`ValidationError`] `e` with a non-empty
///   [`ErrorLocation::path`], `e.location().unwrap().file()` equals the
///   basename of that path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    file_path: String,
    file_type: FileType,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
    info: Vec<ValidationError>,
    validation_time: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    duration: Duration,
    metadata: Details,
}

impl ValidationReport {
    pub(crate) fn new(file_path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_path: file_path.into(),
            file_type,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            validation_time: Utc::now(),
            duration: Duration::ZERO,
            metadata: Details::new(),
        }
    }

    /// Files the given entry into the bucket matching its own
    /// [`ValidationError::severity`]. `critical` is filed alongside `error`
    /// for the purposes of [`Self::is_valid`] but kept in its own sequence.
    pub(crate) fn push(&mut self, error: ValidationError) {
        match error.severity() {
            Severity::Critical | Severity::Error => self.errors.push(error),
            Severity::Warning => self.warnings.push(error),
            Severity::Info => self.info.push(error),
        }
    }

    pub(crate) fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        for error in errors {
            self.push(error);
        }
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Details {
        &mut self.metadata
    }

    /// The path or identifier the report was produced for.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// The format this report was produced for.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// `true` iff there is no `error`- or `critical`-severity entry.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Entries of severity `error` or `critical`.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Entries of severity `warning`.
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Entries of severity `info`.
    pub fn info(&self) -> &[ValidationError] {
        &self.info
    }

    /// All entries across all three severities, in the order:
    /// `errors`, then `warnings`, then `info`.
    pub fn all_entries(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(&self.warnings).chain(&self.info)
    }

    /// When validation started.
    pub fn validation_time(&self) -> DateTime<Utc> {
        self.validation_time
    }

    /// How long validation took.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Free-form metadata attached during validation (e.g. the
    /// accessibility score under the `"accessibility_score"` key).
    pub fn metadata(&self) -> &Details {
        &self.metadata
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ValidationError;

    #[test]
    fn test_is_valid_reflects_error_bucket_only() {
        let mut report = ValidationReport::new("book.epub", FileType::Epub);
        report.push(ValidationError::new("EPUB-A11Y-099", "info only", Severity::Info));
        assert!(report.is_valid());

        report.push(ValidationError::new("EPUB-OPF-002", "missing title", Severity::Error));
        assert!(!report.is_valid());
        assert_eq!(1, report.errors().len());
        assert_eq!(1, report.info().len());
    }
}
