use super::{Details, ErrorLocation, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single finding recorded against a validated artifact.
///
/// `code` is a stable, opaque string of the form `<FORMAT>-<CATEGORY>-<NNN>`
/// (see the error-code registry). Callers are expected to switch on `code`,
/// never on `message`, which is for humans and may be reworded freely.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationError {
    code: String,
    message: String,
    severity: Severity,
    location: Option<ErrorLocation>,
    details: Details,
    timestamp: DateTime<Utc>,
}

impl ValidationError {
    /// Creates a new finding with no location and no details.
    pub fn new(code: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            location: None,
            details: Details::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches a location, builder-style.
    pub fn with_location(mut self, location: ErrorLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches a details bag, builder-style.
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// Attaches a single detail key/value pair, builder-style.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key, value);
        self
    }

    /// The stable error code, e.g. `"EPUB-OPF-002"`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The severity this entry was filed under.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Where this finding was observed, if known.
    pub fn location(&self) -> Option<&ErrorLocation> {
        self.location.as_ref()
    }

    /// Structured evidence, e.g. `expected`/`found` on a mismatch.
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// When this finding was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_roundtrip() {
        let error = ValidationError::new("EPUB-CONTAINER-002", "bad mimetype", Severity::Error)
            .with_location(ErrorLocation::from_path("mimetype"))
            .with_detail("expected", "application/epub+zip")
            .with_detail("found", "application/wrong");

        assert_eq!("EPUB-CONTAINER-002", error.code());
        assert_eq!(Severity::Error, error.severity());
        assert_eq!("mimetype", error.location().unwrap().file());
        assert_eq!(
            Some("application/epub+zip"),
            error.details().get_str("expected")
        );
    }
}
