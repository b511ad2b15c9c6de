use serde::{Deserialize, Serialize};

/// Where a [`super::ValidationError`] was observed.
///
/// # Invariant
/// If [`Self::path`] is non-empty, [`Self::file`] must equal the basename of
/// that path (see `util::path::filename`).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorLocation {
    file: String,
    path: String,
    line: Option<u32>,
    column: Option<u32>,
    manifest_id: Option<String>,
}

impl ErrorLocation {
    /// A location identified only by its in-container or on-disk path; the
    /// leaf [`Self::file`] is derived automatically.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let file = crate::util::path::filename(&path).to_owned();
        Self {
            file,
            path,
            line: None,
            column: None,
            manifest_id: None,
        }
    }

    /// Attaches a 1-based line number, builder-style.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches a 1-based column number, builder-style.
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    /// Attaches the manifest `id` this location was resolved through,
    /// builder-style.
    pub fn with_manifest_id(mut self, id: impl Into<String>) -> Self {
        self.manifest_id = Some(id.into());
        self
    }

    /// The leaf (base) name of [`Self::path`].
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The full in-container or on-disk path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 1-based line number, if known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// 1-based column number, if known.
    pub fn column(&self) -> Option<u32> {
        self.column
    }

    /// The manifest `id` this location resolves through, if the location is
    /// a manifest-referenced resource.
    pub fn manifest_id(&self) -> Option<&str> {
        self.manifest_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_derived_from_path() {
        let location = ErrorLocation::from_path("OEBPS/chapter1.xhtml");
        assert_eq!("chapter1.xhtml", location.file());
        assert_eq!("OEBPS/chapter1.xhtml", location.path());
    }
}
