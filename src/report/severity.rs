use serde::{Deserialize, Serialize};

/// Closed severity enumeration. Ordering is significant: variants compare
/// in the order they are declared (`Info < Warning < Error < Critical`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational observation; never affects validity.
    Info,
    /// Recoverable or non-normative issue; never affects validity.
    Warning,
    /// A spec violation. Affects validity.
    Error,
    /// Precludes meaningful further inspection (e.g. an unparseable PDF
    /// header or catalog). Affects validity.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }
}
