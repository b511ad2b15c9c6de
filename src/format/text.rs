//! Plain text rendering, grouped by severity bucket, most severe first.

use crate::report::{ValidationError, ValidationReport};
use std::fmt::Write;

/// Renders `report` as plain text: a summary line, then one section per
/// non-empty severity bucket (`errors`, `warnings`, `info`), each entry
/// rendered as `<code> <message> (<location>)`.
pub fn to_text(report: &ValidationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} — {} ({})",
        report.file_path(),
        if report.is_valid() { "valid" } else { "invalid" },
        report.file_type(),
    );

    write_section(&mut out, "Errors", report.errors());
    write_section(&mut out, "Warnings", report.warnings());
    write_section(&mut out, "Info", report.info());

    out
}

fn write_section(out: &mut String, heading: &str, entries: &[ValidationError]) {
    if entries.is_empty() {
        return;
    }

    let _ = writeln!(out, "\n{heading}:");
    for entry in entries {
        write_entry(out, entry);
    }
}

fn write_entry(out: &mut String, entry: &ValidationError) {
    let location = entry
        .location()
        .map(|loc| loc.file().to_owned())
        .unwrap_or_else(|| "-".to_owned());
    let _ = writeln!(
        out,
        "  [{}] {} {} ({})",
        entry.code(),
        entry.severity().to_string().to_uppercase(),
        entry.message(),
        location
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FileType, Severity};

    #[test]
    fn test_to_text_preserves_error_code() {
        let mut report = ValidationReport::new("book.epub", FileType::Epub);
        report.push(ValidationError::new("EPUB-OPF-002", "missing title", Severity::Error));

        let text = to_text(&report);
        assert!(text.contains("EPUB-OPF-002"));
        assert!(text.contains("invalid"));
    }

    #[test]
    fn test_to_text_omits_empty_sections() {
        let report = ValidationReport::new("book.epub", FileType::Epub);
        let text = to_text(&report);
        assert!(!text.contains("Errors:"));
        assert!(text.contains("valid"));
    }
}
