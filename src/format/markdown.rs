//! Markdown rendering: a heading per severity bucket, a bullet per entry.

use crate::report::{ValidationError, ValidationReport};
use std::fmt::Write;

/// Renders `report` as Markdown: a title, a validity line, then a `##`
/// heading per non-empty severity bucket with one bullet per entry.
pub fn to_markdown(report: &ValidationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}", report.file_path());
    let _ = writeln!(
        out,
        "\n**{}** — {}\n",
        report.file_type(),
        if report.is_valid() { "valid" } else { "invalid" },
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

    let _ = writeln!(out, "## {heading}\n");
    for entry in entries {
        let location = entry.location().map(|loc| loc.file().to_owned()).unwrap_or_else(|| "-".to_owned());
        let _ = writeln!(out, "- `{}` {} ({})", entry.code(), entry.message(), location);
    }
    let _ = writeln!(out);
}
