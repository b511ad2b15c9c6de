//! PDF structural validator (component C9): byte-wise scanning of the
//! header, trailer, cross-reference section, and document catalog.
//!
//! Grounded on the corruption taxonomy exercised by `oxidize-pdf`'s
//! recovery tests (other_examples: missing header, missing `%%EOF`,
//! corrupted xref) for which structural defects are worth distinguishing,
//! adapted into accumulated [`ValidationError`] findings the way
//! [`crate::epub::container`] accumulates rather than short-circuits.

use crate::pdf::consts;
use crate::report::{ErrorLocation, Severity, ValidationError};
use std::collections::HashSet;

pub(crate) fn validate(path: &str, bytes: &[u8]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_header(path, bytes, &mut errors);
    validate_trailer(path, bytes, &mut errors);
    validate_xref(path, bytes, &mut errors);
    validate_catalog(path, bytes, &mut errors);
    errors
}

fn validate_header(path: &str, bytes: &[u8], errors: &mut Vec<ValidationError>) {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(16)]);
    let Some(rest) = head.strip_prefix(consts::HEADER_PREFIX) else {
        errors.push(
            ValidationError::new("PDF-HEADER-001", "file does not start with a `%PDF-1.x` header", Severity::Critical)
                .with_location(ErrorLocation::from_path(path)),
        );
        return;
    };

    let version_digit = rest.chars().next();
    if !version_digit.is_some_and(|c| ('0'..='7').contains(&c)) {
        errors.push(
            ValidationError::new(
                "PDF-HEADER-002",
                "PDF header version digit is out of the supported 1.0-1.7 range",
                Severity::Critical,
            )
            .with_location(ErrorLocation::from_path(path))
            .with_detail("found", version_digit.map(String::from).unwrap_or_default()),
        );
    }
}

fn validate_trailer(path: &str, bytes: &[u8], errors: &mut Vec<ValidationError>) {
    let tail_start = bytes.len().saturating_sub(consts::TRAILER_TAIL_WINDOW);
    let tail = String::from_utf8_lossy(&bytes[tail_start..]);

    if !tail.contains(consts::EOF_MARKER) {
        errors.push(
            ValidationError::new("PDF-TRAILER-003", "no `%%EOF` marker found in the final bytes of the file", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    match tail.find(consts::STARTXREF) {
        None => {
            errors.push(
                ValidationError::new("PDF-TRAILER-001", "no `startxref` keyword found", Severity::Error)
                    .with_location(ErrorLocation::from_path(path)),
            );
        }
        Some(index) => {
            let after = tail[index + consts::STARTXREF.len()..].trim_start();
            let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                errors.push(
                    ValidationError::new("PDF-TRAILER-001", "`startxref` is not followed by a byte offset", Severity::Error)
                        .with_location(ErrorLocation::from_path(path)),
                );
            }
        }
    }

    if let Some(index) = tail.find(consts::TRAILER_KEYWORD) {
        let after = &tail[index + consts::TRAILER_KEYWORD.len()..];
        let balanced = match (after.find("<<"), after.find(">>")) {
            (Some(start), Some(end)) => start < end,
            _ => false,
        };
        if !balanced {
            errors.push(
                ValidationError::new("PDF-TRAILER-002", "the trailer dictionary is missing or not well-formed", Severity::Error)
                    .with_location(ErrorLocation::from_path(path)),
            );
        }
    }
    // A conventional `trailer` keyword is absent in xref-stream-based (PDF
    // 1.5+) files; the trailer dictionary then lives in the xref stream
    // object instead, so its absence here is not itself reported.
}

fn validate_xref(path: &str, bytes: &[u8], errors: &mut Vec<ValidationError>) {
    let text = String::from_utf8_lossy(bytes);
    let has_xref_stream = text.contains(consts::XREF_STREAM_TYPE) || text.contains(consts::XREF_STREAM_TYPE_SPACED);

    let Some(index) = text.find(consts::XREF_KEYWORD) else {
        if !has_xref_stream {
            errors.push(
                ValidationError::new("PDF-XREF-001", "no conventional xref table or xref stream found", Severity::Error)
                    .with_location(ErrorLocation::from_path(path)),
            );
        }
        return;
    };

    if has_xref_stream {
        return;
    }

    let after = text[index + consts::XREF_KEYWORD.len()..].trim_start();
    let mut lines = after.lines();
    let Some(subsection_header) = lines.next() else {
        errors.push(
            ValidationError::new("PDF-XREF-002", "xref table has no subsection header", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        return;
    };

    let header_tokens: Vec<&str> = subsection_header.split_whitespace().collect();
    let header_valid = matches!(header_tokens.as_slice(), [start, count]
        if !start.is_empty() && start.chars().all(|c| c.is_ascii_digit())
        && !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()));

    if !header_valid {
        errors.push(
            ValidationError::new("PDF-XREF-002", "xref subsection header is not `<start> <count>`", Severity::Error)
                .with_location(ErrorLocation::from_path(path))
                .with_detail("found", subsection_header.to_owned()),
        );
        return;
    }

    let malformed = lines
        .take_while(|line| !line.starts_with(consts::TRAILER_KEYWORD))
        .find(|line| !is_valid_xref_entry(line));

    if let Some(entry) = malformed {
        errors.push(
            ValidationError::new("PDF-XREF-003", "an xref entry does not match the fixed 20-byte record format", Severity::Error)
                .with_location(ErrorLocation::from_path(path))
                .with_detail("found", entry.to_owned()),
        );
    }
}

fn is_valid_xref_entry(line: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return true;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    matches!(parts.as_slice(), [offset, generation, flag]
        if offset.len() == 10 && offset.chars().all(|c| c.is_ascii_digit())
        && generation.len() == 5 && generation.chars().all(|c| c.is_ascii_digit())
        && (*flag == "n" || *flag == "f"))
}

fn validate_catalog(path: &str, bytes: &[u8], errors: &mut Vec<ValidationError>) {
    let text = String::from_utf8_lossy(bytes);
    let catalog_index = text.find(consts::CATALOG_TYPE).or_else(|| text.find(consts::CATALOG_TYPE_SPACED));

    let Some(index) = catalog_index else {
        errors.push(
            ValidationError::new("PDF-CATALOG-001", "no object with `/Type /Catalog` found", Severity::Critical)
                .with_location(ErrorLocation::from_path(path)),
        );
        check_duplicate_objects(path, &text, errors);
        return;
    };

    let object_end = text[index..]
        .find(consts::ENDOBJ_KEYWORD)
        .map_or(text.len(), |offset| index + offset);
    let object_body = &text[index..object_end];

    if !object_body.contains(consts::PAGES_KEY) {
        errors.push(
            ValidationError::new("PDF-CATALOG-002", "the document catalog has no `/Pages` reference", Severity::Critical)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    if !text.contains(consts::ROOT_KEY) {
        errors.push(
            ValidationError::new("PDF-CATALOG-003", "the trailer has no `/Root` reference to the catalog", Severity::Critical)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    check_duplicate_objects(path, &text, errors);
}

/// Flags repeated `<n> <gen> obj` headers for the same object/generation
/// pair as a structural anomaly. Incremental updates legitimately reuse an
/// object number across revisions, so this is filed as a warning rather
/// than an error.
fn check_duplicate_objects(path: &str, text: &str, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (line_index, line) in text.lines().enumerate() {
        let Some((number, generation)) = parse_object_header(line) else {
            continue;
        };
        if !seen.insert((number, generation)) {
            errors.push(
                ValidationError::new(
                    "PDF-STRUCTURE-012",
                    format!("duplicate object definition `{number} {generation} obj`"),
                    Severity::Warning,
                )
                .with_location(ErrorLocation::from_path(path).with_line(line_index as u32 + 1))
                .with_detail("object", format!("{number} {generation}")),
            );
        }
    }
}

fn parse_object_header(line: &str) -> Option<(u32, u32)> {
    let rest = line.trim().strip_suffix(" obj")?;
    let mut parts = rest.split_whitespace();
    let number: u32 = parts.next()?.parse().ok()?;
    let generation: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((number, generation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_pdf() -> Vec<u8> {
        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n");
        let xref_offset = pdf.len();
        pdf.extend_from_slice(b"xref\n0 3\n");
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        pdf.extend_from_slice(b"0000000009 00000 n \n");
        pdf.extend_from_slice(b"0000000058 00000 n \n");
        pdf.extend_from_slice(b"trailer\n<< /Size 3 /Root 1 0 R >>\n");
        pdf.extend_from_slice(format!("startxref\n{xref_offset}\n").as_bytes());
        pdf.extend_from_slice(b"%%EOF\n");
        pdf
    }

    #[test]
    fn test_valid_pdf_has_no_errors() {
        let pdf = minimal_pdf();
        assert!(validate("book.pdf", &pdf).is_empty());
    }

    #[test]
    fn test_missing_header_reported() {
        let pdf = b"1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n".to_vec();
        let errors = validate("book.pdf", &pdf);
        assert!(errors.iter().any(|e| e.code() == "PDF-HEADER-001"));
    }

    #[test]
    fn test_missing_eof_reported() {
        let mut pdf = minimal_pdf();
        let eof_index = pdf.windows(5).rposition(|w| w == b"%%EOF").unwrap();
        pdf.truncate(eof_index);
        let errors = validate("book.pdf", &pdf);
        assert!(errors.iter().any(|e| e.code() == "PDF-TRAILER-003"));
    }

    #[test]
    fn test_missing_catalog_reported() {
        let pdf = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>\nstartxref\n9\n%%EOF\n".to_vec();
        let errors = validate("book.pdf", &pdf);
        assert!(errors.iter().any(|e| e.code() == "PDF-CATALOG-001"));
    }
}
