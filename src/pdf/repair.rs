//! Repair pipeline (component C10) for PDF documents: preview-then-apply,
//! mirroring [`crate::epub::repair`] but flattened into a single module
//! since only three codes are repairable at all.
//!
//! Grounded on `epub::repair::actions` for the diagnose→plan shape and on
//! `epub::repair::apply` for the "write to a temp path, rename into place,
//! never touch the source" discipline.

use crate::cancellation::CancellationToken;
use crate::error::OperationResult;
use crate::pdf::consts;
use crate::pdf::PdfRepairOptions;
use crate::report::{Details, RepairAction, RepairPreview, RepairResult, SafetyClass, ValidationReport};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Diagnoses `report` into a [`RepairPreview`], without touching any file.
pub fn preview(report: &ValidationReport) -> RepairPreview {
    log::debug!("pdf repair preview: entry, {} error(s)", report.errors().len());
    let plan = plan_for(report);
    log::debug!("pdf repair preview: exit, {} action(s) planned", plan.len());
    RepairPreview::new(plan, Vec::new())
}

/// Applies the repair plan diagnosed from `report` against `source`,
/// writing a new artifact. `source` itself is left untouched unless
/// [`PdfRepairOptions::replace_source`] was set.
pub fn apply(source: impl AsRef<Path>, report: &ValidationReport, options: &PdfRepairOptions) -> OperationResult<RepairResult> {
    let source = source.as_ref();
    log::debug!("pdf repair apply: entry ({})", source.display());
    let source_bytes = std::fs::read(source)?;
    let plan = plan_for(report);
    let output_path = options.output_path.clone().unwrap_or_else(|| default_output_path(source));

    if options.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
        log::debug!("pdf repair apply: exit ({}), cancelled", source.display());
        return Ok(RepairResult::failure(report.clone(), "cancelled".to_owned()));
    }

    let repaired = rewrite(&source_bytes, &plan);

    let temp_path = output_path.with_extension("tmp");
    write_file(&temp_path, &repaired)?;
    std::fs::rename(&temp_path, &output_path)?;

    let final_path = if options.replace_source {
        std::fs::rename(&output_path, source)?;
        source.to_path_buf()
    } else {
        output_path
    };

    let actions_applied: Vec<_> = plan.into_iter().filter(|a| a.automated()).collect();
    log::debug!("pdf repair apply: exit ({}), {} action(s) applied", final_path.display(), actions_applied.len());
    Ok(RepairResult::success(actions_applied, report.clone(), final_path))
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(bytes)?;
    file.flush()
}

fn default_output_path(source: &Path) -> PathBuf {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    let ext = source.extension().and_then(|s| s.to_str()).unwrap_or("pdf");
    source.with_file_name(format!("{stem}_repaired.{ext}"))
}

/// Maps each error to zero or one [`RepairAction`]. Only the three codes
/// named below are automated; everything else becomes `manual_review`.
fn plan_for(report: &ValidationReport) -> Vec<RepairAction> {
    report.errors().iter().map(action_for).collect()
}

fn action_for(error: &crate::report::ValidationError) -> RepairAction {
    match error.code() {
        "PDF-TRAILER-003" => RepairAction::new(
            "append_eof",
            "append a `%%EOF` marker on a new line",
            "trailer",
            SafetyClass::VeryHigh,
            true,
        ),
        "PDF-TRAILER-001" => RepairAction::new(
            "fix_startxref",
            "recompute `startxref` from the actual offset of the xref table or stream",
            "trailer",
            SafetyClass::High,
            true,
        ),
        "PDF-TRAILER-002" => RepairAction::new(
            "fix_trailer_typo",
            "insert the trailer dictionary's missing `<<` or `>>` delimiter",
            "trailer",
            SafetyClass::High,
            true,
        ),
        other => RepairAction::new(
            "manual_review",
            format!("no automated repair is defined for {other}"),
            "trailer",
            SafetyClass::Low,
            false,
        )
        .with_details(Details::new().with("code", other)),
    }
}

/// Applies `plan` to `bytes`. Order matters: `%%EOF` is appended first since
/// a missing marker shifts where the new xref offset needs to point, the
/// trailer dictionary's delimiters are fixed next, and `startxref` is
/// recomputed last against the final byte layout.
fn rewrite(bytes: &[u8], plan: &[RepairAction]) -> Vec<u8> {
    let mut out = bytes.to_vec();

    if plan.iter().any(|a| a.kind() == "append_eof") {
        if !out.ends_with(b"\n") {
            out.push(b'\n');
        }
        out.extend_from_slice(consts::EOF_MARKER.as_bytes());
        out.push(b'\n');
    }

    if plan.iter().any(|a| a.kind() == "fix_trailer_typo") {
        if let Some(fixed) = fix_trailer_typo(&out) {
            out = fixed;
        }
    }

    if plan.iter().any(|a| a.kind() == "fix_startxref") {
        if let Some(fixed) = fix_startxref(&out) {
            out = fixed;
        }
    }

    out
}

/// Repairs the narrowly enumerated trailer-dictionary typos this crate
/// recognizes: a missing `<<` opening delimiter, a missing `>>` closing
/// delimiter, or both. Anything else about the dictionary's contents is
/// left alone.
fn fix_trailer_typo(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    let tail_start = bytes.len().saturating_sub(consts::TRAILER_TAIL_WINDOW);
    let trailer_rel = text[tail_start..].find(consts::TRAILER_KEYWORD)?;
    let dict_start = tail_start + trailer_rel + consts::TRAILER_KEYWORD.len();

    if is_balanced(&text, dict_start) {
        return None;
    }

    if !text[dict_start..].contains("<<") {
        text.insert_str(dict_start, " <<");
    }

    if is_balanced(&text, dict_start) {
        return Some(text.into_bytes());
    }

    let open = text[dict_start..].find("<<")?;
    let search_from = dict_start + open + 2;
    let insert_at = text[search_from..]
        .find(consts::STARTXREF)
        .map_or(text.len(), |i| search_from + i);
    text.insert_str(insert_at, ">> ");

    Some(text.into_bytes())
}

fn is_balanced(text: &str, dict_start: usize) -> bool {
    let after = &text[dict_start..];
    matches!((after.find("<<"), after.find(">>")), (Some(start), Some(end)) if start < end)
}

/// Recomputes `startxref`'s offset to point at the last `xref` keyword or
/// `/Type /XRef` stream object in the document. The replacement digit run
/// may be a different length than the original, so the file can grow or
/// shrink by a few bytes.
fn fix_startxref(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = String::from_utf8_lossy(bytes);

    let actual_offset = find_last_xref_offset(&text)?;

    let startxref_index = text.rfind(consts::STARTXREF)?;
    let after = &text[startxref_index + consts::STARTXREF.len()..];
    let digits_start_in_after = after.find(|c: char| c.is_ascii_digit())?;
    let digits_start = startxref_index + consts::STARTXREF.len() + digits_start_in_after;
    let digits_len = text[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - digits_start);
    let digits_end = digits_start + digits_len;

    let mut out = bytes.to_vec();
    let replacement = actual_offset.to_string();
    out.splice(digits_start..digits_end, replacement.into_bytes());
    Some(out)
}

fn find_last_xref_offset(text: &str) -> Option<usize> {
    let type_index = text.rfind(consts::XREF_STREAM_TYPE).or_else(|| text.rfind(consts::XREF_STREAM_TYPE_SPACED));

    match type_index {
        Some(type_index) => {
            let obj_index = text[..type_index].rmatch_indices(" obj").last().map(|(i, _)| i)?;
            Some(text[..obj_index].rfind('\n').map_or(0, |i| i + 1))
        }
        None => text.rfind(consts::XREF_KEYWORD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_appends_missing_eof() {
        let bytes = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>\nstartxref\n9\n".to_vec();
        let action = RepairAction::new("append_eof", "append", "trailer", SafetyClass::VeryHigh, true);
        let out = rewrite(&bytes, &[action]);
        assert!(String::from_utf8(out).unwrap().ends_with("%%EOF\n"));
    }

    #[test]
    fn test_fix_trailer_typo_inserts_missing_closing_delimiter() {
        let bytes = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 \nstartxref\n9\n%%EOF\n".to_vec();
        let fixed = fix_trailer_typo(&bytes).unwrap();
        let text = String::from_utf8(fixed).unwrap();
        let dict_start = text.find("trailer").unwrap() + "trailer".len();
        assert!(is_balanced(&text, dict_start));
    }

    #[test]
    fn test_fix_trailer_typo_inserts_missing_opening_delimiter() {
        let bytes = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n /Size 1 >>\nstartxref\n9\n%%EOF\n".to_vec();
        let fixed = fix_trailer_typo(&bytes).unwrap();
        let text = String::from_utf8(fixed).unwrap();
        let dict_start = text.find("trailer").unwrap() + "trailer".len();
        assert!(is_balanced(&text, dict_start));
    }

    #[test]
    fn test_fix_trailer_typo_is_noop_when_already_balanced() {
        let bytes = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>\nstartxref\n9\n%%EOF\n".to_vec();
        assert!(fix_trailer_typo(&bytes).is_none());
    }

    #[test]
    fn test_fix_startxref_points_at_real_xref_keyword() {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        let xref_offset = bytes.len();
        bytes.extend_from_slice(b"xref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>\n");
        bytes.extend_from_slice(b"startxref\n0000000000\n%%EOF\n");

        let fixed = fix_startxref(&bytes).unwrap();
        let text = String::from_utf8(fixed).unwrap();
        let after = text.rsplit_once("startxref\n").unwrap().1;
        let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
        assert_eq!(xref_offset.to_string(), digits);
    }
}
