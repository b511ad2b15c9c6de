//! End-to-end PDF scenario: a missing `%%EOF` marker is detected and the
//! repair engine's output re-validates clean.

mod common;

use tomecheck::pdf::{self, PdfRepairOptions, PdfValidationOptions};

#[test]
fn missing_eof_detected() {
    let report = pdf::validate_bytes("book.pdf", common::pdf_missing_eof(), &PdfValidationOptions::new()).unwrap();

    assert!(!report.is_valid());
    assert!(report.errors().iter().any(|e| e.code() == "PDF-TRAILER-003"));
}

#[test]
fn valid_pdf_has_no_errors() {
    let report = pdf::validate_bytes("book.pdf", common::valid_pdf(), &PdfValidationOptions::new()).unwrap();
    assert!(report.is_valid());
}

#[test]
fn repair_fixes_missing_eof_and_revalidates_clean() {
    let source_file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::fs::write(source_file.path(), common::pdf_missing_eof()).unwrap();

    let report = pdf::validate(source_file.path(), &PdfValidationOptions::new()).unwrap();
    assert!(!report.is_valid());

    let preview = pdf::repair::preview(&report);
    assert!(preview.can_auto_repair(), "{:?}", preview.actions());

    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("repaired.pdf");
    let options = PdfRepairOptions::new().with_output_path(&output_path);

    let result = pdf::repair::apply(source_file.path(), &report, &options).unwrap();
    assert!(result.success());

    let repaired_report = pdf::validate(&output_path, &PdfValidationOptions::new()).unwrap();
    assert!(repaired_report.is_valid(), "{:?}", repaired_report.errors());
}
