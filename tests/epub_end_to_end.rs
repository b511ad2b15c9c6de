//! End-to-end EPUB scenarios: validation, the report invariants, and the
//! repair round-trip (preview → apply → re-validate).

mod common;

use tomecheck::epub::{self, EpubRepairOptions, EpubValidationOptions};

#[test]
fn minimal_valid_epub_has_no_errors() {
    let report = epub::validate_bytes("book.epub", common::valid_epub(), &EpubValidationOptions::new()).unwrap();

    assert!(report.is_valid());
    assert!(report.errors().is_empty());
}

#[test]
fn wrong_mimetype_bytes_reported() {
    let report =
        epub::validate_bytes("book.epub", common::epub_with_wrong_mimetype(), &EpubValidationOptions::new()).unwrap();

    assert!(!report.is_valid());
    let error = report.errors().iter().find(|e| e.code() == "EPUB-CONTAINER-002").unwrap();
    assert_eq!(Some("application/epub+zip"), error.details().get_str("expected"));
    assert_eq!(Some("application/wrong"), error.details().get_str("found"));
}

#[test]
fn mimetype_not_first_reported() {
    let report = epub::validate_bytes(
        "book.epub",
        common::epub_with_mimetype_not_first(),
        &EpubValidationOptions::new(),
    )
    .unwrap();

    assert!(!report.is_valid());
    let error = report.errors().iter().find(|e| e.code() == "EPUB-CONTAINER-003").unwrap();
    assert_eq!(Some("dummy.txt"), error.details().get_str("first_file"));
}

#[test]
fn opf_missing_title_reported() {
    let report =
        epub::validate_bytes("book.epub", common::epub_with_missing_title(), &EpubValidationOptions::new()).unwrap();

    assert!(!report.is_valid());
    let error = report.errors().iter().find(|e| e.code() == "EPUB-OPF-002").unwrap();
    assert_eq!("OEBPS/content.opf", error.location().unwrap().path());
}

#[test]
fn missing_doctype_in_content_reported() {
    let report =
        epub::validate_bytes("book.epub", common::epub_with_missing_doctype(), &EpubValidationOptions::new()).unwrap();

    assert!(!report.is_valid());
    let error = report.errors().iter().find(|e| e.code() == "EPUB-CONTENT-002").unwrap();
    assert_eq!("OEBPS/chapter1.xhtml", error.location().unwrap().path());
    assert_eq!(Some("chapter1"), error.location().unwrap().manifest_id());
}

#[test]
fn is_valid_matches_empty_errors_invariant() {
    let valid = epub::validate_bytes("book.epub", common::valid_epub(), &EpubValidationOptions::new()).unwrap();
    assert_eq!(valid.is_valid(), valid.errors().is_empty());

    let invalid =
        epub::validate_bytes("book.epub", common::epub_with_wrong_mimetype(), &EpubValidationOptions::new()).unwrap();
    assert_eq!(invalid.is_valid(), invalid.errors().is_empty());
}

#[test]
fn error_location_file_is_basename_of_path() {
    let report =
        epub::validate_bytes("book.epub", common::epub_with_missing_doctype(), &EpubValidationOptions::new()).unwrap();

    for error in report.all_entries() {
        if let Some(location) = error.location() {
            if !location.path().is_empty() {
                let expected_file = location.path().rsplit('/').next().unwrap();
                assert_eq!(expected_file, location.file());
            }
        }
    }
}

/// Scenarios (2)-(5) should each be fully automatically repairable, and the
/// repaired output should re-validate clean while the source is untouched.
#[test]
fn repair_round_trip_fixes_wrong_mimetype() {
    repair_round_trip(common::epub_with_wrong_mimetype());
}

#[test]
fn repair_round_trip_fixes_mimetype_not_first() {
    repair_round_trip(common::epub_with_mimetype_not_first());
}

#[test]
fn repair_round_trip_fixes_missing_title() {
    repair_round_trip(common::epub_with_missing_title());
}

#[test]
fn repair_round_trip_fixes_missing_doctype() {
    repair_round_trip(common::epub_with_missing_doctype());
}

fn repair_round_trip(source_bytes: Vec<u8>) {
    let source_file = tempfile::Builder::new().suffix(".epub").tempfile().unwrap();
    std::fs::write(source_file.path(), &source_bytes).unwrap();

    let report = epub::validate(source_file.path(), &EpubValidationOptions::new()).unwrap();
    assert!(!report.is_valid());

    let preview = epub::repair::preview(&report);
    assert!(preview.can_auto_repair(), "expected a fully automated repair plan: {:?}", preview.actions());

    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("repaired.epub");
    let options = EpubRepairOptions::new().with_output_path(&output_path);

    let result = epub::repair::apply(source_file.path(), &report, &options).unwrap();
    assert!(result.success());
    assert_eq!(Some(output_path.as_path()), result.backup_path());

    let repaired_report = epub::validate(&output_path, &EpubValidationOptions::new()).unwrap();
    assert!(repaired_report.is_valid(), "{:?}", repaired_report.errors());

    let unchanged_source = std::fs::read(source_file.path()).unwrap();
    assert_eq!(source_bytes, unchanged_source);
}

/// For C8, the first entry of a repaired output is always `mimetype`,
/// stored with method STORE, with exact bytes `application/epub+zip` —
/// unconditionally, even when the plan never touched the mimetype entry.
#[test]
fn repaired_output_mimetype_entry_is_always_bit_exact() {
    let source_file = tempfile::Builder::new().suffix(".epub").tempfile().unwrap();
    std::fs::write(source_file.path(), common::epub_with_missing_doctype()).unwrap();

    let report = epub::validate(source_file.path(), &EpubValidationOptions::new()).unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let output_path = output_dir.path().join("repaired.epub");
    let options = EpubRepairOptions::new().with_output_path(&output_path);
    let result = epub::repair::apply(source_file.path(), &report, &options).unwrap();
    assert!(result.success());

    let repaired_bytes = std::fs::read(&output_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(repaired_bytes)).unwrap();
    let mut first_entry = archive.by_index(0).unwrap();
    assert_eq!("mimetype", first_entry.name());
    assert_eq!(zip::CompressionMethod::Stored, first_entry.compression());

    let mut contents = Vec::new();
    std::io::Read::read_to_end(&mut first_entry, &mut contents).unwrap();
    assert_eq!(b"application/epub+zip".to_vec(), contents);
}
