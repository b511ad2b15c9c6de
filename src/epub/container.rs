//! Container validator (component C2): the OCF ZIP envelope, `mimetype`,
//! and `META-INF/container.xml`.
//!
//! Grounded on the teacher's `ebook/epub/parser/container.rs` for the
//! shape of the check (mimetype first/stored/exact bytes, then parse
//! `container.xml` for rootfiles), adapted to accumulate findings into
//! [`ValidationError`] instead of short-circuiting on the first problem.

use crate::archive::EpubArchive;
use crate::epub::consts;
use crate::report::{ErrorLocation, Severity, ValidationError};
use crate::xml;
use std::io::{Read, Seek};
use zip::CompressionMethod;

/// One `<rootfile>` entry from `container.xml`.
#[derive(Clone, Debug)]
pub(crate) struct RootFile {
    pub(crate) full_path: String,
    pub(crate) media_type: String,
}

/// The container stage's findings plus whatever rootfiles it managed to
/// extract. A non-empty `root_files` is still possible alongside errors
/// (e.g. a well-formed `container.xml` with a blank `full-path`).
#[derive(Default)]
pub(crate) struct ContainerOutcome {
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) root_files: Vec<RootFile>,
}

/// Validates the container stage against an already-opened archive. The
/// caller is responsible for `EPUB-CONTAINER-001` (archive failed to open
/// as a ZIP at all), since that precludes constructing an [`EpubArchive`]
/// in the first place.
pub(crate) fn validate<R: Read + Seek>(archive: &mut EpubArchive<R>) -> ContainerOutcome {
    log::debug!("container stage: entry");
    let mut outcome = ContainerOutcome::default();

    validate_mimetype(archive, &mut outcome.errors);
    validate_container_xml(archive, &mut outcome);

    log::debug!("container stage: exit, {} error(s), {} rootfile(s)", outcome.errors.len(), outcome.root_files.len());
    outcome
}

fn validate_mimetype<R: Read + Seek>(archive: &mut EpubArchive<R>, errors: &mut Vec<ValidationError>) {
    if archive.len() == 0 {
        errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-002",
                "archive is empty; no mimetype entry present",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::MIMETYPE_PATH)),
        );
        return;
    }

    let first = archive.entry_info(0).ok();
    let first_is_mimetype = first.as_ref().is_some_and(|e| e.name == consts::MIMETYPE_PATH);
    if !first_is_mimetype {
        let first_name = first.map(|e| e.name).unwrap_or_default();
        errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-003",
                "the first archive entry must be named `mimetype`",
                Severity::Error,
            )
            .with_detail("first_file", first_name),
        );
    }

    let names = archive.entry_names().unwrap_or_default();
    let Some(index) = names.iter().position(|n| n == consts::MIMETYPE_PATH) else {
        errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-002",
                "no entry named `mimetype` exists in the archive",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::MIMETYPE_PATH)),
        );
        return;
    };

    let compression = archive.entry_info(index).ok().map(|e| e.compression);
    let bytes = archive.read_bytes(consts::MIMETYPE_PATH).unwrap_or_default();

    let compressed = compression.is_some_and(|c| c != CompressionMethod::Stored);
    let wrong_content = bytes != consts::MIMETYPE_CONTENTS.as_bytes();

    if compressed || wrong_content {
        let found = String::from_utf8_lossy(&bytes).into_owned();
        errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-002",
                "mimetype entry must be stored uncompressed with exact contents \
                 `application/epub+zip`",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::MIMETYPE_PATH))
            .with_detail("expected", consts::MIMETYPE_CONTENTS)
            .with_detail("found", found),
        );
    }
}

fn validate_container_xml<R: Read + Seek>(archive: &mut EpubArchive<R>, outcome: &mut ContainerOutcome) {
    if !archive.contains(consts::CONTAINER_PATH) {
        outcome.errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-004",
                "META-INF/container.xml is missing",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::CONTAINER_PATH)),
        );
        return;
    }

    let Ok(bytes) = archive.read_bytes(consts::CONTAINER_PATH) else {
        outcome.errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-004",
                "META-INF/container.xml could not be read",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::CONTAINER_PATH)),
        );
        return;
    };

    let root = match xml::parse(&bytes) {
        Ok(root) => root,
        Err(_) => {
            outcome.errors.push(
                ValidationError::new(
                    "EPUB-CONTAINER-005",
                    "META-INF/container.xml is not well-formed XML",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(consts::CONTAINER_PATH)),
            );
            return;
        }
    };

    let rootfiles: Vec<_> = root.descendants_named(consts::ROOT_FILE);
    if rootfiles.is_empty() {
        outcome.errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-005",
                "container.xml contains no <rootfile> elements",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::CONTAINER_PATH)),
        );
        return;
    }

    let mut blank_path = false;
    for rootfile in rootfiles {
        let full_path = rootfile.attr(consts::FULL_PATH).unwrap_or_default().to_owned();
        let media_type = rootfile.attr(consts::MEDIA_TYPE).unwrap_or_default().to_owned();

        if full_path.trim().is_empty() {
            blank_path = true;
            continue;
        }
        outcome.root_files.push(RootFile { full_path, media_type });
    }

    if blank_path {
        outcome.errors.push(
            ValidationError::new(
                "EPUB-CONTAINER-005",
                "container.xml has a <rootfile> with a blank full-path",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(consts::CONTAINER_PATH)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, contents, method) in entries {
                let options = SimpleFileOptions::default().compression_method(*method);
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    fn minimal_entries() -> Vec<(&'static str, &'static [u8], CompressionMethod)> {
        vec![
            ("mimetype", b"application/epub+zip", CompressionMethod::Stored),
            (
                "META-INF/container.xml",
                br#"<?xml version="1.0"?><container><rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles></container>"#,
                CompressionMethod::Deflated,
            ),
        ]
    }

    #[test]
    fn test_valid_container_has_no_errors() {
        let mut archive = EpubArchive::open(Cursor::new(zip_with(&minimal_entries()))).unwrap();
        let outcome = validate(&mut archive);
        assert!(outcome.errors.is_empty());
        assert_eq!(1, outcome.root_files.len());
        assert_eq!("OEBPS/content.opf", outcome.root_files[0].full_path);
    }

    #[test]
    fn test_wrong_mimetype_bytes_reported() {
        let entries = vec![
            ("mimetype", &b"application/wrong"[..], CompressionMethod::Stored),
            (
                "META-INF/container.xml",
                &br#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#[..],
                CompressionMethod::Deflated,
            ),
        ];
        let mut archive = EpubArchive::open(Cursor::new(zip_with(&entries))).unwrap();
        let outcome = validate(&mut archive);

        let error = outcome.errors.iter().find(|e| e.code() == "EPUB-CONTAINER-002").unwrap();
        assert_eq!(Some("application/epub+zip"), error.details().get_str("expected"));
        assert_eq!(Some("application/wrong"), error.details().get_str("found"));
    }

    #[test]
    fn test_mimetype_not_first_reported() {
        let mut entries = vec![("dummy.txt", &b"x"[..], CompressionMethod::Deflated)];
        entries.extend(minimal_entries());
        let mut archive = EpubArchive::open(Cursor::new(zip_with(&entries))).unwrap();
        let outcome = validate(&mut archive);

        let error = outcome.errors.iter().find(|e| e.code() == "EPUB-CONTAINER-003").unwrap();
        assert_eq!(Some("dummy.txt"), error.details().get_str("first_file"));
    }

    #[test]
    fn test_missing_container_xml_reported() {
        let entries = vec![("mimetype", &b"application/epub+zip"[..], CompressionMethod::Stored)];
        let mut archive = EpubArchive::open(Cursor::new(zip_with(&entries))).unwrap();
        let outcome = validate(&mut archive);
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-CONTAINER-004"));
    }
}
