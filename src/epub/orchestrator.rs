//! EPUB orchestrator (component C7): drives the container, package,
//! navigation, content, and accessibility validators across one archive
//! and aggregates their findings into a single [`ValidationReport`].
//!
//! Grounded on `ebook/epub.rs` in the teacher repo for the overall "open →
//! parse package → walk manifest/spine" shape, and on `util/uri.rs` for
//! path resolution (reused directly via [`crate::util::path`]).

use crate::archive::EpubArchive;
use crate::cancellation::CancellationToken;
use crate::epub::consts;
use crate::epub::package::Package;
use crate::epub::{accessibility, container, content, navigation, package};
use crate::error::OperationResult;
use crate::report::{Details, ErrorLocation, FileType, Severity, ValidationError, ValidationReport};
use crate::util::path;
use std::io::{Read, Seek};
use std::time::Instant;

/// Options accepted by [`Self::run`]; kept free of the public
/// [`crate::epub::EpubValidationOptions`] type so narrowed stage runners
/// (container-only, metadata-only, content-only) can reuse this without
/// depending on the full option surface.
pub(crate) struct RunOptions<'a> {
    pub(crate) with_accessibility: bool,
    pub(crate) cancellation: Option<&'a CancellationToken>,
    pub(crate) stop_after: Stage,
}

/// How far the orchestrator should drive the pipeline; used by the
/// container-only/metadata-only/content-only narrowed entry points.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Stage {
    Container,
    Package,
    Content,
}

pub(crate) fn run<R: Read + Seek>(
    file_path: &str,
    reader: R,
    options: &RunOptions<'_>,
) -> OperationResult<ValidationReport> {
    let start = Instant::now();
    let mut report = ValidationReport::new(file_path, FileType::Epub);

    let mut archive = match EpubArchive::open(reader) {
        Ok(archive) => archive,
        Err(_) => {
            report.push(
                ValidationError::new("EPUB-CONTAINER-001", "the archive is not a valid ZIP", Severity::Error)
                    .with_location(ErrorLocation::from_path(file_path)),
            );
            report.set_duration(start.elapsed());
            return Ok(report);
        }
    };

    let container_outcome = container::validate(&mut archive);
    report.extend(container_outcome.errors);

    if is_cancelled(options.cancellation) {
        report.set_duration(start.elapsed());
        return Ok(report);
    }

    let Some(root_file) = container_outcome.root_files.first() else {
        report.set_duration(start.elapsed());
        return Ok(report);
    };

    if options.stop_after == Stage::Container {
        report.set_duration(start.elapsed());
        return Ok(report);
    }

    let opf_path = root_file.full_path.trim_start_matches('/').to_owned();
    let Ok(opf_bytes) = archive.read_bytes(&opf_path) else {
        report.push(
            ValidationError::new("EPUB-OPF-015", "the package document referenced by container.xml is missing", Severity::Error)
                .with_location(ErrorLocation::from_path(&opf_path)),
        );
        report.set_duration(start.elapsed());
        return Ok(report);
    };

    let package_outcome = package::validate(&opf_path, &opf_bytes);
    report.extend(package_outcome.errors);

    if is_cancelled(options.cancellation) {
        report.set_duration(start.elapsed());
        return Ok(report);
    }

    let Some(package) = package_outcome.package else {
        report.set_duration(start.elapsed());
        return Ok(report);
    };

    if options.stop_after == Stage::Package || package.manifest.is_empty() {
        report.set_duration(start.elapsed());
        return Ok(report);
    }

    let opf_dir = path::parent(&opf_path);

    if let Some(nav_item) = package.nav_item() {
        let nav_path = path::resolve_for_lookup(opf_dir, &nav_item.href);
        run_nav_stage(&mut archive, &nav_path, &nav_item.id, &mut report);
    }

    for itemref in &package.spine {
        if is_cancelled(options.cancellation) {
            break;
        }
        run_spine_item(&mut archive, &package, itemref, opf_dir, options.with_accessibility, &mut report);
    }

    report.set_duration(start.elapsed());
    Ok(report)
}

fn run_nav_stage<R: Read + Seek>(
    archive: &mut EpubArchive<R>,
    nav_path: &str,
    manifest_id: &str,
    report: &mut ValidationReport,
) {
    match archive.read_bytes(nav_path) {
        Ok(bytes) => {
            let outcome = navigation::validate(nav_path, &bytes);
            for error in outcome.errors {
                report.push(with_manifest_id(error, manifest_id));
            }
        }
        Err(_) => {
            report.push(
                ValidationError::new("EPUB-OPF-015", "the navigation document referenced by the manifest is missing", Severity::Error)
                    .with_location(ErrorLocation::from_path(nav_path))
                    .with_detail("manifest_id", manifest_id.to_owned()),
            );
        }
    }
}

fn run_spine_item<R: Read + Seek>(
    archive: &mut EpubArchive<R>,
    package: &Package,
    itemref: &package::SpineItemRef,
    opf_dir: &str,
    with_accessibility: bool,
    report: &mut ValidationReport,
) {
    let Some(item) = package.manifest_item(&itemref.idref) else {
        return;
    };
    if item.media_type != consts::XHTML_MEDIA_TYPE || item.has_property(consts::NAV_PROPERTY) {
        return;
    }

    let item_path = path::resolve_for_lookup(opf_dir, &item.href);
    let Ok(bytes) = archive.read_bytes(&item_path) else {
        report.push(
            ValidationError::new("EPUB-OPF-015", "a spine-referenced file is missing from the archive", Severity::Error)
                .with_location(ErrorLocation::from_path(&item_path))
                .with_detail("manifest_id", item.id.clone()),
        );
        return;
    };

    for error in content::validate(&item_path, &bytes) {
        report.push(with_manifest_id(error, &item.id));
    }

    if with_accessibility {
        let outcome = accessibility::validate(&item_path, &bytes);
        for error in outcome.errors {
            report.push(with_manifest_id(error, &item.id));
        }

        let mut details = Details::new()
            .with("score", outcome.score)
            .with("compliance", outcome.compliance);
        for (key, value) in accessibility::summarize(&bytes).iter() {
            details.insert(key.to_owned(), value.clone());
        }
        report.metadata_mut().insert("accessibility", serde_json::to_value(&details).unwrap_or_default());
    }
}

fn with_manifest_id(error: ValidationError, manifest_id: &str) -> ValidationError {
    let location = error
        .location()
        .cloned()
        .unwrap_or_default()
        .with_manifest_id(manifest_id.to_owned());
    // `ValidationError` has no direct location setter; rebuild preserving
    // everything else.
    ValidationError::new(error.code().to_owned(), error.message().to_owned(), error.severity())
        .with_location(location)
        .with_details(error.details().clone())
}

fn is_cancelled(token: Option<&CancellationToken>) -> bool {
    token.is_some_and(CancellationToken::is_cancelled)
}
