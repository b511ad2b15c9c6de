//! Package (OPF) validator (component C3): metadata, manifest, spine, and
//! their cross-references.
//!
//! Grounded on the teacher's `ebook/epub/parser/package.rs` family (the
//! split between metadata/manifest/spine parsing), collapsed into one
//! module since each sub-parser here is a handful of independent checks
//! rather than a full typed-metadata model.

use crate::epub::consts;
use crate::report::{ErrorLocation, Severity, ValidationError};
use crate::xml::{self, XmlElement};
use std::collections::HashSet;

/// A single `<item>` from the manifest.
#[derive(Clone, Debug)]
pub(crate) struct ManifestItem {
    pub(crate) id: String,
    pub(crate) href: String,
    pub(crate) media_type: String,
    pub(crate) properties: Vec<String>,
}

impl ManifestItem {
    pub(crate) fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// A single `<itemref>` from the spine.
#[derive(Clone, Debug)]
pub(crate) struct SpineItemRef {
    pub(crate) idref: String,
}

/// The parsed OPF package document.
#[derive(Clone, Debug, Default)]
pub(crate) struct Package {
    pub(crate) version: String,
    pub(crate) unique_identifier: String,
    pub(crate) manifest: Vec<ManifestItem>,
    pub(crate) spine: Vec<SpineItemRef>,
    pub(crate) spine_toc: Option<String>,
}

impl Package {
    pub(crate) fn is_epub2(&self) -> bool {
        self.version.starts_with('2')
    }

    pub(crate) fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// The first manifest item whose `properties` include `nav`.
    pub(crate) fn nav_item(&self) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.has_property(consts::NAV_PROPERTY))
    }
}

/// The package stage's findings plus the parsed package, when XML parsing
/// succeeded at all (a malformed OPF yields `package = None`).
#[derive(Default)]
pub(crate) struct PackageOutcome {
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) package: Option<Package>,
}

/// Validates an OPF document's raw bytes, located at `path` (used for
/// [`ErrorLocation`]).
pub(crate) fn validate(path: &str, bytes: &[u8]) -> PackageOutcome {
    log::debug!("package stage: entry ({path})");
    let mut outcome = PackageOutcome::default();

    let root = match xml::parse(bytes) {
        Ok(root) => root,
        Err(_) => {
            outcome.errors.push(
                ValidationError::new("EPUB-OPF-001", "the package document is not well-formed XML", Severity::Error)
                    .with_location(ErrorLocation::from_path(path)),
            );
            log::debug!("package stage: exit ({path}), document not well-formed");
            return outcome;
        }
    };

    let mut package = Package {
        version: root.attr(consts::VERSION).unwrap_or_default().to_owned(),
        unique_identifier: root.attr(consts::UNIQUE_ID).unwrap_or_default().to_owned(),
        ..Package::default()
    };

    if package.version.is_empty() || package.unique_identifier.is_empty() {
        outcome.errors.push(
            ValidationError::new(
                "EPUB-OPF-013",
                "package is missing `version` or `unique-identifier`",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path)),
        );
    }

    let metadata = root.first_child_named(consts::METADATA);
    validate_metadata(path, metadata, &package, &mut outcome.errors);

    let manifest = root.first_child_named(consts::MANIFEST);
    package.manifest = collect_manifest(manifest, path, &mut outcome.errors);

    let spine = root.first_child_named(consts::SPINE);
    package.spine = collect_spine(spine, path, &package, &mut outcome.errors);
    package.spine_toc = spine.and_then(|s| s.attr(consts::TOC)).map(str::to_owned);

    if package.is_epub2() {
        validate_epub2(path, &package, &mut outcome.errors);
    }

    outcome.package = Some(package);
    log::debug!("package stage: exit ({path}), {} error(s)", outcome.errors.len());
    outcome
}

fn validate_metadata(
    path: &str,
    metadata: Option<&XmlElement>,
    package: &Package,
    errors: &mut Vec<ValidationError>,
) {
    if metadata.is_none() {
        errors.push(
            ValidationError::new("EPUB-OPF-012", "package document has no <metadata> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        return;
    }
    let metadata = metadata.unwrap();

    let titles: Vec<_> = metadata.children_named(consts::TITLE).collect();
    if !titles.iter().any(|t| !t.text().is_empty()) {
        errors.push(
            ValidationError::new("EPUB-OPF-002", "metadata has no non-blank dc:title", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    let identifiers: Vec<_> = metadata.children_named(consts::IDENTIFIER).collect();
    if !identifiers.iter().any(|i| !i.text().is_empty()) {
        errors.push(
            ValidationError::new("EPUB-OPF-003", "metadata has no non-blank dc:identifier", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    } else if !package.unique_identifier.is_empty()
        && !identifiers
            .iter()
            .any(|i| i.attr(consts::ID) == Some(package.unique_identifier.as_str()))
    {
        errors.push(
            ValidationError::new(
                "EPUB-OPF-006",
                "package/@unique-identifier does not match the id of any dc:identifier",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path))
            .with_detail("unique_identifier", package.unique_identifier.clone()),
        );
    }

    if !metadata.children_named(consts::LANGUAGE).any(|l| !l.text().is_empty()) {
        errors.push(
            ValidationError::new("EPUB-OPF-004", "metadata has no non-blank dc:language", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    let has_modified = metadata.children_named(consts::META).any(|m| {
        m.attr(consts::PROPERTY) == Some(consts::DCTERMS_MODIFIED) && !m.text().is_empty()
    });
    if !has_modified {
        errors.push(
            ValidationError::new(
                "EPUB-OPF-005",
                "metadata has no meta property=\"dcterms:modified\" with a non-blank value",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path)),
        );
    }
}

fn collect_manifest(
    manifest: Option<&XmlElement>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Vec<ManifestItem> {
    let Some(manifest) = manifest else {
        errors.push(
            ValidationError::new("EPUB-OPF-007", "package document has no <manifest> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        return Vec::new();
    };

    let raw_items: Vec<_> = manifest.children_named(consts::ITEM).collect();
    if raw_items.is_empty() {
        errors.push(
            ValidationError::new("EPUB-OPF-007", "manifest has no <item> elements", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    let mut seen_ids = HashSet::new();
    let mut items = Vec::with_capacity(raw_items.len());
    for raw in raw_items {
        let id = raw.attr(consts::ID).unwrap_or_default().to_owned();
        let href = raw.attr(consts::HREF).unwrap_or_default().to_owned();
        let media_type = raw.attr(consts::MEDIA_TYPE).unwrap_or_default().to_owned();
        let properties = raw
            .attr(consts::PROPERTIES)
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        if id.is_empty() || href.is_empty() || media_type.is_empty() {
            errors.push(
                ValidationError::new(
                    "EPUB-OPF-010",
                    "manifest item is missing id, href, or media-type",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(path))
                .with_detail("id", id.clone())
                .with_detail("href", href.clone()),
            );
        }

        if !id.is_empty() && !seen_ids.insert(id.clone()) {
            errors.push(
                ValidationError::new("EPUB-OPF-014", "duplicate manifest item id", Severity::Error)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("id", id.clone()),
            );
        }

        items.push(ManifestItem { id, href, media_type, properties });
    }

    if !items.iter().any(|item| item.has_property(consts::NAV_PROPERTY)) {
        errors.push(
            ValidationError::new(
                "EPUB-OPF-009",
                "no manifest item declares the `nav` property",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path)),
        );
    }

    items
}

fn collect_spine(
    spine: Option<&XmlElement>,
    path: &str,
    package: &Package,
    errors: &mut Vec<ValidationError>,
) -> Vec<SpineItemRef> {
    let Some(spine) = spine else {
        errors.push(
            ValidationError::new("EPUB-OPF-008", "package document has no <spine> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        return Vec::new();
    };

    let raw_refs: Vec<_> = spine.children_named(consts::ITEMREF).collect();
    if raw_refs.is_empty() {
        errors.push(
            ValidationError::new("EPUB-OPF-008", "spine has no <itemref> elements", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    let mut refs = Vec::with_capacity(raw_refs.len());
    for raw in raw_refs {
        let idref = raw.attr(consts::IDREF).unwrap_or_default().to_owned();
        let valid = !idref.is_empty() && package.manifest_item(&idref).is_some();

        if !valid {
            errors.push(
                ValidationError::new(
                    "EPUB-OPF-011",
                    "itemref has a blank idref, or idref matches no manifest item",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(path))
                .with_detail("idref", idref.clone()),
            );
        }
        refs.push(SpineItemRef { idref });
    }

    refs
}

fn validate_epub2(path: &str, package: &Package, errors: &mut Vec<ValidationError>) {
    let ncx = package
        .manifest
        .iter()
        .find(|item| item.media_type == consts::NCX_MEDIA_TYPE);

    if ncx.is_none() {
        errors.push(
            ValidationError::new(
                "EPUB-OPF-016",
                "EPUB 2 package has no manifest item with media-type application/x-dtbncx+xml",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path)),
        );
    }

    let toc_valid = package
        .spine_toc
        .as_deref()
        .and_then(|toc_id| package.manifest_item(toc_id))
        .is_some_and(|item| item.media_type == consts::NCX_MEDIA_TYPE);

    if !toc_valid {
        errors.push(
            ValidationError::new(
                "EPUB-OPF-017",
                "EPUB 2 spine/@toc does not reference the NCX manifest item",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_opf() -> &'static [u8] {
        br#"<?xml version="1.0"?>
        <package version="3.0" unique-identifier="bookid">
          <metadata>
            <dc:title>Complete Test Book</dc:title>
            <dc:identifier id="bookid">urn:isbn:123456789</dc:identifier>
            <dc:language>en</dc:language>
            <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
          </metadata>
          <manifest>
            <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
            <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
          </manifest>
          <spine>
            <itemref idref="chapter1"/>
          </spine>
        </package>"#
    }

    #[test]
    fn test_minimal_package_has_no_errors() {
        let outcome = validate("OEBPS/content.opf", minimal_opf());
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let package = outcome.package.unwrap();
        assert_eq!("3.0", package.version);
        assert!(package.nav_item().is_some());
    }

    #[test]
    fn test_missing_title_reported() {
        let opf = br#"<?xml version="1.0"?>
        <package version="3.0" unique-identifier="bookid">
          <metadata>
            <dc:identifier id="bookid">urn:isbn:123456789</dc:identifier>
            <dc:language>en</dc:language>
            <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
          </metadata>
          <manifest>
            <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
          </manifest>
          <spine>
            <itemref idref="nav"/>
          </spine>
        </package>"#;

        let outcome = validate("OEBPS/content.opf", opf);
        let error = outcome.errors.iter().find(|e| e.code() == "EPUB-OPF-002").unwrap();
        assert_eq!("OEBPS/content.opf", error.location().unwrap().path());
    }

    #[test]
    fn test_spine_idref_must_match_manifest() {
        let opf = br#"<package version="3.0" unique-identifier="bookid">
          <metadata>
            <dc:title>T</dc:title>
            <dc:identifier id="bookid">x</dc:identifier>
            <dc:language>en</dc:language>
            <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
          </metadata>
          <manifest>
            <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
          </manifest>
          <spine>
            <itemref idref="missing"/>
          </spine>
        </package>"#;
        let outcome = validate("OEBPS/content.opf", opf);
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-OPF-011"));
    }
}
