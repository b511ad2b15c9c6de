//! XML/OCF names used across the container, package, and navigation
//! validators.
//!
//! Grounded on `ebook/epub/consts.rs` in the teacher repo (plain `&str`
//! constants grouped by the document they occur in).

// OCF paths
pub(crate) const CONTAINER_PATH: &str = "META-INF/container.xml";
pub(crate) const MIMETYPE_PATH: &str = "mimetype";
pub(crate) const MIMETYPE_CONTENTS: &str = "application/epub+zip";

// container.xml elements/attributes
pub(crate) const ROOT_FILES: &str = "rootfiles";
pub(crate) const ROOT_FILE: &str = "rootfile";
pub(crate) const FULL_PATH: &str = "full-path";
pub(crate) const MEDIA_TYPE: &str = "media-type";

// package (OPF) elements/attributes
pub(crate) const PACKAGE: &str = "package";
pub(crate) const VERSION: &str = "version";
pub(crate) const UNIQUE_ID: &str = "unique-identifier";
pub(crate) const METADATA: &str = "metadata";
pub(crate) const MANIFEST: &str = "manifest";
pub(crate) const SPINE: &str = "spine";
pub(crate) const ITEM: &str = "item";
pub(crate) const ITEMREF: &str = "itemref";
pub(crate) const ID: &str = "id";
pub(crate) const HREF: &str = "href";
pub(crate) const IDREF: &str = "idref";
pub(crate) const PROPERTIES: &str = "properties";
pub(crate) const TOC: &str = "toc";

pub(crate) const TITLE: &str = "title";
pub(crate) const IDENTIFIER: &str = "identifier";
pub(crate) const LANGUAGE: &str = "language";
pub(crate) const META: &str = "meta";
pub(crate) const PROPERTY: &str = "property";
pub(crate) const DCTERMS_MODIFIED: &str = "dcterms:modified";
pub(crate) const NAV_PROPERTY: &str = "nav";
pub(crate) const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

// Navigation document (nav.xhtml)
pub(crate) const NAV: &str = "nav";
pub(crate) const EPUB_TYPE: &str = "epub:type";
pub(crate) const TOC_TYPE: &str = "toc";
pub(crate) const LANDMARKS_TYPE: &str = "landmarks";
pub(crate) const OL: &str = "ol";

// XHTML content documents
pub(crate) const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub(crate) const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
