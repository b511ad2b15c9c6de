//! Byte-string markers used by the PDF validator and repair engine.
//!
//! Grounded on `epub::consts` in spirit (flat `&str` constants grouped by
//! where they occur), adapted to the PDF file grammar rather than XML.

pub(crate) const HEADER_PREFIX: &str = "%PDF-1.";
pub(crate) const EOF_MARKER: &str = "%%EOF";
pub(crate) const STARTXREF: &str = "startxref";
pub(crate) const XREF_KEYWORD: &str = "xref";
pub(crate) const TRAILER_KEYWORD: &str = "trailer";
pub(crate) const XREF_STREAM_TYPE: &str = "/Type/XRef";
pub(crate) const XREF_STREAM_TYPE_SPACED: &str = "/Type /XRef";
pub(crate) const CATALOG_TYPE: &str = "/Type/Catalog";
pub(crate) const CATALOG_TYPE_SPACED: &str = "/Type /Catalog";
pub(crate) const PAGES_KEY: &str = "/Pages";
pub(crate) const ROOT_KEY: &str = "/Root";
pub(crate) const ENDOBJ_KEYWORD: &str = "endobj";

/// How many trailing bytes are scanned for `%%EOF`/`startxref`/`trailer`.
pub(crate) const TRAILER_TAIL_WINDOW: usize = 1024;
