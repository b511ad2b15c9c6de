//! Shared fixture builders for the integration tests.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub const CONTENT_OPF: &str = r#"<?xml version="1.0"?>
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
    <item id="chapter2" href="chapter2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="chapter1"/>
    <itemref idref="chapter2"/>
  </spine>
</package>"#;

pub const CONTENT_OPF_NO_TITLE: &str = r#"<?xml version="1.0"?>
<package version="3.0" unique-identifier="bookid">
  <metadata>
    <dc:identifier id="bookid">urn:isbn:123456789</dc:identifier>
    <dc:language>en</dc:language>
    <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
    <item id="chapter2" href="chapter2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="chapter1"/>
    <itemref idref="chapter2"/>
  </spine>
</package>"#;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const NAV_XHTML: &str = r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Navigation</title></head>
<body>
  <nav epub:type="toc">
    <ol>
      <li><a href="chapter1.xhtml">Chapter 1</a></li>
      <li><a href="chapter2.xhtml">Chapter 2</a></li>
    </ol>
  </nav>
</body>
</html>"#;

pub const CHAPTER_VALID: &str = r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Chapter</title></head><body><p>Hi</p></body></html>"#;

pub const CHAPTER_NO_DOCTYPE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Chapter</title></head><body><p>Hi</p></body></html>"#;

/// Builds a minimal, fully valid EPUB archive's bytes, with `mimetype` as
/// the first entry, stored uncompressed with exact contents.
pub fn valid_epub() -> Vec<u8> {
    build_epub(
        ("mimetype", b"application/epub+zip".to_vec(), CompressionMethod::Stored),
        CONTENT_OPF,
        CHAPTER_VALID,
        &[],
    )
}

/// Like [`valid_epub`], but with the mimetype contents corrupted.
pub fn epub_with_wrong_mimetype() -> Vec<u8> {
    build_epub(
        ("mimetype", b"application/wrong".to_vec(), CompressionMethod::Stored),
        CONTENT_OPF,
        CHAPTER_VALID,
        &[],
    )
}

/// Like [`valid_epub`], but with a `dummy.txt` entry preceding `mimetype`.
pub fn epub_with_mimetype_not_first() -> Vec<u8> {
    build_epub(
        ("mimetype", b"application/epub+zip".to_vec(), CompressionMethod::Stored),
        CONTENT_OPF,
        CHAPTER_VALID,
        &[("dummy.txt", b"x".to_vec())],
    )
}

/// Like [`valid_epub`], but the OPF has no `dc:title`.
pub fn epub_with_missing_title() -> Vec<u8> {
    build_epub(
        ("mimetype", b"application/epub+zip".to_vec(), CompressionMethod::Stored),
        CONTENT_OPF_NO_TITLE,
        CHAPTER_VALID,
        &[],
    )
}

/// Like [`valid_epub`], but `chapter1.xhtml` has no DOCTYPE.
pub fn epub_with_missing_doctype() -> Vec<u8> {
    build_epub(
        ("mimetype", b"application/epub+zip".to_vec(), CompressionMethod::Stored),
        CONTENT_OPF,
        CHAPTER_NO_DOCTYPE,
        &[],
    )
}

fn build_epub(
    mimetype: (&str, Vec<u8>, CompressionMethod),
    opf: &str,
    chapter1: &str,
    extra_leading_entries: &[(&str, Vec<u8>)],
) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));

        for (name, contents) in extra_leading_entries {
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }

        let (name, contents, method) = mimetype;
        writer.start_file(name, SimpleFileOptions::default().compression_method(method)).unwrap();
        writer.write_all(&contents).unwrap();

        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        writer.start_file("META-INF/container.xml", deflated).unwrap();
        writer.write_all(CONTAINER_XML.as_bytes()).unwrap();

        writer.start_file("OEBPS/content.opf", deflated).unwrap();
        writer.write_all(opf.as_bytes()).unwrap();

        writer.start_file("OEBPS/nav.xhtml", deflated).unwrap();
        writer.write_all(NAV_XHTML.as_bytes()).unwrap();

        writer.start_file("OEBPS/chapter1.xhtml", deflated).unwrap();
        writer.write_all(chapter1.as_bytes()).unwrap();

        writer.start_file("OEBPS/chapter2.xhtml", deflated).unwrap();
        writer.write_all(CHAPTER_VALID.as_bytes()).unwrap();

        writer.finish().unwrap();
    }
    buf
}

/// Builds a minimal, well-formed PDF 1.4 document's bytes.
pub fn valid_pdf() -> Vec<u8> {
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

/// Like [`valid_pdf`], with the trailing `%%EOF` line removed.
pub fn pdf_missing_eof() -> Vec<u8> {
    let mut pdf = valid_pdf();
    let eof_index = pdf.windows(5).rposition(|w| w == b"%%EOF").unwrap();
    pdf.truncate(eof_index);
    pdf
}
