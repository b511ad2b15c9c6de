//! Apply: rewrites an EPUB archive per a diagnosed [`RepairAction`] plan.
//!
//! Grounded on `ebook/epub/write/writer.rs` in the teacher repo for the
//! "stream a brand-new ZIP, entry by entry, from a freshly-opened source"
//! shape. Unlike the teacher's writer (which serializes a typed `Epub`
//! model it already holds), this rewrites only the entries a repair
//! touches and copies everything else through bit-exact.

use crate::archive::EpubArchive;
use crate::cancellation::CancellationToken;
use crate::epub::consts;
use crate::epub::container;
use crate::epub::repair::actions;
use crate::error::{OperationError, OperationResult};
use crate::report::{RepairAction, RepairResult, ValidationReport};
use crate::writer::xml::{write_element, XmlWriter};
use crate::writer::zip::ZipWriter;
use crate::xml::{self, XmlElement};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

pub(crate) fn apply(
    source: &Path,
    report: &ValidationReport,
    output_path: Option<&Path>,
    replace_source: bool,
    cancellation: Option<&CancellationToken>,
) -> OperationResult<RepairResult> {
    log::debug!("epub repair apply: entry ({})", source.display());
    let source_bytes = std::fs::read(source)?;
    let plan = actions::plan_for(report.errors());
    let output_path = output_path.map(Path::to_path_buf).unwrap_or_else(|| default_output_path(source));

    match rewrite(&source_bytes, &plan, cancellation) {
        Ok((zip_bytes, actions_applied)) => {
            let temp_path = output_path.with_extension("tmp");
            write_file(&temp_path, &zip_bytes)?;
            std::fs::rename(&temp_path, &output_path)?;

            let final_path = if replace_source {
                std::fs::rename(&output_path, source)?;
                source.to_path_buf()
            } else {
                output_path
            };

            log::debug!("epub repair apply: exit ({}), {} action(s) applied", final_path.display(), actions_applied.len());
            Ok(RepairResult::success(actions_applied, report.clone(), final_path))
        }
        Err(error) => {
            log::debug!("epub repair apply: exit ({}), failed: {error}", source.display());
            Ok(RepairResult::failure(report.clone(), error.to_string()))
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(bytes)?;
    file.flush()
}

fn default_output_path(source: &Path) -> PathBuf {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("book");
    let ext = source.extension().and_then(|s| s.to_str()).unwrap_or("epub");
    source.with_file_name(format!("{stem}_repaired.{ext}"))
}

/// Rewrites `source_bytes` per `plan`, returning the new ZIP's bytes and
/// the subset of actions actually applied (actions whose target entry no
/// longer exists in the source, or that parsing could not locate, are
/// dropped rather than attempted).
fn rewrite(
    source_bytes: &[u8],
    plan: &[RepairAction],
    cancellation: Option<&CancellationToken>,
) -> OperationResult<(Vec<u8>, Vec<RepairAction>)> {
    log::debug!("epub repair rewrite: entry, {} action(s) in plan", plan.len());
    let mut source_archive = EpubArchive::open(Cursor::new(source_bytes.to_vec()))?;
    let opf_path = container::validate(&mut source_archive)
        .root_files
        .into_iter()
        .next()
        .map(|rf| rf.full_path.trim_start_matches('/').to_owned());

    let needs_container_rebuild = plan.iter().any(|a| a.kind() == "create_container_xml");
    let doctype_targets: Vec<&str> = plan
        .iter()
        .filter(|a| a.kind() == "add_doctype")
        .map(RepairAction::target)
        .collect();
    let metadata_kinds: Vec<&RepairAction> = plan
        .iter()
        .filter(|a| a.kind().starts_with("add_metadata_"))
        .collect();

    let mut actions_applied = Vec::new();
    let mut out = Vec::new();

    {
        let mut zip = ZipWriter::new(Cursor::new(&mut out), zip::write::SimpleFileOptions::default());

        zip.start_uncompressed_file(consts::MIMETYPE_PATH)?;
        zip.write_all(consts::MIMETYPE_CONTENTS.as_bytes())?;
        if plan.iter().any(|a| a.kind() == "fix_mimetype_content" || a.kind() == "fix_mimetype_order") {
            actions_applied.extend(plan.iter().filter(|a| a.target() == consts::MIMETYPE_PATH).cloned());
        }

        if needs_container_rebuild {
            write_container_xml(&mut zip, "OEBPS/content.opf")?;
            actions_applied.extend(plan.iter().filter(|a| a.kind() == "create_container_xml").cloned());
        }

        for name in source_archive.entry_names()? {
            if cancellation.is_some_and(CancellationToken::is_cancelled) {
                return Err(OperationError::Cancelled);
            }
            if name == consts::MIMETYPE_PATH {
                continue;
            }
            if name == consts::CONTAINER_PATH && needs_container_rebuild {
                continue;
            }

            let bytes = source_archive.read_bytes(&name)?;
            let rewritten = if doctype_targets.contains(&name.as_str()) {
                actions_applied.extend(
                    plan.iter().filter(|a| a.kind() == "add_doctype" && a.target() == name).cloned(),
                );
                add_doctype(&bytes)
            } else if !metadata_kinds.is_empty() && opf_path.as_deref() == Some(name.as_str()) {
                match apply_metadata_edits(&bytes, &metadata_kinds) {
                    Some(edited) => {
                        actions_applied.extend(metadata_kinds.iter().map(|a| (**a).clone()));
                        edited
                    }
                    None => bytes,
                }
            } else {
                bytes
            };

            zip.start_file(&name)?;
            zip.write_all(&rewritten)?;
        }

        zip.finish()?;
    }

    for action in plan.iter().filter(|a| a.automated()) {
        if !actions_applied.iter().any(|applied| applied.kind() == action.kind() && applied.target() == action.target()) {
            log::warn!(
                "epub repair rewrite: dropped automated action {} for {} (target entry not found)",
                action.kind(),
                action.target()
            );
        }
    }

    log::debug!("epub repair rewrite: exit, {} action(s) applied", actions_applied.len());
    Ok((out, actions_applied))
}

fn write_container_xml<W: Write + Seek>(zip: &mut ZipWriter<W>, opf_path: &str) -> OperationResult<()> {
    zip.start_file(consts::CONTAINER_PATH)?;
    let mut writer = XmlWriter::new(&mut *zip);
    writer.write_utf8_declaration()?;
    write_element! {
        writer: writer,
        tag: "container",
        attributes: {
            "version" => "1.0",
            "xmlns" => "urn:oasis:names:tc:opendocument:xmlns:container",
        }
        inner_content: {
            write_element! {
                writer: writer,
                tag: consts::ROOT_FILES,
                inner_content: {
                    write_element! {
                        writer: writer,
                        tag: consts::ROOT_FILE,
                        attributes: {
                            consts::FULL_PATH => opf_path,
                            consts::MEDIA_TYPE => "application/oebps-package+xml",
                        }
                    }?;
                }
            }?;
        }
    }?;
    Ok(())
}

/// Prepends a `<!DOCTYPE html>` declaration to an XHTML content document,
/// preserving any leading XML declaration. Idempotent: a document that
/// already carries a DOCTYPE (immediately after an optional XML
/// declaration) is returned unchanged.
fn add_doctype(bytes: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(bytes);
    let decl_end = find_xml_decl_end(&text);
    let after_decl = decl_end.map_or(text.as_ref(), |end| &text[end..]);

    if after_decl.trim_start().to_ascii_uppercase().starts_with("<!DOCTYPE") {
        return bytes.to_vec();
    }

    match decl_end {
        Some(end) => format!("{}\n<!DOCTYPE html>\n{}", &text[..end], text[end..].trim_start()).into_bytes(),
        None => format!("<!DOCTYPE html>\n{text}").into_bytes(),
    }
}

fn find_xml_decl_end(text: &str) -> Option<usize> {
    let start = text.find("<?xml")?;
    let end = text[start..].find("?>")?;
    Some(start + end + 2)
}

/// Applies the metadata-synthesis actions to a parsed OPF document.
/// Returns `None` if the document does not parse (the source is left
/// untouched and the action is dropped from `actions_applied`).
fn apply_metadata_edits(bytes: &[u8], actions: &[&RepairAction]) -> Option<Vec<u8>> {
    let mut root = xml::parse(bytes).ok()?;

    let metadata_index = root.children.iter().position(|c| c.local_name() == consts::METADATA)?;

    for action in actions {
        match action.kind() {
            "add_metadata_title" => {
                root.children[metadata_index]
                    .children
                    .push(XmlElement::new("dc:title").with_text("Untitled"));
            }
            "add_metadata_identifier" => {
                root.children[metadata_index].children.push(
                    XmlElement::new("dc:identifier")
                        .with_attr(consts::ID, "bookid")
                        .with_text("urn:uuid:00000000-0000-0000-0000-000000000000"),
                );
                if root.attr(consts::UNIQUE_ID).unwrap_or_default().is_empty() {
                    root.attributes.push((consts::UNIQUE_ID.to_owned(), "bookid".to_owned()));
                }
            }
            "add_metadata_language" => {
                root.children[metadata_index]
                    .children
                    .push(XmlElement::new("dc:language").with_text("en"));
            }
            "add_metadata_modified" => {
                let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
                root.children[metadata_index].children.push(
                    XmlElement::new(consts::META)
                        .with_attr(consts::PROPERTY, consts::DCTERMS_MODIFIED)
                        .with_text(timestamp),
                );
            }
            _ => {}
        }
    }

    Some(serialize_opf(&root))
}

fn serialize_opf(root: &XmlElement) -> Vec<u8> {
    use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};

    let mut buf = Vec::new();
    let mut writer = quick_xml::Writer::new_with_indent(&mut buf, b' ', 2);
    let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));
    write_node(&mut writer, root);

    fn write_node<W: Write>(writer: &mut quick_xml::Writer<W>, element: &XmlElement) {
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.children.is_empty() && element.text().is_empty() {
            let _ = writer.write_event(Event::Empty(start));
            return;
        }

        let _ = writer.write_event(Event::Start(start.clone()));
        if !element.text().is_empty() {
            let escaped = quick_xml::escape::escape(element.text());
            let _ = writer.write_event(Event::Text(BytesText::from_escaped(escaped)));
        }
        for child in &element.children {
            write_node(writer, child);
        }
        let _ = writer.write_event(Event::End(start.to_end()));
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_doctype_preserves_xml_decl() {
        let input = b"<?xml version=\"1.0\"?>\n<html><body/></html>";
        let out = add_doctype(input);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_add_doctype_is_idempotent() {
        let input = b"<html><body/></html>";
        let once = add_doctype(input);
        let twice = add_doctype(&once);
        assert_eq!(once, twice);
    }
}
