//! Content document validator (component C5): XHTML well-formedness,
//! DOCTYPE, required elements, and the XHTML namespace.
//!
//! Grounded on `parser/xml.rs` in the teacher repo for event-by-event
//! streaming with `quick_xml::Reader`, kept closer to the raw token stream
//! than [`crate::epub::navigation`] (which needs a lenient HTML5 parser):
//! here we need to see the DOCTYPE token itself, which `scraper`/
//! `html5ever` normalizes away.

use crate::report::{ErrorLocation, Severity, ValidationError};
use quick_xml::events::Event;
use quick_xml::Reader;

const HTML: &str = "html";
const HEAD: &str = "head";
const BODY: &str = "body";
const XMLNS: &str = "xmlns";

/// Validates a content document's raw bytes, located at `path` (used for
/// [`ErrorLocation`]).
pub(crate) fn validate(path: &str, bytes: &[u8]) -> Vec<ValidationError> {
    log::debug!("content stage: entry ({path})");
    let mut errors = Vec::new();

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut doctype: Option<String> = None;
    let mut found_html = false;
    let mut found_head = false;
    let mut found_body = false;
    let mut html_namespace: Option<String> = None;

    let mut buf = Vec::new();
    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(_) => {
                errors.push(
                    ValidationError::new("EPUB-CONTENT-001", "the content document could not be tokenized", Severity::Error)
                        .with_location(ErrorLocation::from_path(path)),
                );
                log::debug!("content stage: exit ({path}), not tokenizable");
                return errors;
            }
        };

        match event {
            Event::DocType(text) => {
                let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                doctype = Some(raw.split_whitespace().next().unwrap_or_default().to_owned());
            }
            Event::Start(start) | Event::Empty(start) => {
                let name = local_name_lower(start.name().as_ref());
                match name.as_str() {
                    HTML => {
                        found_html = true;
                        for attribute in start.attributes().flatten() {
                            if attribute.key.as_ref() == XMLNS.as_bytes() {
                                html_namespace = Some(String::from_utf8_lossy(&attribute.value).into_owned());
                            }
                        }
                    }
                    HEAD => found_head = true,
                    BODY => found_body = true,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match &doctype {
        None => {
            errors.push(
                ValidationError::new("EPUB-CONTENT-002", "the content document has no DOCTYPE", Severity::Error)
                    .with_location(ErrorLocation::from_path(path)),
            );
        }
        Some(name) if !name.eq_ignore_ascii_case(HTML) => {
            errors.push(
                ValidationError::new("EPUB-CONTENT-003", "the DOCTYPE is not `html`", Severity::Error)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("found", name.clone()),
            );
        }
        Some(_) => {}
    }

    if !found_html {
        errors.push(
            ValidationError::new("EPUB-CONTENT-004", "the content document has no <html> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }
    if !found_head {
        errors.push(
            ValidationError::new("EPUB-CONTENT-005", "the content document has no <head> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }
    if !found_body {
        errors.push(
            ValidationError::new("EPUB-CONTENT-006", "the content document has no <body> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
    }
    if found_html && html_namespace.as_deref() != Some(crate::epub::consts::XHTML_NAMESPACE) {
        errors.push(
            ValidationError::new(
                "EPUB-CONTENT-007",
                "the <html> element's xmlns does not equal the XHTML namespace",
                Severity::Error,
            )
            .with_location(ErrorLocation::from_path(path))
            .with_detail("found", html_namespace.unwrap_or_default()),
        );
    }

    log::debug!("content stage: exit ({path}), {} error(s)", errors.len());
    errors
}

fn local_name_lower(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    name.rsplit_once(':').map_or(name.as_ref(), |(_, n)| n).to_ascii_lowercase()
}
