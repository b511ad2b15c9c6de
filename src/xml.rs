//! A small, allocating XML tree reader used by the container and package
//! validators.
//!
//! Grounded on `parser/xml.rs` in the teacher repo: events are read through
//! [`quick_xml::Reader`] and a parse failure is surfaced as a single
//! [`XmlError`], the same way [`crate::parser::xml::XmlReader`] turns a
//! [`quick_xml`] error into `FormatError::Unparsable`. Unlike the teacher's
//! reader, which streams events directly into typed data models, this
//! module first materializes a lightweight [`XmlElement`] tree, since the
//! validators here need to inspect an OPF/container document structurally
//! (find-by-local-name, attribute lookup) rather than build a single
//! purpose-built model.

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

/// XML parsing failed; the document is not well-formed.
#[derive(Error, Debug)]
#[error("XML parse error at byte {position}: {source}")]
pub(crate) struct XmlError {
    pub(crate) position: usize,
    #[source]
    pub(crate) source: quick_xml::Error,
}

/// A parsed XML element: a local name, its attributes (name kept verbatim,
/// e.g. `"xml:lang"` or `"unique-identifier"`), and its children.
#[derive(Clone, Debug, Default)]
pub(crate) struct XmlElement {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Builds a new, childless element with no text content. Used by the
    /// repair engine to synthesize OPF nodes (e.g. a placeholder
    /// `dc:title`) that were never present in the source document.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Builds a new element with text content, builder-style.
    pub(crate) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attaches an attribute, builder-style.
    pub(crate) fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// The local (unprefixed) part of the element's tag name.
    pub(crate) fn local_name(&self) -> &str {
        self.name.rsplit_once(':').map_or(&self.name, |(_, n)| n)
    }

    /// Looks up an attribute by its exact (possibly prefixed) name.
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct text content, already whitespace-trimmed.
    pub(crate) fn text(&self) -> &str {
        self.text.trim()
    }

    /// Direct children whose local name matches.
    pub(crate) fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |c| c.local_name() == local_name)
    }

    /// First direct child whose local name matches.
    pub(crate) fn first_child_named(&self, local_name: &str) -> Option<&XmlElement> {
        self.children_named(local_name).next()
    }

    /// All descendants (depth-first, self excluded) whose local name
    /// matches.
    pub(crate) fn descendants_named<'a>(&'a self, local_name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants_named(local_name, &mut found);
        found
    }

    fn collect_descendants_named<'a>(&'a self, local_name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.local_name() == local_name {
                out.push(child);
            }
            child.collect_descendants_named(local_name, out);
        }
    }

    /// `true` if any descendant (or this element) matches the local name.
    pub(crate) fn contains_descendant(&self, local_name: &str) -> bool {
        self.local_name() == local_name
            || self.children.iter().any(|c| c.contains_descendant(local_name))
    }
}

/// Parses `bytes` into a single root [`XmlElement`].
///
/// Returns [`XmlError`] if the document is not well-formed XML, or if it
/// has no single root element (e.g. the document is empty or has no
/// element content at all).
pub(crate) fn parse(bytes: &[u8]) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| XmlError { position, source })?;

        match event {
            Event::Start(start) => {
                stack.push(new_element(&reader, &start)?);
            }
            Event::Empty(start) => {
                let element = new_element(&reader, &start)?;
                push_finished(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    push_finished(&mut stack, &mut root, element);
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let decoded = text
                        .unescape()
                        .map_err(|source| XmlError { position, source })?;
                    top.text.push_str(&decoded);
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(cdata.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| XmlError {
        position: bytes.len(),
        source: quick_xml::Error::UnexpectedEof("no root element".into()),
    })
}

fn push_finished(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn new_element(
    reader: &Reader<&[u8]>,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlElement, XmlError> {
    let position = reader.buffer_position() as usize;
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|error| XmlError {
            position,
            source: quick_xml::Error::InvalidAttr(error),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .decode_and_unescape_value(reader.decoder())
            .map_err(|source| XmlError { position, source })?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finds_nested_elements() {
        let xml = br#"<package version="3.0"><metadata><dc:title>Hi</dc:title></metadata></package>"#;
        let root = parse(xml).unwrap();
        assert_eq!("package", root.local_name());
        assert_eq!(Some("3.0"), root.attr("version"));

        let title = root.descendants_named("title");
        assert_eq!(1, title.len());
        assert_eq!("Hi", title[0].text());
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let xml = b"<package><unterminated>";
        assert!(parse(xml).is_err());
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(parse(b"").is_err());
    }
}
