//! A small streaming XML writer used to regenerate `container.xml` and
//! repaired OPF documents.
//!
//! Grounded on `writer/xml.rs` in the teacher repo: a builder over
//! [`quick_xml::Writer`] with `start_element` / `add_attribute` /
//! `finish_*_element` steps, plus the same `write_element!` macro shape for
//! attribute lists and nested content.

use crate::writer::WriterResult;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::io::Write;

pub(crate) struct XmlWriter<'a, W> {
    writer: quick_xml::Writer<W>,
    start_element: Option<BytesStart<'a>>,
}

impl<'a, W: Write> XmlWriter<'a, W> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            writer: quick_xml::Writer::new_with_indent(writer, b' ', 2),
            start_element: None,
        }
    }

    pub(crate) fn write_utf8_declaration(&mut self) -> WriterResult<&mut Self> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(self)
    }

    /// Start an element: `<tag`
    pub(crate) fn start_element(&mut self, tag: &'a str) -> WriterResult<&mut Self> {
        self.finish_start_element()?;
        self.start_element = Some(BytesStart::new(tag));
        Ok(self)
    }

    /// Append an attribute to the started element: `<tag name="value"`
    pub(crate) fn add_attribute<'b>(
        &mut self,
        name: &str,
        value: impl Into<Option<&'b str>>,
    ) -> &mut Self {
        if let (Some(element), Some(value)) = (&mut self.start_element, value.into()) {
            element.push_attribute(new_escaped_attribute(name, value));
        }
        self
    }

    /// Finish writing a start element: `<parent>`
    pub(crate) fn finish_start_element(&mut self) -> WriterResult<()> {
        if let Some(element) = self.start_element.take() {
            self.writer.write_event(Event::Start(element))?;
        }
        Ok(())
    }

    /// Finish writing a parent element's closing tag: `</parent>`
    pub(crate) fn finish_end_element(&mut self, tag: &str) -> WriterResult<()> {
        self.finish_start_element()?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// The given `text` is unescaped; finish writing a text element:
    /// `<elem>text</elem>`
    pub(crate) fn finish_text_element(&mut self, text: &str) -> WriterResult<()> {
        if let Some(element) = self.start_element.take() {
            let escaped = BytesText::from_escaped(escape(text));
            self.writer.write_event(Event::Start(element.borrow()))?;
            self.writer.write_event(Event::Text(escaped))?;
            self.writer.write_event(Event::End(element.to_end()))?;
        }
        Ok(())
    }

    /// Finish writing a self-closing element: `<elem/>`
    pub(crate) fn finish_empty_element(&mut self) -> WriterResult<()> {
        if let Some(element) = self.start_element.take() {
            self.writer.write_event(Event::Empty(element))?;
        }
        Ok(())
    }
}

fn new_escaped_attribute<'a>(name: &'a str, value: &'a str) -> Attribute<'a> {
    Attribute {
        key: quick_xml::name::QName(name.as_bytes()),
        value: match escape(value.trim()) {
            Cow::Borrowed(borrowed) => Cow::Borrowed(borrowed.as_bytes()),
            Cow::Owned(owned) => Cow::Owned(owned.into_bytes()),
        },
    }
}

fn escape(input: &str) -> Cow<'_, str> {
    const ESCAPE_CHARS: &[char] = &['<', '>', '"', '&', '\'', '\t', '\n', '\r'];

    fn get_entity(c: char) -> &'static str {
        match c {
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '&' => "&amp;",
            '\'' => "&apos;",
            '\t' => "&#9;",
            '\n' => "&#10;",
            '\r' => "&#13;",
            _ => unreachable!("only characters in `ESCAPE_CHARS` are matched"),
        }
    }

    let mut escaped = None;
    let mut last_pos = 0;

    for (i, matched) in input.match_indices(ESCAPE_CHARS) {
        let out = escaped.get_or_insert_with(|| String::with_capacity(input.len() + 16));
        let c = matched.chars().next().expect("non-empty match");
        out.push_str(&input[last_pos..i]);
        out.push_str(get_entity(c));
        last_pos = i + matched.len();
    }

    match escaped {
        None => Cow::Borrowed(input),
        Some(mut s) => {
            s.push_str(&input[last_pos..]);
            Cow::Owned(s)
        }
    }
}

/// Writes a `<tag attr="...">inner</tag>`-shaped element, mirroring the
/// teacher's `write_element!` macro.
macro_rules! write_element {
    (writer: $w:expr, tag: $t:expr, $(attributes: { $($name:expr => $val:expr,)* })?) => {{
        let element = $w.start_element($t)?;
        $($(element.add_attribute($name, $val);)*)?
        element.finish_empty_element()
    }};
    (writer: $w:expr, tag: $t:expr, $(attributes: { $($name:expr => $val:expr,)* })? text: $text:expr) => {{
        let element = $w.start_element($t)?;
        $($(element.add_attribute($name, $val);)*)?
        element.finish_text_element($text)
    }};
    (writer: $w:expr, tag: $t:expr, $(attributes: { $($name:expr => $val:expr,)* })? inner_content: $inner:block) => {{
        let tag = $t;
        {
            let element = $w.start_element(tag)?;
            $($(element.add_attribute($name, $val);)*)?
        }
        $w.finish_start_element()?;
        $inner
        $w.finish_end_element(tag)
    }};
}

pub(crate) use write_element;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!("&lt;&gt;&apos;&quot;&amp;", escape("<>'\"&"));
        assert_eq!("abc xyz", escape("abc xyz"));
        assert_eq!("1 &lt; 2 &amp; 3", escape("1 < 2 & 3"));
    }

    #[test]
    fn test_write_container_like_document() {
        let mut buf = Vec::new();
        {
            let mut writer = XmlWriter::new(&mut buf);
            writer.write_utf8_declaration().unwrap();
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
                        tag: "rootfiles",
                        inner_content: {
                            write_element! {
                                writer: writer,
                                tag: "rootfile",
                                attributes: {
                                    "full-path" => "OEBPS/content.opf",
                                    "media-type" => "application/oebps-package+xml",
                                }
                            }.unwrap();
                        }
                    }.unwrap();
                }
            }
            .unwrap();
        }

        let document = String::from_utf8(buf).unwrap();
        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(document.contains("<rootfile full-path=\"OEBPS/content.opf\""));
    }
}
