//! Navigation document validator (component C4): the XHTML nav document's
//! `toc`/`landmarks` structure and its link graph.
//!
//! Grounded on the `scraper`-based nav parsing in the pack's
//! `other_examples` (`pablocpas-epub_reader`'s `parse_nav_xhtml`,
//! `Rookro-RookReader`'s `epub_container.rs`): both reach for `scraper`'s
//! lenient HTML5 parser rather than a strict XML parser, since real-world
//! nav documents routinely carry SGML-style quirks the teacher's
//! `quick-xml`-based reader would reject outright.

use crate::epub::consts;
use crate::report::{ErrorLocation, Severity, ValidationError};
use crate::util::path;
use scraper::{Html, Selector};

/// A single link extracted from a `toc` or `landmarks` nav list.
#[derive(Clone, Debug)]
pub(crate) struct NavLink {
    pub(crate) text: String,
    pub(crate) href: String,
}

#[derive(Default)]
pub(crate) struct NavOutcome {
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) toc_links: Vec<NavLink>,
    pub(crate) landmark_links: Vec<NavLink>,
}

/// Validates a nav document's raw bytes, located at `path` (used for
/// [`ErrorLocation`]).
pub(crate) fn validate(path: &str, bytes: &[u8]) -> NavOutcome {
    log::debug!("navigation stage: entry ({path})");
    let mut outcome = NavOutcome::default();

    if bytes.is_empty() {
        outcome.errors.push(
            ValidationError::new("EPUB-NAV-001", "the navigation document is empty", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        log::debug!("navigation stage: exit ({path}), empty document");
        return outcome;
    }

    let text = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&text);

    let nav_selector = Selector::parse("nav").expect("static selector");
    let navs: Vec<_> = document.select(&nav_selector).collect();

    if navs.is_empty() {
        outcome.errors.push(
            ValidationError::new("EPUB-NAV-006", "the document contains no <nav> element", Severity::Error)
                .with_location(ErrorLocation::from_path(path)),
        );
        log::debug!("navigation stage: exit ({path}), no <nav> element");
        return outcome;
    }

    let ol_selector = Selector::parse("ol").expect("static selector");
    let a_selector = Selector::parse("a[href]").expect("static selector");

    let toc_nav = navs.iter().find(|nav| nav_has_epub_type(nav, consts::TOC_TYPE));
    let landmarks_nav = navs.iter().find(|nav| nav_has_epub_type(nav, consts::LANDMARKS_TYPE));

    match toc_nav {
        None => {
            outcome.errors.push(
                ValidationError::new(
                    "EPUB-NAV-002",
                    "no <nav epub:type=\"toc\"> element was found",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(path)),
            );
        }
        Some(nav) => {
            if nav.select(&ol_selector).next().is_none() {
                outcome.errors.push(
                    ValidationError::new(
                        "EPUB-NAV-003",
                        "the toc <nav> has no <ol> descendant",
                        Severity::Error,
                    )
                    .with_location(ErrorLocation::from_path(path)),
                );
            }
            outcome.toc_links = extract_links(nav, &a_selector);
            check_links(path, &outcome.toc_links, &mut outcome.errors);
        }
    }

    if let Some(nav) = landmarks_nav {
        if nav.select(&ol_selector).next().is_none() {
            outcome.errors.push(
                ValidationError::new(
                    "EPUB-NAV-005",
                    "the landmarks <nav> has no <ol> descendant",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(path)),
            );
        }
        outcome.landmark_links = extract_links(nav, &a_selector);
        check_links(path, &outcome.landmark_links, &mut outcome.errors);
    } else {
        log::warn!(
            "navigation stage ({path}): no <nav epub:type=\"landmarks\"> element found, skipping landmarks checks"
        );
    }

    log::debug!("navigation stage: exit ({path}), {} error(s)", outcome.errors.len());
    outcome
}

fn nav_has_epub_type(nav: &scraper::ElementRef<'_>, expected: &str) -> bool {
    nav.value()
        .attr(consts::EPUB_TYPE)
        .is_some_and(|value| value.split_whitespace().any(|token| token == expected))
}

fn extract_links(nav: &scraper::ElementRef<'_>, selector: &Selector) -> Vec<NavLink> {
    nav.select(selector)
        .map(|a| NavLink {
            text: a.text().collect::<String>().trim().to_owned(),
            href: a.value().attr("href").unwrap_or_default().to_owned(),
        })
        .collect()
}

fn check_links(path: &str, links: &[NavLink], errors: &mut Vec<ValidationError>) {
    for link in links {
        if is_invalid_href(&link.href) {
            errors.push(
                ValidationError::new(
                    "EPUB-NAV-004",
                    "nav link href is empty, absolute, protocol-relative, or escapes the container",
                    Severity::Error,
                )
                .with_location(ErrorLocation::from_path(path))
                .with_detail("href", link.href.clone()),
            );
        }
    }
}

/// `true` if `href` is disallowed for a nav link (see §4.3 of the spec).
/// Fragment-only (`#…`) and ordinary relative hrefs are accepted.
fn is_invalid_href(href: &str) -> bool {
    if href.is_empty() {
        return true;
    }
    if href.starts_with('#') {
        return false;
    }
    if href.starts_with("//") || href.starts_with('/') {
        return true;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return true;
    }
    path::escapes_root(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_NAV: &str = r#"<!DOCTYPE html>
        <html xmlns:epub="http://www.idpf.org/2007/ops">
        <body>
          <nav epub:type="toc">
            <ol>
              <li><a href="chapter1.xhtml">Chapter 1</a></li>
              <li><a href="chapter2.xhtml">Chapter 2</a></li>
            </ol>
          </nav>
        </body>
        </html>"#;

    #[test]
    fn test_valid_nav_has_no_errors() {
        let outcome = validate("OEBPS/nav.xhtml", VALID_NAV.as_bytes());
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(2, outcome.toc_links.len());
    }

    #[test]
    fn test_missing_toc_nav_reported() {
        let html = r#"<html><body><nav epub:type="landmarks"><ol><li><a href="#x">X</a></li></ol></nav></body></html>"#;
        let outcome = validate("OEBPS/nav.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-NAV-002"));
    }

    #[test]
    fn test_absolute_href_reported() {
        let html = r#"<html><body><nav epub:type="toc"><ol><li><a href="https://example.com/x">X</a></li></ol></nav></body></html>"#;
        let outcome = validate("OEBPS/nav.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-NAV-004"));
    }

    #[test]
    fn test_escaping_href_reported() {
        let html = r#"<html><body><nav epub:type="toc"><ol><li><a href="../outside.xhtml">X</a></li></ol></nav></body></html>"#;
        let outcome = validate("OEBPS/nav.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-NAV-004"));
    }
}
