//! Accessibility auditor (component C6): a WCAG-2.1-aligned pass over a
//! content document, producing advisory findings and a weighted score.
//!
//! Grounded on the same `scraper`-based DOM walk as
//! [`crate::epub::navigation`]; unlike the nav/container/OPF validators,
//! nearly every finding here is advisory (`Severity::Warning`), per §7 of
//! the spec ("warning for recoverable or non-normative issues (most A11Y
//! advisories)").

use crate::report::{Details, ErrorLocation, Severity, ValidationError};
use scraper::{Html, Selector};

const SEMANTIC_TAGS: &[&str] = &["header", "nav", "main", "article", "section", "aside", "footer"];

/// A computed accessibility audit.
pub(crate) struct AccessibilityOutcome {
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) score: f64,
    pub(crate) compliance: &'static str,
}

/// Audits a content document's raw bytes, located at `path`.
pub(crate) fn validate(path: &str, bytes: &[u8]) -> AccessibilityOutcome {
    log::debug!("accessibility stage: entry ({path})");
    let text = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&text);
    let mut errors = Vec::new();

    let html_selector = Selector::parse("html").expect("static selector");
    let html = document.select(&html_selector).next();

    let language_score = score_language(path, html, &mut errors);
    let semantic_score = score_semantic(&document);
    let aria_score = score_aria(path, &document, &mut errors);
    let alt_score = score_alt_text(path, &document, &mut errors);
    let heading_score = score_headings(path, &document, &mut errors);
    let reading_order_score = score_reading_order(path, &document, &mut errors);
    let table_header_score = score_table_headers(path, &document, &mut errors);
    let form_label_score = score_form_labels(path, &document, &mut errors);
    let landmark_score = score_landmarks(path, &document, &mut errors);

    let score = language_score
        + semantic_score
        + aria_score
        + alt_score
        + heading_score
        + reading_order_score
        + table_header_score
        + form_label_score
        + landmark_score;
    let error_count = errors.iter().filter(|e| e.severity() >= Severity::Error).count();

    let compliance = if score >= 90.0 && error_count == 0 {
        "WCAG 2.1 AA"
    } else if score >= 80.0 && error_count == 0 {
        "WCAG 2.1 A"
    } else if score >= 60.0 {
        "Partial"
    } else {
        "Non-compliant"
    };

    log::debug!("accessibility stage: exit ({path}), score {score:.1}, compliance {compliance}");
    AccessibilityOutcome { errors, score, compliance }
}

fn score_language(path: &str, html: Option<scraper::ElementRef<'_>>, errors: &mut Vec<ValidationError>) -> f64 {
    let lang = html.and_then(|el| el.value().attr("lang").or_else(|| el.value().attr("xml:lang")));
    match lang {
        None | Some("") => {
            errors.push(
                ValidationError::new("EPUB-A11Y-001", "the document declares no language", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path)),
            );
            0.0
        }
        Some(value) if value.len() < 2 || !value.chars().take(2).all(|c| c.is_ascii_alphabetic()) => {
            errors.push(
                ValidationError::new("EPUB-A11Y-002", "the declared language does not look like a valid tag", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("lang", value.to_owned()),
            );
            0.0
        }
        Some(_) => 5.0,
    }
}

fn score_semantic(document: &Html) -> f64 {
    let present = SEMANTIC_TAGS
        .iter()
        .filter(|tag| {
            Selector::parse(tag)
                .ok()
                .is_some_and(|selector| document.select(&selector).next().is_some())
        })
        .count();
    (present.min(5) as f64 / 5.0) * 20.0
}

fn score_aria(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    const VALID_ROLES: &[&str] = &[
        "button", "link", "navigation", "main", "banner", "contentinfo", "complementary", "region",
        "heading", "list", "listitem", "img", "presentation", "note", "article", "tab", "tabpanel",
        "tablist", "dialog", "alert", "form", "search", "checkbox", "radio",
    ];
    const LABEL_REQUIRED_ROLES: &[&str] = &["button", "link", "checkbox", "radio", "tab", "dialog"];

    let role_selector = Selector::parse("[role]").expect("static selector");
    let mut score: f64 = 15.0;

    for element in document.select(&role_selector) {
        let role = element.value().attr("role").unwrap_or_default();
        if !VALID_ROLES.contains(&role) {
            score -= 2.0;
            errors.push(
                ValidationError::new("EPUB-A11Y-006", "element has an invalid ARIA role", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("role", role.to_owned()),
            );
        }

        let has_label = element.value().attr("aria-label").is_some()
            || element.value().attr("aria-labelledby").is_some()
            || !element.text().collect::<String>().trim().is_empty();
        if LABEL_REQUIRED_ROLES.contains(&role) && !has_label {
            score -= 3.0;
            errors.push(
                ValidationError::new("EPUB-A11Y-007", "element's role requires an accessible label", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("role", role.to_owned()),
            );
        }
    }

    if score < 0.0 {
        log::warn!("accessibility stage ({path}): aria score floor hit, raw score was {score:.1}");
    }
    score.max(0.0)
}

fn score_alt_text(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    let img_selector = Selector::parse("img").expect("static selector");
    let images: Vec<_> = document.select(&img_selector).collect();
    if images.is_empty() {
        return 20.0;
    }

    let mut with_alt = 0usize;
    for image in &images {
        if image.value().attr("alt").is_some() {
            with_alt += 1;
        } else {
            errors.push(
                ValidationError::new("EPUB-A11Y-004", "image has no alt attribute", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("src", image.value().attr("src").unwrap_or_default().to_owned()),
            );
        }
    }

    (with_alt as f64 / images.len() as f64) * 20.0
}

fn score_headings(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").expect("static selector");
    let mut score: f64 = 10.0;
    let mut previous_level: Option<u8> = None;

    for heading in document.select(&heading_selector) {
        let level: u8 = heading.value().name()[1..].parse().unwrap_or(1);

        if heading.text().collect::<String>().trim().is_empty() {
            score -= 2.0;
            errors.push(
                ValidationError::new("EPUB-A11Y-011", "heading element has no text content", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("level", level as i64),
            );
        }

        if let Some(previous) = previous_level {
            if level > previous + 1 {
                score -= 2.0;
                errors.push(
                    ValidationError::new("EPUB-A11Y-012", "heading level skips one or more levels", Severity::Warning)
                        .with_location(ErrorLocation::from_path(path))
                        .with_detail("from", previous as i64)
                        .with_detail("to", level as i64),
                );
            }
        }
        previous_level = Some(level);
    }

    if score < 0.0 {
        log::warn!("accessibility stage ({path}): heading score floor hit, raw score was {score:.1}");
    }
    score.max(0.0)
}

fn score_reading_order(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    let tabindex_selector = Selector::parse("[tabindex]").expect("static selector");
    let mut score: f64 = 10.0;

    for element in document.select(&tabindex_selector) {
        let positive = element
            .value()
            .attr("tabindex")
            .and_then(|value| value.parse::<i32>().ok())
            .is_some_and(|value| value > 0);

        if positive {
            score -= 1.0;
            errors.push(
                ValidationError::new(
                    "EPUB-A11Y-008",
                    "element has a positive tabindex, overriding natural reading order",
                    Severity::Warning,
                )
                .with_location(ErrorLocation::from_path(path)),
            );
        }
    }

    if score < 0.0 {
        log::warn!("accessibility stage ({path}): reading-order score floor hit, raw score was {score:.1}");
    }
    score.max(0.0)
}

fn score_table_headers(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    let table_selector = Selector::parse("table").expect("static selector");
    let th_selector = Selector::parse("th").expect("static selector");
    let scope_selector = Selector::parse("[scope]").expect("static selector");

    let tables: Vec<_> = document.select(&table_selector).collect();
    if tables.is_empty() {
        return 5.0;
    }

    let mut with_headers = 0usize;
    for (index, table) in tables.iter().enumerate() {
        let has_header = table.select(&th_selector).next().is_some() || table.select(&scope_selector).next().is_some();
        if has_header {
            with_headers += 1;
        } else {
            errors.push(
                ValidationError::new("EPUB-A11Y-005", "table has no header cells", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("table_index", index as i64),
            );
        }
    }

    (with_headers as f64 / tables.len() as f64) * 5.0
}

fn score_form_labels(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    let control_selector = Selector::parse("input, select, textarea").expect("static selector");
    let label_selector = Selector::parse("label[for]").expect("static selector");

    let labelled_ids: std::collections::HashSet<&str> =
        document.select(&label_selector).filter_map(|label| label.value().attr("for")).collect();

    let controls: Vec<_> = document
        .select(&control_selector)
        .filter(|el| !matches!(el.value().attr("type"), Some("hidden" | "submit" | "button" | "image")))
        .collect();

    if controls.is_empty() {
        return 5.0;
    }

    let mut labelled = 0usize;
    for control in &controls {
        let has_label = control.value().attr("id").is_some_and(|id| labelled_ids.contains(id))
            || control.value().attr("aria-label").is_some()
            || control.value().attr("aria-labelledby").is_some();
        if has_label {
            labelled += 1;
        } else {
            errors.push(
                ValidationError::new("EPUB-A11Y-009", "form control has no associated label", Severity::Warning)
                    .with_location(ErrorLocation::from_path(path))
                    .with_detail("tag", control.value().name().to_owned()),
            );
        }
    }

    (labelled as f64 / controls.len() as f64) * 5.0
}

fn score_landmarks(path: &str, document: &Html, errors: &mut Vec<ValidationError>) -> f64 {
    const LANDMARKS: &[(&str, &str)] = &[("main", "main"), ("nav", "navigation"), ("header", "banner"), ("footer", "contentinfo")];

    let mut present = 0usize;
    for (tag, role) in LANDMARKS {
        let tag_selector = Selector::parse(tag).expect("static selector");
        let role_selector = Selector::parse(&format!("[role='{role}']")).expect("static selector");
        if document.select(&tag_selector).next().is_some() || document.select(&role_selector).next().is_some() {
            present += 1;
        }
    }

    if present == 0 {
        errors.push(
            ValidationError::new("EPUB-A11Y-010", "document has no ARIA landmark regions", Severity::Warning)
                .with_location(ErrorLocation::from_path(path)),
        );
    }

    (present as f64 / LANDMARKS.len() as f64) * 10.0
}

/// Summarizes observed accessibility structure for [`super::orchestrator`]
/// to merge into [`crate::report::ValidationReport::metadata`].
pub(crate) fn summarize(document_bytes: &[u8]) -> Details {
    let text = String::from_utf8_lossy(document_bytes);
    let document = Html::parse_document(&text);

    let has_images = Selector::parse("img").ok().is_some_and(|s| document.select(&s).next().is_some());
    let has_audio = Selector::parse("audio").ok().is_some_and(|s| document.select(&s).next().is_some());
    let has_video = Selector::parse("video").ok().is_some_and(|s| document.select(&s).next().is_some());

    let mut access_modes = vec!["textual"];
    if has_images {
        access_modes.push("visual");
    }
    if has_audio || has_video {
        access_modes.push("auditory");
    }

    Details::new()
        .with("access_modes", access_modes)
        .with("has_images", has_images)
        .with("has_audio_or_video", has_audio || has_video)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_accessible_document_scores_high() {
        let html = r#"<html lang="en"><body>
            <header>H</header>
            <nav>N</nav>
            <main><h1>Title</h1><img src="a.png" alt="a"/></main>
            <footer>F</footer>
        </body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.score > 80.0, "score was {}", outcome.score);
    }

    #[test]
    fn test_missing_alt_text_reported() {
        let html = r#"<html lang="en"><body><img src="a.png"/></body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-A11Y-004"));
    }

    #[test]
    fn test_missing_lang_reported() {
        let html = r#"<html><body><p>Hi</p></body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-A11Y-001"));
    }

    #[test]
    fn test_table_without_headers_reported() {
        let html = r#"<html lang="en"><body><table><tr><td>1</td></tr></table></body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-A11Y-005"));
    }

    #[test]
    fn test_unlabeled_form_control_reported() {
        let html = r#"<html lang="en"><body><input type="text" id="name"/></body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-A11Y-009"));
    }

    #[test]
    fn test_missing_landmarks_reported() {
        let html = r#"<html lang="en"><body><p>Hi</p></body></html>"#;
        let outcome = validate("OEBPS/chapter1.xhtml", html.as_bytes());
        assert!(outcome.errors.iter().any(|e| e.code() == "EPUB-A11Y-010"));
    }
}
