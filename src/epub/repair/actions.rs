//! Diagnose → plan: maps each [`ValidationError`] code to zero or more
//! [`RepairAction`]s.
//!
//! This is the single source of truth for repairability (see DESIGN.md's
//! resolution of the spec's open questions (a)/(b): the teacher's OPF
//! repair and its separate `CanRepair` table disagreed on which codes were
//! repairable — here there is only this one mapping, consulted by both
//! [`super::preview`] and [`super::apply`]).

use crate::epub::consts;
use crate::report::{Details, RepairAction, SafetyClass, ValidationError};

/// Builds the full repair plan for `errors`, in order. Unknown codes still
/// produce a `manual_review` action so the plan is exhaustive over the
/// report (§4.7).
pub(crate) fn plan_for(errors: &[ValidationError]) -> Vec<RepairAction> {
    errors.iter().map(action_for).collect()
}

fn action_for(error: &ValidationError) -> RepairAction {
    let target = error
        .location()
        .map(|loc| loc.path().to_owned())
        .unwrap_or_default();

    match error.code() {
        "EPUB-CONTAINER-002" => RepairAction::new(
            "fix_mimetype_content",
            "rewrite the mimetype entry as STORE with exact contents `application/epub+zip`",
            consts::MIMETYPE_PATH,
            SafetyClass::High,
            true,
        ),
        "EPUB-CONTAINER-003" => RepairAction::new(
            "fix_mimetype_order",
            "rebuild the archive with mimetype as the first entry",
            consts::MIMETYPE_PATH,
            SafetyClass::High,
            true,
        ),
        "EPUB-CONTAINER-004" => RepairAction::new(
            "create_container_xml",
            "write a minimal META-INF/container.xml pointing at the package document",
            consts::CONTAINER_PATH,
            SafetyClass::High,
            true,
        ),
        "EPUB-CONTENT-002" => RepairAction::new(
            "add_doctype",
            "prepend a `<!DOCTYPE html>` declaration",
            target,
            SafetyClass::VeryHigh,
            true,
        ),
        "EPUB-OPF-002" => metadata_action("add_metadata_title", "synthesize a placeholder dc:title", target),
        "EPUB-OPF-003" => metadata_action("add_metadata_identifier", "synthesize a placeholder dc:identifier", target),
        "EPUB-OPF-004" => metadata_action("add_metadata_language", "synthesize a placeholder dc:language", target),
        "EPUB-OPF-005" => metadata_action("add_metadata_modified", "synthesize a meta[property=dcterms:modified]", target),
        "EPUB-OPF-009" => RepairAction::new(
            "manual_review",
            "synthesizing a nav document is a content decision, not a mechanical fix",
            target,
            SafetyClass::Medium,
            false,
        ),
        other => RepairAction::new(
            "manual_review",
            format!("no automated repair is defined for {other}"),
            target,
            SafetyClass::Low,
            false,
        )
        .with_details(Details::new().with("code", other)),
    }
}

fn metadata_action(kind: &'static str, description: &'static str, target: String) -> RepairAction {
    RepairAction::new(kind, description, target, SafetyClass::Medium, true)
}
