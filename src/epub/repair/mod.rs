//! Repair pipeline (component C8): preview-then-apply over a diagnosed
//! [`ValidationReport`].
//!
//! Grounded on the teacher's "parse, then optionally rewrite" split between
//! `ebook/epub.rs` and `ebook/epub/write/writer.rs`: [`preview`] only
//! consults [`actions::plan_for`] (no I/O), and [`apply`] is the only
//! function in this crate that writes to disk on the repair path.

mod actions;
mod apply;

use crate::epub::EpubRepairOptions;
use crate::error::OperationResult;
use crate::report::{RepairPreview, RepairResult, ValidationReport};
use std::path::Path;

/// Diagnoses `report` into a [`RepairPreview`], without touching any file.
///
/// Safe to call repeatedly; the plan is a pure function of the report's
/// error codes (see `actions::plan_for`).
pub fn preview(report: &ValidationReport) -> RepairPreview {
    log::debug!("repair preview: entry, {} error(s)", report.errors().len());
    let plan = actions::plan_for(report.errors());
    let warnings = plan
        .iter()
        .filter(|action| action.safety() == crate::report::SafetyClass::Medium)
        .map(|action| format!("{}: {}", action.target(), action.description()))
        .collect();

    log::debug!("repair preview: exit, {} action(s) planned", plan.len());
    RepairPreview::new(plan, warnings)
}

/// Applies the repair plan diagnosed from `report` against `source`,
/// writing a new artifact. `source` itself is left untouched unless
/// [`EpubRepairOptions::replace_source`] was set.
pub fn apply(
    source: impl AsRef<Path>,
    report: &ValidationReport,
    options: &EpubRepairOptions,
) -> OperationResult<RepairResult> {
    log::debug!("repair apply: entry ({})", source.as_ref().display());
    let result = apply::apply(
        source.as_ref(),
        report,
        options.output_path.as_deref(),
        options.replace_source,
        options.cancellation.as_ref(),
    );
    log::debug!("repair apply: exit ({})", source.as_ref().display());
    result
}
