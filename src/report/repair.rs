use super::{Details, ValidationReport};
use serde::{Deserialize, Serialize};

/// Self-assessed invasiveness of a [`RepairAction`] (see §4.7/§4.9).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyClass {
    /// Purely additive and idempotent (e.g. adding a DOCTYPE).
    VeryHigh,
    /// Structural correction with stable semantics (e.g. regenerating
    /// `mimetype`, rebuilding ZIP entry order).
    High,
    /// Heuristic (e.g. synthesizing a nav document from spine order).
    Medium,
    /// Potentially lossy; never [`RepairAction::automated`].
    Low,
}

/// A single proposed (or applied) repair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepairAction {
    kind: String,
    description: String,
    target: String,
    details: Details,
    safety: SafetyClass,
    automated: bool,
}

impl RepairAction {
    pub(crate) fn new(
        kind: impl Into<String>,
        description: impl Into<String>,
        target: impl Into<String>,
        safety: SafetyClass,
        automated: bool,
    ) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            target: target.into(),
            details: Details::new(),
            safety,
            automated,
        }
    }

    pub(crate) fn with_details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    /// The repair kind, e.g. `"add_doctype"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable explanation of what will be changed.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The in-container path (or PDF file) this action targets.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Structured evidence about this action.
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// This action's safety class.
    pub fn safety(&self) -> SafetyClass {
        self.safety
    }

    /// `true` if the repair engine will execute this action without human
    /// review.
    pub fn automated(&self) -> bool {
        self.automated
    }
}

/// A diagnosed, not-yet-applied repair plan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepairPreview {
    actions: Vec<RepairAction>,
    can_auto_repair: bool,
    estimated_time_ms: u64,
    backup_required: bool,
    warnings: Vec<String>,
}

impl RepairPreview {
    pub(crate) fn new(actions: Vec<RepairAction>, warnings: Vec<String>) -> Self {
        let can_auto_repair = actions.iter().all(RepairAction::automated);
        // Coarse per-action cost estimate; not a contractual quantity.
        let estimated_time_ms = (actions.len() as u64).max(1) * 15;

        Self {
            backup_required: !actions.is_empty(),
            can_auto_repair,
            estimated_time_ms,
            actions,
            warnings,
        }
    }

    /// The full diagnosed plan, one entry per [`super::ValidationError`]
    /// the engine recognized (unknown codes still produce a non-automated
    /// `manual_review` entry, so this list is exhaustive over the report).
    pub fn actions(&self) -> &[RepairAction] {
        &self.actions
    }

    /// `true` iff every action in [`Self::actions`] is
    /// [`RepairAction::automated`].
    pub fn can_auto_repair(&self) -> bool {
        self.can_auto_repair
    }

    /// A rough cost estimate for applying the plan.
    pub fn estimated_time_ms(&self) -> u64 {
        self.estimated_time_ms
    }

    /// `true` if applying this plan produces a new output file (it always
    /// does, when the plan is non-empty — the source is never mutated).
    pub fn backup_required(&self) -> bool {
        self.backup_required
    }

    /// Advisory messages about the plan (e.g. heuristic actions that may
    /// need a human follow-up even though they ran automatically).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// The outcome of applying a [`RepairPreview`].
#[derive(Debug)]
pub struct RepairResult {
    success: bool,
    actions_applied: Vec<RepairAction>,
    report: ValidationReport,
    backup_path: Option<std::path::PathBuf>,
    error: Option<String>,
}

impl RepairResult {
    pub(crate) fn success(
        actions_applied: Vec<RepairAction>,
        report: ValidationReport,
        backup_path: std::path::PathBuf,
    ) -> Self {
        Self {
            success: true,
            actions_applied,
            report,
            backup_path: Some(backup_path),
            error: None,
        }
    }

    pub(crate) fn failure(report: ValidationReport, error: impl Into<String>) -> Self {
        Self {
            success: false,
            actions_applied: Vec::new(),
            report,
            backup_path: None,
            error: Some(error.into()),
        }
    }

    /// `true` iff the rewrite completed and was promoted to
    /// [`Self::backup_path`].
    pub fn success(&self) -> bool {
        self.success
    }

    /// The actions actually applied (a prefix of the preview's actions on
    /// failure).
    pub fn actions_applied(&self) -> &[RepairAction] {
        &self.actions_applied
    }

    /// The source report this repair was diagnosed from.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// The repaired artifact's path. The original source is left untouched
    /// at its original location unless the caller opted into in-place
    /// replacement.
    pub fn backup_path(&self) -> Option<&std::path::Path> {
        self.backup_path.as_deref()
    }

    /// The failure reason, if [`Self::success`] is `false`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
