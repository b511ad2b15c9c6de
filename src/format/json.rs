//! JSON rendering: a direct `serde_json` mirror of [`ValidationReport`]'s
//! own field names, since the report already derives `Serialize`.

use crate::report::ValidationReport;

/// Serializes `report` to a pretty-printed JSON object.
pub fn to_json(report: &ValidationReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
