//! `tasker-ctl schema-diff` — breaking-change analysis for a proposed
//! `Schema.definition` update (§4.7).

use std::path::Path;

use anyhow::{Context, Result};
use tasker_sdk::{diff_schema, Compatibility};

use crate::output;

/// Returns `true` when the diff is breaking, so the caller can set the
/// process exit code accordingly.
pub(crate) fn handle_schema_diff(before: &Path, after: &Path, json: bool) -> Result<bool> {
    let before_doc = read_schema(before)?;
    let after_doc = read_schema(after)?;
    let report = diff_schema(&before_doc, &after_doc);

    if json {
        output::plain(serde_json::to_string_pretty(&report)?);
        return Ok(report.is_breaking());
    }

    match report.compatibility {
        Compatibility::Compatible => output::success("compatible: no findings"),
        Compatibility::CompatibleWithWarnings => {
            output::warning("compatible with warnings:");
            for finding in &report.findings {
                output::dim(format!("  [{}] {}", finding.code, finding.message));
            }
        }
        Compatibility::Incompatible => {
            output::error("breaking change detected:");
            for finding in report.findings.iter().filter(|f| f.breaking) {
                output::plain(format!("  [{}] {}", finding.code, finding.message));
            }
        }
    }

    Ok(report.is_breaking())
}

fn read_schema(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing schema file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_schema(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn compatible_update_exits_non_breaking() {
        let dir = tempfile::tempdir().unwrap();
        let before = write_schema(
            &dir,
            "before.json",
            r#"{"type":"object","properties":{"id":{"type":"string"}}}"#,
        );
        let after = write_schema(
            &dir,
            "after.json",
            r#"{"type":"object","properties":{"id":{"type":"string"},"name":{"type":"string"}}}"#,
        );
        let breaking = handle_schema_diff(&before, &after, true).unwrap();
        assert!(!breaking);
    }

    #[test]
    fn removing_a_required_field_exits_breaking() {
        let dir = tempfile::tempdir().unwrap();
        let before = write_schema(
            &dir,
            "before.json",
            r#"{"type":"object","required":["id"],"properties":{"id":{"type":"string"}}}"#,
        );
        let after = write_schema(&dir, "after.json", r#"{"type":"object","properties":{}}"#);
        let breaking = handle_schema_diff(&before, &after, true).unwrap();
        assert!(breaking);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let before = dir.path().join("missing.json");
        let after = write_schema(&dir, "after.json", r#"{"type":"object"}"#);
        assert!(handle_schema_diff(&before, &after, true).is_err());
    }
}
