//! Report output — Markdown passthrough or the full run record as JSON.

use std::path::Path;

use mlc_protocol::{ReportFormat, RunOutcome};

/// Render the run outcome in the requested format.
///
/// Markdown emits the agent's report verbatim, with degraded-result
/// notes appended so partial data is never presented silently as
/// complete. JSON serializes the whole run record.
pub fn render(outcome: &RunOutcome, format: ReportFormat) -> String {
    match format {
        ReportFormat::Markdown => {
            let mut out = outcome.report.clone();
            if !outcome.degraded_notes.is_empty() {
                out.push_str("\n\n---\n\n## Degraded Results\n\n");
                for note in &outcome.degraded_notes {
                    out.push_str(&format!("- {note}\n"));
                }
            }
            out
        }
        ReportFormat::Json => {
            serde_json::to_string_pretty(outcome).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
        }
    }
}

/// Write the rendered report to a file, or stdout when no path is given.
pub fn emit(rendered: &str, output_file: Option<&Path>) -> std::io::Result<()> {
    match output_file {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "report saved");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome(notes: Vec<String>) -> RunOutcome {
        RunOutcome {
            run_id: Uuid::now_v7(),
            query: "analyze".into(),
            provider: "bedrock".into(),
            model_id: "us.amazon.nova-pro-v1:0".into(),
            report: "# Executive Summary\nSpend is under control.".into(),
            degraded_notes: notes,
            turns: 3,
            tool_calls: 5,
            started_at: Utc::now(),
            duration_secs: 42.0,
        }
    }

    #[test]
    fn markdown_is_verbatim_when_clean() {
        let rendered = render(&outcome(Vec::new()), ReportFormat::Markdown);
        assert_eq!(rendered, "# Executive Summary\nSpend is under control.");
    }

    #[test]
    fn markdown_appends_degraded_notes() {
        let rendered = render(
            &outcome(vec!["list_dashboards: degraded result".into()]),
            ReportFormat::Markdown,
        );
        assert!(rendered.contains("## Degraded Results"));
        assert!(rendered.contains("- list_dashboards"));
    }

    #[test]
    fn json_includes_run_stats() {
        let rendered = render(&outcome(Vec::new()), ReportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["tool_calls"], 5);
        assert_eq!(parsed["provider"], "bedrock");
        assert!(parsed["report"].as_str().unwrap().contains("Executive"));
    }

    #[test]
    fn emit_writes_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        emit("# Report", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report");
    }
}
