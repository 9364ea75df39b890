//! Turn output for the terminal and for `--json`.

use quill::TurnReport;
use serde_json::{json, Value};

/// Assistant replies separated by blank lines. With `verbose`, a trailer lists
/// the nodes run and any recovered failures.
pub fn render_report(report: &TurnReport, verbose: bool) -> String {
    let mut out = report.replies().collect::<Vec<_>>().join("\n\n");
    if verbose {
        let path: Vec<&str> = report.visited.iter().map(|n| n.as_str()).collect();
        out.push_str(&format!("\n\n[nodes: {}]", path.join(" -> ")));
        for failure in &report.failures {
            out.push_str(&format!("\n[recovered in {}: {}]", failure.node, failure.reason));
        }
        if let Some(id) = &report.checkpoint_id {
            out.push_str(&format!("\n[checkpoint: {}]", id));
        }
    }
    out
}

/// `--json` shape: replies, visited nodes, failures, the artifact and checkpoint id.
pub fn report_json(report: &TurnReport) -> Value {
    json!({
        "replies": report.replies().collect::<Vec<_>>(),
        "visited": report.visited,
        "failures": report.failures,
        "artifact": report.artifact,
        "checkpoint_id": report.checkpoint_id,
        "progress": report.state.expert.as_ref().map(|e| e.progress()),
    })
}
