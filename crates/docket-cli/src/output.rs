use docket_core::paths::display_path;
use docket_core::report::Report;
use serde::Serialize;
use std::path::Path;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Report as JSON: root-relative paths plus `has_errors`.
pub fn report_json(root: &Path, report: &Report) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = report
        .iter()
        .map(|e| {
            serde_json::json!({
                "path": display_path(root, &e.path),
                "message": e.message,
            })
        })
        .collect();
    serde_json::json!({
        "entries": entries,
        "has_errors": report.has_errors(),
    })
}

/// One `path: message` line per entry.
pub fn print_report(root: &Path, report: &Report) {
    for entry in report.iter() {
        println!("{}: {}", display_path(root, &entry.path), entry.message);
    }
}
