use serde::Serialize;
use std::path::{Path, PathBuf};

/// One finding: a violation during validation, or an applied change during
/// a repair run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub message: String,
}

/// Ordered findings for a whole run. Per-file problems are collected here
/// instead of aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.entries.push(ReportEntry {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: Report) {
        self.entries.extend(other.entries);
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter()
    }

    pub fn for_path<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a ReportEntry> {
        self.entries.iter().filter(move |e| e.path == path)
    }

    /// Number of distinct files with at least one entry.
    pub fn file_count(&self) -> usize {
        let mut paths: Vec<&Path> = self.entries.iter().map(|e| e.path.as_path()).collect();
        paths.sort();
        paths.dedup();
        paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_entries_in_order() {
        let mut report = Report::new();
        assert!(!report.has_errors());
        report.push("a.md", "first");
        report.push("b.md", "second");
        report.push("a.md", "third");
        assert!(report.has_errors());
        assert_eq!(report.len(), 3);
        assert_eq!(report.file_count(), 2);
        let for_a: Vec<&str> = report
            .for_path(Path::new("a.md"))
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(for_a, vec!["first", "third"]);

        let mut later = Report::new();
        later.push("c.md", "fourth");
        report.extend(later);
        assert_eq!(report.entries.last().map(|e| e.message.as_str()), Some("fourth"));
    }

    #[test]
    fn serializes_as_entries() {
        let mut report = Report::new();
        report.push("todo/001.md", "missing required field 'title'");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["path"], "todo/001.md");
        assert_eq!(json["entries"][0]["message"], "missing required field 'title'");
    }
}
