//! Persists finished reports as Markdown files.

use crate::types::Result;
use std::path::{Path, PathBuf};

/// Longest file stem produced from a topic, in characters.
pub const MAX_FILENAME_CHARS: usize = 100;

const FORBIDDEN: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|', '\n', '\r'];

#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the report for `topic` would be written to.
    pub fn path_for(&self, topic: &str) -> PathBuf {
        self.output_dir.join(format!("{}.md", sanitize_filename(topic)))
    }

    /// Write `content` as UTF-8, creating the output directory if needed.
    pub fn write(&self, topic: &str, content: &str) -> Result<PathBuf> {
        self.write_to(self.path_for(topic), content)
    }

    /// Write `content` under a fixed file name, e.g. `use_case_diagram.puml`.
    pub fn write_file(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        self.write_to(self.output_dir.join(file_name), content)
    }

    fn write_to(&self, path: PathBuf, content: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::write(&path, content)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "Report written");
        Ok(path)
    }
}

/// Replace each run of forbidden characters with `_` and cap the length.
pub fn sanitize_filename(topic: &str) -> String {
    let mut name = String::with_capacity(topic.len());
    let mut in_run = false;
    for c in topic.trim().chars() {
        if FORBIDDEN.contains(&c) {
            if !in_run {
                name.push('_');
            }
            in_run = true;
        } else {
            name.push(c);
            in_run = false;
        }
    }

    let name: String = name.chars().take(MAX_FILENAME_CHARS).collect();
    if name.trim().is_empty() {
        "research".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("Battery recycling", "Battery recycling")]
    #[case("EV vs. ICE: costs/benefits?", "EV vs. ICE_ costs_benefits_")]
    #[case("a\\/:b", "a_b")]
    #[case("line one\nline two", "line one_line two")]
    #[case("   ", "research")]
    fn test_sanitize_filename(#[case] topic: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(topic), expected);
    }

    #[test]
    fn test_sanitize_caps_length_on_char_boundary() {
        let topic = "电".repeat(150);
        let name = sanitize_filename(&topic);
        assert_eq!(name.chars().count(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports/nested"));

        let path = writer.write("Battery recycling", "# Battery recycling\n").unwrap();

        assert_eq!(path, dir.path().join("reports/nested/Battery recycling.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Battery recycling\n");
    }

    #[test]
    fn test_write_file_keeps_the_given_name() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("docs"));

        let path = writer.write_file("use_case_diagram.puml", "@startuml\n@enduml").unwrap();

        assert_eq!(path, dir.path().join("docs/use_case_diagram.puml"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "@startuml\n@enduml");
    }
}
