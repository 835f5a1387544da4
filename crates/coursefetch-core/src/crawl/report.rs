//! Human-readable crawl report, appended as the crawl progresses.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Incremental writer for the crawl report. Each section is flushed as soon
/// as it is written, so an aborted crawl still leaves a readable partial
/// report behind.
pub struct ReportWriter {
    file: File,
}

impl ReportWriter {
    /// Create (truncating) the report and write its header.
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        writeln!(file, "Course Content Extraction Report")?;
        writeln!(file, "================================")?;
        writeln!(file)?;
        Ok(Self { file })
    }

    pub fn start_course(&mut self, title: &str) -> Result<()> {
        let banner = "=".repeat(50);
        writeln!(self.file)?;
        writeln!(self.file, "{banner}")?;
        writeln!(self.file, "COURSE: {title}")?;
        writeln!(self.file, "{banner}")?;
        self.file.flush()?;
        Ok(())
    }

    pub fn start_module(&mut self, module_path: &str) -> Result<()> {
        writeln!(self.file)?;
        writeln!(self.file, "  MODULE: {module_path}")?;
        writeln!(self.file, "  {}", "-".repeat(module_path.len()))?;
        self.file.flush()?;
        Ok(())
    }

    pub fn item(&mut self, tag: &str, title: &str) -> Result<()> {
        writeln!(self.file, "    - {tag} {title}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn report_sections_nest_by_indentation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.txt");
        {
            let mut report = ReportWriter::create(&path).unwrap();
            report.start_course("CS 180 - Problem Solving").unwrap();
            report.start_module("Module 1/Topic 1.1_ Intro").unwrap();
            report.item("[VIDEO]", "Lecture 1 (32:10)").unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Course Content Extraction Report\n"));
        assert!(text.contains("COURSE: CS 180 - Problem Solving\n"));
        assert!(text.contains("  MODULE: Module 1/Topic 1.1_ Intro\n"));
        assert!(text.contains("    - [VIDEO] Lecture 1 (32:10)\n"));
    }

    #[test]
    fn module_underline_matches_path_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.txt");
        {
            let mut report = ReportWriter::create(&path).unwrap();
            report.start_module("Module 2").unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("  MODULE: Module 2\n  --------\n"));
    }
}
