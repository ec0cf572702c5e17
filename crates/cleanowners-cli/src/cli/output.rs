//! Output formatting for the CLI.
//!
//! This module provides the console summary, the JSON summary and the
//! Markdown report written at the end of a run.

use cleanowners_core::stats::RunStatistics;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Writes the end-of-run summary sentences.
    pub fn write_summary(&mut self, stats: &RunStatistics) -> std::io::Result<()> {
        for line in stats.summary_lines() {
            writeln!(self.writer, "{}", line)?;
        }

        for pull in &stats.pull_requests {
            if self.use_colors {
                writeln!(self.writer, "  {} {}", pull.repository.cyan(), pull.html_url)?;
            } else {
                writeln!(self.writer, "  {} {}", pull.repository, pull.html_url)?;
            }
        }

        Ok(())
    }

    /// Writes an error message.
    pub fn write_error(&mut self, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)?;
        } else {
            writeln!(self.writer, "Error: {}", message)?;
        }
        Ok(())
    }
}

/// Writes the statistics as pretty-printed JSON.
pub fn write_json<W: Write>(writer: &mut W, stats: &RunStatistics) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

/// Renders the Markdown report.
pub fn write_markdown_report<W: Write>(writer: &mut W, stats: &RunStatistics) -> std::io::Result<()> {
    write!(
        writer,
        "# Cleanowners Report\n\n\
         ## Overall Stats\n\
         {} Users to Remove\n\
         {} Pull Requests created\n\
         {} Repositories missing or empty CODEOWNERS files\n\
         {} Repositories with CODEOWNERS file\n",
        stats.users_to_remove,
        stats.pull_requests_created,
        stats.repos_without_codeowners,
        stats.repos_with_codeowners,
    )?;

    if !stats.users_by_repo.is_empty() {
        writeln!(writer, "## Repositories and Users to Remove")?;
        for entry in &stats.users_by_repo {
            writeln!(writer, "{}", entry.repository)?;
            for user in &entry.users {
                writeln!(writer, "- {}", user)?;
            }
            writeln!(writer)?;
        }
    }

    if !stats.repos_missing_codeowners.is_empty() {
        writeln!(writer, "## Repositories Missing or Empty CODEOWNERS")?;
        for repo in &stats.repos_missing_codeowners {
            writeln!(writer, "- {}", repo)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Writes the Markdown report to `path`, replacing any existing file.
pub fn write_report_file(path: &Path, stats: &RunStatistics) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_markdown_report(&mut writer, stats)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> RunStatistics {
        let mut stats = RunStatistics::new();
        stats.users_to_remove = 3;
        stats.eligible_for_pull_request = 2;
        stats.repos_with_codeowners = 2;
        stats.record_stale("org/api", vec!["alice".to_string(), "bob".to_string()]);
        stats.record_stale("org/web", vec!["carol".to_string()]);
        stats.record_missing("org/docs");
        stats.record_pull_request("org/api", "https://github.com/org/api/pull/7");
        stats
    }

    fn render(stats: &RunStatistics) -> String {
        let mut buffer = Vec::new();
        write_markdown_report(&mut buffer, stats).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn report_with_all_sections() {
        let expected = "# Cleanowners Report\n\n\
            ## Overall Stats\n\
            3 Users to Remove\n\
            1 Pull Requests created\n\
            1 Repositories missing or empty CODEOWNERS files\n\
            2 Repositories with CODEOWNERS file\n\
            ## Repositories and Users to Remove\n\
            org/api\n\
            - alice\n\
            - bob\n\
            \n\
            org/web\n\
            - carol\n\
            \n\
            ## Repositories Missing or Empty CODEOWNERS\n\
            - org/docs\n\
            \n";
        assert_eq!(render(&stats()), expected);
    }

    #[test]
    fn empty_report_has_only_stats() {
        let report = render(&RunStatistics::new());
        assert_eq!(
            report,
            "# Cleanowners Report\n\n## Overall Stats\n\
             0 Users to Remove\n0 Pull Requests created\n\
             0 Repositories missing or empty CODEOWNERS files\n\
             0 Repositories with CODEOWNERS file\n"
        );
    }

    #[test]
    fn report_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "stale content that is much longer than nothing").unwrap();

        write_report_file(&path, &RunStatistics::new()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Cleanowners Report\n"));
        assert!(!written.contains("stale content"));
    }

    #[test]
    fn human_summary_lists_sentences_and_pulls() {
        let mut buffer = Vec::new();
        HumanOutput::new(&mut buffer, false)
            .write_summary(&stats())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Found 3 users to remove\n"));
        assert!(text.contains("Created 1 pull requests successfully\n"));
        assert!(text.contains("50.0% of eligible repositories had pull requests created\n"));
        assert!(text.contains("  org/api https://github.com/org/api/pull/7\n"));
    }

    #[test]
    fn error_without_colors() {
        let mut buffer = Vec::new();
        HumanOutput::new(&mut buffer, false)
            .write_error("boom")
            .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "Error: boom\n");
    }

    #[test]
    fn json_summary_has_counts() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &stats()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["users_to_remove"], 3);
        assert_eq!(value["repos_missing_codeowners"][0], "org/docs");
    }
}
