//! Save a summary as a plain-text file.
//!
//! The file holds the summary text, optionally preceded by a short header
//! naming the model, density, and generation time.

use anyhow::{Context, Result};
use std::path::Path;

use crate::summarize::SummaryReport;

/// File name used when none is given.
pub const DEFAULT_FILE_NAME: &str = "summary.txt";

/// Render the file contents for `report`.
pub fn render(report: &SummaryReport, with_header: bool) -> String {
    let mut out = String::new();
    if with_header {
        out.push_str(&format!(
            "# Summary ({}, max_length {} via {})\n# Generated {}\n# Input: {} words, {} characters\n\n",
            report.density,
            report.params.max_length,
            report.model,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.input.words,
            report.input.characters,
        ));
    }
    out.push_str(report.summary.trim_end());
    out.push('\n');
    out
}

/// Write the summary to `path`, creating parent directories as needed.
pub fn write_summary(path: &Path, report: &SummaryReport, with_header: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, render(report, with_header))
        .with_context(|| format!("Failed to write summary file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::tests::sample_report;

    #[test]
    fn plain_render_is_summary_with_newline() {
        let report = sample_report("The gist.\n\n");
        assert_eq!(render(&report, false), "The gist.\n");
    }

    #[test]
    fn header_names_density_and_model() {
        let report = sample_report("The gist.");
        let text = render(&report, true);
        assert!(text.starts_with("# Summary (balanced, max_length 150 via lead)"));
        assert!(text.ends_with("\n\nThe gist.\n"));
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_FILE_NAME);
        write_summary(&path, &sample_report("Saved."), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Saved.\n");
    }
}
