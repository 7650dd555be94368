pub mod types;

pub use types::{Report, Status};

use crate::diff::DiffDocument;
use crate::review::ValidationOutcome;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report from the validation outcome and the parsed diff.
pub fn build(outcome: ValidationOutcome, document: &DiffDocument) -> Report {
    let status = match (outcome.accepted.is_empty(), outcome.rejected.is_empty()) {
        (true, _) => Status::Empty,
        (false, true) => Status::Clean,
        (false, false) => Status::Partial,
    };

    Report {
        files: document.files().len(),
        hunks: document.hunk_count(),
        parse_errors: document.parse_errors().to_vec(),
        accepted: outcome.accepted,
        rejected: outcome.rejected,
        status,
    }
}

/// Output the report to the terminal (default) or to a markdown file.
///
/// Terminal output goes to stderr so stdout stays free for the payload.
#[instrument(skip(report), fields(status = %report.status))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn print_terminal_report(report: &Report) {
    eprintln!();
    eprintln!(
        "Diff: {} files | {} hunks | {} accepted | {} rejected",
        report.files,
        report.hunks,
        report.accepted.len(),
        report.rejected.len()
    );
    eprintln!();

    if !report.parse_errors.is_empty() {
        eprintln!("═══ Skipped hunk headers ═══");
        for error in &report.parse_errors {
            eprintln!("  • line {}: {} ({})", error.line_no, error.reason, error.header);
        }
        eprintln!();
    }

    eprintln!("═══ Accepted ═══");
    if report.accepted.is_empty() {
        eprintln!("  No comments.");
    }
    for comment in &report.accepted {
        eprintln!(
            "  {} {}",
            "✓".green().bold(),
            location(&comment.path, comment.start_line, comment.end_line)
        );
    }
    eprintln!();

    eprintln!("═══ Rejected ═══");
    if report.rejected.is_empty() {
        eprintln!("  No rejections.");
    }
    for rejection in &report.rejected {
        let a = &rejection.annotation;
        eprintln!(
            "  {} {} [{}] {}",
            "✗".red().bold(),
            location(&a.path, a.start_line, a.end_line),
            rejection.reason.code().yellow(),
            rejection.reason
        );
    }
    eprintln!();

    eprintln!("═══ Status: {} ═══", colorize_status(report.status));
    eprintln!();
}

/// Write the report as a markdown file.
fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str("# Review comment validation\n\n");
    md.push_str(&format!(
        "**Files:** {} | **Hunks:** {} | **Accepted:** {} | **Rejected:** {}\n\n",
        report.files,
        report.hunks,
        report.accepted.len(),
        report.rejected.len()
    ));

    if !report.parse_errors.is_empty() {
        md.push_str("## Skipped hunk headers\n\n");
        for error in &report.parse_errors {
            md.push_str(&format!(
                "- line {}: {} (`{}`)\n",
                error.line_no, error.reason, error.header
            ));
        }
        md.push('\n');
    }

    md.push_str("## Accepted\n\n");
    if report.accepted.is_empty() {
        md.push_str("No comments.\n\n");
    } else {
        for comment in &report.accepted {
            md.push_str(&format!(
                "- `{}`\n",
                location(&comment.path, comment.start_line, comment.end_line)
            ));
        }
        md.push('\n');
    }

    md.push_str("## Rejected\n\n");
    if report.rejected.is_empty() {
        md.push_str("No rejections.\n\n");
    } else {
        for rejection in &report.rejected {
            let a = &rejection.annotation;
            md.push_str(&format!(
                "- **[{}]** `{}`: {}\n",
                rejection.reason.code(),
                location(&a.path, a.start_line, a.end_line),
                rejection.reason
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!("## Status: {}\n", report.status));

    std::fs::write(path, md)?;
    Ok(())
}

fn location<T: PartialEq + std::fmt::Display>(path: &str, start: T, end: T) -> String {
    if start == end {
        format!("{}:{}", path, start)
    } else {
        format!("{}:{}-{}", path, start, end)
    }
}

fn colorize_status(status: Status) -> colored::ColoredString {
    match status {
        Status::Clean => "CLEAN".green().bold(),
        Status::Partial => "PARTIAL".yellow().bold(),
        Status::Empty => "EMPTY".red().bold(),
    }
}
