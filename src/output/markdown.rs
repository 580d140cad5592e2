//! Markdown report generation
//!
//! This module writes a human-readable markdown version of a mirror report,
//! including counts, failure reasons, and skipped resources.

use crate::output::report::MirrorReport;
use crate::robots::RobotsAdvice;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `report` as markdown to `output_path`
///
/// # Arguments
///
/// * `report` - The mirror report
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_report(report: &MirrorReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a mirror report as markdown
pub fn format_markdown_report(report: &MirrorReport) -> String {
    let mut md = String::new();

    md.push_str("# Site Mirror Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Output**: {}\n", report.output_dir.display()));
    if let Some(started) = report.started_at {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", report.status));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if let Some(robots) = &report.robots {
        md.push_str(&format!("- **robots.txt**: {}\n", describe_robots(robots)));
    }
    md.push('\n');

    md.push_str("## Totals\n\n");
    md.push_str("| | Count |\n");
    md.push_str("|---|---|\n");
    md.push_str(&format!("| Pages visited | {} |\n", report.pages_visited));
    md.push_str(&format!("| Pages failed | {} |\n", report.pages_failed()));
    md.push_str(&format!("| Resources downloaded | {} |\n", report.downloaded));
    md.push_str(&format!(
        "| Resources skipped | {} |\n",
        report.skipped_count()
    ));
    md.push_str(&format!(
        "| Resources failed | {} |\n\n",
        report.failed_count()
    ));

    push_table(&mut md, "Failed Pages", &report.page_failures);
    push_table(&mut md, "Failed Resources", &report.failed);
    push_table(&mut md, "Skipped Resources", &report.skipped);

    md
}

fn push_table(md: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", title));
    md.push_str("| URL | Reason |\n");
    md.push_str("|-----|--------|\n");
    for (url, reason) in rows {
        md.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(url),
            escape_cell(reason)
        ));
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn describe_robots(advice: &RobotsAdvice) -> String {
    match advice {
        RobotsAdvice::Missing => "not present".to_string(),
        RobotsAdvice::NoRestrictions => "no Disallow rules".to_string(),
        RobotsAdvice::Restricted {
            rules,
            seed_allowed,
        } => format!(
            "{} Disallow rule(s), seed {}",
            rules,
            if *seed_allowed { "allowed" } else { "disallowed" }
        ),
    }
}
