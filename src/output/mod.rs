//! Output module for end-of-run reporting
//!
//! This module handles:
//! - Tallying resource outcomes into a `MirrorReport`
//! - Printing the report to the terminal
//! - Exporting the report as markdown

mod markdown;
mod report;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{MirrorReport, RunStatus};
