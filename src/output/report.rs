//! End-of-run report
//!
//! Tallies the outcomes of a run into the counts an operator looks at first
//! (downloaded / skipped / failed), plus the details behind them.

use crate::crawler::OutcomeLog;
use crate::robots::RobotsAdvice;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// How the run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every reachable page was processed
    Completed,
    /// Stopped by the operator (Ctrl-C)
    Interrupted,
    /// A run-level failure stopped the crawl
    Aborted(String),
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Interrupted => f.write_str("interrupted"),
            Self::Aborted(reason) => write!(f, "aborted ({})", reason),
        }
    }
}

/// Summary of one mirror run
#[derive(Debug, Clone)]
pub struct MirrorReport {
    /// Seed URL of the run
    pub seed: String,

    /// `outputRoot/<host>`
    pub output_dir: PathBuf,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages rendered, rewritten, and written
    pub pages_visited: usize,

    /// (url, reason) of pages that failed on every attempt
    pub page_failures: Vec<(String, String)>,

    /// Resources written to disk
    pub downloaded: usize,

    /// (url, reason)
    pub skipped: Vec<(String, String)>,

    /// (url, reason)
    pub failed: Vec<(String, String)>,

    /// robots.txt advice, if it was checked
    pub robots: Option<RobotsAdvice>,

    /// SHA-256 of the tuning file, if one was used
    pub config_hash: Option<String>,

    pub status: RunStatus,
}

impl MirrorReport {
    /// Tallies resource outcomes into a report
    ///
    /// Only the counts are filled in; run metadata (seed, timestamps, pages)
    /// is left empty for the caller to set.
    pub fn summarize(outcomes: &OutcomeLog) -> Self {
        Self {
            seed: String::new(),
            output_dir: PathBuf::new(),
            started_at: None,
            finished_at: None,
            pages_visited: 0,
            page_failures: Vec::new(),
            downloaded: outcomes.downloaded.len(),
            skipped: outcomes.skipped.clone(),
            failed: outcomes.failed.clone(),
            robots: None,
            config_hash: None,
            status: RunStatus::Completed,
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn pages_failed(&self) -> usize {
        self.page_failures.len()
    }

    /// Wall-clock duration of the run, if both timestamps are known
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_seconds()),
            _ => None,
        }
    }
}

impl fmt::Display for MirrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Mirror Report ===")?;
        writeln!(f)?;
        if !self.seed.is_empty() {
            writeln!(f, "Seed:       {}", self.seed)?;
        }
        if !self.output_dir.as_os_str().is_empty() {
            writeln!(f, "Output:     {}", self.output_dir.display())?;
        }
        writeln!(f, "Status:     {}", self.status)?;
        if let Some(seconds) = self.duration_seconds() {
            writeln!(f, "Duration:   {}s", seconds)?;
        }
        writeln!(f)?;

        writeln!(f, "Pages:")?;
        writeln!(f, "  Visited:    {}", self.pages_visited)?;
        writeln!(f, "  Failed:     {}", self.pages_failed())?;
        writeln!(f)?;

        writeln!(f, "Resources:")?;
        writeln!(f, "  Downloaded: {}", self.downloaded)?;
        writeln!(f, "  Skipped:    {}", self.skipped_count())?;
        write!(f, "  Failed:     {}", self.failed_count())?;

        if !self.failed.is_empty() || !self.page_failures.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Failures:")?;
            for (url, reason) in self.page_failures.iter().chain(self.failed.iter()) {
                write!(f, "\n  - {}: {}", url, reason)?;
            }
        }

        Ok(())
    }
}
