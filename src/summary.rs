//! Created/updated bookkeeping for a generation run.

use std::fmt;
use std::path::{Path, PathBuf};

/// Formats the one-line description of a finished run.
pub trait SummaryReporter {
    fn format_detail(&self, created: usize, updated: usize, root: &Path) -> String;
}

/// Reporter used by the command line driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectSummaryReporter;

impl SummaryReporter for ProjectSummaryReporter {
    fn format_detail(&self, created: usize, updated: usize, root: &Path) -> String {
        format!(
            "Wrote {} projects to {}; {} created; {} updated.",
            created + updated,
            root.display(),
            created,
            updated
        )
    }
}

/// Counters accumulated over one driver invocation.
///
/// Counts only ever increase; a new run starts from a new value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    created: usize,
    updated: usize,
    root: PathBuf,
}

impl GenerationSummary {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { created: 0, updated: 0, root: root.into() }
    }

    pub fn record_created(&mut self) {
        self.created += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    pub fn total(&self) -> usize {
        self.created + self.updated
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn detail(&self, reporter: &dyn SummaryReporter) -> String {
        reporter.format_detail(self.created, self.updated, &self.root)
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail(&ProjectSummaryReporter))
    }
}
