//! Run summary assembled by the orchestrator.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::HarvestError;

use super::state::PipelineState;

/// Outcome of one harvest run: counts, timings and every recorded failure.
///
/// Failures are kept in the order they occurred; the first one is the error
/// the process reports, but none of them is dropped.
#[derive(Debug)]
pub struct HarvestReport {
    pub state: PipelineState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub repositories_found: usize,
    pub repositories_collected: usize,
    pub project_rows: u64,
    pub contributor_rows: u64,
    pub failures: Vec<HarvestError>,
}

impl HarvestReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The first failure of the run, which becomes the process's reported
    /// error.
    pub fn first_failure(&self) -> Option<&HarvestError> {
        self.failures.first()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} repositories found, {} collected, {} project rows and {} contributor rows loaded, {} failures in {}ms",
            self.state,
            self.repositories_found,
            self.repositories_collected,
            self.project_rows,
            self.contributor_rows,
            self.failures.len(),
            self.duration_ms()
        )
    }
}
