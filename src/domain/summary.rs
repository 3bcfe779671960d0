//! Batch summary and progress types
//!
//! Tallies are accumulated one result at a time as lookups complete, so a
//! progress event always reflects exactly the results analyzed so far.

use serde::{Deserialize, Serialize};

use super::{PackageResult, Status};

/// Running count of results per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTallies {
    pub up_to_date: usize,
    pub outdated: usize,
    pub major_update: usize,
    pub failed: usize,
}

impl StatusTallies {
    /// Counts one more result with the given status
    pub fn record(&mut self, status: Status) {
        match status {
            Status::UpToDate => self.up_to_date += 1,
            Status::Outdated => self.outdated += 1,
            Status::MajorUpdate => self.major_update += 1,
            Status::Failed => self.failed += 1,
        }
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::UpToDate => self.up_to_date,
            Status::Outdated => self.outdated,
            Status::MajorUpdate => self.major_update,
            Status::Failed => self.failed,
        }
    }

    /// Number of results recorded so far
    pub fn analyzed(&self) -> usize {
        self.up_to_date + self.outdated + self.major_update + self.failed
    }
}

/// Snapshot emitted after each completed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub analyzed: usize,
    pub total: usize,
    pub tallies: StatusTallies,
}

/// Final counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub up_to_date: usize,
    pub outdated: usize,
    pub major_update: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Builds a summary from the batch's completed tallies
    pub fn from_tallies(total: usize, tallies: StatusTallies) -> Self {
        Self {
            total,
            up_to_date: tallies.up_to_date,
            outdated: tallies.outdated,
            major_update: tallies.major_update,
            failed: tallies.failed,
        }
    }

    /// Recomputes a summary from a full result list
    pub fn from_results(results: &[PackageResult]) -> Self {
        let mut tallies = StatusTallies::default();
        for result in results {
            tallies.record(result.status);
        }
        Self::from_tallies(results.len(), tallies)
    }

    /// Number of packages with any newer version available
    pub fn needs_attention(&self) -> usize {
        self.outdated + self.major_update
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
