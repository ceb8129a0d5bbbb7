use std::collections::BTreeMap;

use serde::Serialize;

/// Counters shared across a pipeline run.
///
/// Held exclusively by the run context; updates go through `&mut`, which is
/// the whole mutual-exclusion story for a single-owner aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub processed: u64,
    pub dropped: u64,
    pub drop_reasons: BTreeMap<String, u64>,
    pub failed_media: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub fn record_dropped(&mut self, reason: &str) {
        self.dropped += 1;
        *self.drop_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_failed_media(&mut self) {
        self.failed_media += 1;
    }
}

/// Final snapshot of a run, reported once the export stream is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: u64,
    pub dropped: u64,
    pub drop_reasons: BTreeMap<String, u64>,
    pub failed_media: u64,
    pub output_path: std::path::PathBuf,
}

impl RunSummary {
    pub fn from_stats(stats: RunStats, output_path: std::path::PathBuf) -> Self {
        Self {
            processed: stats.processed,
            dropped: stats.dropped,
            drop_reasons: stats.drop_reasons,
            failed_media: stats.failed_media,
            output_path,
        }
    }
}
