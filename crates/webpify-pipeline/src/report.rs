use serde::Serialize;
use tracing::{info, warn};

use crate::types::{TranscodeFailure, TranscodeOutcome};

/// Aggregated result of one invocation's batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub outcomes: Vec<TranscodeOutcome>,
    pub failures: Vec<TranscodeFailure>,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// The invocation verdict is binary: one failed record fails the batch,
    /// even though sibling conversions are already durable.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            message: "image conversion complete".to_string(),
            total_files: self.total,
            processed_files: self.processed(),
            failed_files: self.failed(),
            results: self.outcomes.clone(),
        }
    }

    /// Totals plus one line per failure; per-record detail only reaches the
    /// log stream, never the invocation return value.
    pub fn log_summary(&self) {
        info!(
            total = self.total,
            processed = self.processed(),
            failed = self.failed(),
            "batch complete"
        );
        for failure in &self.failures {
            warn!(key = %failure.key, stage = failure.stage.as_str(), "{}", failure.error);
        }
    }
}

/// Serializable success body.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub message: String,
    pub total_files: usize,
    pub processed_files: usize,
    pub failed_files: usize,
    pub results: Vec<TranscodeOutcome>,
}
