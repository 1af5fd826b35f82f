//! Batch pipeline turning stored source images into WebP copies.
//!
//! One invocation receives a batch of "object created" notifications and
//! processes them strictly in order: eligibility filter, fetch, convert,
//! store, optional source deletion. Per-record errors are captured and the
//! loop continues; the batch verdict is binary afterwards.

pub mod config;
pub mod keys;
pub mod pipeline;
pub mod report;
pub mod types;

pub use config::{ConfigError, PipelineConfig};
pub use keys::{destination_key, eligibility, Eligibility, SOURCE_EXTENSIONS, WEBP_CONTENT_TYPE};
pub use pipeline::TranscodePipeline;
pub use report::{BatchReport, BatchSummary};
pub use types::{
    FailureStage, NotificationRecord, RecordResult, TranscodeFailure, TranscodeOutcome,
};

#[cfg(test)]
mod tests;
