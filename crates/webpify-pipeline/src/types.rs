use std::fmt;

use serde::Serialize;

/// A single "object created" notification: source bucket plus the already
/// percent-decoded object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub bucket: String,
    pub key: String,
}

impl NotificationRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// Successful conversion of one record. Field names are the wire contract of
/// the success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeOutcome {
    pub original: String,
    pub webp: String,
    pub compression_ratio: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Fetch,
    Convert,
    Store,
    Unknown,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Fetch => "fetch",
            FailureStage::Convert => "convert",
            FailureStage::Store => "store",
            FailureStage::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TranscodeFailure {
    pub key: String,
    pub error: String,
    pub stage: FailureStage,
}

impl TranscodeFailure {
    pub fn new(key: impl Into<String>, stage: FailureStage, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            error: error.into(),
            stage,
        }
    }
}

/// What processing one record produced. Skipped records land in neither
/// accumulator.
#[derive(Debug, Clone)]
pub enum RecordResult {
    Skipped,
    Converted(TranscodeOutcome),
    Failed(TranscodeFailure),
}
