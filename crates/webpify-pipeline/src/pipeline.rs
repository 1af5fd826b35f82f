use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};
use webpify_bucket::BucketStore;
use webpify_convert::transcode_to_webp;

use crate::config::PipelineConfig;
use crate::keys::{self, Eligibility, WEBP_CONTENT_TYPE};
use crate::report::BatchReport;
use crate::types::{
    FailureStage, NotificationRecord, RecordResult, TranscodeFailure, TranscodeOutcome,
};

/// Sequentially converts each notified object into a WebP copy.
#[derive(Clone)]
pub struct TranscodePipeline {
    store: Arc<dyn BucketStore>,
    config: PipelineConfig,
}

impl TranscodePipeline {
    pub fn new(store: Arc<dyn BucketStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes the batch in order. Per-record errors are captured in the
    /// report; nothing here aborts sibling records.
    pub async fn run(&self, records: &[NotificationRecord]) -> BatchReport {
        let mut report = BatchReport::new(records.len());

        for record in records {
            info!(uri = %record.uri(), "processing object");
            match self.process_record(record).await {
                RecordResult::Skipped => {}
                RecordResult::Converted(outcome) => report.outcomes.push(outcome),
                RecordResult::Failed(failure) => {
                    error!(key = %failure.key, stage = failure.stage.as_str(), "{}", failure.error);
                    report.failures.push(failure);
                }
            }
        }

        report.log_summary();
        report
    }

    async fn process_record(&self, record: &NotificationRecord) -> RecordResult {
        let extension = match keys::eligibility(&record.key) {
            Eligibility::Convert(extension) => extension,
            Eligibility::AlreadyWebp => {
                info!(key = %record.key, "object is already webp, skipping");
                return RecordResult::Skipped;
            }
            Eligibility::Unsupported => {
                info!(key = %record.key, "unsupported extension, skipping");
                return RecordResult::Skipped;
            }
        };

        let source = match self.store.get_object(&record.bucket, &record.key).await {
            Ok(source) => source,
            Err(err) => {
                return RecordResult::Failed(TranscodeFailure::new(
                    &record.key,
                    FailureStage::Fetch,
                    format!("object fetch failed: {err}"),
                ));
            }
        };
        info!(bytes = source.bytes.len(), "downloaded source object");

        let transcoded = match transcode_to_webp(&source.bytes, self.config.quality) {
            Ok(transcoded) => transcoded,
            Err(err) => {
                return RecordResult::Failed(TranscodeFailure::new(
                    &record.key,
                    FailureStage::Convert,
                    format!("image conversion failed: {err}"),
                ));
            }
        };
        let ratio = format!("{:.1}%", transcoded.compression_ratio());
        info!(
            original = transcoded.original_len,
            webp = transcoded.bytes.len(),
            ratio = %ratio,
            "webp encode complete"
        );

        let output_bucket = self
            .config
            .output_bucket
            .as_deref()
            .unwrap_or(&record.bucket);
        let output_key = keys::destination_key(&record.key, self.config.output_prefix.as_deref());
        let output_uri = format!("s3://{output_bucket}/{output_key}");

        let metadata = merged_metadata(
            &extension,
            transcoded.original_len,
            transcoded.bytes.len(),
            &ratio,
            self.config.quality,
            &source.metadata,
        );

        if let Err(err) = self
            .store
            .put_object(
                output_bucket,
                &output_key,
                Bytes::from(transcoded.bytes),
                WEBP_CONTENT_TYPE,
                metadata,
            )
            .await
        {
            return RecordResult::Failed(TranscodeFailure::new(
                &record.key,
                FailureStage::Store,
                format!("webp upload failed: {err}"),
            ));
        }
        info!(uri = %output_uri, "webp object stored");

        if self.config.delete_original {
            // Late failure: the webp copy is already durable and the source
            // remains. Recorded without a dedicated stage.
            if let Err(err) = self.store.delete_object(&record.bucket, &record.key).await {
                return RecordResult::Failed(TranscodeFailure::new(
                    &record.key,
                    FailureStage::Unknown,
                    format!("source deletion failed: {err}"),
                ));
            }
            info!(uri = %record.uri(), "source object deleted");
        }

        RecordResult::Converted(TranscodeOutcome {
            original: record.uri(),
            webp: output_uri,
            compression_ratio: ratio,
        })
    }
}

/// Derived transformation metadata overlaid with the source object's own
/// metadata. Source keys win on collision.
fn merged_metadata(
    extension: &str,
    original_len: usize,
    webp_len: usize,
    ratio: &str,
    quality: u8,
    source_metadata: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut metadata = HashMap::from([
        ("original-format".to_string(), extension.to_string()),
        ("original-size".to_string(), original_len.to_string()),
        ("webp-size".to_string(), webp_len.to_string()),
        ("compression-ratio".to_string(), ratio.to_string()),
        ("webp-quality".to_string(), quality.to_string()),
    ]);
    metadata.extend(
        source_metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    metadata
}
