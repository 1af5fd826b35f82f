//! Maps the Lambda invocation surface onto the transcode pipeline.

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Error, LambdaEvent};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use webpify_pipeline::{NotificationRecord, TranscodePipeline};

/// Success payload. `body` is the JSON-encoded batch summary string.
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

pub async fn handle(
    pipeline: &TranscodePipeline,
    event: LambdaEvent<S3Event>,
) -> Result<InvocationResponse, Error> {
    let records = notification_records(&event.payload)?;
    let report = pipeline.run(&records).await;

    // Any failed record fails the invocation so the host's error channel
    // fires; per-record detail stays in the log stream.
    if !report.is_success() {
        return Err(format!(
            "{} of {} objects failed to convert; see log for per-object detail",
            report.failed(),
            report.total
        )
        .into());
    }

    Ok(InvocationResponse {
        status_code: 200,
        body: serde_json::to_string(&report.summary())?,
    })
}

/// A record without a bucket or key is a malformed batch, not a per-object
/// failure: it fails the whole invocation before any processing starts.
fn notification_records(event: &S3Event) -> Result<Vec<NotificationRecord>, Error> {
    event
        .records
        .iter()
        .map(|record| {
            let bucket = record
                .s3
                .bucket
                .name
                .as_deref()
                .ok_or("notification record missing bucket name")?;
            let key = record
                .s3
                .object
                .key
                .as_deref()
                .ok_or("notification record missing object key")?;
            Ok(NotificationRecord::new(bucket, decode_key(key)?))
        })
        .collect()
}

/// S3 event keys arrive form-encoded: `+` is a space and `%XX` escapes
/// apply.
fn decode_key(raw: &str) -> Result<String, Error> {
    let unplussed = raw.replace('+', " ");
    let decoded = percent_decode_str(&unplussed).decode_utf8().map_err(|err| {
        format!("object key '{raw}' is not valid utf-8 after percent-decoding: {err}")
    })?;
    Ok(decoded.into_owned())
}
