use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{info, Level};
use webpify_bucket::{S3BucketStore, S3Config};
use webpify_pipeline::{PipelineConfig, TranscodePipeline};

mod handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .json()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Config and client are built once per cold start; every invocation
    // reuses them.
    let config = PipelineConfig::from_env()?;
    let store = S3BucketStore::new(S3Config::from_env()).await?;
    let pipeline = TranscodePipeline::new(Arc::new(store), config);
    info!(quality = pipeline.config().quality, "transcoder ready");

    run(service_fn(|event: LambdaEvent<S3Event>| {
        handler::handle(&pipeline, event)
    }))
    .await
}
