//! Abstractions over S3-compatible object storage used by the transcode
//! pipeline. Source and destination buckets can differ per call, so the
//! bucket is an argument rather than part of the store.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        }
    }
}

impl S3Config {
    /// Reads connection settings from the environment. Credentials left
    /// unset here fall through to the SDK's default provider chain, which
    /// is what a deployed function relies on.
    pub fn from_env() -> Self {
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|_| "us-east-1".to_string());

        Self {
            region,
            endpoint: non_empty("S3_ENDPOINT_URL"),
            access_key_id: non_empty("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty("S3_SECRET_ACCESS_KEY"),
            force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// An object fetched from storage: its payload plus whatever user metadata
/// was attached when it was uploaded.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum BucketError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
    #[error("object not found: {0}")]
    NotFound(String),
}

impl BucketError {
    fn from_sdk(err: impl fmt::Display) -> Self {
        Self::Sdk(err.to_string())
    }
}

#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, BucketError>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), BucketError>;
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BucketError>;
}

#[derive(Clone, Debug)]
pub struct S3BucketStore {
    client: Client,
}

impl S3BucketStore {
    pub async fn new(config: S3Config) -> Result<Self, BucketError> {
        if config.access_key_id.is_some() != config.secret_access_key.is_some() {
            return Err(BucketError::Configuration(
                "access key and secret key must be provided together".into(),
            ));
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(access_key, secret_key, None, None, "static");
            loader = loader.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        let shared_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, BucketError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(service_err) => {
                    let message = service_err.err().to_string();
                    if message.contains("NoSuchKey") {
                        BucketError::NotFound(format!("{bucket}/{key}"))
                    } else {
                        BucketError::from_sdk(message)
                    }
                }
                other => BucketError::from_sdk(other),
            })?;

        let metadata = output.metadata().cloned().unwrap_or_default();
        let data = output.body.collect().await.map_err(BucketError::from_sdk)?;

        Ok(StoredObject {
            bytes: Bytes::from(data.into_bytes()),
            metadata,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), BucketError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type)
            .set_metadata(Some(metadata))
            .send()
            .await
            .map_err(BucketError::from_sdk)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BucketError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(BucketError::from_sdk)?;
        Ok(())
    }
}

/// One stored entry in a [`MemoryBucketStore`].
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub bytes: Bytes,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// In-memory [`BucketStore`] for tests and local runs where real S3 is
/// unwanted. Always compiled: downstream crates use it from their own test
/// suites.
#[derive(Clone, Default)]
pub struct MemoryBucketStore {
    objects: Arc<Mutex<HashMap<(String, String), StoredEntry>>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an object directly into the store, as if previously uploaded.
    pub fn seed(
        &self,
        bucket: &str,
        key: &str,
        bytes: impl Into<Bytes>,
        metadata: HashMap<String, String>,
    ) {
        let mut objects = self.objects.lock().expect("bucket store lock poisoned");
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredEntry {
                bytes: bytes.into(),
                content_type: "application/octet-stream".to_string(),
                metadata,
            },
        );
    }

    pub fn entry(&self, bucket: &str, key: &str) -> Option<StoredEntry> {
        let objects = self.objects.lock().expect("bucket store lock poisoned");
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.entry(bucket, key).is_some()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("bucket store lock poisoned").len()
    }
}

#[async_trait]
impl BucketStore for MemoryBucketStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject, BucketError> {
        self.entry(bucket, key)
            .map(|entry| StoredObject {
                bytes: entry.bytes,
                metadata: entry.metadata,
            })
            .ok_or_else(|| BucketError::NotFound(format!("{bucket}/{key}")))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), BucketError> {
        let mut objects = self.objects.lock().expect("bucket store lock poisoned");
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredEntry {
                bytes,
                content_type: content_type.to_string(),
                metadata,
            },
        );
        Ok(())
    }

    // Deleting a missing key succeeds, matching S3's idempotent delete.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BucketError> {
        let mut objects = self.objects.lock().expect("bucket store lock poisoned");
        objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryBucketStore::new();
        store
            .put_object(
                "photos",
                "cat.png",
                Bytes::from_static(b"pixels"),
                "image/png",
                HashMap::from([("camera".to_string(), "x100".to_string())]),
            )
            .await
            .expect("put failed");

        let fetched = store.get_object("photos", "cat.png").await.expect("get failed");
        assert_eq!(fetched.bytes.as_ref(), b"pixels");
        assert_eq!(fetched.metadata.get("camera").map(String::as_str), Some("x100"));

        let entry = store.entry("photos", "cat.png").expect("entry missing");
        assert_eq!(entry.content_type, "image/png");

        store.delete_object("photos", "cat.png").await.expect("delete failed");
        assert!(!store.contains("photos", "cat.png"));
    }

    #[tokio::test]
    async fn memory_store_reports_missing_objects() {
        let store = MemoryBucketStore::new();
        let err = store.get_object("photos", "ghost.png").await.unwrap_err();
        assert!(matches!(err, BucketError::NotFound(_)));

        // Deletes are idempotent, as on real S3.
        store
            .delete_object("photos", "ghost.png")
            .await
            .expect("delete of a missing key should succeed");
    }

    #[tokio::test]
    async fn s3_store_rejects_half_configured_credentials() {
        let config = S3Config {
            access_key_id: Some("key".to_string()),
            secret_access_key: None,
            ..S3Config::default()
        };
        let err = S3BucketStore::new(config).await.unwrap_err();
        assert!(matches!(err, BucketError::Configuration(_)));
    }
}
