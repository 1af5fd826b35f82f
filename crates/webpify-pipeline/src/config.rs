use thiserror::Error;

pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid WEBP_QUALITY '{0}': expected an integer in 0..=100")]
    InvalidQuality(String),
}

/// Invocation-wide configuration, read once at process start and passed into
/// the pipeline. Never consulted ad hoc mid-batch.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target WebP encode quality, 0-100.
    pub quality: u8,
    /// Destination bucket; the source bucket when unset.
    pub output_bucket: Option<String>,
    /// Destination key prefix; converted objects sit next to their source
    /// when unset.
    pub output_prefix: Option<String>,
    /// Delete the source object after a successful store.
    pub delete_original: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            output_bucket: None,
            output_prefix: None,
            delete_original: false,
        }
    }
}

impl PipelineConfig {
    /// Reads configuration from the environment. Empty values count as
    /// unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let quality = match non_empty_var("WEBP_QUALITY") {
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .filter(|quality| *quality <= 100)
                .ok_or(ConfigError::InvalidQuality(raw))?,
            None => DEFAULT_QUALITY,
        };

        Ok(Self {
            quality,
            output_bucket: non_empty_var("OUTPUT_BUCKET"),
            output_prefix: non_empty_var("OUTPUT_PREFIX"),
            delete_original: non_empty_var("DELETE_ORIGINAL")
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
