use crate::config::{PipelineConfig, DEFAULT_QUALITY};
use crate::keys::{destination_key, eligibility, Eligibility};

#[test]
fn eligibility_follows_the_allow_list() {
    assert_eq!(
        eligibility("photos/cat.png"),
        Eligibility::Convert("png".to_string())
    );
    assert_eq!(
        eligibility("photos/CAT.JPEG"),
        Eligibility::Convert("jpeg".to_string())
    );
    assert_eq!(
        eligibility("scan.TIF"),
        Eligibility::Convert("tif".to_string())
    );
    assert_eq!(eligibility("photos/cat.webp"), Eligibility::AlreadyWebp);
    assert_eq!(eligibility("notes/readme.txt"), Eligibility::Unsupported);
    assert_eq!(eligibility("no-extension"), Eligibility::Unsupported);
    assert_eq!(eligibility("dir.with.dots/file"), Eligibility::Unsupported);
    assert_eq!(eligibility(".hidden"), Eligibility::Unsupported);
}

#[test]
fn destination_sits_next_to_source_by_default() {
    assert_eq!(
        destination_key("photos/2024/cat.png", None),
        "photos/2024/cat.webp"
    );
    assert_eq!(destination_key("cat.png", None), "cat.webp");
}

#[test]
fn destination_prefix_is_prepended() {
    assert_eq!(destination_key("cat.png", Some("archive")), "archive/cat.webp");
    assert_eq!(
        destination_key("photos/cat.png", Some("archive/")),
        "archive/photos/cat.webp"
    );
    assert_eq!(
        destination_key("cat.png", Some("archive///")),
        "archive/cat.webp"
    );
}

#[test]
fn destination_keeps_only_the_final_extension() {
    assert_eq!(
        destination_key("backups/shot.tar.png", None),
        "backups/shot.tar.webp"
    );
}

#[test]
fn config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.quality, DEFAULT_QUALITY);
    assert!(config.output_bucket.is_none());
    assert!(config.output_prefix.is_none());
    assert!(!config.delete_original);
}

// Environment-backed settings are exercised in one test so nothing races on
// the process environment.
#[test]
fn config_from_env() {
    let keys = [
        "WEBP_QUALITY",
        "OUTPUT_BUCKET",
        "OUTPUT_PREFIX",
        "DELETE_ORIGINAL",
    ];
    let saved: Vec<Option<String>> = keys.iter().map(|key| std::env::var(key).ok()).collect();

    for key in keys {
        std::env::remove_var(key);
    }
    let config = PipelineConfig::from_env().expect("defaults should parse");
    assert_eq!(config.quality, DEFAULT_QUALITY);
    assert!(config.output_bucket.is_none());

    std::env::set_var("WEBP_QUALITY", "70");
    std::env::set_var("OUTPUT_BUCKET", "processed");
    std::env::set_var("OUTPUT_PREFIX", "");
    std::env::set_var("DELETE_ORIGINAL", "TRUE");
    let config = PipelineConfig::from_env().expect("explicit settings should parse");
    assert_eq!(config.quality, 70);
    assert_eq!(config.output_bucket.as_deref(), Some("processed"));
    assert!(config.output_prefix.is_none(), "empty value counts as unset");
    assert!(config.delete_original);

    std::env::set_var("WEBP_QUALITY", "101");
    assert!(PipelineConfig::from_env().is_err());
    std::env::set_var("WEBP_QUALITY", "soft");
    assert!(PipelineConfig::from_env().is_err());

    for (key, value) in keys.iter().zip(saved) {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}
