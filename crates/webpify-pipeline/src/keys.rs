//! Pure helpers: eligibility filtering and destination key derivation.

/// Source extensions the pipeline converts, lowercase, without the dot.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

pub const WEBP_EXTENSION: &str = "webp";
pub const WEBP_CONTENT_TYPE: &str = "image/webp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// On the allow-list; carries the lowercase extension for metadata.
    Convert(String),
    AlreadyWebp,
    Unsupported,
}

pub fn eligibility(key: &str) -> Eligibility {
    match extension(key) {
        Some(ext) if ext == WEBP_EXTENSION => Eligibility::AlreadyWebp,
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext.as_str()) => Eligibility::Convert(ext),
        _ => Eligibility::Unsupported,
    }
}

/// Lowercase extension of the key's file name. A leading dot alone does not
/// count as an extension, so dotfiles have none.
fn extension(key: &str) -> Option<String> {
    let (stem, ext) = file_name(key).rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn file_name(key: &str) -> &str {
    key.rsplit_once('/').map(|(_, name)| name).unwrap_or(key)
}

/// Derives the destination key: next to the source by default, or under the
/// configured prefix (trailing slashes stripped) when one is set.
pub fn destination_key(source_key: &str, prefix: Option<&str>) -> String {
    let (dir, name) = match source_key.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", source_key),
    };
    let base = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    match (prefix.map(|p| p.trim_end_matches('/')), dir.is_empty()) {
        (Some(prefix), false) => format!("{prefix}/{dir}/{base}.{WEBP_EXTENSION}"),
        (Some(prefix), true) => format!("{prefix}/{base}.{WEBP_EXTENSION}"),
        (None, false) => format!("{dir}/{base}.{WEBP_EXTENSION}"),
        (None, true) => format!("{base}.{WEBP_EXTENSION}"),
    }
}
