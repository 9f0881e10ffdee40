//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Config files are read by [`FileSource`](file_source::FileSource); the
//! format is picked from the file extension. YAML, JSON and TOML are each
//! gated by a feature flag. [`parse_config_str`] is the shared
//! format-specific deserializer.

pub mod file_source;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::model::Config;
use crate::config::ConfigSource;
use crate::error::CourierError;

use file_source::FileSource;

/// Config file names probed in the working directory, in priority order.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "courier.yaml",
    "courier.yml",
    "courier.json",
    "courier.toml",
];

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, CourierError> {
    let parse_err = |source: Box<dyn std::error::Error + Send + Sync>| CourierError::ConfigParse {
        path: path_display.to_string(),
        source,
    };

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| parse_err(Box::new(e))),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| parse_err(Box::new(e))),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| parse_err(Box::new(e))),

        other => Err(CourierError::UnsupportedFormat(other.to_string())),
    }
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Build a source for `path`, rejecting extensions this build cannot parse.
pub fn for_path(path: &Path) -> Result<Box<dyn ConfigSource>, CourierError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let name = match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => "yaml",

        #[cfg(feature = "json")]
        "json" => "json",

        #[cfg(feature = "toml")]
        "toml" => "toml",

        other => return Err(CourierError::UnsupportedFormat(other.to_string())),
    };

    Ok(Box::new(FileSource::new(path.to_path_buf(), name)))
}

/// Use `explicit` when given, otherwise the first auto-detect candidate
/// present in the working directory.
pub async fn resolve(explicit: Option<&Path>) -> Result<Box<dyn ConfigSource>, CourierError> {
    if let Some(path) = explicit {
        return for_path(path);
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return for_path(&path);
        }
    }

    Err(CourierError::NoConfigSource {
        hint: "Provide --config <file>.\n  \
               Run 'courier init' to create a config file."
            .into(),
    })
}
