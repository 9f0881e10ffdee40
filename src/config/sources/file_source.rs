//! Async file-based config source.
//!
//! [`FileSource`] reads the file through Tokio, parses it with the
//! deserializer matching its format, validates the result, and tags it
//! with a SHA-256 [`ConfigVersion`] of the raw bytes.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{parse_config_str, sha256_hex};
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::CourierError;

pub struct FileSource {
    path: PathBuf,
    format: &'static str,
}

impl FileSource {
    /// `format` is the canonical extension understood by
    /// [`parse_config_str`](super::parse_config_str).
    #[must_use]
    pub fn new(path: PathBuf, format: &'static str) -> Self {
        Self { path, format }
    }

    async fn read_content(&self) -> Result<String, CourierError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CourierError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                CourierError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.format
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), CourierError> {
        let content = self.read_content().await?;
        let config = parse_config_str(self.format, &content, &self.path.display().to_string())?;

        if let Err(errors) = validate(&config) {
            return Err(CourierError::ConfigValidation { errors });
        }

        let version = ConfigVersion::Hash(sha256_hex(content.as_bytes()));
        tracing::debug!(
            path = %self.path.display(),
            version = version.short(),
            remotes = config.remotes.len(),
            "config file loaded"
        );
        Ok((config, version))
    }
}
