//! Error types for Courier.
//!
//! [`CourierError`] covers configuration, IO and transport setup failures
//! surfaced to the binary and to [`Courier::new`](crate::client::Courier::new).
//! [`ValidationError`] describes a single config problem. [`DecodeError`]
//! is the only error a remote call hands back to its caller; everything
//! that goes wrong while a call is in flight is absorbed into a
//! [`Response`](crate::client::Response) instead.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub remote: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  remote {}: {} — {}",
            self.remote, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CourierError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Invalid argument '{arg}': {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Remote '{remote}' could not be reached")]
    RemoteUnreachable { remote: String },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failure to decode a response body into a caller-supplied type.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode response body: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

impl DecodeError {
    /// Whether the body was not valid JSON at all, as opposed to valid JSON
    /// of the wrong shape.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        self.source.is_syntax() || self.source.is_eof()
    }
}

/// Failure to turn a call's parameters into query pairs, a form body or JSON.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("parameters could not be serialized: {0}")]
    Serialize(String),

    #[error("parameters must be a map or an encoded string, got {0}")]
    NotAMap(&'static str),
}
