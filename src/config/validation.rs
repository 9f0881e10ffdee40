//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as empty remotes, malformed or duplicate addresses, and
//! timeout entries that can never apply. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use std::collections::HashSet;

use url::Url;

use super::model::{Config, DEFAULT_PATH_KEY};
use crate::error::ValidationError;

/// Validate a single remote address. Returns `Ok(())` or a human-readable error.
///
/// Bare `host:port` addresses are accepted and dialed over plain HTTP.
pub fn validate_address(address: &str) -> Result<(), String> {
    let trimmed = address.trim_matches('/');
    if trimmed.is_empty() {
        return Err("address cannot be empty".into());
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    match Url::parse(&candidate) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().map_or(true, str::is_empty) {
                Err(format!("'{address}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{address}' is not a valid address")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.remotes.is_empty() {
        errors.push(ValidationError {
            remote: "(root)".into(),
            field: "remotes".into(),
            message: "at least one remote must be defined".into(),
            suggestion: None,
        });
    }

    for (name, addresses) in &config.remotes {
        let remote_id = if name.trim().is_empty() {
            "(unnamed)".to_string()
        } else {
            name.clone()
        };

        if name.trim().is_empty() {
            errors.push(ValidationError {
                remote: remote_id.clone(),
                field: "remotes".into(),
                message: "remote name cannot be empty".into(),
                suggestion: None,
            });
        }

        if addresses.is_empty() {
            errors.push(ValidationError {
                remote: remote_id.clone(),
                field: "remotes.addresses".into(),
                message: "at least one address must be defined".into(),
                suggestion: None,
            });
        }

        let mut seen = HashSet::new();
        for address in addresses {
            if let Err(msg) = validate_address(address) {
                errors.push(ValidationError {
                    remote: remote_id.clone(),
                    field: "remotes.addresses".into(),
                    message: msg,
                    suggestion: None,
                });
            }

            if !seen.insert(address.trim_matches('/')) {
                errors.push(ValidationError {
                    remote: remote_id.clone(),
                    field: "remotes.addresses".into(),
                    message: format!("duplicate address '{address}'"),
                    suggestion: Some("duplicates skew the random pick toward one host".into()),
                });
            }
        }
    }

    for (name, paths) in &config.http_timeout {
        if !config.remotes.contains_key(name) {
            let suggestion = config
                .remotes
                .keys()
                .find(|known| known.eq_ignore_ascii_case(name))
                .map(|known| format!("did you mean '{known}'?"));
            errors.push(ValidationError {
                remote: name.clone(),
                field: "httpTimeout".into(),
                message: "timeouts configured for an unregistered remote".into(),
                suggestion,
            });
        }

        let mut lowered = HashSet::new();
        for (path, ms) in paths {
            if *ms == 0 {
                errors.push(ValidationError {
                    remote: name.clone(),
                    field: format!("httpTimeout.{path}"),
                    message: "timeout must be greater than zero".into(),
                    suggestion: None,
                });
            }

            if !lowered.insert(path.to_lowercase()) {
                errors.push(ValidationError {
                    remote: name.clone(),
                    field: format!("httpTimeout.{path}"),
                    message: "paths are matched case-insensitively, this key collides with another".into(),
                    suggestion: Some(format!("keep a single '{}' entry", path.to_lowercase())),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  {} remotes, {} addresses\n",
        config.remotes.len(),
        config.total_addresses()
    )];

    for (name, addresses) in &config.remotes {
        let overrides = config
            .http_timeout
            .get(name)
            .map_or(0, |paths| paths.keys().filter(|k| *k != DEFAULT_PATH_KEY).count());

        lines.push(format!("  {name}  -> {} addresses", addresses.len()));
        for address in addresses {
            lines.push(format!("    {address}"));
        }
        lines.push(format!(
            "    timeout: {}ms default, {overrides} path overrides",
            config.remote_default_timeout(name)
        ));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}
