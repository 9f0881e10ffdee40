//! Serde data structures for the Courier configuration file.
//!
//! [`Config`] is the root: the remote registry, the per-remote timeout
//! table, and the `debug` / `enableMetrics` switches. Keys use the
//! camelCase names services already ship in their config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fallback timeout when neither the path nor the remote has an entry.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Per-remote key consulted when the request path has no entry of its own.
pub const DEFAULT_PATH_KEY: &str = "default";

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_metrics: bool,

    pub remotes: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub http_timeout: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Config {
    #[must_use]
    pub fn total_addresses(&self) -> usize {
        self.remotes.values().map(Vec::len).sum()
    }

    /// Timeout in milliseconds that applies to `remote` when no path entry
    /// matches.
    #[must_use]
    pub fn remote_default_timeout(&self, remote: &str) -> u64 {
        self.http_timeout
            .get(remote)
            .and_then(|paths| paths.get(DEFAULT_PATH_KEY))
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}
