//! Layered per-remote, per-path timeout policy.
//!
//! Lookup order, first hit wins: the lowercased request path under the
//! remote, then the remote's `"default"` key, then [`DEFAULT_TIMEOUT_MS`].
//! A remote without any entry goes straight to the constant.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::model::{DEFAULT_PATH_KEY, DEFAULT_TIMEOUT_MS};

#[derive(Debug, Clone, Default)]
pub struct TimeoutPolicy {
    table: HashMap<String, HashMap<String, Duration>>,
}

impl TimeoutPolicy {
    /// Path keys are stored lowercased; remote names are kept verbatim.
    #[must_use]
    pub fn new<I, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = (String, u64)>,
    {
        let table = table
            .into_iter()
            .map(|(remote, paths)| {
                let paths = paths
                    .into_iter()
                    .map(|(path, ms)| (path.to_lowercase(), Duration::from_millis(ms)))
                    .collect();
                (remote, paths)
            })
            .collect();
        Self { table }
    }

    /// The configured timeout for `remote` and `path`, if any layer of the
    /// table covers it.
    #[must_use]
    pub fn lookup(&self, remote: &str, path: &str) -> Option<Duration> {
        let paths = self.table.get(remote)?;
        paths
            .get(&path.to_lowercase())
            .or_else(|| paths.get(DEFAULT_PATH_KEY))
            .copied()
    }

    #[must_use]
    pub fn resolve(&self, remote: &str, path: &str) -> Duration {
        self.lookup(remote, path)
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}
