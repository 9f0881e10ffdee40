//! Logical remote name to physical address resolution.
//!
//! [`RemoteRegistry`] is built once from the `remotes` table and never
//! mutated afterwards, so any number of calls can read it concurrently.
//! Every [`select`](RemoteRegistry::select) is an independent uniform
//! draw: there is no stickiness and no health awareness.

use std::collections::HashMap;

use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct RemoteRegistry {
    remotes: HashMap<String, Vec<String>>,
}

impl RemoteRegistry {
    /// Entries with an empty address list are dropped, so every registered
    /// name has at least one address to pick from.
    #[must_use]
    pub fn new<I>(remotes: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let remotes = remotes
            .into_iter()
            .filter(|(name, addresses)| {
                if addresses.is_empty() {
                    tracing::warn!(remote = %name, "remote has no addresses, ignoring");
                    return false;
                }
                true
            })
            .collect();
        Self { remotes }
    }

    /// Pick one address for `name` uniformly at random in `[0, N)`.
    ///
    /// Returns `None` for names that were never registered.
    #[must_use]
    pub fn select(&self, name: &str) -> Option<&str> {
        let addresses = self.remotes.get(name)?;
        let idx = rand::thread_rng().gen_range(0..addresses.len());
        addresses.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn addresses(&self, name: &str) -> Option<&[String]> {
        self.remotes.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.remotes.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn registry() -> RemoteRegistry {
        RemoteRegistry::new([
            (
                "users".to_string(),
                vec![
                    "http://u1:80".to_string(),
                    "http://u2:80".to_string(),
                    "http://u3:80".to_string(),
                ],
            ),
            ("billing".to_string(), vec!["http://b1:80".to_string()]),
            ("empty".to_string(), vec![]),
        ])
    }

    #[test]
    fn single_address_is_always_selected() {
        let registry = registry();
        for _ in 0..20 {
            assert_eq!(registry.select("billing"), Some("http://b1:80"));
        }
    }

    #[test]
    fn every_address_is_reachable() {
        let registry = registry();
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            seen.insert(registry.select("users").unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn unknown_name_selects_nothing() {
        assert_eq!(registry().select("nope"), None);
    }

    #[test]
    fn empty_lists_are_not_registered() {
        let registry = registry();
        assert!(!registry.contains("empty"));
        assert_eq!(registry.len(), 2);
    }
}
