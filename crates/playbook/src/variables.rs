//! Variable store shared across a playbook run.

use serde::Serialize;
use std::collections::BTreeMap;

/// Variables available to the template pass.
///
/// Keys are only ever added or overwritten during a run, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableStore {
    values: BTreeMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, returning the previous value if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Merge another set of variables into this one.
    pub fn merge(&mut self, other: &BTreeMap<String, String>) {
        for (k, v) in other {
            self.values.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl From<BTreeMap<String, String>> for VariableStore {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut store = VariableStore::new();
        assert!(store.is_empty());
        assert_eq!(store.set("token", "abc"), None);
        assert_eq!(store.get("token"), Some("abc"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_overwrite_keeps_key() {
        let mut store = VariableStore::new();
        store.set("id", "1");
        assert_eq!(store.set("id", "2"), Some("1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("id"), Some("2"));
    }

    #[test]
    fn test_merge() {
        let mut store = VariableStore::from(BTreeMap::from([("a".to_string(), "1".to_string())]));
        store.merge(&BTreeMap::from([
            ("a".to_string(), "10".to_string()),
            ("b".to_string(), "2".to_string()),
        ]));
        assert_eq!(store.get("a"), Some("10"));
        assert!(store.contains("b"));
        assert_eq!(store.iter().count(), 2);
    }
}
