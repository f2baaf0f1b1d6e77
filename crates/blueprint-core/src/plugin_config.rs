//! Flattened configuration for provider and transformer plugins.

use crate::scalar::ScalarValue;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration values of a plugin keyed by dot-delimited names.
///
/// Hierarchy lives entirely in the keys: `aws.config.regionKMSKeys.0.arn`
/// is the `arn` field of the first item of the `regionKMSKeys` list.
/// Keys keep their insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig(IndexMap<String, ScalarValue>);

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a value, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: ScalarValue) -> Option<ScalarValue> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ScalarValue> {
        self.0.iter()
    }

    /// Every entry whose key starts with `prefix`.
    ///
    /// An empty prefix returns the whole config.
    pub fn get_all_with_prefix(&self, prefix: &str) -> PluginConfig {
        self.iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Entries under a list prefix, such as `aws.config.regionKMSKeys.0.arn`
    /// for the prefix `aws.config.regionKMSKeys`.
    ///
    /// Also returns the matching keys ordered by their list index. An empty
    /// prefix returns the whole config and no keys.
    pub fn get_all_with_slice_prefix(&self, prefix: &str) -> (PluginConfig, Vec<String>) {
        if prefix.is_empty() {
            return (self.clone(), Vec::new());
        }
        let Some(pattern) = prefix_pattern(prefix, r"\.([0-9]+)\.?") else {
            return (PluginConfig::new(), Vec::new());
        };

        let mut subset = PluginConfig::new();
        let mut positioned = Vec::new();
        for (key, value) in self.iter() {
            if let Some(index) = captured_index(&pattern, key) {
                positioned.push((index, key.clone()));
                subset.insert(key.clone(), value.clone());
            }
        }
        positioned.sort_by_key(|(index, _)| *index);

        let keys = positioned.into_iter().map(|(_, key)| key).collect();
        (subset, keys)
    }

    /// Entries directly under a map prefix, such as
    /// `aws.config.regionKMSKeys.us-east-1` for the prefix
    /// `aws.config.regionKMSKeys`.
    ///
    /// An empty prefix returns the whole config.
    pub fn get_all_with_map_prefix(&self, prefix: &str) -> PluginConfig {
        if prefix.is_empty() {
            return self.clone();
        }
        let Some(pattern) = prefix_pattern(prefix, MAP_KEY_SUFFIX) else {
            return PluginConfig::new();
        };
        self.iter()
            .filter(|(key, _)| pattern.is_match(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Values of a list of scalars stored under `<prefix>.<index>`, ordered
    /// by index.
    ///
    /// Nested entries such as `<prefix>.0.field` are not included; use
    /// [`PluginConfig::get_all_with_slice_prefix`] for lists of objects.
    pub fn slice_from_prefix(&self, prefix: &str) -> Vec<ScalarValue> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let Some(pattern) = prefix_pattern(prefix, r"\.([0-9]+)$") else {
            return Vec::new();
        };

        let mut positioned: Vec<(usize, &ScalarValue)> = self
            .iter()
            .filter_map(|(key, value)| captured_index(&pattern, key).map(|index| (index, value)))
            .collect();
        positioned.sort_by_key(|(index, _)| *index);
        positioned.into_iter().map(|(_, value)| value.clone()).collect()
    }

    /// Values stored under `<prefix>.<name>`, keyed by `<name>`.
    pub fn map_from_prefix(&self, prefix: &str) -> PluginConfig {
        if prefix.is_empty() {
            return PluginConfig::new();
        }
        let Some(pattern) = prefix_pattern(prefix, MAP_KEY_SUFFIX) else {
            return PluginConfig::new();
        };
        self.iter()
            .filter_map(|(key, value)| {
                let captures = pattern.captures(key)?;
                Some((captures[1].to_string(), value.clone()))
            })
            .collect()
    }
}

const MAP_KEY_SUFFIX: &str = r"\.([A-Za-z0-9\-_]+)$";

/// Compile `^<escaped prefix><suffix>`.
fn prefix_pattern(prefix: &str, suffix: &str) -> Option<Regex> {
    let source = format!("^{}{}", regex::escape(prefix), suffix);
    match Regex::new(&source) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            tracing::debug!(prefix, error = %err, "could not compile config prefix pattern");
            None
        }
    }
}

fn captured_index(pattern: &Regex, key: &str) -> Option<usize> {
    pattern.captures(key)?.get(1)?.as_str().parse().ok()
}

impl FromIterator<(String, ScalarValue)> for PluginConfig {
    fn from_iter<I: IntoIterator<Item = (String, ScalarValue)>>(iter: I) -> Self {
        PluginConfig(iter.into_iter().collect())
    }
}

impl From<IndexMap<String, ScalarValue>> for PluginConfig {
    fn from(values: IndexMap<String, ScalarValue>) -> Self {
        PluginConfig(values)
    }
}

impl IntoIterator for PluginConfig {
    type Item = (String, ScalarValue);
    type IntoIter = indexmap::map::IntoIter<String, ScalarValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PluginConfig {
    type Item = (&'a String, &'a ScalarValue);
    type IntoIter = indexmap::map::Iter<'a, String, ScalarValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
