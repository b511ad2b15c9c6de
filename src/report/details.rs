use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An open key→value bag used for structured evidence (e.g. `expected`/
/// `found` on a mismatch) and for [`crate::report::ValidationReport`]
/// metadata (e.g. the accessibility score).
///
/// Backed by a [`BTreeMap`] so JSON/text/markdown renderings are
/// deterministically ordered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Details(BTreeMap<String, Value>);

impl Details {
    /// An empty details bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a value by key and returns it as `&str`, if present and a
    /// JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// `true` if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
