//! Global cube attributes.
//!
//! Attributes are an immutable snapshot at merge time: the merge operates on
//! copies and never mutates a source cube's storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Arbitrary attribute value.
pub type AttrValue = serde_json::Value;

/// An ordered map of global attributes attached to a cube.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    map: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.map.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.remove(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.map.iter()
    }

    /// Deterministic textual form, suitable for keying and diagnostics.
    /// Stable because the underlying map is ordered.
    pub fn digest(&self) -> String {
        serde_json::to_string(&self.map).unwrap_or_default()
    }
}

impl Hash for Attributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest().hash(state);
    }
}

impl From<BTreeMap<String, AttrValue>> for Attributes {
    fn from(map: BTreeMap<String, AttrValue>) -> Self {
        Self { map }
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, AttrValue)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_order_independent() {
        let mut a = Attributes::new();
        a.insert("source", "unified model");
        a.insert("history", "merged");

        let mut b = Attributes::new();
        b.insert("history", "merged");
        b.insert("source", "unified model");

        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_value_difference_detected() {
        let mut a = Attributes::new();
        a.insert("my_attr1", "foo");
        let mut b = Attributes::new();
        b.insert("my_attr1", "bar");
        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
    }
}
