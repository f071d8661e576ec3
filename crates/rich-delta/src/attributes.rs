//! Formatting attributes attached to inserted and retained content.
//!
//! An attribute value is either set to a JSON value or explicitly marked for
//! removal. On the wire the removal marker is `null`; in memory it is a
//! distinct variant so that "remove this key" and "key absent" never collapse
//! into one another.

use indexmap::IndexMap;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Set(Value),
    /// Tombstone: removes the attribute from the content it is applied to.
    Remove,
}

impl AttributeValue {
    pub fn from_json(value: Value) -> Self {
        if value.is_null() {
            AttributeValue::Remove
        } else {
            AttributeValue::Set(value)
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Set(v) => v.clone(),
            AttributeValue::Remove => Value::Null,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, AttributeValue::Remove)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AttributeValue::Set(v) => Some(v),
            AttributeValue::Remove => None,
        }
    }
}

/// Insertion-ordered attribute map. Equality ignores key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap(IndexMap<String, AttributeValue>);

impl AttributeMap {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets `key`. A JSON `null` is stored as a tombstone.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), AttributeValue::from_json(value.into()));
        self
    }

    /// Marks `key` for removal.
    pub fn tombstone(&mut self, key: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), AttributeValue::Remove);
        self
    }

    /// Chainable form of [`AttributeMap::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Chainable form of [`AttributeMap::tombstone`].
    pub fn without(mut self, key: impl Into<String>) -> Self {
        self.tombstone(key);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First key carrying a tombstone, if any.
    pub fn first_removal(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, v)| v.is_remove())
            .map(|(k, _)| k.as_str())
    }

    /// Copy of this map with all tombstones dropped.
    pub fn without_removals(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(_, v)| !v.is_remove())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .map(|(k, v)| (k.clone(), AttributeValue::from_json(v.clone())))
                .collect(),
        )
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    // ── Algebra ───────────────────────────────────────────────────────────

    /// Overlays `b` on `a`.
    ///
    /// With `keep_removals` set, tombstones in `b` survive in the result
    /// (the target is a retain, so the removal must still reach the base
    /// document). Without it they are applied and dropped.
    pub fn compose(a: &AttributeMap, b: &AttributeMap, keep_removals: bool) -> AttributeMap {
        let mut out: IndexMap<String, AttributeValue> = b
            .0
            .iter()
            .filter(|(_, v)| keep_removals || !v.is_remove())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in &a.0 {
            if b.0.contains_key(key) || (!keep_removals && value.is_remove()) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        AttributeMap(out)
    }

    /// Attribute changes turning `a` into `b`; keys missing from `b` become
    /// tombstones.
    pub fn diff(a: &AttributeMap, b: &AttributeMap) -> AttributeMap {
        let mut out = IndexMap::new();
        for key in a.0.keys().chain(b.0.keys()) {
            if out.contains_key(key) {
                continue;
            }
            let (left, right) = (a.0.get(key), b.0.get(key));
            if left != right {
                let value = right.cloned().unwrap_or(AttributeValue::Remove);
                out.insert(key.clone(), value);
            }
        }
        AttributeMap(out)
    }

    /// Attributes that undo `attr` on content currently formatted with `base`.
    pub fn invert(attr: &AttributeMap, base: &AttributeMap) -> AttributeMap {
        let mut out = IndexMap::new();
        for (key, value) in &base.0 {
            if let Some(applied) = attr.0.get(key) {
                if applied != value {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        for key in attr.0.keys() {
            if !base.0.contains_key(key) {
                out.insert(key.clone(), AttributeValue::Remove);
            }
        }
        AttributeMap(out)
    }

    /// Rewrites `b` to apply after the concurrent `a`. When `priority` is
    /// set, `a` wins every key both sides touch.
    pub fn transform(a: &AttributeMap, b: &AttributeMap, priority: bool) -> AttributeMap {
        if !priority {
            return b.clone();
        }
        AttributeMap(
            b.0.iter()
                .filter(|(k, _)| !a.0.contains_key(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}
