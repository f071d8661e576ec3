#![allow(dead_code)]

use rich_delta::{AttributeMap, Delta};
use serde_json::Value;

/// Decodes a wire-format fixture, panicking on malformed input.
pub fn delta(value: Value) -> Delta {
    Delta::from_json(&value).unwrap_or_else(|e| panic!("fixture must decode: {e}: {value}"))
}

/// Plain text document.
pub fn doc(text: &str) -> Delta {
    Delta::builder().insert(text, None).build()
}

pub fn attrs(value: Value) -> AttributeMap {
    AttributeMap::from_json_map(value.as_object().expect("attributes fixture must be an object"))
}
