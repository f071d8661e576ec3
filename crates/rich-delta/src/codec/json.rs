//! JSON codec for deltas.
//!
//! A delta is encoded as an array of operation objects:
//!
//! ```text
//! { "insert": <string> | <embed object>, "attributes"?: { ... } }
//! { "delete": <positive integer> }
//! { "retain": <positive integer>, "attributes"?: { ... } }
//! ```
//!
//! `attributes` is omitted when empty and attribute tombstones are `null`.
//! The decoder also accepts the `{"ops": [...]}` envelope.

use serde_json::{json, Map, Value};

use crate::attributes::AttributeMap;
use crate::delta::Delta;
use crate::error::{DeltaError, DeltaResult, ValidationError};
use crate::op::{Content, Operation};

// ── Serialization ─────────────────────────────────────────────────────────

pub fn to_json(delta: &Delta) -> Value {
    Value::Array(delta.iter().map(op_to_json).collect())
}

pub fn op_to_json(op: &Operation) -> Value {
    let (mut m, attributes) = match op {
        Operation::Insert {
            content,
            attributes,
        } => {
            let mut m = Map::new();
            let value = match content {
                Content::Text(s) => Value::String(s.clone()),
                Content::Embed(v) => v.clone(),
            };
            m.insert("insert".into(), value);
            (m, attributes)
        }
        Operation::Delete { length } => return json!({ "delete": length }),
        Operation::Retain { length, attributes } => {
            let mut m = Map::new();
            m.insert("retain".into(), json!(length));
            (m, attributes)
        }
    };
    if !attributes.is_empty() {
        m.insert("attributes".into(), Value::Object(attributes.to_json_map()));
    }
    Value::Object(m)
}

// ── Deserialization ───────────────────────────────────────────────────────

pub fn from_json(value: &Value) -> DeltaResult<Delta> {
    let ops = match value {
        Value::Array(ops) => ops,
        Value::Object(m) => m
            .get("ops")
            .and_then(Value::as_array)
            .ok_or_else(|| DeltaError::malformed("delta object must carry an ops array"))?,
        _ => return Err(DeltaError::malformed("delta must be an array")),
    };
    let ops = ops
        .iter()
        .map(op_from_json)
        .collect::<DeltaResult<Vec<_>>>()?;
    Delta::from_ops(ops)
}

pub fn from_json_str(s: &str) -> DeltaResult<Delta> {
    let value: Value =
        serde_json::from_str(s).map_err(|e| DeltaError::malformed(format!("invalid JSON: {e}")))?;
    from_json(&value)
}

pub fn op_from_json(value: &Value) -> DeltaResult<Operation> {
    let m = value
        .as_object()
        .ok_or_else(|| DeltaError::malformed("operation must be an object"))?;
    if let Some(key) = m
        .keys()
        .find(|k| !matches!(k.as_str(), "insert" | "delete" | "retain" | "attributes"))
    {
        return Err(DeltaError::malformed(format!("unknown key: {key}")));
    }
    let kinds = ["insert", "delete", "retain"]
        .iter()
        .filter(|k| m.contains_key(**k))
        .count();
    if kinds != 1 {
        return Err(DeltaError::malformed(
            "operation must have exactly one of insert, delete, retain",
        ));
    }
    let attributes = match m.get("attributes") {
        None => AttributeMap::new(),
        Some(Value::Object(attrs)) => AttributeMap::from_json_map(attrs),
        Some(_) => return Err(DeltaError::malformed("attributes must be an object")),
    };

    let op = if let Some(insert) = m.get("insert") {
        let content = match insert {
            Value::String(s) => Content::Text(s.clone()),
            Value::Object(_) => Content::Embed(insert.clone()),
            _ => {
                return Err(DeltaError::malformed(
                    "insert must be a string or an embed object",
                ))
            }
        };
        Operation::Insert {
            content,
            attributes,
        }
    } else if let Some(delete) = m.get("delete") {
        if m.contains_key("attributes") {
            return Err(DeltaError::malformed("delete takes no attributes"));
        }
        Operation::Delete {
            length: decode_length(delete)?,
        }
    } else {
        let retain = m.get("retain").unwrap_or(&Value::Null);
        Operation::Retain {
            length: decode_length(retain)?,
            attributes,
        }
    };
    op.validate()?;
    Ok(op)
}

fn decode_length(value: &Value) -> DeltaResult<usize> {
    let n = value.as_u64().ok_or_else(|| {
        DeltaError::malformed(format!("length must be a positive integer, got {value}"))
    })?;
    if n == 0 {
        return Err(ValidationError::ZeroLength.into());
    }
    usize::try_from(n).map_err(|_| DeltaError::malformed("length out of range"))
}
