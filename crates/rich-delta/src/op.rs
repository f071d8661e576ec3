//! Operation primitives.
//!
//! # Operation format
//!
//! - `Insert { content, attributes }`: insert text or a single embed
//! - `Delete { length }`: remove `length` units of the source
//! - `Retain { length, attributes }`: keep `length` units, optionally
//!   re-formatting them
//!
//! Lengths count Unicode scalar values (Rust `char`s); an embed counts as one.

use log::debug;
use serde_json::Value;

use crate::attributes::AttributeMap;
use crate::error::{DeltaError, DeltaResult, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    /// Opaque, indivisible unit of length 1 (image, formula, widget...).
    Embed(Value),
}

impl Content {
    pub fn embed(value: Value) -> Self {
        Content::Embed(value)
    }

    pub fn len(&self) -> usize {
        match self {
            Content::Text(s) => s.chars().count(),
            Content::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(s) => s.is_empty(),
            Content::Embed(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Value> {
        match self {
            Content::Text(_) => None,
            Content::Embed(v) => Some(v),
        }
    }

    pub fn is_embed(&self) -> bool {
        matches!(self, Content::Embed(_))
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<char> for Content {
    fn from(c: char) -> Self {
        Content::Text(c.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Delete,
    Retain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert {
        content: Content,
        attributes: AttributeMap,
    },
    Delete {
        length: usize,
    },
    Retain {
        length: usize,
        attributes: AttributeMap,
    },
}

impl Operation {
    pub fn insert(content: impl Into<Content>) -> Self {
        Operation::Insert {
            content: content.into(),
            attributes: AttributeMap::new(),
        }
    }

    pub fn embed(value: Value) -> Self {
        Operation::Insert {
            content: Content::Embed(value),
            attributes: AttributeMap::new(),
        }
    }

    pub fn delete(length: usize) -> Self {
        Operation::Delete { length }
    }

    pub fn retain(length: usize) -> Self {
        Operation::Retain {
            length,
            attributes: AttributeMap::new(),
        }
    }

    /// Replaces the attributes of an insert or retain. Deletes are returned
    /// unchanged.
    pub fn with_attributes(self, attrs: AttributeMap) -> Self {
        match self {
            Operation::Insert { content, .. } => Operation::Insert {
                content,
                attributes: attrs,
            },
            Operation::Retain { length, .. } => Operation::Retain {
                length,
                attributes: attrs,
            },
            del @ Operation::Delete { .. } => del,
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Insert { .. } => OpKind::Insert,
            Operation::Delete { .. } => OpKind::Delete,
            Operation::Retain { .. } => OpKind::Retain,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Operation::Insert { content, .. } => content.len(),
            Operation::Delete { length } | Operation::Retain { length, .. } => *length,
        }
    }

    /// True for operations that change nothing and are dropped on push.
    pub fn is_empty(&self) -> bool {
        match self {
            Operation::Insert { content, .. } => content.is_empty(),
            Operation::Delete { length } | Operation::Retain { length, .. } => *length == 0,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Operation::Insert { attributes, .. } | Operation::Retain { attributes, .. } => {
                Some(attributes)
            }
            Operation::Delete { .. } => None,
        }
    }

    /// Strict well-formedness check used by [`crate::Delta::from_ops`] and the
    /// wire decoder.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Operation::Insert { content, attributes } => {
                if content.is_empty() {
                    return Err(ValidationError::EmptyInsert);
                }
                if let Some(key) = attributes.first_removal() {
                    return Err(ValidationError::TombstoneOnInsert(key.to_string()));
                }
                Ok(())
            }
            Operation::Delete { length } | Operation::Retain { length, .. } => {
                if *length == 0 {
                    Err(ValidationError::ZeroLength)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Splits into `[0, at)` and `[at, len)`. Both halves must be non-empty;
    /// an embed can never be split.
    pub fn split_at(&self, at: usize) -> DeltaResult<(Operation, Operation)> {
        let len = self.len();
        if matches!(self, Operation::Insert { content: Content::Embed(_), .. }) {
            debug!("refusing to split embed at {at}");
            return Err(DeltaError::EmbedSplit { offset: at });
        }
        if at == 0 || at >= len {
            return Err(ValidationError::InvalidRange { start: at, end: len }.into());
        }
        Ok((self.piece(0, at)?, self.piece(at, len - at)?))
    }

    /// The part of this operation covering `[offset, offset + len)`.
    pub(crate) fn piece(&self, offset: usize, len: usize) -> DeltaResult<Operation> {
        match self {
            Operation::Insert {
                content: Content::Text(s),
                attributes,
            } => Ok(Operation::Insert {
                content: Content::Text(char_slice(s, offset, len).to_string()),
                attributes: attributes.clone(),
            }),
            Operation::Insert {
                content: Content::Embed(_),
                ..
            } => {
                if offset != 0 || len != 1 {
                    let at = if offset != 0 { offset } else { len };
                    debug!("embed boundary at {at} falls inside the embed");
                    return Err(DeltaError::EmbedSplit { offset: at });
                }
                Ok(self.clone())
            }
            Operation::Delete { .. } => Ok(Operation::Delete { length: len }),
            Operation::Retain { attributes, .. } => Ok(Operation::Retain {
                length: len,
                attributes: attributes.clone(),
            }),
        }
    }
}

/// Substring of `s` covering `len` chars starting at char `start`.
pub(crate) fn char_slice(s: &str, start: usize, len: usize) -> &str {
    let mut indices = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
    let from = indices.nth(start).unwrap_or(s.len());
    let to = if len == 0 {
        from
    } else {
        indices.nth(len - 1).unwrap_or(s.len())
    };
    &s[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lengths_count_chars() {
        assert_eq!(Operation::insert("héllo").len(), 5);
        assert_eq!(Operation::embed(json!({"image": "a.png"})).len(), 1);
        assert_eq!(Operation::delete(3).len(), 3);
    }

    #[test]
    fn char_slice_handles_multibyte() {
        assert_eq!(char_slice("añb€c", 1, 3), "ñb€");
        assert_eq!(char_slice("añb€c", 0, 0), "");
        assert_eq!(char_slice("añb€c", 4, 1), "c");
        assert_eq!(char_slice("añb€c", 5, 0), "");
    }

    #[test]
    fn split_text() {
        let op = Operation::insert("hello").with_attributes(AttributeMap::new().with("bold", true));
        let (a, b) = op.split_at(2).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
        assert_eq!(a.attributes(), op.attributes());
        let bold = AttributeMap::new().with("bold", true);
        assert_eq!(b, Operation::insert("llo").with_attributes(bold));
    }

    #[test]
    fn split_embed_is_an_error() {
        let op = Operation::embed(json!({"image": "a.png"}));
        assert_eq!(op.split_at(1), Err(DeltaError::EmbedSplit { offset: 1 }));
        assert_eq!(op.piece(0, 2), Err(DeltaError::EmbedSplit { offset: 2 }));
    }

    #[test]
    fn split_out_of_range() {
        assert!(matches!(
            Operation::retain(3).split_at(3),
            Err(DeltaError::Validation(ValidationError::InvalidRange { start: 3, end: 3 }))
        ));
    }

    #[test]
    fn validate_rejects_malformed() {
        assert_eq!(Operation::delete(0).validate(), Err(ValidationError::ZeroLength));
        assert_eq!(Operation::insert("").validate(), Err(ValidationError::EmptyInsert));
        let op = Operation::insert("x").with_attributes(AttributeMap::new().without("bold"));
        assert_eq!(op.validate(), Err(ValidationError::TombstoneOnInsert("bold".into())));
    }
}
