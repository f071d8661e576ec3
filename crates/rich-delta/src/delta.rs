//! The operation sequence and its builder.
//!
//! A [`Delta`] is always canonical: adjacent operations of the same kind and
//! attributes are coalesced, no-ops are dropped, and an insert never directly
//! follows a delete. Deltas are built with a [`DeltaBuilder`] and are
//! immutable once sealed; every operation on them returns a new value.
//!
//! Content past the last operation is implicitly retained, so a delta that
//! only inserts doubles as a document.

use std::fmt;

use log::debug;
use serde_json::Value;

use crate::attributes::AttributeMap;
use crate::cursor::OpCursor;
use crate::diff::DiffOptions;
use crate::error::{DeltaError, DeltaResult, ValidationError};
use crate::op::{Content, OpKind, Operation};

#[derive(Debug, Clone, Default)]
pub struct DeltaBuilder {
    ops: Vec<Operation>,
}

impl DeltaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(
        mut self,
        content: impl Into<Content>,
        attributes: impl Into<Option<AttributeMap>>,
    ) -> Self {
        self.push(Operation::Insert {
            content: content.into(),
            attributes: attributes.into().unwrap_or_default(),
        });
        self
    }

    pub fn insert_embed(
        mut self,
        embed: Value,
        attributes: impl Into<Option<AttributeMap>>,
    ) -> Self {
        self.push(Operation::Insert {
            content: Content::Embed(embed),
            attributes: attributes.into().unwrap_or_default(),
        });
        self
    }

    pub fn delete(mut self, length: usize) -> Self {
        self.push(Operation::Delete { length });
        self
    }

    pub fn retain(mut self, length: usize, attributes: impl Into<Option<AttributeMap>>) -> Self {
        self.push(Operation::Retain {
            length,
            attributes: attributes.into().unwrap_or_default(),
        });
        self
    }

    /// Appends `op`, keeping the sequence canonical.
    pub fn push(&mut self, op: Operation) -> &mut Self {
        let op = match op {
            _ if op.is_empty() => return self,
            Operation::Insert {
                content,
                attributes,
            } if attributes.first_removal().is_some() => Operation::Insert {
                content,
                attributes: attributes.without_removals(),
            },
            op => op,
        };

        let mut index = self.ops.len();
        if let (Some(Operation::Delete { length: last }), Operation::Delete { length }) =
            (self.ops.last_mut(), &op)
        {
            *last += length;
            return self;
        }
        // Inserts are ordered before an adjacent delete.
        if op.kind() == OpKind::Insert
            && matches!(self.ops.last(), Some(Operation::Delete { .. }))
        {
            index -= 1;
        }
        let op = match index.checked_sub(1) {
            Some(prev) => match merge_into(&mut self.ops[prev], op) {
                Some(op) => op,
                None => return self,
            },
            None => op,
        };
        self.ops.insert(index, op);
        self
    }

    /// Drops a trailing plain retain.
    pub fn chop(&mut self) -> &mut Self {
        if let Some(Operation::Retain { attributes, .. }) = self.ops.last() {
            if attributes.is_empty() {
                self.ops.pop();
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn build(self) -> Delta {
        Delta { ops: self.ops }
    }
}

/// Merges `op` into `prev` when both are text inserts or retains with equal
/// attributes. Hands `op` back otherwise.
fn merge_into(prev: &mut Operation, op: Operation) -> Option<Operation> {
    match (prev, op) {
        (
            Operation::Insert {
                content: Content::Text(text),
                attributes,
            },
            Operation::Insert {
                content: Content::Text(more),
                attributes: more_attrs,
            },
        ) if *attributes == more_attrs => {
            text.push_str(&more);
            None
        }
        (
            Operation::Retain { length, attributes },
            Operation::Retain {
                length: more,
                attributes: more_attrs,
            },
        ) if *attributes == more_attrs => {
            *length += more;
            None
        }
        (_, op) => Some(op),
    }
}

/// A line of a document together with the attributes of its newline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub content: Delta,
    pub attributes: AttributeMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    ops: Vec<Operation>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DeltaBuilder {
        DeltaBuilder::new()
    }

    /// Canonicalises `ops`, rejecting malformed operations instead of
    /// silently dropping them.
    pub fn from_ops(ops: impl IntoIterator<Item = Operation>) -> DeltaResult<Self> {
        let mut builder = DeltaBuilder::new();
        for op in ops {
            op.validate()?;
            builder.push(op);
        }
        Ok(builder.build())
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Operation> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True when the delta only inserts, i.e. it describes a document.
    pub fn is_document(&self) -> bool {
        self.ops.iter().all(|op| op.kind() == OpKind::Insert)
    }

    /// Sum of the lengths of all operations.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Operation::len).sum()
    }

    /// Units of the source document this delta consumes.
    pub fn base_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind() != OpKind::Insert)
            .map(Operation::len)
            .sum()
    }

    /// Units this delta produces, not counting the implicit trailing retain.
    pub fn target_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind() != OpKind::Delete)
            .map(Operation::len)
            .sum()
    }

    /// Net change in document length.
    pub fn change_length(&self) -> i64 {
        self.ops.iter().fold(0i64, |acc, op| match op.kind() {
            OpKind::Insert => acc + op.len() as i64,
            OpKind::Delete => acc - op.len() as i64,
            OpKind::Retain => acc,
        })
    }

    pub fn chop(&self) -> Delta {
        let mut builder = DeltaBuilder {
            ops: self.ops.clone(),
        };
        builder.chop();
        builder.build()
    }

    /// Operations covering `[start, end)`, measured in [`Delta::length`]
    /// units. `end` defaults to, and is clamped to, the full length.
    pub fn slice(&self, start: usize, end: Option<usize>) -> DeltaResult<Delta> {
        let end = end.unwrap_or(usize::MAX);
        if start > end {
            return Err(ValidationError::InvalidRange { start, end }.into());
        }
        let mut out = DeltaBuilder::new();
        let mut cursor = OpCursor::new(&self.ops);
        let mut index = 0;
        while index < end && cursor.has_next() {
            if index < start {
                index += cursor.skip(start - index);
            } else {
                let op = cursor.next(end - index)?;
                index += op.len();
                out.push(op);
            }
        }
        Ok(out.build())
    }

    /// Appends `other`, merging the seam.
    pub fn concat(&self, other: &Delta) -> Delta {
        let mut builder = DeltaBuilder {
            ops: self.ops.clone(),
        };
        for op in &other.ops {
            builder.push(op.clone());
        }
        builder.build()
    }

    pub fn compose(&self, other: &Delta) -> DeltaResult<Delta> {
        crate::compose::compose(self, other)
    }

    /// Rewrites `other`, concurrent with `self`, to apply after `self`.
    /// With `priority`, `self` is considered to have happened first.
    pub fn transform(&self, other: &Delta, priority: bool) -> DeltaResult<Delta> {
        crate::transform::transform(other, self, priority)
    }

    /// Maps `index` through this delta. `priority` defaults to `false`: a
    /// position at the same index as an insert stays in front of it.
    pub fn transform_position(&self, index: usize, priority: impl Into<Option<bool>>) -> usize {
        let priority = priority.into().unwrap_or(false);
        crate::transform::transform_position(self, index, priority)
    }

    pub fn diff(&self, other: &Delta) -> DeltaResult<Delta> {
        crate::diff::diff(self, other)
    }

    pub fn diff_with(&self, other: &Delta, options: DiffOptions) -> DeltaResult<Delta> {
        crate::diff::diff_with(self, other, options)
    }

    /// Applies this edit to the document `doc`.
    pub fn apply(&self, doc: &Delta) -> DeltaResult<Delta> {
        ensure_fits(self, doc)?;
        doc.compose(self)
    }

    /// The delta that undoes `self` once it has been applied to `base`.
    pub fn invert(&self, base: &Delta) -> DeltaResult<Delta> {
        ensure_fits(self, base)?;
        let mut out = DeltaBuilder::with_capacity(self.ops.len());
        let mut base_cursor = OpCursor::new(&base.ops);
        for op in &self.ops {
            match op {
                Operation::Insert { content, .. } => {
                    out.push(Operation::Delete {
                        length: content.len(),
                    });
                }
                Operation::Retain { length, attributes } if attributes.is_empty() => {
                    out.push(Operation::retain(*length));
                    let mut left = *length;
                    while left > 0 && base_cursor.has_next() {
                        left -= base_cursor.skip(left);
                    }
                }
                Operation::Retain { length, attributes } => {
                    let mut left = *length;
                    while left > 0 && base_cursor.has_next() {
                        let base_op = base_cursor.next(left)?;
                        left -= base_op.len();
                        let base_attrs = base_op.attributes().cloned().unwrap_or_default();
                        out.push(Operation::Retain {
                            length: base_op.len(),
                            attributes: AttributeMap::invert(attributes, &base_attrs),
                        });
                    }
                }
                Operation::Delete { length } => {
                    let mut left = *length;
                    while left > 0 && base_cursor.has_next() {
                        let base_op = base_cursor.next(left)?;
                        left -= base_op.len();
                        out.push(base_op);
                    }
                }
            }
        }
        out.chop();
        Ok(out.build())
    }

    /// Splits a document into lines at `newline`.
    pub fn lines(&self, newline: char) -> DeltaResult<Vec<Line>> {
        if !self.is_document() {
            return Err(ValidationError::NotADocument.into());
        }
        let mut lines = Vec::new();
        let mut line = DeltaBuilder::new();
        let mut cursor = OpCursor::new(&self.ops);
        while cursor.has_next() {
            let found = cursor
                .peek_text()
                .and_then(|text| text.chars().position(|c| c == newline));
            match found {
                Some(0) => {
                    let newline_op = cursor.next(1)?;
                    lines.push(Line {
                        content: std::mem::take(&mut line).build(),
                        attributes: newline_op.attributes().cloned().unwrap_or_default(),
                    });
                }
                Some(n) => {
                    line.push(cursor.next(n)?);
                }
                None => {
                    if let Some(op) = cursor.next_op()? {
                        line.push(op);
                    }
                }
            }
        }
        if !line.is_empty() {
            lines.push(Line {
                content: line.build(),
                attributes: AttributeMap::new(),
            });
        }
        Ok(lines)
    }

    pub fn to_json(&self) -> Value {
        crate::codec::json::to_json(self)
    }

    pub fn from_json(value: &Value) -> DeltaResult<Delta> {
        crate::codec::json::from_json(value)
    }
}

/// `doc` must be a document at least as long as what `delta` consumes.
fn ensure_fits(delta: &Delta, doc: &Delta) -> DeltaResult<()> {
    if !doc.is_document() {
        return Err(ValidationError::NotADocument.into());
    }
    let (expected, actual) = (doc.length(), delta.base_len());
    if actual > expected {
        debug!("delta consumes {actual} units of a {expected} unit document");
        return Err(DeltaError::LengthMismatch { expected, actual });
    }
    Ok(())
}

impl FromIterator<Operation> for Delta {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut builder = DeltaBuilder::new();
        for op in iter {
            builder.push(op);
        }
        builder.build()
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
