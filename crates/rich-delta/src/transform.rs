//! Concurrent-edit transformation and position mapping.
//!
//! Given two deltas `a` and `b` built against the same document,
//! `transform(b, a, priority)` rewrites `b` so that it applies after `a`.
//! `priority` breaks ties in favour of `a`: its inserts at the same index go
//! first and its attribute values win conflicts. Applying both orders
//! converges:
//!
//! ```text
//! compose(a, transform(b, a, false)) == compose(b, transform(a, b, true))
//! ```

use log::trace;

use crate::attributes::AttributeMap;
use crate::cursor::{min_len, OpCursor};
use crate::delta::{Delta, DeltaBuilder};
use crate::error::DeltaResult;
use crate::op::{OpKind, Operation};

/// Incremental transformation of `other` against the concurrent `this`.
#[derive(Debug)]
pub struct Transformer<'a> {
    this: OpCursor<'a>,
    other: OpCursor<'a>,
    priority: bool,
    out: DeltaBuilder,
}

impl<'a> Transformer<'a> {
    pub fn new(this: &'a Delta, other: &'a Delta, priority: bool) -> Self {
        Self {
            this: OpCursor::new(this.ops()),
            other: OpCursor::new(other.ops()),
            priority,
            out: DeltaBuilder::with_capacity(this.ops().len() + other.ops().len()),
        }
    }

    pub fn is_done(&self) -> bool {
        !self.this.has_next() && !self.other.has_next()
    }

    /// Returns `false` once both inputs are exhausted.
    pub fn step(&mut self) -> DeltaResult<bool> {
        if self.is_done() {
            return Ok(false);
        }
        let this_kind = self.this.peek_kind();
        let other_kind = self.other.peek_kind();
        if this_kind == OpKind::Insert && (self.priority || other_kind != OpKind::Insert) {
            // Step over content the concurrent side inserted.
            if let Some(len) = self.this.peek_len() {
                self.this.skip(len);
                self.out.push(Operation::retain(len));
            }
            return Ok(true);
        }
        if other_kind == OpKind::Insert {
            if let Some(op) = self.other.next_op()? {
                self.out.push(op);
            }
            return Ok(true);
        }
        let Some(len) = min_len(self.this.peek_len(), self.other.peek_len()) else {
            return Ok(false);
        };
        let this_op = self.this.next(len)?;
        let other_op = self.other.next(len)?;
        match (this_op, other_op) {
            // Already gone: nothing to retain, and deleting it again is a no-op.
            (Operation::Delete { .. }, _) => {}
            (_, del @ Operation::Delete { .. }) => {
                self.out.push(del);
            }
            (
                Operation::Retain { attributes, .. },
                Operation::Retain {
                    length,
                    attributes: other_attrs,
                },
            ) => {
                self.out.push(Operation::Retain {
                    length,
                    attributes: AttributeMap::transform(&attributes, &other_attrs, self.priority),
                });
            }
            _ => {}
        }
        Ok(true)
    }

    pub fn finish(mut self) -> Delta {
        self.out.chop();
        self.out.build()
    }

    pub fn run(mut self) -> DeltaResult<Delta> {
        while self.step()? {}
        Ok(self.finish())
    }
}

/// Rewrites `op` to apply after the concurrent `against`.
pub fn transform(op: &Delta, against: &Delta, priority: bool) -> DeltaResult<Delta> {
    trace!(
        "transform: {} ops against {} ops, priority={priority}",
        op.ops().len(),
        against.ops().len()
    );
    Transformer::new(against, op, priority).run()
}

/// Maps `index` through the edits of `delta`.
///
/// An insert exactly at `index` shifts it only when `priority` is set;
/// otherwise the position stays in front of the inserted content. A delete
/// straddling `index` pulls it back to the start of the deleted span.
pub fn transform_position(delta: &Delta, index: usize, priority: bool) -> usize {
    let mut index = index;
    let mut offset = 0;
    let mut cursor = OpCursor::new(delta.ops());
    while offset <= index {
        let (Some(len), kind) = (cursor.peek_len(), cursor.peek_kind()) else {
            break;
        };
        cursor.skip(len);
        match kind {
            OpKind::Delete => {
                index -= len.min(index - offset);
                continue;
            }
            OpKind::Insert if offset < index || priority => {
                index += len;
            }
            _ => {}
        }
        offset += len;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_against_insert() {
        let a = Delta::builder().insert("A", None).build();
        let b = Delta::builder().insert("B", None).build();
        assert_eq!(
            transform(&b, &a, true).unwrap(),
            Delta::builder().retain(1, None).insert("B", None).build()
        );
        assert_eq!(transform(&b, &a, false).unwrap(), Delta::builder().insert("B", None).build());
    }

    #[test]
    fn retain_against_insert() {
        let a = Delta::builder().insert("A", None).build();
        let b = Delta::builder().retain(1, AttributeMap::new().with("bold", true)).build();
        assert_eq!(
            transform(&b, &a, true).unwrap(),
            Delta::builder()
                .retain(1, None)
                .retain(1, AttributeMap::new().with("bold", true))
                .build()
        );
    }

    #[test]
    fn delete_against_delete_is_absorbed() {
        let a = Delta::builder().delete(1).build();
        let b = Delta::builder().delete(1).build();
        assert!(transform(&b, &a, false).unwrap().is_empty());
    }

    #[test]
    fn delete_against_retain() {
        let a = Delta::builder().retain(1, None).build();
        let b = Delta::builder().delete(1).build();
        assert_eq!(transform(&b, &a, false).unwrap(), b);
    }

    #[test]
    fn insert_against_delete() {
        let a = Delta::builder().delete(1).build();
        let b = Delta::builder().insert("B", None).build();
        assert_eq!(transform(&b, &a, true).unwrap(), b);
    }

    #[test]
    fn retain_attributes_respect_priority() {
        let a = Delta::builder()
            .retain(1, AttributeMap::new().with("bold", true).with("color", "red"))
            .build();
        let b = Delta::builder()
            .retain(1, AttributeMap::new().with("bold", false).with("italic", true))
            .build();
        assert_eq!(
            transform(&b, &a, true).unwrap(),
            Delta::builder()
                .retain(1, AttributeMap::new().with("italic", true))
                .build()
        );
        assert_eq!(transform(&b, &a, false).unwrap(), b);
    }

    #[test]
    fn method_form_matches_free_function() {
        let a = Delta::builder().retain(2, None).insert("si", None).delete(5).build();
        let b = Delta::builder()
            .retain(1, None)
            .insert("e", None)
            .delete(5)
            .insert("ow", None)
            .build();
        assert_eq!(a.transform(&b, true).unwrap(), transform(&b, &a, true).unwrap());
    }

    #[test]
    fn position_before_insert() {
        let delta = Delta::builder().retain(2, None).insert("X", None).build();
        assert_eq!(transform_position(&delta, 1, false), 1);
        assert_eq!(transform_position(&delta, 2, false), 2);
        assert_eq!(transform_position(&delta, 2, true), 3);
        assert_eq!(transform_position(&delta, 3, false), 4);
    }

    #[test]
    fn position_through_delete() {
        let delta = Delta::builder().retain(2, None).delete(3).build();
        assert_eq!(transform_position(&delta, 1, false), 1);
        assert_eq!(transform_position(&delta, 3, false), 2);
        assert_eq!(transform_position(&delta, 6, false), 3);
        let delta = Delta::builder().delete(4).build();
        assert_eq!(transform_position(&delta, 2, false), 0);
    }

    #[test]
    fn position_through_mixed_edit() {
        let delta = Delta::builder()
            .retain(2, None)
            .insert("A", None)
            .delete(2)
            .insert("B", None)
            .build();
        assert_eq!(transform_position(&delta, 4, false), 4);
        assert_eq!(transform_position(&delta, 5, false), 5);
    }
}
