//! Sequential composition of two deltas.

use log::trace;

use crate::attributes::AttributeMap;
use crate::cursor::{min_len, OpCursor};
use crate::delta::{Delta, DeltaBuilder};
use crate::error::DeltaResult;
use crate::op::{OpKind, Operation};

/// Incremental composition of `a` followed by `b`.
///
/// Each [`Composer::step`] consumes one aligned span from the two inputs and
/// emits at most one operation.
#[derive(Debug)]
pub struct Composer<'a> {
    this: OpCursor<'a>,
    other: OpCursor<'a>,
    out: DeltaBuilder,
}

impl<'a> Composer<'a> {
    pub fn new(a: &'a Delta, b: &'a Delta) -> Self {
        Self {
            this: OpCursor::new(a.ops()),
            other: OpCursor::new(b.ops()),
            out: DeltaBuilder::with_capacity(a.ops().len() + b.ops().len()),
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
        // Content inserted by `b` passes through untouched.
        if self.other.peek_kind() == OpKind::Insert {
            if let Some(op) = self.other.next_op()? {
                self.out.push(op);
            }
            return Ok(true);
        }
        // `a` deleted base content `b` never saw.
        if self.this.peek_kind() == OpKind::Delete {
            if let Some(op) = self.this.next_op()? {
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
            (
                Operation::Insert {
                    content,
                    attributes,
                },
                Operation::Retain {
                    attributes: other_attrs,
                    ..
                },
            ) => {
                self.out.push(Operation::Insert {
                    content,
                    attributes: AttributeMap::compose(&attributes, &other_attrs, false),
                });
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
                    attributes: AttributeMap::compose(&attributes, &other_attrs, true),
                });
            }
            (Operation::Retain { .. }, del @ Operation::Delete { .. }) => {
                self.out.push(del);
            }
            // Insert then delete cancel out. Deletes from `a` and inserts
            // from `b` never reach this point.
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

/// Composes `a` then `b` into a single delta with the same effect.
///
/// Lengths are not checked: past its last operation a delta implicitly
/// retains, so a `b` that consumes more than `a` produces is composed as if
/// `a` were followed by that much untouched content. Composing a document
/// with an edit that is too long therefore yields a non-document instead of
/// an error. Use [`Delta::apply`] to apply an edit to a document with the
/// length check.
pub fn compose(a: &Delta, b: &Delta) -> DeltaResult<Delta> {
    trace!("compose: {} ops then {} ops", a.ops().len(), b.ops().len());
    Composer::new(a, b).run()
}
