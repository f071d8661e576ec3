//! Cursor over a list of operations that can hand out partial operations.
//!
//! Past the last operation the cursor behaves as an unbounded plain retain,
//! which is how a delta's implicit trailing retain is modelled.

use crate::attributes::AttributeMap;
use crate::error::{DeltaResult, ValidationError};
use crate::op::{Content, OpKind, Operation};

/// Walks each operation once: the char length of the current operation is
/// cached on entry and text is sliced from a byte offset, so taking many
/// small pieces of one long insert stays linear.
#[derive(Debug, Clone)]
pub struct OpCursor<'a> {
    ops: &'a [Operation],
    index: usize,
    offset: usize,
    byte_offset: usize,
    op_len: usize,
}

impl<'a> OpCursor<'a> {
    pub fn new(ops: &'a [Operation]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
            byte_offset: 0,
            op_len: ops.first().map_or(0, Operation::len),
        }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    /// The current operation, of which `offset()` units are already consumed.
    pub fn peek(&self) -> Option<&'a Operation> {
        self.ops.get(self.index)
    }

    /// Units left in the current operation; `None` once exhausted.
    pub fn peek_len(&self) -> Option<usize> {
        self.peek().map(|_| self.op_len - self.offset)
    }

    pub fn peek_kind(&self) -> OpKind {
        self.peek().map_or(OpKind::Retain, Operation::kind)
    }

    /// Unconsumed text of the current operation, if it is a text insert.
    pub fn peek_text(&self) -> Option<&'a str> {
        match self.peek()? {
            Operation::Insert {
                content: Content::Text(text),
                ..
            } => Some(&text[self.byte_offset..]),
            _ => None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Takes up to `len` units from the current operation.
    pub fn next(&mut self, len: usize) -> DeltaResult<Operation> {
        if len == 0 {
            return Err(ValidationError::ZeroLength.into());
        }
        let Some(op) = self.ops.get(self.index) else {
            return Ok(Operation::Retain {
                length: len,
                attributes: AttributeMap::new(),
            });
        };
        let remaining = self.op_len - self.offset;
        let take = len.min(remaining);
        if self.offset == 0 && take == remaining {
            self.advance(take, remaining, 0);
            return Ok(op.clone());
        }
        let bytes = self.text_bytes(take);
        let piece = match op {
            Operation::Insert {
                content: Content::Text(text),
                attributes,
            } => {
                let end = self.byte_offset + bytes;
                Operation::Insert {
                    content: Content::Text(text[self.byte_offset..end].to_string()),
                    attributes: attributes.clone(),
                }
            }
            _ => op.piece(self.offset, take)?,
        };
        self.advance(take, remaining, bytes);
        Ok(piece)
    }

    /// Takes whatever is left of the current operation.
    pub fn next_op(&mut self) -> DeltaResult<Option<Operation>> {
        match self.peek_len() {
            Some(len) => self.next(len).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`OpCursor::next`] but only moves the cursor. Returns the number
    /// of units skipped.
    pub fn skip(&mut self, len: usize) -> usize {
        match self.peek_len() {
            Some(remaining) => {
                let take = len.min(remaining);
                let bytes = if take == remaining {
                    0
                } else {
                    self.text_bytes(take)
                };
                self.advance(take, remaining, bytes);
                take
            }
            None => len,
        }
    }

    /// Byte width of the next `len` chars of a text insert; zero otherwise.
    fn text_bytes(&self, len: usize) -> usize {
        match self.peek_text() {
            Some(rest) => rest.char_indices().nth(len).map_or(rest.len(), |(i, _)| i),
            None => 0,
        }
    }

    fn advance(&mut self, take: usize, remaining: usize, bytes: usize) {
        if take == remaining {
            self.index += 1;
            self.offset = 0;
            self.byte_offset = 0;
            self.op_len = self.peek().map_or(0, Operation::len);
        } else {
            self.offset += take;
            self.byte_offset += bytes;
        }
    }
}

/// Smaller of two cursor lengths, where `None` is unbounded.
pub(crate) fn min_len(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(n), None) | (None, Some(n)) => Some(n),
        (None, None) => None,
    }
}
