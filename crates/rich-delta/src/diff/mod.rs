//! Document diff.
//!
//! Both inputs are flattened into units (one per char, one per embed) and
//! diffed with Myers' algorithm. Embeds are compared whole by deep equality,
//! never char by char. Equal runs whose formatting differs become attributed
//! retains, so `compose(a, diff(a, b)) == b` holds for formatting too.
//!
//! Complexity is O((N + M) · D) time for inputs of N and M units differing in
//! D edits, after stripping the common prefix and suffix in linear time.

pub mod myers;

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::AttributeMap;
use crate::cursor::OpCursor;
use crate::delta::{Delta, DeltaBuilder};
use crate::error::{DeltaError, DeltaResult, ValidationError};
use crate::op::{Content, Operation};

use myers::Edit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Caret position in the target document, when known. A single insert
    /// or delete ending at the caret is then found without a full diff.
    pub cursor: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit<'a> {
    Char(char),
    Embed(&'a Value),
}

fn units(doc: &Delta) -> DeltaResult<Vec<Unit<'_>>> {
    let mut out = Vec::with_capacity(doc.length());
    for op in doc {
        match op {
            Operation::Insert {
                content: Content::Text(text),
                ..
            } => out.extend(text.chars().map(Unit::Char)),
            Operation::Insert {
                content: Content::Embed(value),
                ..
            } => out.push(Unit::Embed(value)),
            _ => return Err(ValidationError::NotADocument.into()),
        }
    }
    Ok(out)
}

pub fn diff(a: &Delta, b: &Delta) -> DeltaResult<Delta> {
    diff_with(a, b, DiffOptions::default())
}

/// Delta turning document `a` into document `b`.
pub fn diff_with(a: &Delta, b: &Delta, options: DiffOptions) -> DeltaResult<Delta> {
    let src = units(a)?;
    let dst = units(b)?;
    if a == b {
        return Ok(Delta::new());
    }
    trace!("diff: {} units against {} units", src.len(), dst.len());
    let script = match options.cursor {
        Some(caret) => myers::diff_edit(&src, &dst, caret),
        None => myers::diff(&src, &dst),
    };

    let overrun = || DeltaError::malformed("diff script overruns its input");
    let mut this = OpCursor::new(a.ops());
    let mut other = OpCursor::new(b.ops());
    let mut out = DeltaBuilder::new();
    for (edit, len) in script {
        let mut left = len;
        while left > 0 {
            match edit {
                Edit::Ins => {
                    let take = other.peek_len().ok_or_else(overrun)?.min(left);
                    out.push(other.next(take)?);
                    left -= take;
                }
                Edit::Del => {
                    let take = this.peek_len().ok_or_else(overrun)?.min(left);
                    this.skip(take);
                    out.push(Operation::delete(take));
                    left -= take;
                }
                Edit::Eql => {
                    let take = this
                        .peek_len()
                        .zip(other.peek_len())
                        .ok_or_else(overrun)?;
                    let take = take.0.min(take.1).min(left);
                    let this_op = this.next(take)?;
                    let other_op = other.next(take)?;
                    match (&this_op, &other_op) {
                        (
                            Operation::Insert {
                                content,
                                attributes,
                            },
                            Operation::Insert {
                                content: other_content,
                                attributes: other_attrs,
                            },
                        ) if content == other_content => {
                            out.push(Operation::Retain {
                                length: take,
                                attributes: AttributeMap::diff(attributes, other_attrs),
                            });
                        }
                        _ => {
                            out.push(other_op);
                            out.push(Operation::delete(take));
                        }
                    }
                    left -= take;
                }
            }
        }
    }
    out.chop();
    Ok(out.build())
}
