//! Rich-text operation sequences.
//!
//! A [`Delta`] is a canonical list of insert, delete and retain operations
//! describing an edit of a document, or, when it only inserts, the document
//! itself. Deltas support:
//!
//! - composition of sequential edits ([`compose`])
//! - transformation of concurrent edits ([`transform`]), converging for
//!   either application order
//! - position mapping ([`Delta::transform_position`])
//! - document diffing ([`diff`])
//!
//! Formatting is carried in [`AttributeMap`]s with explicit removal markers,
//! and embeds are atomic units of length one.
//!
//! ```
//! use rich_delta::Delta;
//!
//! let a = Delta::builder().insert("Hello ", None).build();
//! let b = Delta::builder().insert("World", None).build();
//! let b2 = rich_delta::transform(&b, &a, true).unwrap();
//! assert_eq!(a.compose(&b2).unwrap(), Delta::builder().insert("Hello World", None).build());
//! ```

pub mod attributes;
pub mod codec;
pub mod compose;
pub mod cursor;
pub mod delta;
pub mod diff;
pub mod error;
pub mod op;
pub mod transform;

pub use attributes::{AttributeMap, AttributeValue};
pub use compose::{compose, Composer};
pub use cursor::OpCursor;
pub use delta::{Delta, DeltaBuilder, Line};
pub use diff::{diff, diff_with, DiffOptions};
pub use error::{DeltaError, DeltaResult, ValidationError};
pub use op::{Content, OpKind, Operation};
pub use transform::{transform, transform_position, Transformer};
