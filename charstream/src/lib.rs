//! Position-tracked, backtrackable access to a sequence of code points.
//!
//! Parsers built on top of this crate try a production by taking a
//! [`Checkpoint`], driving the stream through it, and either committing the
//! progress or letting the guard rewind on the way out.

mod position;
mod stream;

pub use position::Position;
pub use stream::{is_identifier, is_whitespace, CharStream, Checkpoint};
