//! A pull-based JSON codec for `serde`.
//!
//! Decoding runs through three layers. The [`Scanner`] cuts a byte
//! [`Source`] into raw tokens. The [`StructuralStateMachine`] checks every
//! token against the JSON grammar using an explicit nesting stack, with one
//! token of lookahead. The [`Deserializer`] routes tokens to `serde`
//! visitors. No layer recurses per nesting level, so arbitrarily deep input
//! is bounded by memory, not by the call stack.
//!
//! Encoding goes through the [`Serializer`], which appends compact JSON to a
//! buffer and places separators by looking at the last byte written.
//! Output buffers can be recycled through a [`BufferPool`].
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let p: Point = jsonpull::from_str(r#"{"y": 2, "x": -1}"#).unwrap();
//! assert_eq!(p, Point { x: -1, y: 2 });
//! assert_eq!(jsonpull::to_string(&p).unwrap(), r#"{"x":-1,"y":2}"#);
//! ```

extern crate alloc;

mod de;
mod error;
mod escape_buffer;
mod literal_buffer;
mod machine;
mod options;
mod read;
mod scanner;
mod ser;
mod token;
mod value;

#[cfg(test)]
mod tests;

pub use de::{
    Deserializer, from_reader, from_reader_with_options, from_slice, from_slice_with_options,
    from_str, from_str_with_options,
};
pub use error::{Category, Error, ErrorKind, GrammarError, LexError, Result};
pub use machine::{Frame, ParserState, StructuralStateMachine, Transition, transition};
pub use options::{DEFAULT_RECURSION_LIMIT, DeserializerOptions, NumberInference};
pub use read::{IoSource, Position, SliceSource, Source};
pub use scanner::Scanner;
pub use ser::{
    BufferPool, Compound, DEFAULT_BUFFER_CAPACITY, PooledBuffer, Serializer, to_string, to_vec,
    to_vec_pooled, to_writer,
};
pub use token::{Token, TokenKind};
pub use value::{Array, Map, Number, Value};
