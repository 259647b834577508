//! Protocol-buffer text-format documents: parse, edit, serialize.
//!
//! The format is the human-readable one used by label maps and training
//! pipeline templates. Documents are ordered field multimaps, so repeated
//! fields survive a parse/serialize round trip, and serialization is a
//! fixed point of `parse` followed by `Display`.

mod common;

pub mod document;
pub use document::*;

pub mod error;
pub use error::*;

mod lexer;

pub mod parser;
pub use parser::*;
