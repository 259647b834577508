//! Pascal VOC-style annotations and the label vocabulary.
//!
//! Parsing is strict: malformed XML, missing fields, degenerate or
//! out-of-bounds boxes all fail loudly instead of being skipped, and
//! directory scans process files in sorted order so downstream id
//! assignment is reproducible.

mod common;

pub mod error;
pub use error::*;

pub mod types;
pub use types::*;

pub mod voc;
pub use voc::*;

pub mod vocabulary;
pub use vocabulary::*;
