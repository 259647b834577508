//! Training-record output: example encoding, the record container, the
//! label map, and the CSV audit dump.
//!
//! Output files are written to a temporary sibling and renamed into place;
//! record files are additionally verified by re-reading them before the
//! rename, so an aborted conversion leaves nothing usable behind.

mod common;

pub mod convert;
pub use convert::*;

pub mod csv;
pub use self::csv::*;

pub mod error;
pub use error::*;

pub mod example;
pub use example::*;

pub mod writer;
pub use writer::*;
