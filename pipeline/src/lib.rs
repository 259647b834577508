//! Training pipeline configuration: the pre-trained model catalog and the
//! template assembler.
//!
//! Assembly has a hard ordering dependency on the dataset conversion: the
//! label map must exist before [`assemble`](assembler::assemble) runs, and
//! every patch failure is an error rather than a silently skipped field.

mod common;

pub mod assembler;
pub use assembler::*;

pub mod error;
pub use error::*;

pub mod zoo;
pub use zoo::*;
