use crate::common::*;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("missing field '{path}'")]
    MissingField { path: String },
    #[error("field '{path}' is not a {expected}")]
    FieldKind {
        path: String,
        expected: &'static str,
    },
}
