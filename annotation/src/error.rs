use crate::common::*;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{path}' does not exist")]
    NotFound { path: PathBuf },
    #[error("no annotation files found in '{path}'")]
    NoAnnotations { path: PathBuf },
    #[error("cannot parse annotation '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid bounding box for class '{class_name}': {message}")]
    InvalidBox {
        class_name: String,
        message: String,
    },
    #[error("invalid annotation: {message}")]
    Invalid { message: String },
    #[error("invalid label map: {message}")]
    LabelMap { message: String },
    #[error("invalid search pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("cannot read '{path}'")]
    Io { path: PathBuf, source: io::Error },
}
