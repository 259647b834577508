use crate::common::*;

#[derive(Debug, Error)]
pub enum Error {
    #[error("image '{path}' referenced by its annotation does not exist")]
    MissingImage { path: PathBuf },
    #[error("cannot decode image '{path}': {message}")]
    CorruptImage { path: PathBuf, message: String },
    #[error(
        "image '{path}' is {probed_width}x{probed_height} \
         but its annotation says {annotated_width}x{annotated_height}"
    )]
    DimensionMismatch {
        path: PathBuf,
        probed_width: u32,
        probed_height: u32,
        annotated_width: u32,
        annotated_height: u32,
    },
    #[error("malformed example: {message}")]
    MalformedExample { message: String },
    #[error("record file '{path}' failed verification: wrote {expected} examples, read back {actual}")]
    Verify {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("record file '{path}'")]
    Record {
        path: PathBuf,
        source: tfrecord::Error,
    },
    #[error("csv file '{path}'")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("cannot access '{path}'")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Annotation(#[from] annotation::Error),
}
