use crate::common::*;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown model '{name}'; known models are: {known}")]
    UnknownModel { name: String, known: String },
    #[error("pipeline configuration error: {message}")]
    Config { message: String },
    #[error("cannot parse '{path}'")]
    Parse {
        path: PathBuf,
        source: prototext::Error,
    },
    #[error("cannot patch pipeline configuration")]
    Patch { source: prototext::Error },
    #[error("invalid label map '{path}'")]
    LabelMap {
        path: PathBuf,
        source: annotation::Error,
    },
    #[error("cannot access '{path}'")]
    Io { path: PathBuf, source: io::Error },
}
