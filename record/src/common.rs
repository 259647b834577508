pub use itertools::{izip, Itertools as _};
pub use log::{debug, info};
pub use serde::{Deserialize, Serialize};
pub use std::{
    ffi::OsString,
    fmt,
    fmt::{Debug, Display},
    fs, io,
    path::{Path, PathBuf},
};
pub use tfrecord::{Example, ExampleReader, ExampleWriter, Feature, RecordReaderInit, RecordWriterInit};
pub use thiserror::Error;
