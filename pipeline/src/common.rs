pub use itertools::Itertools as _;
pub use log::{debug, info};
pub use std::{
    collections::HashSet,
    ffi::OsString,
    fmt,
    fmt::{Debug, Display},
    fs, io,
    path::{Path, PathBuf},
};
pub use thiserror::Error;
