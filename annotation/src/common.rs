pub use indexmap::IndexSet;
pub use itertools::Itertools as _;
pub use log::warn;
pub use serde::Deserialize;
pub use std::{
    fmt,
    fmt::{Debug, Display},
    fs, io,
    path::{Path, PathBuf},
};
pub use thiserror::Error;
