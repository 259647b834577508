pub use anyhow::{ensure, Context as _, Result};
pub use log::{info, warn};
pub use std::{
    fs,
    path::{Path, PathBuf},
};
