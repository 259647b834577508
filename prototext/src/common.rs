pub use std::{
    fmt,
    fmt::{Debug, Display},
    iter::Peekable,
    str::{Chars, FromStr},
};
pub use thiserror::Error;
