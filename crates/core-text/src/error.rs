//! Fatal construction errors (spec §7). Everything else is a value return.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid UTF-8 at byte offset {byte_offset}")]
    InvalidUtf8 { byte_offset: usize },
}
