//! Fatal errors (spec §7): `ParseExpressionInvalid` at compile time,
//! `SerializationError` on load.

use core_events::Event;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("expression has no alternatives or elements")]
    InvalidExprType,
    #[error("inverted event range {0}..{1}")]
    InvalidRange(Event, Event),
    #[error("duplicate command id {0}")]
    DuplicateCmdId(u32),
    #[error("capture {0} nests inside another capture")]
    NestedCapture(u32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated varint")]
    TruncatedVarint,
    #[error("unknown tag {0}")]
    UnknownTag(u8),
}
