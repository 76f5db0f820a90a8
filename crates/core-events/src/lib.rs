//! The event/syntax seams the core consumes without depending on a terminal,
//! a keyboard decoder, or a syntax engine: an opaque event id, a byte-stream
//! alias, and the token-query trait the bracket-match locator reads through.
//!
//! None of these types decide what an event *means* — that partitioning is
//! the caller's responsibility (spec §6).

use std::io::Read;

/// An opaque input stimulus, typically a decoded key. The input engine only
/// ever compares these for equality or orders them within a range; it never
/// interprets the value.
pub type Event = i64;

/// "Receive file contents as a byte stream" — anything that can be read.
pub trait ByteSource: Read {}
impl<T: Read> ByteSource for T {}

/// Fixed enum of syntax roles a token can carry. `Custom` reserves room for
/// grammar-specific roles without growing this enum per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    None,
    Operator,
    Keyword,
    Identifier,
    Number,
    String,
    Comment,
    Custom(u16),
}

/// `{start_char, end_char, role}`: tokens are sequential, non-overlapping,
/// and non-zero length (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start_char: u64,
    pub end_char: u64,
    pub role: Role,
}

impl Token {
    pub fn none() -> Self {
        Self {
            start_char: 0,
            end_char: 0,
            role: Role::None,
        }
    }

    pub fn len(&self) -> u64 {
        self.end_char.saturating_sub(self.start_char)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The seam bracket-match locators consult to ignore delimiters inside
/// comments and strings (spec §4.2). When no parser is attached, callers use
/// [`NullTokenQuery`], which always answers the sentinel `None`-role token.
pub trait SyntaxTokenQuery {
    fn token_at_position(&self, pos: u64) -> Token;
}

/// Sentinel used when no parser is attached (spec §6).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTokenQuery;

impl SyntaxTokenQuery for NullTokenQuery {
    fn token_at_position(&self, _pos: u64) -> Token {
        Token::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_token_query_always_none() {
        let q = NullTokenQuery;
        let t = q.token_at_position(42);
        assert_eq!(t.role, Role::None);
        assert!(t.is_empty());
    }
}
