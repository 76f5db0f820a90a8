//! Bracket/delimiter matching (spec §4.2). Delimiters found inside a comment
//! or string token are skipped, via the [`SyntaxTokenQuery`] seam; if the
//! search position itself starts inside such a token, matching falls back to
//! scanning the whole document instead of refusing to answer.

use crate::common::char_at;
use core_events::{Role, SyntaxTokenQuery};
use core_text::Rope;

pub const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

fn is_in_code(tokens: &dyn SyntaxTokenQuery, pos: u64) -> bool {
    !matches!(tokens.token_at_position(pos).role, Role::Comment | Role::String)
}

fn pair_for(c: char) -> Option<(char, char)> {
    PAIRS.into_iter().find(|&(o, cl)| o == c || cl == c)
}

/// If `pos` sits on a bracket, return the position of its partner.
pub fn matching_code_block_delimiter(rope: &Rope, tokens: &dyn SyntaxTokenQuery, pos: u64) -> Option<u64> {
    let c = char_at(rope, pos)?;
    let (open, close) = pair_for(c)?;
    let starts_in_code = is_in_code(tokens, pos);
    if c == open {
        next_unmatched_close_inner(rope, tokens, (open, close), pos + 1, starts_in_code)
    } else {
        prev_unmatched_open_inner(rope, tokens, (open, close), pos, starts_in_code)
    }
}

fn next_unmatched_close_inner(
    rope: &Rope,
    tokens: &dyn SyntaxTokenQuery,
    pair: (char, char),
    from: u64,
    restrict_to_code: bool,
) -> Option<u64> {
    let (open, close) = pair;
    let mut depth = 0i64;
    let mut p = from;
    while let Some(c) = char_at(rope, p) {
        if !restrict_to_code || is_in_code(tokens, p) {
            if c == open {
                depth += 1;
            } else if c == close {
                if depth == 0 {
                    return Some(p);
                }
                depth -= 1;
            }
        }
        p += 1;
    }
    None
}

fn prev_unmatched_open_inner(
    rope: &Rope,
    tokens: &dyn SyntaxTokenQuery,
    pair: (char, char),
    before: u64,
    restrict_to_code: bool,
) -> Option<u64> {
    let (open, close) = pair;
    let mut depth = 0i64;
    let mut p = before;
    while p > 0 {
        p -= 1;
        if let Some(c) = char_at(rope, p) {
            if !restrict_to_code || is_in_code(tokens, p) {
                if c == close {
                    depth += 1;
                } else if c == open {
                    if depth == 0 {
                        return Some(p);
                    }
                    depth -= 1;
                }
            }
        }
    }
    None
}

/// Nearest unmatched opener of `pair` strictly before `pos`.
pub fn prev_unmatched_open(rope: &Rope, tokens: &dyn SyntaxTokenQuery, pair: (char, char), pos: u64) -> Option<u64> {
    let restrict = is_in_code(tokens, pos.saturating_sub(1).min(pos));
    prev_unmatched_open_inner(rope, tokens, pair, pos, restrict)
}

/// Nearest unmatched closer of `pair` at or after `pos`.
pub fn next_unmatched_close(rope: &Rope, tokens: &dyn SyntaxTokenQuery, pair: (char, char), pos: u64) -> Option<u64> {
    let restrict = is_in_code(tokens, pos);
    next_unmatched_close_inner(rope, tokens, pair, pos, restrict)
}

/// The smallest delimited block of `pair` enclosing `pos`, as `(start, end)`
/// char positions. `include_delims` controls whether the delimiters
/// themselves are part of the returned range.
pub fn delimited_block(
    rope: &Rope,
    tokens: &dyn SyntaxTokenQuery,
    pair: (char, char),
    include_delims: bool,
    pos: u64,
) -> Option<(u64, u64)> {
    let open = prev_unmatched_open(rope, tokens, pair, pos + 1)?;
    let close = next_unmatched_close(rope, tokens, pair, pos)?;
    if close < open {
        return None;
    }
    if include_delims {
        Some((open, close + 1))
    } else {
        Some((open + 1, close))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{NullTokenQuery, Token};
    use core_text::Rope;

    #[test]
    fn matches_nested_parens() {
        let rope = Rope::from_str("a(b(c)d)e").unwrap();
        let q = NullTokenQuery;
        assert_eq!(matching_code_block_delimiter(&rope, &q, 1), Some(7));
        assert_eq!(matching_code_block_delimiter(&rope, &q, 7), Some(1));
        assert_eq!(matching_code_block_delimiter(&rope, &q, 3), Some(5));
    }

    #[test]
    fn delimited_block_respects_include_delims() {
        let rope = Rope::from_str("x[abc]y").unwrap();
        let q = NullTokenQuery;
        assert_eq!(delimited_block(&rope, &q, ('[', ']'), false, 3), Some((2, 5)));
        assert_eq!(delimited_block(&rope, &q, ('[', ']'), true, 3), Some((1, 6)));
    }

    struct StringSpan(u64, u64);
    impl SyntaxTokenQuery for StringSpan {
        fn token_at_position(&self, pos: u64) -> Token {
            if pos >= self.0 && pos < self.1 {
                Token {
                    start_char: self.0,
                    end_char: self.1,
                    role: Role::String,
                }
            } else {
                Token::none()
            }
        }
    }

    #[test]
    fn bracket_inside_a_string_token_is_ignored() {
        // "(" at 0 pairs with ")" at 8, skipping the ")" at 4 which sits
        // inside the quoted string "a)b".
        let rope = Rope::from_str("(\"a)b\")").unwrap();
        let q = StringSpan(1, 6);
        assert_eq!(matching_code_block_delimiter(&rope, &q, 0), Some(6));
    }

    #[test]
    fn starting_inside_a_string_falls_back_to_whole_document() {
        let rope = Rope::from_str("\"(a\"b)").unwrap();
        // pos 1 is '(' but sits inside the string token [0,4); the search
        // must still find its partner at 5 rather than giving up.
        let q = StringSpan(0, 4);
        assert_eq!(matching_code_block_delimiter(&rope, &q, 1), Some(5));
    }
}
