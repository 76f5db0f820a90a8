//! Parser combinators (spec §4.3): transformations on parse functions,
//! modeled — per the source's own design note — as closures carrying
//! captured environments rather than named types.
//!
//! Every combinator forks its cursor before trying a child and only folds
//! the fork back into the caller's cursor on success, so `Failed` always
//! means "no position was consumed" — the precondition `or` and
//! `recover_from_failure` rely on to retry cleanly.

use crate::cursor::TrackingCursor;
use crate::token::ComputedToken;

pub enum ParseOutcome<S> {
    Success {
        consumed: u64,
        tokens: Vec<ComputedToken>,
        next_state: S,
    },
    Failed,
}

pub type ParseFn<S> = Box<dyn Fn(&mut TrackingCursor, S) -> ParseOutcome<S>>;

fn shift(tokens: Vec<ComputedToken>, by: u64) -> impl Iterator<Item = ComputedToken> {
    tokens
        .into_iter()
        .map(move |t| ComputedToken::new(t.offset + by, t.length, t.role))
}

/// If `f` succeeds, rewrite its tokens/state via `m`; `consumed` is untouched.
pub fn map<S: Clone + 'static>(
    f: ParseFn<S>,
    m: impl Fn(Vec<ComputedToken>, S) -> (Vec<ComputedToken>, S) + 'static,
) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut attempt = cursor.fork();
        match f(&mut attempt, state) {
            ParseOutcome::Failed => ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => {
                *cursor = attempt;
                let (tokens, next_state) = m(tokens, next_state);
                ParseOutcome::Success {
                    consumed,
                    tokens,
                    next_state,
                }
            }
        }
    })
}

/// Same as [`map`], but `m` also sees the position and state `f` was invoked with.
pub fn map_with_input<S: Clone + 'static>(
    f: ParseFn<S>,
    m: impl Fn(u64, S, Vec<ComputedToken>, S) -> (Vec<ComputedToken>, S) + 'static,
) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let original_pos = cursor.position();
        let original_state = state.clone();
        let mut attempt = cursor.fork();
        match f(&mut attempt, state) {
            ParseOutcome::Failed => ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => {
                *cursor = attempt;
                let (tokens, next_state) = m(original_pos, original_state, tokens, next_state);
                ParseOutcome::Success {
                    consumed,
                    tokens,
                    next_state,
                }
            }
        }
    })
}

/// Sequential composition: `f` then `g`; fails if either fails.
pub fn then<S: Clone + 'static>(f: ParseFn<S>, g: ParseFn<S>) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut attempt = cursor.fork();
        let (c1, t1, s1) = match f(&mut attempt, state) {
            ParseOutcome::Failed => return ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => (consumed, tokens, next_state),
        };
        match g(&mut attempt, s1) {
            ParseOutcome::Failed => ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed: c2,
                tokens: t2,
                next_state: s2,
            } => {
                *cursor = attempt;
                let tokens = t1.into_iter().chain(shift(t2, c1)).collect();
                ParseOutcome::Success {
                    consumed: c1 + c2,
                    tokens,
                    next_state: s2,
                }
            }
        }
    })
}

/// `f`; optionally `g`. Always succeeds if `f` does, even if `g` fails.
pub fn then_maybe<S: Clone + 'static>(f: ParseFn<S>, g: ParseFn<S>) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut attempt = cursor.fork();
        let (c1, t1, s1) = match f(&mut attempt, state) {
            ParseOutcome::Failed => return ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => (consumed, tokens, next_state),
        };
        let mut maybe = attempt.fork();
        match g(&mut maybe, s1.clone()) {
            ParseOutcome::Success {
                consumed: c2,
                tokens: t2,
                next_state: s2,
            } => {
                *cursor = maybe;
                let tokens = t1.into_iter().chain(shift(t2, c1)).collect();
                ParseOutcome::Success {
                    consumed: c1 + c2,
                    tokens,
                    next_state: s2,
                }
            }
            ParseOutcome::Failed => {
                *cursor = attempt;
                ParseOutcome::Success {
                    consumed: c1,
                    tokens: t1,
                    next_state: s1,
                }
            }
        }
    })
}

/// `f` succeeds only if `g` would fail at the position just after `f`.
pub fn then_not<S: Clone + 'static>(f: ParseFn<S>, g: ParseFn<S>) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut attempt = cursor.fork();
        match f(&mut attempt, state) {
            ParseOutcome::Failed => ParseOutcome::Failed,
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => {
                let mut probe = attempt.fork();
                match g(&mut probe, next_state.clone()) {
                    ParseOutcome::Success { .. } => ParseOutcome::Failed,
                    ParseOutcome::Failed => {
                        *cursor = attempt;
                        ParseOutcome::Success {
                            consumed,
                            tokens,
                            next_state,
                        }
                    }
                }
            }
        }
    })
}

/// Try `f`; on failure try `g` from the original position.
pub fn or<S: Clone + 'static>(f: ParseFn<S>, g: ParseFn<S>) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut attempt = cursor.fork();
        match f(&mut attempt, state.clone()) {
            ParseOutcome::Success {
                consumed,
                tokens,
                next_state,
            } => {
                *cursor = attempt;
                ParseOutcome::Success {
                    consumed,
                    tokens,
                    next_state,
                }
            }
            ParseOutcome::Failed => {
                let mut attempt2 = cursor.fork();
                match g(&mut attempt2, state) {
                    ParseOutcome::Success {
                        consumed,
                        tokens,
                        next_state,
                    } => {
                        *cursor = attempt2;
                        ParseOutcome::Success {
                            consumed,
                            tokens,
                            next_state,
                        }
                    }
                    ParseOutcome::Failed => ParseOutcome::Failed,
                }
            }
        }
    })
}

/// Skip one rune forward on failure and retry, shifting token offsets by
/// the skip count, until `f` succeeds or the document runs out — so the
/// wrapped function always makes progress (or legitimately reaches EOF).
pub fn recover_from_failure<S: Clone + 'static>(f: ParseFn<S>) -> ParseFn<S> {
    Box::new(move |cursor, state| {
        let mut skipped = 0u64;
        loop {
            if cursor.at_eof() {
                return ParseOutcome::Success {
                    consumed: skipped,
                    tokens: Vec::new(),
                    next_state: state,
                };
            }
            let mut attempt = cursor.fork();
            match f(&mut attempt, state.clone()) {
                ParseOutcome::Success {
                    consumed,
                    tokens,
                    next_state,
                } => {
                    *cursor = attempt;
                    let tokens = shift(tokens, skipped).collect();
                    return ParseOutcome::Success {
                        consumed: skipped + consumed,
                        tokens,
                        next_state,
                    };
                }
                ParseOutcome::Failed => {
                    cursor.advance();
                    skipped += 1;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use core_events::Role;
    use core_text::Rope;

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct St(u8);

    fn single(target: char, role: Role) -> ParseFn<St> {
        Box::new(move |cursor, state| match cursor.advance() {
            Some(c) if c == target => ParseOutcome::Success {
                consumed: 1,
                tokens: vec![ComputedToken::new(0, 1, role)],
                next_state: state,
            },
            _ => ParseOutcome::Failed,
        })
    }

    #[test]
    fn then_concatenates_and_shifts_tokens() {
        let rope = Rope::from_str("ab").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = then(single('a', Role::Keyword), single('b', Role::Identifier));
        match f(&mut cursor, St(0)) {
            ParseOutcome::Success { consumed, tokens, .. } => {
                assert_eq!(consumed, 2);
                assert_eq!(tokens[0].offset, 0);
                assert_eq!(tokens[1].offset, 1);
            }
            ParseOutcome::Failed => panic!("expected success"),
        }
    }

    #[test]
    fn or_falls_back_to_the_second_alternative() {
        let rope = Rope::from_str("b").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = or(single('a', Role::Keyword), single('b', Role::Identifier));
        match f(&mut cursor, St(0)) {
            ParseOutcome::Success { consumed, .. } => assert_eq!(consumed, 1),
            ParseOutcome::Failed => panic!("expected success via fallback"),
        }
    }

    #[test]
    fn or_leaves_cursor_untouched_on_total_failure() {
        let rope = Rope::from_str("c").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = or(single('a', Role::Keyword), single('b', Role::Identifier));
        assert!(matches!(f(&mut cursor, St(0)), ParseOutcome::Failed));
        assert_eq!(cursor.consumed_len(), 0);
    }

    #[test]
    fn recover_skips_one_rune_and_shifts_offsets() {
        let rope = Rope::from_str("xa").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = recover_from_failure(single('a', Role::Keyword));
        match f(&mut cursor, St(0)) {
            ParseOutcome::Success { consumed, tokens, .. } => {
                assert_eq!(consumed, 2);
                assert_eq!(tokens[0].offset, 1);
            }
            ParseOutcome::Failed => panic!("recover_from_failure must not fail"),
        }
    }

    #[test]
    fn recover_terminates_cleanly_at_eof() {
        let rope = Rope::from_str("x").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = recover_from_failure(single('a', Role::Keyword));
        match f(&mut cursor, St(0)) {
            ParseOutcome::Success { consumed, tokens, .. } => {
                assert_eq!(consumed, 1);
                assert!(tokens.is_empty());
            }
            ParseOutcome::Failed => panic!("recover_from_failure must not fail"),
        }
    }

    #[test]
    fn then_not_rejects_when_the_lookahead_matches() {
        let rope = Rope::from_str("ab").unwrap();
        let mut cursor = TrackingCursor::new(&rope, 0);
        let f = then_not(single('a', Role::Keyword), single('b', Role::Identifier));
        assert!(matches!(f(&mut cursor, St(0)), ParseOutcome::Failed));
    }
}
