//! Word motions (spec §4.2). Ported from a line/byte `(Buffer, Position)`
//! model to the rope's flat char positions: the skip-blanks / skip-same-class
//! loops are the same shape, just walked over one position counter.

use crate::class::classify;
use crate::common::char_at;
use core_text::Rope;

/// True if `p` is the start of an empty line: the char at `p` ends the line
/// immediately, and `p` itself begins a line (start of buffer, or the char
/// just before it already ended the previous one).
fn at_empty_line_start(rope: &Rope, p: u64) -> bool {
    char_at(rope, p) == Some('\n') && (p == 0 || char_at(rope, p - 1) == Some('\n'))
}

/// Move forward to the start of the next word or punctuation token,
/// following Vim `w` semantics. Whitespace (and, unless `stop_at_eol`,
/// newlines) is skipped crossing line boundaries, but the start of an empty
/// line is itself a stopping point (aretext's `w`/`b` stop on blank lines).
pub fn next_word_start(rope: &Rope, pos: u64, with_punct: bool, stop_at_eol: bool) -> u64 {
    let n = rope.num_chars();
    if pos >= n {
        return pos;
    }
    let mut p = pos;
    if let Some(c) = char_at(rope, p) {
        if c != '\n' {
            let k = classify(c, with_punct);
            while let Some(c2) = char_at(rope, p) {
                if c2 == '\n' || classify(c2, with_punct) != k {
                    break;
                }
                p += 1;
            }
        }
    }
    loop {
        match char_at(rope, p) {
            None => return p,
            Some('\n') => {
                if stop_at_eol {
                    return p;
                }
                p += 1;
                if at_empty_line_start(rope, p) {
                    return p;
                }
            }
            Some(c) if c.is_whitespace() => p += 1,
            Some(_) => return p,
        }
    }
}

/// Move backward to the start of the previous word or punctuation token.
/// The start of an empty line is itself a stopping point, same as forward.
pub fn prev_word_start(rope: &Rope, pos: u64, with_punct: bool) -> u64 {
    let mut p = pos;
    loop {
        if p == 0 {
            return 0;
        }
        p -= 1;
        if at_empty_line_start(rope, p) {
            return p;
        }
        match char_at(rope, p) {
            Some(c) if c.is_whitespace() => continue,
            Some(c) => {
                let k = classify(c, with_punct);
                while p > 0 {
                    match char_at(rope, p - 1) {
                        Some(prev_c) if classify(prev_c, with_punct) == k && prev_c != '\n' => {
                            p -= 1;
                        }
                        _ => break,
                    }
                }
                return p;
            }
            None => return p,
        }
    }
}

/// Move forward to the end of the next word or punctuation token.
pub fn next_word_end(rope: &Rope, pos: u64, with_punct: bool) -> u64 {
    let n = rope.num_chars();
    if n == 0 {
        return pos;
    }
    let mut p = pos + 1;
    while let Some(c) = char_at(rope, p) {
        if c.is_whitespace() {
            p += 1;
        } else {
            break;
        }
    }
    if p >= n {
        return n - 1;
    }
    let k = classify(char_at(rope, p).expect("p < n"), with_punct);
    while let Some(c2) = char_at(rope, p + 1) {
        if c2.is_whitespace() || classify(c2, with_punct) != k {
            break;
        }
        p += 1;
    }
    p
}

/// Start of the token containing `pos`; a no-op if `pos` sits on whitespace.
pub fn current_word_start(rope: &Rope, pos: u64, with_punct: bool) -> u64 {
    let Some(c) = char_at(rope, pos) else {
        return pos;
    };
    if c.is_whitespace() {
        return pos;
    }
    let k = classify(c, with_punct);
    let mut p = pos;
    while p > 0 {
        match char_at(rope, p - 1) {
            Some(prev_c) if classify(prev_c, with_punct) == k => p -= 1,
            _ => break,
        }
    }
    p
}

/// End of the token containing `pos`; a no-op if `pos` sits on whitespace.
pub fn current_word_end(rope: &Rope, pos: u64, with_punct: bool) -> u64 {
    let Some(c) = char_at(rope, pos) else {
        return pos;
    };
    if c.is_whitespace() {
        return pos;
    }
    let k = classify(c, with_punct);
    let mut p = pos;
    while let Some(next_c) = char_at(rope, p + 1) {
        if classify(next_c, with_punct) != k {
            break;
        }
        p += 1;
    }
    p
}

/// Like [`current_word_end`] but also consumes any trailing (non-newline)
/// whitespace, for operators that delete "word plus following space".
pub fn current_word_end_with_trailing_whitespace(rope: &Rope, pos: u64, with_punct: bool) -> u64 {
    let mut p = current_word_end(rope, pos, with_punct);
    while let Some(c) = char_at(rope, p + 1) {
        if c.is_whitespace() && c != '\n' {
            p += 1;
        } else {
            break;
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Rope;

    #[test]
    fn seed_scenario_next_and_prev_word_start() {
        let rope = Rope::from_str("abc   defg   hij").unwrap();
        assert_eq!(next_word_start(&rope, 1, false, false), 6);
        assert_eq!(prev_word_start(&rope, 12, false), 6);
    }

    #[test]
    fn punctuation_is_its_own_token_when_with_punct_false() {
        let rope = Rope::from_str("foo, bar").unwrap();
        assert_eq!(next_word_start(&rope, 0, false, false), 3); // the comma
        assert_eq!(next_word_start(&rope, 3, false, false), 5); // "bar"
    }

    #[test]
    fn with_punct_true_treats_punctuation_as_word_char() {
        let rope = Rope::from_str("foo, bar").unwrap();
        assert_eq!(next_word_start(&rope, 0, true, false), 5);
    }

    #[test]
    fn current_word_bounds_are_a_no_op_on_whitespace() {
        let rope = Rope::from_str("foo bar").unwrap();
        assert_eq!(current_word_start(&rope, 3, false), 3);
        assert_eq!(current_word_end(&rope, 3, false), 3);
    }

    #[test]
    fn current_word_end_with_trailing_whitespace_eats_the_gap() {
        let rope = Rope::from_str("foo   bar").unwrap();
        assert_eq!(current_word_end_with_trailing_whitespace(&rope, 0, false), 5);
    }

    #[test]
    fn next_word_start_stops_on_each_empty_line_before_the_next_word() {
        let rope = Rope::from_str("ab\n\n\ncd").unwrap();
        // "ab\n\n\ncd": 'a'=0 'b'=1 \n=2 \n=3 \n=4 'c'=5 'd'=6.
        // Lines: "ab" (0), "" (starts at 3), "" (starts at 4), "cd" (starts at 5).
        assert_eq!(next_word_start(&rope, 0, false, false), 3);
        assert_eq!(next_word_start(&rope, 3, false, false), 4);
        assert_eq!(next_word_start(&rope, 4, false, false), 5);
    }

    #[test]
    fn prev_word_start_stops_on_each_empty_line_before_the_previous_word() {
        let rope = Rope::from_str("ab\n\n\ncd").unwrap();
        assert_eq!(prev_word_start(&rope, 5, false), 4);
        assert_eq!(prev_word_start(&rope, 4, false), 3);
        assert_eq!(prev_word_start(&rope, 3, false), 0);
    }

    #[test]
    fn next_word_end_lands_on_last_char_of_token() {
        let rope = Rope::from_str("foo bar").unwrap();
        // From the start of "foo", 'e' lands on its own end.
        assert_eq!(next_word_end(&rope, 0, false), 2);
        // Already at the end of a token, 'e' jumps to the end of the next one.
        assert_eq!(next_word_end(&rope, 2, false), 6);
    }
}
