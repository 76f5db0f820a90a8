//! A rope cursor that remembers the furthest position any clone of it ever
//! looked at (spec §4.3). Combinators fork a `TrackingCursor` freely for
//! lookahead; the driver reads the shared counter back after the parse
//! function returns to compute a leaf's `read_len`.

use core_text::{Direction, Rope};
use std::cell::Cell;
use std::rc::Rc;

fn char_at(rope: &Rope, pos: u64) -> Option<char> {
    if pos >= rope.num_chars() {
        return None;
    }
    let byte = rope.char_to_byte(pos);
    rope.reader_at_position(byte, Direction::Forward)
        .read_rune()
        .map(|(c, _)| c)
}

#[derive(Clone)]
pub struct TrackingCursor<'a> {
    rope: &'a Rope,
    start: u64,
    pos: u64,
    max_seen: Rc<Cell<u64>>,
}

impl<'a> TrackingCursor<'a> {
    pub fn new(rope: &'a Rope, start: u64) -> Self {
        Self {
            rope,
            start,
            pos: start,
            max_seen: Rc::new(Cell::new(start)),
        }
    }

    fn touch(&self, pos: u64) {
        if pos > self.max_seen.get() {
            self.max_seen.set(pos);
        }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.rope.num_chars()
    }

    /// Read the rune at the current position without advancing. Still
    /// counts toward `read_len` — a peek is lookahead.
    pub fn peek(&self) -> Option<char> {
        let c = char_at(self.rope, self.pos);
        if c.is_some() {
            self.touch(self.pos + 1);
        }
        c
    }

    /// Read and move past the current rune.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// A lookahead clone sharing the same `max_seen` counter and consumed-so-far
    /// start. Combinators use this to try an alternative from the current
    /// position without committing to it.
    pub fn fork(&self) -> Self {
        Self {
            rope: self.rope,
            start: self.start,
            pos: self.pos,
            max_seen: Rc::clone(&self.max_seen),
        }
    }

    /// Runes actually advanced past since this invocation's start.
    pub fn consumed_len(&self) -> u64 {
        self.pos - self.start
    }

    /// Furthest rune read (including lookahead) since this invocation's start.
    pub fn read_len(&self) -> u64 {
        self.max_seen.get() - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use core_text::Rope;

    #[test]
    fn peek_extends_read_len_without_consuming() {
        let rope = Rope::from_str("abcd").unwrap();
        let mut cur = TrackingCursor::new(&rope, 0);
        assert_eq!(cur.peek(), Some('a'));
        assert_eq!(cur.consumed_len(), 0);
        assert_eq!(cur.read_len(), 1);
        assert_eq!(cur.advance(), Some('a'));
        assert_eq!(cur.consumed_len(), 1);
    }

    #[test]
    fn fork_shares_the_max_seen_counter() {
        let rope = Rope::from_str("abcd").unwrap();
        let cur = TrackingCursor::new(&rope, 0);
        let mut lookahead = cur.fork();
        lookahead.advance();
        lookahead.advance();
        lookahead.advance();
        // The original cursor didn't move, but its read_len reflects the
        // fork's deeper lookahead because the counter is shared.
        assert_eq!(cur.consumed_len(), 0);
        assert_eq!(cur.read_len(), 3);
    }

    #[test]
    fn eof_is_detected_past_the_last_char() {
        let rope = Rope::from_str("ab").unwrap();
        let mut cur = TrackingCursor::new(&rope, 0);
        cur.advance();
        cur.advance();
        assert!(cur.at_eof());
        assert_eq!(cur.peek(), None);
    }
}
