//! A byte-granularity cursor over a [`Rope`](super::Rope). Cursors borrow the
//! rope they read from, so the borrow checker enforces spec §5's invalidation
//! rule: a cursor cannot outlive a mutation of the rope it points into, and a
//! fresh [`Rope::reader_at_position`] is required after every edit.

use super::Rope;
use crate::codec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    rope: &'a Rope,
    pos: u64,
    direction: Direction,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(rope: &'a Rope, byte_pos: u64, direction: Direction) -> Self {
        Self {
            rope,
            pos: byte_pos.min(rope.byte_len()),
            direction,
        }
    }

    pub fn byte_position(&self) -> u64 {
        self.pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Read one byte, advancing the cursor in its direction. `None` at the
    /// relevant end of the rope.
    pub fn read_byte(&mut self) -> Option<u8> {
        match self.direction {
            Direction::Forward => {
                if self.pos >= self.rope.byte_len() {
                    return None;
                }
                let b = self.rope.byte_at(self.pos);
                self.pos += 1;
                Some(b)
            }
            Direction::Backward => {
                if self.pos == 0 {
                    return None;
                }
                self.pos -= 1;
                Some(self.rope.byte_at(self.pos))
            }
        }
    }

    /// Read one full rune, advancing by its UTF-8 width. Returns
    /// `(rune, byte-width)`.
    pub fn read_rune(&mut self) -> Option<(char, u8)> {
        match self.direction {
            Direction::Forward => {
                if self.pos >= self.rope.byte_len() {
                    return None;
                }
                let b0 = self.rope.byte_at(self.pos);
                let width = codec::start_byte_width(b0)?;
                let mut buf = [0u8; 4];
                for (i, slot) in buf.iter_mut().enumerate().take(width) {
                    *slot = self.rope.byte_at(self.pos + i as u64);
                }
                let (c, w) = codec::decode_char(&buf[..width])?;
                self.pos += w as u64;
                Some((c, w as u8))
            }
            Direction::Backward => {
                if self.pos == 0 {
                    return None;
                }
                let start = self.rope.prev_start_byte(self.pos)?;
                let width = (self.pos - start) as usize;
                let mut buf = [0u8; 4];
                for (i, slot) in buf.iter_mut().enumerate().take(width) {
                    *slot = self.rope.byte_at(start + i as u64);
                }
                let (c, w) = codec::decode_char(&buf[..width])?;
                self.pos = start;
                Some((c, w as u8))
            }
        }
    }

    /// Move the cursor `n` bytes toward the start, clamping at 0. Used for
    /// lookahead-reset within a single parse-function invocation.
    pub fn seek_backward(&mut self, n: u64) {
        self.pos = self.pos.saturating_sub(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rope;

    #[test]
    fn forward_and_backward_read_rune_are_symmetric() {
        let rope = Rope::from_str("a£篴\u{10AAAA}b").unwrap();
        let mut fwd = rope.reader_at_position(0, Direction::Forward);
        let mut collected = Vec::new();
        while let Some((c, _)) = fwd.read_rune() {
            collected.push(c);
        }
        assert_eq!(collected, vec!['a', '£', '篴', '\u{10AAAA}', 'b']);

        let mut bwd = rope.reader_at_position(rope.byte_len(), Direction::Backward);
        let mut reversed = Vec::new();
        while let Some((c, _)) = bwd.read_rune() {
            reversed.push(c);
        }
        reversed.reverse();
        assert_eq!(reversed, collected);
    }

    #[test]
    fn read_byte_hits_none_at_each_end() {
        let rope = Rope::from_str("hi").unwrap();
        let mut fwd = rope.reader_at_position(2, Direction::Forward);
        assert_eq!(fwd.read_byte(), None);
        let mut bwd = rope.reader_at_position(0, Direction::Backward);
        assert_eq!(bwd.read_byte(), None);
    }
}
