//! Balanced in-memory UTF-8 rope (spec §4.1).

mod cursor;
mod leaf;
mod node;

pub use cursor::{Cursor, Direction};

use crate::codec;
use crate::error::Error;
use leaf::LeafData;
use node::Node;
use std::io::Read;

const DEFAULT_LEAF_BUDGET: usize = core_config_default_leaf_budget();

const fn core_config_default_leaf_budget() -> usize {
    // Mirrors `core_config::Config::default().rope_leaf_bytes`; kept as a
    // literal here so this module has no hard dependency cycle on
    // `core-config` for the common case of `Rope::new_empty()`.
    1024
}

/// An ordered sequence of UTF-8 bytes with derived character and line counts
/// (spec §3). Structural nodes are owned exclusively by the rope; they are
/// never shared with another `Rope`.
#[derive(Debug, Clone)]
pub struct Rope {
    root: Node,
    leaf_budget: usize,
}

impl Rope {
    pub fn new_empty() -> Self {
        Self::with_leaf_budget(DEFAULT_LEAF_BUDGET)
    }

    pub fn with_leaf_budget(leaf_budget: usize) -> Self {
        Self {
            root: Node::empty(),
            leaf_budget,
        }
    }

    /// Convenience constructor over an in-memory string; used pervasively by
    /// tests and by callers who already hold the whole document in memory.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        Self::from_reader(s.as_bytes())
    }

    /// Read bytes from `r`, validating UTF-8 incrementally. Fails with
    /// [`Error::InvalidUtf8`] reporting the byte offset of the first invalid
    /// sequence; the rope is not created on failure (spec §4.1, §7).
    pub fn from_reader<R: Read>(mut r: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)
            .map_err(|_| Error::InvalidUtf8 { byte_offset: 0 })?;
        codec::validate_utf8(&bytes).map_err(|byte_offset| Error::InvalidUtf8 { byte_offset })?;
        let text = String::from_utf8(bytes).expect("validated above");
        Ok(Self::from_string(text, DEFAULT_LEAF_BUDGET))
    }

    fn from_string(text: String, leaf_budget: usize) -> Self {
        let mut leaves = Vec::new();
        let mut rest = text.as_str();
        if rest.is_empty() {
            leaves.push(LeafData::empty());
        }
        while !rest.is_empty() {
            let take = rest.len().min(leaf_budget.max(1));
            let mut at = take;
            while at > 0 && !rest.is_char_boundary(at) {
                at -= 1;
            }
            if at == 0 {
                // A single code point wider than the budget; never split it.
                at = codec::start_byte_width(rest.as_bytes()[0]).unwrap_or(1);
            }
            let (chunk, remainder) = rest.split_at(at);
            leaves.push(LeafData::from_str(chunk));
            rest = remainder;
        }
        Self {
            root: Node::from_leaves(leaves),
            leaf_budget,
        }
    }

    pub fn num_chars(&self) -> u64 {
        self.root.char_len()
    }

    pub fn num_lines(&self) -> u64 {
        if self.root.char_len() == 0 {
            0
        } else {
            self.root.line_breaks() + 1
        }
    }

    pub fn byte_len(&self) -> u64 {
        self.root.byte_len()
    }

    pub(crate) fn byte_at(&self, idx: u64) -> u8 {
        self.root.byte_at(idx)
    }

    pub(crate) fn prev_start_byte(&self, before: u64) -> Option<u64> {
        let mut i = before;
        let floor = before.saturating_sub(4);
        while i > floor {
            i -= 1;
            if !codec::is_continuation_byte(self.root.byte_at(i)) {
                return Some(i);
            }
        }
        None
    }

    /// Char position of the first character of `line`; `line >= num_lines`
    /// returns `num_chars` (spec §4.1).
    pub fn line_start_position(&self, line: u64) -> u64 {
        if line == 0 {
            return 0;
        }
        match node::nth_newline_abs(&self.root, line - 1, 0) {
            Some(p) => p + 1,
            None => self.num_chars(),
        }
    }

    /// Inverse of [`Self::line_start_position`]; positions past end return
    /// the last real line number.
    pub fn line_num_for_position(&self, pos: u64) -> u64 {
        let clamped = pos.min(self.num_chars());
        node::newlines_before(&self.root, clamped)
    }

    /// Byte-granularity cursor clamped to `[0, byte_len]`.
    pub fn reader_at_position(&self, byte_pos: u64, direction: Direction) -> Cursor<'_> {
        Cursor::new(self, byte_pos, direction)
    }

    /// Byte offset of the `char_pos`-th character, clamped past the end.
    /// Bridges the rope's char-indexed public API to [`Self::reader_at_position`]'s
    /// byte-indexed cursors.
    pub fn char_to_byte(&self, char_pos: u64) -> u64 {
        node::char_to_byte(&self.root, char_pos.min(self.num_chars()))
    }

    /// Insert `r` at char position `pos` (clamped to `[0, num_chars]`).
    /// Rejects invalid code points.
    pub fn insert_at_position(&mut self, pos: u64, r: char) -> Result<(), Error> {
        let clamped = pos.min(self.num_chars());
        let old = std::mem::replace(&mut self.root, Node::empty());
        self.root = node::insert(old, clamped, r, self.leaf_budget);
        Ok(())
    }

    /// Delete the char at `pos`. Returns `(true, r)` if removed,
    /// `(false, '\0')` if `pos >= num_chars`.
    pub fn delete_at_position(&mut self, pos: u64) -> (bool, char) {
        if pos >= self.num_chars() {
            return (false, '\0');
        }
        let old = std::mem::replace(&mut self.root, Node::empty());
        let (new_root, removed) = node::delete(old, pos);
        self.root = new_root;
        match removed {
            Some(c) => (true, c),
            None => (false, '\0'),
        }
    }

    /// Materialize the whole rope as owned bytes (used by round-trip tests
    /// and by callers persisting the buffer).
    pub fn into_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len() as usize);
        collect_bytes(&self.root, &mut out);
        out
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8(self.into_bytes()).expect("rope bytes are always valid UTF-8")
    }

    #[cfg(any(test, feature = "internal-debug"))]
    pub fn debug_assert_invariants(&self) {
        node::assert_invariants(&self.root);
    }
}

fn collect_bytes(node: &Node, out: &mut Vec<u8>) {
    match node {
        Node::Leaf(l) => out.extend_from_slice(l.bytes.as_bytes()),
        Node::Internal(i) => {
            collect_bytes(&i.left, out);
            collect_bytes(&i.right, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_scenario_from_spec() {
        let mut rope = Rope::from_str("a£篴\u{10AAAA}").unwrap();
        assert_eq!(rope.num_chars(), 4);
        assert_eq!(rope.delete_at_position(1), (true, '£'));
        assert_eq!(rope.to_string_lossy(), "a篴\u{10AAAA}");
    }

    #[test]
    fn line_indexing_seed_scenario() {
        let rope = Rope::from_str("abc\ndef\n\nghi").unwrap();
        // newline at char index 7 is the second '\n'; line index 2 starts
        // right after it.
        assert_eq!(rope.line_start_position(2), 8);
        assert_eq!(rope.line_num_for_position(5), 1);
    }

    #[test]
    fn line_start_past_end_clamps_to_num_chars() {
        let rope = Rope::from_str("abc\ndef").unwrap();
        assert_eq!(rope.line_start_position(rope.num_lines()), rope.num_chars());
        assert_eq!(
            rope.line_start_position(rope.num_lines() + 5),
            rope.num_chars()
        );
    }

    #[test]
    fn insert_delete_is_an_inverse() {
        let mut rope = Rope::from_str("hello").unwrap();
        let before = rope.to_string_lossy();
        rope.insert_at_position(2, 'X').unwrap();
        let (_, removed) = rope.delete_at_position(2);
        assert_eq!(removed, 'X');
        assert_eq!(rope.to_string_lossy(), before);
    }

    #[test]
    fn char_to_byte_accounts_for_multibyte_chars() {
        let rope = Rope::from_str("a£c").unwrap();
        assert_eq!(rope.char_to_byte(0), 0);
        assert_eq!(rope.char_to_byte(1), 1);
        assert_eq!(rope.char_to_byte(2), 3);
        assert_eq!(rope.char_to_byte(99), rope.byte_len());
    }

    #[test]
    fn delete_past_end_is_a_no_op_value() {
        let mut rope = Rope::from_str("hi").unwrap();
        assert_eq!(rope.delete_at_position(100), (false, '\0'));
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let mut bytes = b"ok-".to_vec();
        bytes.push(0xFF);
        let err = Rope::from_reader(bytes.as_slice()).unwrap_err();
        assert_eq!(err, Error::InvalidUtf8 { byte_offset: 3 });
    }

    #[test]
    fn small_leaf_budget_forces_many_splits_but_stays_correct() {
        let mut rope = Rope::with_leaf_budget(4);
        for (i, c) in "the quick brown fox".chars().enumerate() {
            rope.insert_at_position(i as u64, c).unwrap();
        }
        rope.debug_assert_invariants();
        assert_eq!(rope.to_string_lossy(), "the quick brown fox");
    }

    proptest! {
        #[test]
        fn round_trip_any_valid_utf8(s in "\\PC*") {
            let rope = Rope::from_str(&s).unwrap();
            prop_assert_eq!(rope.to_string_lossy(), s);
        }

        #[test]
        fn insert_then_delete_restores_rope(s in "[a-zA-Z0-9 \n]{0,40}", idx in 0u64..41, ch in "[a-zA-Z]") {
            let mut rope = Rope::from_str(&s).unwrap();
            let pos = idx.min(rope.num_chars());
            let c = ch.chars().next().unwrap();
            rope.insert_at_position(pos, c).unwrap();
            let (_, removed) = rope.delete_at_position(pos);
            prop_assert_eq!(removed, c);
            prop_assert_eq!(rope.to_string_lossy(), s);
        }
    }
}
