//! Shared char-at-position helper. Locators address positions in the same
//! unit as the rope's public API — Unicode scalar values — so movement is
//! expressed purely in terms of position arithmetic plus this one read.

use core_text::{Direction, Rope};

pub(crate) fn char_at(rope: &Rope, pos: u64) -> Option<char> {
    if pos >= rope.num_chars() {
        return None;
    }
    let byte = rope.char_to_byte(pos);
    rope.reader_at_position(byte, Direction::Forward)
        .read_rune()
        .map(|(c, _)| c)
}
