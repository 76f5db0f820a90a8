//! Line-position locators.

use crate::common::char_at;
use core_text::Rope;

pub fn start_of_line_at_pos(rope: &Rope, pos: u64) -> u64 {
    rope.line_start_position(rope.line_num_for_position(pos))
}

pub fn start_of_line_num(rope: &Rope, line: u64) -> u64 {
    rope.line_start_position(line)
}

pub fn start_of_last_line(rope: &Rope) -> u64 {
    rope.line_start_position(rope.num_lines().saturating_sub(1))
}

pub fn start_of_line_above(rope: &Rope, pos: u64, n: u64) -> u64 {
    let line = rope.line_num_for_position(pos).saturating_sub(n);
    rope.line_start_position(line)
}

pub fn start_of_line_below(rope: &Rope, pos: u64, n: u64) -> u64 {
    let last = rope.num_lines().saturating_sub(1);
    let line = (rope.line_num_for_position(pos) + n).min(last);
    rope.line_start_position(line)
}

/// End of the current line's content; `include_eol` extends onto the
/// trailing `\n` itself.
pub fn next_line_boundary(rope: &Rope, pos: u64, include_eol: bool) -> u64 {
    let line = rope.line_num_for_position(pos);
    let mut end = rope.line_start_position(line + 1);
    let has_nl = end > rope.line_start_position(line) && char_at(rope, end.saturating_sub(1)) == Some('\n');
    if has_nl && !include_eol {
        end -= 1;
    }
    end.min(rope.num_chars())
}

pub fn prev_line_boundary(rope: &Rope, pos: u64) -> u64 {
    start_of_line_at_pos(rope, pos)
}

/// Snap a position off the line's trailing newline onto the last real
/// character of that line (a no-op if the line is empty).
pub fn closest_char_on_line(rope: &Rope, pos: u64) -> u64 {
    if char_at(rope, pos) != Some('\n') {
        return pos;
    }
    let line = rope.line_num_for_position(pos);
    let start = rope.line_start_position(line);
    if pos == start {
        pos
    } else {
        pos - 1
    }
}

pub(crate) fn line_char_count(rope: &Rope, line: u64) -> u64 {
    let start = rope.line_start_position(line);
    next_line_boundary(rope, start, false) - start
}

pub(crate) fn line_is_empty(rope: &Rope, line: u64) -> bool {
    line_char_count(rope, line) == 0
}
