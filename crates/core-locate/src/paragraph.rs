//! Paragraph motions (spec §4.2): a paragraph boundary is an empty line
//! separating runs of non-empty lines.

use crate::line::{line_is_empty, start_of_line_num};
use core_text::Rope;

pub fn next_paragraph_start(rope: &Rope, pos: u64) -> u64 {
    let last = rope.num_lines().saturating_sub(1);
    let mut line = rope.line_num_for_position(pos);

    // Skip the rest of the current paragraph (or blank run) we're already in.
    let starting_empty = line_is_empty(rope, line);
    while line < last && line_is_empty(rope, line) == starting_empty {
        line += 1;
    }
    // Now walk forward to the next empty line, which is the boundary itself.
    while line < last && !line_is_empty(rope, line) {
        line += 1;
    }
    start_of_line_num(rope, line)
}

pub fn prev_paragraph_start(rope: &Rope, pos: u64) -> u64 {
    let mut line = rope.line_num_for_position(pos);

    let starting_empty = line_is_empty(rope, line);
    while line > 0 && line_is_empty(rope, line) == starting_empty {
        line -= 1;
    }
    while line > 0 && !line_is_empty(rope, line) {
        line -= 1;
    }
    start_of_line_num(rope, line)
}
