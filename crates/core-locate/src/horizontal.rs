//! Character movement within a line, and cross-line backward stepping.

use crate::common::char_at;
use core_text::Rope;

fn line_end_position(rope: &Rope, line: u64) -> u64 {
    let mut end = rope.line_start_position(line + 1);
    if end > rope.line_start_position(line) && char_at(rope, end - 1) == Some('\n') {
        end -= 1;
    }
    end.min(rope.num_chars())
}

/// Move `n` chars right without leaving the current line. `include_eol`
/// allows landing on the line's trailing `\n`; `n == 0` is a no-op.
pub fn next_char_in_line(rope: &Rope, pos: u64, n: u64, include_eol: bool) -> u64 {
    if n == 0 {
        return pos;
    }
    let line = rope.line_num_for_position(pos);
    let mut limit = line_end_position(rope, line);
    if include_eol && char_at(rope, limit) == Some('\n') {
        limit += 1;
    }
    (pos + n).min(limit)
}

/// Move `n` chars left without leaving the current line.
pub fn prev_char_in_line(rope: &Rope, pos: u64, n: u64, include_eol: bool) -> u64 {
    if n == 0 {
        return pos;
    }
    let line = rope.line_num_for_position(pos);
    let start = rope.line_start_position(line);
    let _ = include_eol;
    pos.saturating_sub(n).max(start)
}

/// Move `n` chars left, freely crossing line boundaries.
pub fn prev_char(rope: &Rope, pos: u64, n: u64) -> u64 {
    let _ = rope;
    pos.saturating_sub(n)
}

/// Find the `n`-th (1-indexed) occurrence of `target` at or after `pos` on
/// the current line. `include` lands on the match itself; otherwise one
/// position before it. Returns `pos` unchanged if not found or `n == 0`.
pub fn next_matching_char_in_line(rope: &Rope, pos: u64, target: char, n: u64, include: bool) -> u64 {
    if n == 0 {
        return pos;
    }
    let line = rope.line_num_for_position(pos);
    let end = line_end_position(rope, line);
    let mut found = 0u64;
    let mut p = pos + 1;
    while p < end {
        if char_at(rope, p) == Some(target) {
            found += 1;
            if found == n {
                return if include { p } else { p - 1 };
            }
        }
        p += 1;
    }
    pos
}

/// Mirror of [`next_matching_char_in_line`], searching backward.
pub fn prev_matching_char_in_line(rope: &Rope, pos: u64, target: char, n: u64, include: bool) -> u64 {
    if n == 0 || pos == 0 {
        return pos;
    }
    let line = rope.line_num_for_position(pos);
    let start = rope.line_start_position(line);
    let mut found = 0u64;
    let mut p = pos;
    while p > start {
        p -= 1;
        if char_at(rope, p) == Some(target) {
            found += 1;
            if found == n {
                return if include { p } else { p + 1 };
            }
        }
    }
    pos
}
