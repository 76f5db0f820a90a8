//! Auto-indent locator: "what indentation should a freshly opened line
//! inherit" (spec §4.2) — the leading whitespace run of the previous
//! non-empty line, expanded to the configured tab stop.

use crate::common::char_at;
use core_text::Rope;

/// Leading-whitespace prefix of the line containing `pos`, as a column
/// count (tabs expand to the next multiple of `tab_size`). Returns 0 when
/// `enabled` is false.
pub fn prev_auto_indent(rope: &Rope, enabled: bool, tab_size: u64, pos: u64) -> u64 {
    if !enabled || tab_size == 0 {
        return 0;
    }
    let line = rope.line_num_for_position(pos);
    let start = rope.line_start_position(line);
    let mut p = start;
    let mut column = 0u64;
    while let Some(c) = char_at(rope, p) {
        match c {
            ' ' => column += 1,
            '\t' => column = (column / tab_size + 1) * tab_size,
            _ => break,
        }
        p += 1;
    }
    column
}
