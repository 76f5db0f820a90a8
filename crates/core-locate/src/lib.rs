//! Text locators and motions (spec §4.2): pure functions from a `Rope` plus
//! a char position to another char position. None of these hold state of
//! their own — callers (the input engine's command handlers) own the
//! position being moved and call straight through.

mod bracket;
mod class;
mod common;
mod horizontal;
mod indent;
mod line;
mod paragraph;
mod word;

pub use bracket::{delimited_block, matching_code_block_delimiter, next_unmatched_close, prev_unmatched_open, PAIRS};
pub use horizontal::{next_char_in_line, next_matching_char_in_line, prev_char, prev_char_in_line, prev_matching_char_in_line};
pub use indent::prev_auto_indent;
pub use line::{
    closest_char_on_line, next_line_boundary, prev_line_boundary, start_of_last_line, start_of_line_above,
    start_of_line_at_pos, start_of_line_below, start_of_line_num,
};
pub use paragraph::{next_paragraph_start, prev_paragraph_start};
pub use word::{
    current_word_end, current_word_end_with_trailing_whitespace, current_word_start, next_word_end, next_word_start,
    prev_word_start,
};
