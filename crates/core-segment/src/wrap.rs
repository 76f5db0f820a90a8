//! Visual line wrapping: combines the line-break iterator with a width
//! function and a max-width budget to produce wrapped [`Segment`]s.

use crate::linebreak::{BreakDecision, LineBreaks};
use crate::Segment;

/// `(rune, column_so_far) -> column width of that rune`, matching the
/// spec's `(runes, column) -> width` contract. Callers typically back this
/// with `core-segment`'s own grapheme/width tables; it is passed in rather
/// than fixed so tab expansion and double-width overrides stay callers'
/// business.
pub trait WidthFn {
    fn width(&self, c: char, column: usize) -> usize;
}

impl<F: Fn(char, usize) -> usize> WidthFn for F {
    fn width(&self, c: char, column: usize) -> usize {
        self(c, column)
    }
}

pub struct WrappedLines<I: Iterator<Item = char>, W: WidthFn> {
    breaks: std::iter::Peekable<LineBreaks<I>>,
    width_fn: W,
    max_width: usize,
}

impl<I: Iterator<Item = char>, W: WidthFn> WrappedLines<I, W> {
    pub fn new(source: I, width_fn: W, max_width: usize) -> Self {
        Self {
            breaks: LineBreaks::new(source).peekable(),
            width_fn,
            max_width: max_width.max(1),
        }
    }
}

impl<I: Iterator<Item = char>, W: WidthFn> Iterator for WrappedLines<I, W> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let (first, _) = self.breaks.next()?;
        let mut runes = vec![first];
        let mut column = self.width_fn.width(first, 0);

        loop {
            let Some(&(next_char, decision)) = self.breaks.peek() else {
                break;
            };
            if decision == BreakDecision::RequireBreakBefore {
                break;
            }
            let next_width = self.width_fn.width(next_char, column);
            // Break whenever the next rune would overflow the line, even at
            // a `NoBreak` boundary — a run with no break opportunity still
            // gets a forced char-break rather than overflowing the width
            // (this is also what gives an over-wide single cluster its own
            // line: the first rune of a line is always accepted above).
            if column + next_width > self.max_width {
                break;
            }
            let (c, _) = self.breaks.next().unwrap();
            runes.push(c);
            column += next_width;
        }
        Some(Segment::from_runes(runes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_width(_c: char, _col: usize) -> usize {
        1
    }

    #[test]
    fn wraps_at_max_width_on_space_boundary() {
        let lines: Vec<String> = WrappedLines::new("abc def".chars(), ascii_width, 4)
            .map(|s| s.text())
            .collect();
        assert_eq!(lines, vec!["abc ", "def"]);
    }

    #[test]
    fn oversized_single_cluster_gets_its_own_line() {
        let lines: Vec<String> = WrappedLines::new("ab".chars(), ascii_width, 1)
            .map(|s| s.text())
            .collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn mandatory_newline_starts_a_new_line() {
        let lines: Vec<String> = WrappedLines::new("ab\ncd".chars(), ascii_width, 80)
            .map(|s| s.text())
            .collect();
        assert_eq!(lines, vec!["ab\n", "cd"]);
    }
}
