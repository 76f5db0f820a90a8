//! Unicode segmentation: grapheme clusters (UAX #29) and line-break-aware
//! visual wrapping (UAX #14), driven by any rune source — a rope cursor or
//! a plain `str`.

pub mod classify;
pub mod grapheme;
pub mod linebreak;
pub mod wrap;

pub use grapheme::GraphemeClusters;
pub use linebreak::{BreakDecision, LineBreaks};
pub use wrap::{WidthFn, WrappedLines};

/// A sequence of runes forming one grapheme cluster or one wrapped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    runes: Vec<char>,
}

impl Segment {
    pub(crate) fn from_runes(runes: Vec<char>) -> Self {
        Self { runes }
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }

    pub fn num_runes(&self) -> usize {
        self.runes.len()
    }

    pub fn has_newline(&self) -> bool {
        self.runes.contains(&'\n') || self.runes.contains(&'\r')
    }

    pub fn is_whitespace(&self) -> bool {
        self.runes.iter().all(|c| c.is_whitespace())
    }

    pub fn text(&self) -> String {
        self.runes.iter().collect()
    }
}
