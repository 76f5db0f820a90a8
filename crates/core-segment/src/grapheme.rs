//! Grapheme-cluster iterator (UAX #29 rules GB1-GB13, GB999).
//!
//! Operates over any `Iterator<Item = char>` so the same algorithm drives a
//! forward rope cursor, a backward one, or a plain `str::chars()` — the
//! break logic itself never looks at byte offsets.

use crate::classify::{classify_grapheme, GraphemeProp};
use crate::Segment;

#[derive(Default)]
struct BreakState {
    prev: Option<GraphemeProp>,
    after_pictographic_extend: bool,
    ri_run_len: u32,
}

impl BreakState {
    /// True if a cluster boundary exists before `next`, given `prev` is the
    /// last property observed. Mutates run-tracking state as a side effect.
    fn is_break_before(&mut self, next: GraphemeProp) -> bool {
        use GraphemeProp::*;
        let prev = match self.prev {
            None => {
                self.advance(next);
                return true; // GB1: break at start of text
            }
            Some(p) => p,
        };

        let break_here = match (prev, next) {
            (Cr, Lf) => false,                                  // GB3
            (Cr | Lf | Control, _) => true,                     // GB4
            (_, Cr | Lf | Control) => true,                     // GB5
            (L, L | V | Lv | Lvt) => false,                     // GB6
            (Lv | V, V | T) => false,                           // GB7
            (Lvt | T, T) => false,                              // GB8
            (_, Extend | ZwjProp) => false,                     // GB9
            (_, SpacingMark) => false,                          // GB9a
            (Prepend, _) => false,                              // GB9b
            (ZwjProp, ExtendedPictographic) if self.after_pictographic_extend => false, // GB11
            (RegionalIndicator, RegionalIndicator) => self.ri_run_len % 2 == 0, // GB12/GB13
            _ => true,                                          // GB999
        };

        self.advance(next);
        break_here
    }

    fn advance(&mut self, next: GraphemeProp) {
        use GraphemeProp::*;
        self.after_pictographic_extend = match next {
            ExtendedPictographic => true,
            Extend => self.after_pictographic_extend,
            ZwjProp => self.after_pictographic_extend,
            _ => false,
        };
        self.ri_run_len = if next == RegionalIndicator {
            self.ri_run_len + 1
        } else {
            0
        };
        self.prev = Some(next);
    }
}

/// Iterates grapheme clusters over a rune source, yielding one [`Segment`]
/// per cluster.
pub struct GraphemeClusters<I: Iterator<Item = char>> {
    source: std::iter::Peekable<I>,
    state: BreakState,
    started: bool,
}

impl<I: Iterator<Item = char>> GraphemeClusters<I> {
    pub fn new(source: I) -> Self {
        Self {
            source: source.peekable(),
            state: BreakState::default(),
            started: false,
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for GraphemeClusters<I> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let first = self.source.next()?;
        if !self.started {
            self.started = true;
            self.state.advance(classify_grapheme(first));
        }
        let mut runes = vec![first];
        while let Some(&peek) = self.source.peek() {
            let prop = classify_grapheme(peek);
            if self.state.is_break_before(prop) {
                break;
            }
            runes.push(self.source.next().unwrap());
        }
        Some(Segment::from_runes(runes))
    }
}
