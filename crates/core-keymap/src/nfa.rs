//! Thompson construction (spec §4.4 step 1): each expression becomes a
//! fragment with one entry and one exit state, wired together with
//! ε-transitions. Capture membership is recorded directly on the `Read`
//! edges a capture's subtree builds, rather than via separate marker
//! states — the set of edges traversed while "inside" a capture is exactly
//! the span of events it captures, so this is an equivalent construction
//! that the subset-construction step in `dfa.rs` can propagate without
//! having to walk ε-closures for marker tags.
//!
//! Structural validity (no `nil` expressions, ranges in order, no nested
//! captures, no duplicate `cmd_id`s) is checked once up front by
//! [`crate::expr::validate_cmds`], shared with the bytecode VM compiler, so
//! construction below can assume it never sees invalid input.

use crate::error::CompileError;
use crate::expr::{validate_cmds, CmdExpr, Expr};
use core_events::Event;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub(crate) struct ReadEdge {
    pub(crate) lo: Event,
    pub(crate) hi: Event,
    pub(crate) to: usize,
    /// `(cmd_id, capture_id)` pairs open while this edge is traversed.
    pub(crate) captures: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
    pub(crate) eps: Vec<usize>,
    pub(crate) reads: Vec<ReadEdge>,
}

pub(crate) struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: usize,
    /// NFA accepting states and the command they accept, in declaration order.
    pub(crate) accepts: Vec<(usize, u32)>,
}

struct Builder {
    states: Vec<NfaState>,
}

impl Builder {
    fn new_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn add_eps(&mut self, from: usize, to: usize) {
        self.states[from].eps.push(to);
    }

    fn add_read(&mut self, from: usize, lo: Event, hi: Event, to: usize, captures: Vec<(u32, u32)>) {
        self.states[from].reads.push(ReadEdge { lo, hi, to, captures });
    }
}

/// Builds one fragment per expression, returning its (entry, exit) states.
/// Assumes `expr` already passed [`validate_cmds`].
fn build_expr(b: &mut Builder, expr: &Expr, cmd_id: u32, open_capture: &mut Option<u32>) -> (usize, usize) {
    match expr {
        Expr::Event(e) => {
            let (s, t) = (b.new_state(), b.new_state());
            b.add_read(s, *e, *e, t, captures_tag(cmd_id, *open_capture));
            (s, t)
        }
        Expr::EventRange(a, b_) => {
            let (s, t) = (b.new_state(), b.new_state());
            b.add_read(s, *a, *b_, t, captures_tag(cmd_id, *open_capture));
            (s, t)
        }
        Expr::Concat(children) => {
            let mut iter = children.iter();
            let (start, mut prev_end) = build_expr(b, iter.next().unwrap(), cmd_id, open_capture);
            for child in iter {
                let (cs, ce) = build_expr(b, child, cmd_id, open_capture);
                b.add_eps(prev_end, cs);
                prev_end = ce;
            }
            (start, prev_end)
        }
        Expr::Alt(children) => {
            let s = b.new_state();
            let e = b.new_state();
            for child in children {
                let (cs, ce) = build_expr(b, child, cmd_id, open_capture);
                b.add_eps(s, cs);
                b.add_eps(ce, e);
            }
            (s, e)
        }
        Expr::Option(child) => {
            let (cs, ce) = build_expr(b, child, cmd_id, open_capture);
            let s = b.new_state();
            let e = b.new_state();
            b.add_eps(s, cs);
            b.add_eps(s, e);
            b.add_eps(ce, e);
            (s, e)
        }
        Expr::Star(child) => {
            let (cs, ce) = build_expr(b, child, cmd_id, open_capture);
            let s = b.new_state();
            let e = b.new_state();
            b.add_eps(s, cs);
            b.add_eps(s, e);
            b.add_eps(ce, cs);
            b.add_eps(ce, e);
            (s, e)
        }
        Expr::Capture(id, child) => {
            *open_capture = Some(*id);
            let result = build_expr(b, child, cmd_id, open_capture);
            *open_capture = None;
            result
        }
    }
}

fn captures_tag(cmd_id: u32, open_capture: Option<u32>) -> Vec<(u32, u32)> {
    open_capture.map(|id| vec![(cmd_id, id)]).unwrap_or_default()
}

impl Nfa {
    pub(crate) fn compile(cmds: &[CmdExpr]) -> Result<Nfa, CompileError> {
        validate_cmds(cmds)?;

        let mut b = Builder { states: Vec::new() };
        let start = b.new_state();
        let mut accepts = Vec::new();
        for c in cmds {
            let mut open_capture = None;
            let (cs, ce) = build_expr(&mut b, &c.expr, c.cmd_id, &mut open_capture);
            b.add_eps(start, cs);
            accepts.push((ce, c.cmd_id));
        }

        Ok(Nfa {
            states: b.states,
            start,
            accepts,
        })
    }

    /// ε-closure of a set of states, as a sorted deduplicated vector.
    pub(crate) fn epsilon_closure(&self, seeds: &[usize]) -> Vec<usize> {
        let mut stack: Vec<usize> = seeds.to_vec();
        let mut seen: HashSet<usize> = seeds.iter().copied().collect();
        let mut out: Vec<usize> = seeds.to_vec();
        while let Some(s) = stack.pop() {
            for &next in &self.states[s].eps {
                if seen.insert(next) {
                    stack.push(next);
                    out.push(next);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use pretty_assertions::assert_eq;

    #[test]
    fn concat_chains_reads_in_sequence() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(1), Expr::event(2)]))];
        let nfa = Nfa::compile(&cmds).unwrap();
        assert_eq!(nfa.accepts.len(), 1);
        assert_eq!(nfa.accepts[0].1, 0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cmds = vec![CmdExpr::new(0, Expr::range(5, 2))];
        assert!(matches!(Nfa::compile(&cmds), Err(CompileError::InvalidRange(5, 2))));
    }

    #[test]
    fn duplicate_cmd_id_is_rejected() {
        let cmds = vec![CmdExpr::new(0, Expr::event(1)), CmdExpr::new(0, Expr::event(2))];
        assert!(matches!(Nfa::compile(&cmds), Err(CompileError::DuplicateCmdId(0))));
    }

    #[test]
    fn nested_capture_is_rejected() {
        let inner = Expr::capture(2, Expr::event(1));
        let outer = Expr::capture(1, inner);
        let cmds = vec![CmdExpr::new(0, outer)];
        assert!(matches!(Nfa::compile(&cmds), Err(CompileError::NestedCapture(2))));
    }

    #[test]
    fn epsilon_closure_follows_star_back_edge() {
        let cmds = vec![CmdExpr::new(0, Expr::star(Expr::event(1)))];
        let nfa = Nfa::compile(&cmds).unwrap();
        let closure = nfa.epsilon_closure(&[nfa.start]);
        // start -> star-entry -> (child-entry via eps, star-exit via eps)
        assert!(closure.len() >= 3);
    }
}
