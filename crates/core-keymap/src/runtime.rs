//! The DFA runtime (spec §4.4 "Runtime"): feeds one event at a time
//! through a compiled [`Dfa`] and reports `Accept` / `Wait` / `Reject`.

use crate::dfa::{Dfa, Transition};
use core_events::Event;
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept {
        cmd_id: u32,
        captures: BTreeMap<u32, Vec<Event>>,
    },
    Wait,
    Reject,
}

/// Buffers events since the last reset and walks `dfa` one event at a time.
pub struct Engine<'a> {
    dfa: &'a Dfa,
    state: usize,
    buffer: Vec<(Event, Vec<(u32, u32)>)>,
    capacity: u32,
}

impl<'a> Engine<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Self {
            dfa,
            state: dfa.start,
            buffer: Vec::new(),
            capacity: dfa.max_match_len().max(1),
        }
    }

    /// Cancels a pending multi-event input (spec §5: a consumer may cancel a
    /// pending multi-event input by calling `reset()`).
    pub fn reset(&mut self) {
        self.state = self.dfa.start;
        self.buffer.clear();
    }

    pub fn process_event(&mut self, e: Event) -> Decision {
        if let Some(decision) = self.try_consume(e) {
            trace!(target = "keymap.runtime", event = e, state = self.state, "consumed");
            return decision;
        }
        if self.state == self.dfa.start {
            debug!(target = "keymap.runtime", event = e, "reject");
            return Decision::Reject;
        }
        self.reset();
        let decision = self.try_consume(e).unwrap_or(Decision::Reject);
        debug!(target = "keymap.runtime", event = e, retried = true, ?decision, "reject_then_retry");
        decision
    }

    fn try_consume(&mut self, e: Event) -> Option<Decision> {
        let found: Transition = self.dfa.states[self.state]
            .transitions
            .iter()
            .find(|t| t.lo <= e && e <= t.hi)
            .cloned()?;

        self.buffer.push((e, found.captures));
        self.state = found.to;
        let next = &self.dfa.states[self.state];

        Some(match next.accept {
            Some(cmd_id) if next.transitions.is_empty() || self.buffer.len() as u32 >= self.capacity => {
                let captures = self.extract_captures(cmd_id);
                self.reset();
                Decision::Accept { cmd_id, captures }
            }
            _ => Decision::Wait,
        })
    }

    fn extract_captures(&self, cmd_id: u32) -> BTreeMap<u32, Vec<Event>> {
        let mut out: BTreeMap<u32, Vec<Event>> = BTreeMap::new();
        for (event, tags) in &self.buffer {
            for &(tag_cmd, capture_id) in tags {
                if tag_cmd == cmd_id {
                    out.entry(capture_id).or_default().push(*event);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CmdExpr, Expr};
    use pretty_assertions::assert_eq;

    #[test]
    fn sequential_match_waits_then_accepts() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(2), Expr::event(3), Expr::event(4)]))];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut engine = Engine::new(&dfa);

        assert_eq!(engine.process_event(1), Decision::Reject);
        assert_eq!(engine.process_event(2), Decision::Wait);
        assert_eq!(engine.process_event(3), Decision::Wait);
        assert_eq!(
            engine.process_event(4),
            Decision::Accept {
                cmd_id: 0,
                captures: BTreeMap::new()
            }
        );
    }

    #[test]
    fn stray_event_mid_sequence_rejects_after_retrying_from_start() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(5), Expr::event(6)]))];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut engine = Engine::new(&dfa);

        assert_eq!(engine.process_event(5), Decision::Wait);
        assert_eq!(engine.process_event(9), Decision::Reject);
        // The engine recovered cleanly and can still match a fresh sequence.
        assert_eq!(engine.process_event(5), Decision::Wait);
        assert_eq!(
            engine.process_event(6),
            Decision::Accept {
                cmd_id: 0,
                captures: BTreeMap::new()
            }
        );
    }

    #[test]
    fn ambiguous_prefix_waits_even_though_the_current_state_already_accepts() {
        // "1" alone accepts; "1 2" also accepts. After "1" the machine must
        // keep waiting, since a longer match is still possible.
        let cmds = vec![CmdExpr::new(
            0,
            Expr::alt([Expr::event(1), Expr::concat([Expr::event(1), Expr::event(2)])]),
        )];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut engine = Engine::new(&dfa);

        assert_eq!(engine.process_event(1), Decision::Wait);
        assert_eq!(
            engine.process_event(2),
            Decision::Accept {
                cmd_id: 0,
                captures: BTreeMap::new()
            }
        );
    }

    #[test]
    fn captures_record_the_events_consumed_inside_them() {
        let cmds = vec![CmdExpr::new(
            0,
            Expr::concat([Expr::event(1), Expr::capture(9, Expr::concat([Expr::event(2), Expr::event(3)]))]),
        )];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut engine = Engine::new(&dfa);

        assert_eq!(engine.process_event(1), Decision::Wait);
        assert_eq!(engine.process_event(2), Decision::Wait);
        match engine.process_event(3) {
            Decision::Accept { cmd_id, captures } => {
                assert_eq!(cmd_id, 0);
                assert_eq!(captures.get(&9), Some(&vec![2, 3]));
            }
            other => panic!("expected accept, got {other:?}"),
        }
    }

    #[test]
    fn reset_cancels_a_pending_sequence() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(5), Expr::event(6)]))];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut engine = Engine::new(&dfa);

        assert_eq!(engine.process_event(5), Decision::Wait);
        engine.reset();
        assert_eq!(engine.process_event(5), Decision::Wait);
        assert_eq!(
            engine.process_event(6),
            Decision::Accept {
                cmd_id: 0,
                captures: BTreeMap::new()
            }
        );
    }
}
