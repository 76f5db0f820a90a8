//! Subset construction (spec §4.4 steps 2-4): turns the Thompson NFA into a
//! deterministic machine whose outgoing event ranges are disjoint and sorted
//! per state, accept states resolved to the lowest declared `cmd_id`, and
//! capture annotations propagated onto the transitions that carry them.

use crate::error::CompileError;
use crate::expr::CmdExpr;
use crate::nfa::{Nfa, ReadEdge};
use core_events::Event;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub lo: Event,
    pub hi: Event,
    pub to: usize,
    /// `(cmd_id, capture_id)` pairs this transition feeds into.
    pub captures: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct DfaState {
    pub transitions: Vec<Transition>,
    pub accept: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: usize,
}

impl Dfa {
    pub fn compile(cmds: &[CmdExpr]) -> Result<Dfa, CompileError> {
        let nfa = Nfa::compile(cmds)?;
        Ok(subset_construct(&nfa))
    }

    /// Longest accepting path through the machine, used to size the
    /// runtime's event buffer. Star-induced cycles have no finite longest
    /// path, so a generous fixed capacity stands in for them instead.
    pub fn max_match_len(&self) -> u32 {
        const CYCLE_FALLBACK: u32 = 256;
        if self.has_cycle() {
            return CYCLE_FALLBACK;
        }
        let mut memo = vec![None; self.states.len()];
        longest_path_from(self, self.start, &mut memo)
    }

    fn has_cycle(&self) -> bool {
        let mut mark = vec![0u8; self.states.len()];
        visit_for_cycle(self, self.start, &mut mark)
    }
}

fn visit_for_cycle(dfa: &Dfa, id: usize, mark: &mut [u8]) -> bool {
    mark[id] = 1;
    for t in &dfa.states[id].transitions {
        if mark[t.to] == 1 {
            return true;
        }
        if mark[t.to] == 0 && visit_for_cycle(dfa, t.to, mark) {
            return true;
        }
    }
    mark[id] = 2;
    false
}

fn longest_path_from(dfa: &Dfa, id: usize, memo: &mut Vec<Option<u32>>) -> u32 {
    if let Some(v) = memo[id] {
        return v;
    }
    let mut best = 0;
    for t in &dfa.states[id].transitions {
        best = best.max(1 + longest_path_from(dfa, t.to, memo));
    }
    memo[id] = Some(best);
    best
}

fn intern(
    index: &mut HashMap<Vec<usize>, usize>,
    subsets: &mut Vec<Vec<usize>>,
    transitions: &mut Vec<Vec<Transition>>,
    accepts: &mut Vec<Option<u32>>,
    subset: Vec<usize>,
) -> usize {
    if let Some(&id) = index.get(&subset) {
        return id;
    }
    let id = subsets.len();
    subsets.push(subset.clone());
    transitions.push(Vec::new());
    accepts.push(None);
    index.insert(subset, id);
    id
}

/// Every `lo` and every `hi + 1` is a boundary; the elementary ranges
/// between consecutive boundaries are where no edge partially overlaps
/// another, so each one maps cleanly onto a single outgoing DFA transition.
fn boundaries(edges: &[&ReadEdge]) -> Vec<i128> {
    let mut b = Vec::with_capacity(edges.len() * 2);
    for e in edges {
        b.push(e.lo as i128);
        b.push(e.hi as i128 + 1);
    }
    b.sort_unstable();
    b.dedup();
    b
}

fn merge_adjacent(transitions: Vec<Transition>) -> Vec<Transition> {
    let mut merged: Vec<Transition> = Vec::with_capacity(transitions.len());
    for t in transitions {
        if let Some(last) = merged.last_mut() {
            if last.to == t.to && last.captures == t.captures && last.hi.checked_add(1) == Some(t.lo) {
                last.hi = t.hi;
                continue;
            }
        }
        merged.push(t);
    }
    merged
}

fn subset_construct(nfa: &Nfa) -> Dfa {
    let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut subsets: Vec<Vec<usize>> = Vec::new();
    let mut transitions: Vec<Vec<Transition>> = Vec::new();
    let mut accepts: Vec<Option<u32>> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut processed: HashSet<usize> = HashSet::new();

    let start_subset = nfa.epsilon_closure(&[nfa.start]);
    let start_id = intern(&mut index, &mut subsets, &mut transitions, &mut accepts, start_subset);
    queue.push_back(start_id);

    while let Some(id) = queue.pop_front() {
        if !processed.insert(id) {
            continue;
        }
        let subset = subsets[id].clone();

        accepts[id] = nfa
            .accepts
            .iter()
            .filter(|(s, _)| subset.contains(s))
            .map(|(_, cmd)| *cmd)
            .min();

        let edges: Vec<&ReadEdge> = subset.iter().flat_map(|&s| nfa.states[s].reads.iter()).collect();
        if edges.is_empty() {
            continue;
        }

        let bounds = boundaries(&edges);
        let mut built: Vec<Transition> = Vec::new();
        for w in bounds.windows(2) {
            let (lo128, hi_excl128) = (w[0], w[1]);
            let covering: Vec<&&ReadEdge> = edges
                .iter()
                .filter(|e| (e.lo as i128) <= lo128 && hi_excl128 - 1 <= e.hi as i128)
                .collect();
            if covering.is_empty() {
                continue;
            }

            let mut targets: Vec<usize> = covering.iter().map(|e| e.to).collect();
            targets.sort_unstable();
            targets.dedup();
            let next_subset = nfa.epsilon_closure(&targets);
            let next_id = intern(&mut index, &mut subsets, &mut transitions, &mut accepts, next_subset);
            queue.push_back(next_id);

            let mut captures: Vec<(u32, u32)> = covering.iter().flat_map(|e| e.captures.iter().copied()).collect();
            captures.sort_unstable();
            captures.dedup();

            built.push(Transition {
                lo: lo128 as Event,
                hi: (hi_excl128 - 1) as Event,
                to: next_id,
                captures,
            });
        }
        transitions[id] = merge_adjacent(built);
    }

    let states = (0..subsets.len())
        .map(|i| DfaState {
            transitions: std::mem::take(&mut transitions[i]),
            accept: accepts[i],
        })
        .collect();

    Dfa { states, start: start_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::expr::Expr;

    fn ranges_for(dfa: &Dfa, state: usize) -> Vec<(Event, Event)> {
        dfa.states[state].transitions.iter().map(|t| (t.lo, t.hi)).collect()
    }

    #[test]
    fn sequential_events_compile_to_a_simple_chain() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(2), Expr::event(3), Expr::event(4)]))];
        let dfa = Dfa::compile(&cmds).unwrap();
        assert_eq!(ranges_for(&dfa, dfa.start), vec![(2, 2)]);
        assert_eq!(dfa.max_match_len(), 3);
    }

    #[test]
    fn overlapping_ranges_are_split_at_the_boundary() {
        // cmd0 matches [1,5]; cmd1 matches [3,8]. They overlap on [3,5].
        let cmds = vec![
            CmdExpr::new(0, Expr::range(1, 5)),
            CmdExpr::new(1, Expr::range(3, 8)),
        ];
        let dfa = Dfa::compile(&cmds).unwrap();
        let mut ranges = ranges_for(&dfa, dfa.start);
        ranges.sort();
        assert_eq!(ranges, vec![(1, 2), (3, 5), (6, 8)]);
        // Ranges are disjoint and sorted ascending (the critical invariant).
        for w in ranges.windows(2) {
            assert!(w[0].1 < w[1].0);
        }
    }

    #[test]
    fn accept_resolves_to_the_lower_cmd_id_on_overlap() {
        let cmds = vec![CmdExpr::new(5, Expr::event(1)), CmdExpr::new(1, Expr::event(1))];
        let dfa = Dfa::compile(&cmds).unwrap();
        let (_, next) = dfa.states[dfa.start].transitions.iter().map(|t| (t.lo, t.to)).next().unwrap();
        assert_eq!(dfa.states[next].accept, Some(1));
    }

    #[test]
    fn star_compiles_to_a_cyclic_machine_with_a_fallback_buffer_size() {
        let cmds = vec![CmdExpr::new(0, Expr::star(Expr::event(7)))];
        let dfa = Dfa::compile(&cmds).unwrap();
        assert!(dfa.has_cycle());
        assert_eq!(dfa.max_match_len(), 256);
    }

    #[test]
    fn capture_is_tagged_on_the_transitions_inside_it() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([Expr::event(1), Expr::capture(9, Expr::event(2))]))];
        let dfa = Dfa::compile(&cmds).unwrap();
        let first = &dfa.states[dfa.start].transitions[0];
        assert!(first.captures.is_empty());
        let second_state = first.to;
        let second = &dfa.states[second_state].transitions[0];
        assert_eq!(second.captures, vec![(0, 9)]);
    }
}
