//! The alternative NFA bytecode VM (spec §4.4 "Alternative NFA VM"):
//! compiles expressions directly to bytecode and runs a Pike-style thread
//! simulation instead of determinizing. Accepts the same languages as the
//! DFA engine and reports the same [`Decision`] outcomes.

use crate::error::CompileError;
use crate::expr::{validate_cmds, CmdExpr, Expr};
use crate::runtime::Decision;
use core_events::Event;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Read(Event, Event),
    Jump(usize),
    Fork(usize, usize),
    StartCapture(u32),
    EndCapture(u32),
    Accept(u32),
}

#[derive(Debug, Clone)]
pub struct Program {
    pub instrs: Vec<Instr>,
}

fn compile_expr(instrs: &mut Vec<Instr>, expr: &Expr) {
    match expr {
        Expr::Event(e) => instrs.push(Instr::Read(*e, *e)),
        Expr::EventRange(a, b) => instrs.push(Instr::Read(*a, *b)),
        Expr::Concat(children) => {
            for child in children {
                compile_expr(instrs, child);
            }
        }
        Expr::Alt(children) => {
            let mut jump_patches = Vec::new();
            for (i, child) in children.iter().enumerate() {
                if i + 1 < children.len() {
                    let fork_idx = instrs.len();
                    instrs.push(Instr::Fork(0, 0));
                    let branch_start = instrs.len();
                    compile_expr(instrs, child);
                    let jump_idx = instrs.len();
                    instrs.push(Instr::Jump(0));
                    jump_patches.push(jump_idx);
                    let next_branch = instrs.len();
                    instrs[fork_idx] = Instr::Fork(branch_start, next_branch);
                } else {
                    compile_expr(instrs, child);
                }
            }
            let end = instrs.len();
            for idx in jump_patches {
                instrs[idx] = Instr::Jump(end);
            }
        }
        Expr::Option(child) => {
            let fork_idx = instrs.len();
            instrs.push(Instr::Fork(0, 0));
            let branch_start = instrs.len();
            compile_expr(instrs, child);
            let end = instrs.len();
            instrs[fork_idx] = Instr::Fork(branch_start, end);
        }
        Expr::Star(child) => {
            let fork_idx = instrs.len();
            instrs.push(Instr::Fork(0, 0));
            let body_start = instrs.len();
            compile_expr(instrs, child);
            instrs.push(Instr::Jump(fork_idx));
            let end = instrs.len();
            instrs[fork_idx] = Instr::Fork(body_start, end);
        }
        Expr::Capture(id, child) => {
            instrs.push(Instr::StartCapture(*id));
            compile_expr(instrs, child);
            instrs.push(Instr::EndCapture(*id));
        }
    }
}

impl Program {
    /// Compiles `(cmd_id, expr)` pairs, highest-priority (lowest `cmd_id`)
    /// branch first, so thread dedup in [`Vm`] naturally favors it on ties.
    pub fn compile(cmds: &[CmdExpr]) -> Result<Program, CompileError> {
        validate_cmds(cmds)?;
        let mut ordered: Vec<&CmdExpr> = cmds.iter().collect();
        ordered.sort_by_key(|c| c.cmd_id);

        let mut instrs = Vec::new();
        for (i, cmd) in ordered.iter().enumerate() {
            if i + 1 < ordered.len() {
                let fork_idx = instrs.len();
                instrs.push(Instr::Fork(0, 0));
                let branch_start = instrs.len();
                compile_expr(&mut instrs, &cmd.expr);
                instrs.push(Instr::Accept(cmd.cmd_id));
                let next_branch = instrs.len();
                instrs[fork_idx] = Instr::Fork(branch_start, next_branch);
            } else {
                compile_expr(&mut instrs, &cmd.expr);
                instrs.push(Instr::Accept(cmd.cmd_id));
            }
        }

        Ok(Program { instrs })
    }

    fn has_cycle(&self) -> bool {
        let mut mark = vec![0u8; self.instrs.len()];
        self.visit(0, &mut mark)
    }

    fn visit(&self, pc: usize, mark: &mut [u8]) -> bool {
        mark[pc] = 1;
        let result = match self.instrs[pc] {
            Instr::Read(..) | Instr::Accept(_) => false,
            Instr::Jump(to) => self.step_into(to, mark),
            Instr::Fork(a, b) => self.step_into(a, mark) || self.step_into(b, mark),
            Instr::StartCapture(_) | Instr::EndCapture(_) => self.step_into(pc + 1, mark),
        };
        mark[pc] = 2;
        result
    }

    fn step_into(&self, pc: usize, mark: &mut [u8]) -> bool {
        if mark[pc] == 1 {
            return true;
        }
        mark[pc] == 0 && self.visit(pc, mark)
    }

    /// Longest accepting path, in events consumed — sizes the runtime's
    /// event buffer the same way `Dfa::max_match_len` does.
    pub fn max_match_len(&self) -> u32 {
        const CYCLE_FALLBACK: u32 = 256;
        if self.instrs.is_empty() || self.has_cycle() {
            return CYCLE_FALLBACK;
        }
        let mut memo = vec![None; self.instrs.len()];
        self.longest_from(0, &mut memo)
    }

    fn longest_from(&self, pc: usize, memo: &mut Vec<Option<u32>>) -> u32 {
        if let Some(v) = memo[pc] {
            return v;
        }
        let result = match self.instrs[pc] {
            Instr::Read(..) => 1 + self.longest_from(pc + 1, memo),
            Instr::Accept(_) => 0,
            Instr::Jump(to) => self.longest_from(to, memo),
            Instr::Fork(a, b) => self.longest_from(a, memo).max(self.longest_from(b, memo)),
            Instr::StartCapture(_) | Instr::EndCapture(_) => self.longest_from(pc + 1, memo),
        };
        memo[pc] = Some(result);
        result
    }
}

#[derive(Clone)]
struct VmThread {
    pc: usize,
    active_capture: Option<u32>,
    captures: BTreeMap<u32, Vec<Event>>,
}

/// Runs `program` as a set of parallel threads (spec §4.4 "Alternative NFA
/// VM"): each event advances or kills every thread, `Fork` duplicates a
/// thread's state at zero input cost, and `Accept` discards the rest.
pub struct Vm<'a> {
    program: &'a Program,
    threads: Vec<VmThread>,
    at_start: bool,
}

fn add_thread(program: &Program, thread: VmThread, out: &mut Vec<VmThread>, seen: &mut HashSet<usize>) {
    if !seen.insert(thread.pc) {
        return;
    }
    match program.instrs[thread.pc] {
        Instr::Jump(to) => add_thread(program, VmThread { pc: to, ..thread }, out, seen),
        Instr::Fork(a, b) => {
            add_thread(program, VmThread { pc: a, ..thread.clone() }, out, seen);
            add_thread(program, VmThread { pc: b, ..thread }, out, seen);
        }
        Instr::StartCapture(id) => {
            let pc = thread.pc + 1;
            add_thread(
                program,
                VmThread {
                    pc,
                    active_capture: Some(id),
                    ..thread
                },
                out,
                seen,
            );
        }
        Instr::EndCapture(_) => {
            let pc = thread.pc + 1;
            add_thread(
                program,
                VmThread {
                    pc,
                    active_capture: None,
                    ..thread
                },
                out,
                seen,
            );
        }
        Instr::Read(..) | Instr::Accept(_) => out.push(thread),
    }
}

impl<'a> Vm<'a> {
    pub fn new(program: &'a Program) -> Self {
        let mut vm = Self {
            program,
            threads: Vec::new(),
            at_start: true,
        };
        vm.reset();
        vm
    }

    pub fn reset(&mut self) {
        self.threads.clear();
        self.at_start = true;
        if self.program.instrs.is_empty() {
            return;
        }
        let seed = VmThread {
            pc: 0,
            active_capture: None,
            captures: BTreeMap::new(),
        };
        let mut seen = HashSet::new();
        add_thread(self.program, seed, &mut self.threads, &mut seen);
    }

    pub fn process_event(&mut self, e: Event) -> Decision {
        if let Some(decision) = self.try_consume(e) {
            return decision;
        }
        if self.at_start {
            return Decision::Reject;
        }
        self.reset();
        self.try_consume(e).unwrap_or(Decision::Reject)
    }

    fn try_consume(&mut self, e: Event) -> Option<Decision> {
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        let mut matched = false;

        for thread in self.threads.drain(..) {
            if let Instr::Read(lo, hi) = self.program.instrs[thread.pc] {
                if lo <= e && e <= hi {
                    matched = true;
                    let mut t = thread;
                    if let Some(id) = t.active_capture {
                        t.captures.entry(id).or_default().push(e);
                    }
                    let pc = t.pc + 1;
                    add_thread(self.program, VmThread { pc, ..t }, &mut next, &mut seen);
                }
            }
        }

        if !matched {
            return None;
        }
        self.at_start = false;

        let (accepts, live): (Vec<_>, Vec<_>) =
            next.into_iter().partition(|t| matches!(self.program.instrs[t.pc], Instr::Accept(_)));

        if live.is_empty() {
            let best = accepts
                .into_iter()
                .min_by_key(|t| match self.program.instrs[t.pc] {
                    Instr::Accept(id) => id,
                    _ => unreachable!("partitioned as an accept thread above"),
                })
                .expect("matched implies at least one surviving thread");
            let cmd_id = match self.program.instrs[best.pc] {
                Instr::Accept(id) => id,
                _ => unreachable!(),
            };
            self.reset();
            Some(Decision::Accept {
                cmd_id,
                captures: best.captures,
            })
        } else {
            self.threads = live;
            Some(Decision::Wait)
        }
    }
}
