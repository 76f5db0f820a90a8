//! Input state-machine engine (spec §4.4): compiles regular expressions
//! over opaque input events into either a deterministic state machine
//! (`dfa`/`runtime`) or an equivalent NFA bytecode VM (`vm`), plus the
//! binary serialization for the compiled DFA form.
//!
//! Two compilers, one language: both accept exactly the inputs
//! [`expr::validate_cmds`] allows and reject everything else the same way.

mod dfa;
mod error;
mod expr;
mod nfa;
mod runtime;
mod serialize;
mod vm;

pub use dfa::{Dfa, DfaState, Transition};
pub use error::{CompileError, DecodeError};
pub use expr::{CmdExpr, Expr};
pub use runtime::{Decision, Engine};
pub use vm::{Instr, Program, Vm};
