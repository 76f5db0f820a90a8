//! Regular expressions over input events (spec §4.4 "Regex expression AST").
//!
//! A polymorphic expression node would be an interface elsewhere; here it's
//! a tagged variant, matching how the rest of the core models sum types.

use crate::error::CompileError;
use core_events::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Event(Event),
    EventRange(Event, Event),
    Concat(Vec<Expr>),
    Alt(Vec<Expr>),
    Option(Box<Expr>),
    Star(Box<Expr>),
    /// Capture ids do not nest: a `Capture` may not contain another
    /// `Capture` anywhere in its subtree.
    Capture(u32, Box<Expr>),
}

impl Expr {
    pub fn event(e: Event) -> Self {
        Expr::Event(e)
    }

    pub fn range(a: Event, b: Event) -> Self {
        Expr::EventRange(a, b)
    }

    pub fn concat(children: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Concat(children.into_iter().collect())
    }

    pub fn alt(children: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Alt(children.into_iter().collect())
    }

    pub fn option(child: Expr) -> Self {
        Expr::Option(Box::new(child))
    }

    pub fn star(child: Expr) -> Self {
        Expr::Star(Box::new(child))
    }

    pub fn capture(id: u32, child: Expr) -> Self {
        Expr::Capture(id, Box::new(child))
    }
}

/// A command identifier bound to the pattern that triggers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdExpr {
    pub cmd_id: u32,
    pub expr: Expr,
}

impl CmdExpr {
    pub fn new(cmd_id: u32, expr: Expr) -> Self {
        Self { cmd_id, expr }
    }
}

/// Structural validation shared by both compilers (the DFA path and the
/// bytecode VM), so the two are guaranteed to reject the same inputs:
/// `nil` expressions (an empty `Concat`/`Alt`), inverted ranges, duplicate
/// `cmd_id`s, and captures nested inside captures.
pub fn validate_cmds(cmds: &[CmdExpr]) -> Result<(), CompileError> {
    let mut seen = std::collections::HashSet::new();
    for c in cmds {
        if !seen.insert(c.cmd_id) {
            return Err(CompileError::DuplicateCmdId(c.cmd_id));
        }
    }
    for c in cmds {
        validate_expr(&c.expr, false)?;
    }
    Ok(())
}

fn validate_expr(expr: &Expr, inside_capture: bool) -> Result<(), CompileError> {
    match expr {
        Expr::Event(_) => Ok(()),
        Expr::EventRange(a, b) => {
            if a > b {
                Err(CompileError::InvalidRange(*a, *b))
            } else {
                Ok(())
            }
        }
        Expr::Concat(children) | Expr::Alt(children) => {
            if children.is_empty() {
                return Err(CompileError::InvalidExprType);
            }
            for c in children {
                validate_expr(c, inside_capture)?;
            }
            Ok(())
        }
        Expr::Option(child) | Expr::Star(child) => validate_expr(child, inside_capture),
        Expr::Capture(id, child) => {
            if inside_capture {
                return Err(CompileError::NestedCapture(*id));
            }
            validate_expr(child, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nil_expression_is_rejected() {
        let cmds = vec![CmdExpr::new(0, Expr::concat([]))];
        assert_eq!(validate_cmds(&cmds), Err(CompileError::InvalidExprType));
    }

    #[test]
    fn duplicate_capture_ids_across_commands_are_allowed() {
        let cmds = vec![
            CmdExpr::new(0, Expr::capture(1, Expr::event(1))),
            CmdExpr::new(1, Expr::capture(1, Expr::event(2))),
        ];
        assert_eq!(validate_cmds(&cmds), Ok(()));
    }
}
