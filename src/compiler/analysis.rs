//! Static questions asked about expression trees before and during the
//! CPS transform

use super::ast::Expr;
use crate::breakpoint::BreakpointTable;
use crate::symbol::SymbolId;

/// Apply `pred` to each direct child evaluated as part of `expr` itself.
///
/// Function literal bodies are not children: they run when the function is
/// called, not when the literal is evaluated.
fn any_child(expr: &Expr, mut pred: impl FnMut(&Expr) -> bool) -> bool {
    match expr {
        Expr::Literal(_) | Expr::Var(_) | Expr::Lambda(_) => false,
        Expr::Call { func, args } => pred(func) || args.iter().any(pred),
        Expr::If { cond, then, else_ } => pred(cond) || pred(then) || pred(else_),
        Expr::Begin(exprs) | Expr::Recur(exprs) => exprs.iter().any(pred),
        Expr::Let { bindings, body } | Expr::Loop { bindings, body } => {
            bindings.iter().any(|(_, init)| pred(init)) || pred(body)
        }
        Expr::Try {
            body,
            catches,
            finally,
        } => {
            pred(body)
                || catches.iter().any(|clause| pred(&clause.body))
                || finally.as_deref().is_some_and(pred)
        }
        Expr::Define { value, .. } => pred(value),
    }
}

/// Can evaluating `expr` reach a call to an operation in `table`?
///
/// Function literals are opaque: a breakpoint inside one is never a
/// suspension point of the enclosing coroutine.
pub fn reaches_breakpoint(expr: &Expr, table: &BreakpointTable) -> bool {
    if let Expr::Call { func, .. } = expr {
        if let Expr::Var(id) = func.as_ref() {
            if table.contains(*id) {
                return true;
            }
        }
    }
    any_child(expr, |child| reaches_breakpoint(child, table))
}

/// Does `expr` contain a `recur` targeting the innermost enclosing loop?
///
/// Nested loops own the recurs inside them.
pub fn contains_recur(expr: &Expr) -> bool {
    match expr {
        Expr::Recur(_) => true,
        Expr::Loop { .. } | Expr::Lambda(_) => false,
        other => any_child(other, contains_recur),
    }
}

/// A breakpoint identifier found inside a nested function literal
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeViolation {
    pub op: SymbolId,
    /// The offending call, or the bare reference when it is not called
    pub form: Expr,
}

/// Find the first breakpoint identifier used inside a function literal
/// nested in a coroutine body.
pub fn find_scope_violation(expr: &Expr, table: &BreakpointTable) -> Option<ScopeViolation> {
    scan(expr, table, false)
}

fn scan(expr: &Expr, table: &BreakpointTable, in_fn: bool) -> Option<ScopeViolation> {
    match expr {
        Expr::Var(id) if in_fn && table.contains(*id) => Some(ScopeViolation {
            op: *id,
            form: expr.clone(),
        }),
        Expr::Call { func, .. } if in_fn => {
            if let Expr::Var(id) = func.as_ref() {
                if table.contains(*id) {
                    return Some(ScopeViolation {
                        op: *id,
                        form: expr.clone(),
                    });
                }
            }
            scan_children(expr, table, in_fn)
        }
        Expr::Lambda(lambda) => scan(&lambda.body, table, true),
        _ => scan_children(expr, table, in_fn),
    }
}

fn scan_children(expr: &Expr, table: &BreakpointTable, in_fn: bool) -> Option<ScopeViolation> {
    let mut found = None;
    any_child(expr, |child| {
        found = scan(child, table, in_fn);
        found.is_some()
    });
    found
}
