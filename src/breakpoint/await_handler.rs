//! The `await` breakpoint
//!
//! `(await op extra...)` inside a coroutine body becomes
//!
//! ```text
//! (op extra... (await-resume k) (await-reject f))
//! ```
//!
//! where `k`/`f` are the continuations of the call site. `op` is any
//! function that accepts two trailing continuations and eventually calls
//! exactly one of them with a single argument.
//!
//! The wrapped continuations do three things the raw ones do not:
//! - they capture the dynamic context at the suspension point and restore
//!   it around every step of the resumed work;
//! - they hand the work to the trampoline, so an operation that calls its
//!   continuation synchronously does not grow the stack, and one that calls
//!   it from an event loop gets a level of its own;
//! - the work runs on a level whose errors leave through whoever resumed
//!   it; `f` is never called for them, since a rewritten continuation has
//!   already handed its own errors to its failure continuation.

use super::{BreakpointHandler, BreakpointSite};
use crate::compiler::ast::Expr;
use crate::compiler::cps::trampoline;
use crate::context;
use crate::error::CompileError;
use crate::value::{Condition, LResult, Value};
use tracing::trace;

pub struct AwaitHandler;

impl BreakpointHandler for AwaitHandler {
    fn generate(&self, site: &BreakpointSite<'_>, args: Vec<Expr>) -> Result<Expr, CompileError> {
        let mut args = args.into_iter();
        let op = args.next().ok_or_else(|| CompileError::BadBreakpointCall {
            op: site.op_name(),
            reason: "expected an operation to call".to_string(),
        })?;

        let mut call_args: Vec<Expr> = args.collect();
        call_args.push(Expr::call(
            Expr::Literal(await_resume()),
            vec![Expr::var(site.success)],
        ));
        call_args.push(Expr::call(
            Expr::Literal(await_reject()),
            vec![Expr::var(site.failure)],
        ));
        Ok(Expr::call(op, call_args))
    }
}

/// `(await-resume k)`: success continuation handed to the operation
fn await_resume() -> Value {
    Value::native("await-resume", |args| {
        Condition::check_arity("await-resume", args, 1)?;
        Ok(wrap_success(args[0].clone()))
    })
}

/// `(await-reject f)`: failure continuation handed to the operation
fn await_reject() -> Value {
    Value::native("await-reject", |args| {
        Condition::check_arity("await-reject", args, 1)?;
        Ok(wrap_failure(args[0].clone()))
    })
}

fn wrap_success(k: Value) -> Value {
    let snapshot = context::capture();
    if let Some(exec) = snapshot.execution() {
        exec.suspend();
    }
    trace!("await: continuation issued");

    Value::native("await-continuation", move |args| {
        Condition::check_arity("await continuation", args, 1)?;
        let value = args[0].clone();
        if let Some(exec) = snapshot.execution() {
            exec.resume();
        }
        let (k, snapshot) = (k.clone(), snapshot.clone());
        trampoline::resume(Box::new(move || {
            let next = snapshot.enter(|| -> LResult<Value> {
                if let Some(exec) = snapshot.execution() {
                    exec.run();
                }
                k.call(&[value])
            })?;
            Ok(snapshot.in_context(next))
        }))
    })
}

fn wrap_failure(f: Value) -> Value {
    let snapshot = context::capture();

    Value::native("await-failure", move |args| {
        Condition::check_arity("await failure", args, 1)?;
        // Whatever the operation rejects with, the body sees a condition
        let err: Value = Condition::from_thrown(&args[0]).into();
        if let Some(exec) = snapshot.execution() {
            exec.resume();
        }
        let (f, snapshot) = (f.clone(), snapshot.clone());
        trampoline::resume(Box::new(move || {
            let next = snapshot.enter(|| {
                if let Some(exec) = snapshot.execution() {
                    exec.run();
                }
                f.call(&[err])
            })?;
            Ok(snapshot.in_context(next))
        }))
    })
}

/// Global bound to a breakpoint's name outside coroutine bodies.
///
/// Calls that the transform rewrites never reach it. Anything else (a
/// breakpoint called from a nested function literal when scope checks are
/// deferred, or from ordinary code) raises a `scope-violation` condition
/// at the call site.
pub fn sentinel(name: &str) -> Value {
    let op = name.to_string();
    Value::native(name, move |args| Err(scope_violation(&op, args)))
}

/// The condition raised when breakpoint `op` is called as a function
pub fn scope_violation(op: &str, args: &[Value]) -> Condition {
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let form = if rendered.is_empty() {
        format!("({})", op)
    } else {
        format!("({} {})", op, rendered.join(" "))
    };
    Condition::scope_violation(format!(
        "`{}` called outside a coroutine body: {}",
        op, form
    ))
    .with_data(Value::list(args.to_vec()))
}
