//! The coroutine runtime surface
//!
//! A coroutine value (what `async` and `coroutine` evaluate to) is a
//! function of a success and a failure continuation. `run` is the entry
//! point for starting one; the rest are building blocks for trampolined
//! code and for writing breakpoint operations.

use super::{Arity, PrimitiveDef};
use crate::breakpoint::scope_violation;
use crate::compiler::cps::trampoline;
use crate::context;
use crate::value::{Condition, LResult, Value};

fn expect_fn(name: &str, value: &Value) -> LResult<()> {
    if value.is_callable() {
        Ok(())
    } else {
        Err(Condition::type_error(format!(
            "{}: expected a function, got {}",
            name,
            value.type_name()
        )))
    }
}

/// (run coroutine resolve reject): start a coroutine, return its execution
fn prim_run(args: &[Value]) -> LResult<Value> {
    for arg in args {
        expect_fn("run", arg)?;
    }
    let execution = trampoline::run(&args[0], args[1].clone(), args[2].clone())?;
    Ok(Value::Execution(execution))
}

/// (unwind value): force thunks until a plain value comes out
fn prim_unwind(args: &[Value]) -> LResult<Value> {
    trampoline::unwind(args[0].clone())
}

/// (resolved value k f): an operation that succeeds at once with `value`
fn prim_resolved(args: &[Value]) -> LResult<Value> {
    args[1].call(&args[..1])
}

/// (rejected error k f): an operation that fails at once with `error`
fn prim_rejected(args: &[Value]) -> LResult<Value> {
    args[2].call(&args[..1])
}

/// (execution-state) or (execution-state execution): state as a keyword;
/// nil outside any execution
fn prim_execution_state(args: &[Value]) -> LResult<Value> {
    let execution = match args.first() {
        Some(Value::Execution(execution)) => Some(execution.clone()),
        Some(other) => {
            return Err(Condition::type_error(format!(
                "execution-state: expected execution, got {}",
                other.type_name()
            )))
        }
        None => context::current_execution(),
    };
    Ok(execution.map_or(Value::Nil, |e| Value::keyword(e.state().name())))
}

/// `await` outside the rewritten part of a coroutine body
fn prim_await(args: &[Value]) -> LResult<Value> {
    Err(scope_violation("await", args))
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "run",
        func: prim_run,
        arity: Arity::Exact(3),
        doc: "Start a coroutine with resolve and reject continuations.",
    },
    PrimitiveDef {
        name: "thunk",
        func: trampoline::make_thunk,
        arity: Arity::Exact(1),
        doc: "Wrap a zero-argument function as a trampoline step.",
    },
    PrimitiveDef {
        name: "unwind",
        func: prim_unwind,
        arity: Arity::Exact(1),
        doc: "Force a value while it is a thunk.",
    },
    PrimitiveDef {
        name: "resolved",
        func: prim_resolved,
        arity: Arity::Exact(3),
        doc: "Operation that immediately succeeds with its argument.",
    },
    PrimitiveDef {
        name: "rejected",
        func: prim_rejected,
        arity: Arity::Exact(3),
        doc: "Operation that immediately fails with its argument.",
    },
    PrimitiveDef {
        name: "execution-state",
        func: prim_execution_state,
        arity: Arity::Range(0, 1),
        doc: "State of the current (or given) coroutine execution.",
    },
    PrimitiveDef {
        name: "await",
        func: prim_await,
        arity: Arity::AtLeast(0),
        doc: "Suspend until an operation delivers; only inside async bodies.",
    },
];
