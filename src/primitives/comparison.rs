use super::{Arity, PrimitiveDef};
use crate::value::{Condition, LResult, Value};
use std::cmp::Ordering;

fn prim_eq(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(args.windows(2).all(|pair| pair[0] == pair[1])))
}

fn prim_not_eq(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(!args.windows(2).all(|pair| pair[0] == pair[1])))
}

/// Order two numbers or two strings; `None` when either is NaN
fn compare(name: &str, a: &Value, b: &Value) -> LResult<Option<Ordering>> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            a.as_float()?.partial_cmp(&b.as_float()?)
        }
        _ => {
            return Err(Condition::type_error(format!(
                "{}: cannot compare {} with {}",
                name,
                a.type_name(),
                b.type_name()
            )))
        }
    };
    Ok(ordering)
}

fn chain(name: &str, args: &[Value], accept: fn(Ordering) -> bool) -> LResult<Value> {
    for pair in args.windows(2) {
        match compare(name, &pair[0], &pair[1])? {
            Some(ordering) if accept(ordering) => {}
            _ => return Ok(Value::Bool(false)),
        }
    }
    Ok(Value::Bool(true))
}

fn prim_lt(args: &[Value]) -> LResult<Value> {
    chain("<", args, Ordering::is_lt)
}

fn prim_gt(args: &[Value]) -> LResult<Value> {
    chain(">", args, Ordering::is_gt)
}

fn prim_le(args: &[Value]) -> LResult<Value> {
    chain("<=", args, Ordering::is_le)
}

fn prim_ge(args: &[Value]) -> LResult<Value> {
    chain(">=", args, Ordering::is_ge)
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "=",
        func: prim_eq,
        arity: Arity::AtLeast(1),
        doc: "True when all arguments are equal.",
    },
    PrimitiveDef {
        name: "not=",
        func: prim_not_eq,
        arity: Arity::AtLeast(1),
        doc: "True when some two arguments differ.",
    },
    PrimitiveDef {
        name: "<",
        func: prim_lt,
        arity: Arity::AtLeast(1),
        doc: "True when the arguments are strictly increasing.",
    },
    PrimitiveDef {
        name: ">",
        func: prim_gt,
        arity: Arity::AtLeast(1),
        doc: "True when the arguments are strictly decreasing.",
    },
    PrimitiveDef {
        name: "<=",
        func: prim_le,
        arity: Arity::AtLeast(1),
        doc: "True when the arguments are non-decreasing.",
    },
    PrimitiveDef {
        name: ">=",
        func: prim_ge,
        arity: Arity::AtLeast(1),
        doc: "True when the arguments are non-increasing.",
    },
];
