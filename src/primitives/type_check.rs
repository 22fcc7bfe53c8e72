use super::{Arity, PrimitiveDef};
use crate::value::{LResult, Value};

fn prim_is_nil(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(args[0].is_nil()))
}

fn prim_is_number(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(matches!(args[0], Value::Int(_) | Value::Float(_))))
}

fn prim_is_string(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(matches!(args[0], Value::String(_))))
}

fn prim_is_fn(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(args[0].is_callable()))
}

fn prim_is_thunk(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(args[0].is_thunk()))
}

fn prim_is_condition(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(matches!(args[0], Value::Condition(_))))
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "nil?",
        func: prim_is_nil,
        arity: Arity::Exact(1),
        doc: "True for nil.",
    },
    PrimitiveDef {
        name: "number?",
        func: prim_is_number,
        arity: Arity::Exact(1),
        doc: "True for integers and floats.",
    },
    PrimitiveDef {
        name: "string?",
        func: prim_is_string,
        arity: Arity::Exact(1),
        doc: "True for strings.",
    },
    PrimitiveDef {
        name: "fn?",
        func: prim_is_fn,
        arity: Arity::Exact(1),
        doc: "True for closures and native functions.",
    },
    PrimitiveDef {
        name: "thunk?",
        func: prim_is_thunk,
        arity: Arity::Exact(1),
        doc: "True for trampoline thunks.",
    },
    PrimitiveDef {
        name: "condition?",
        func: prim_is_condition,
        arity: Arity::Exact(1),
        doc: "True for condition values.",
    },
];
