use super::{Arity, PrimitiveDef};
use crate::value::{Condition, ConditionKind, LResult, Value};
use std::rc::Rc;

fn expect_condition<'a>(name: &str, value: &'a Value) -> LResult<&'a Rc<Condition>> {
    match value {
        Value::Condition(cond) => Ok(cond),
        other => Err(Condition::type_error(format!(
            "{}: expected condition, got {}",
            name,
            other.type_name()
        ))),
    }
}

/// Build a condition from `[:kind] message [data]`
fn build(name: &str, args: &[Value]) -> LResult<Condition> {
    let (kind, rest) = match args.first() {
        Some(Value::Keyword(kind)) => (ConditionKind::from_name(kind), &args[1..]),
        _ => (ConditionKind::Error, args),
    };
    let message = match rest.first() {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(Condition::type_error(format!(
                "{}: expected message string, got {}",
                name,
                other.type_name()
            )))
        }
        None => return Err(Condition::arity_error(format!("{}: missing message", name))),
    };
    let condition = Condition::new(kind, &*message);
    Ok(match rest.get(1) {
        Some(data) => condition.with_data(data.clone()),
        None => condition,
    })
}

/// (throw value): raise a condition, or an error carrying the value
fn prim_throw(args: &[Value]) -> LResult<Value> {
    Err(Condition::from_thrown(&args[0]))
}

/// (error [:kind] message [data]): build and raise a condition
fn prim_error(args: &[Value]) -> LResult<Value> {
    Err(build("error", args)?)
}

/// (ex-info [:kind] message [data]): build a condition without raising it
fn prim_ex_info(args: &[Value]) -> LResult<Value> {
    Ok(build("ex-info", args)?.into())
}

fn prim_error_message(args: &[Value]) -> LResult<Value> {
    let cond = expect_condition("error-message", &args[0])?;
    Ok(Value::String(cond.message.clone()))
}

fn prim_error_kind(args: &[Value]) -> LResult<Value> {
    let cond = expect_condition("error-kind", &args[0])?;
    Ok(Value::keyword(cond.kind.name()))
}

fn prim_error_data(args: &[Value]) -> LResult<Value> {
    let cond = expect_condition("error-data", &args[0])?;
    Ok(cond.data.clone())
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "throw",
        func: prim_throw,
        arity: Arity::Exact(1),
        doc: "Raise a condition; other values are wrapped in an error.",
    },
    PrimitiveDef {
        name: "error",
        func: prim_error,
        arity: Arity::Range(1, 3),
        doc: "Raise a condition of an optional kind with a message and data.",
    },
    PrimitiveDef {
        name: "ex-info",
        func: prim_ex_info,
        arity: Arity::Range(1, 3),
        doc: "Make a condition of an optional kind with a message and data.",
    },
    PrimitiveDef {
        name: "error-message",
        func: prim_error_message,
        arity: Arity::Exact(1),
        doc: "Message of a condition.",
    },
    PrimitiveDef {
        name: "error-kind",
        func: prim_error_kind,
        arity: Arity::Exact(1),
        doc: "Kind of a condition, as a keyword.",
    },
    PrimitiveDef {
        name: "error-data",
        func: prim_error_data,
        arity: Arity::Exact(1),
        doc: "Payload of a condition.",
    },
];
