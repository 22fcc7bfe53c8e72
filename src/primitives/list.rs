use super::{expect_int, Arity, PrimitiveDef};
use crate::value::{Condition, LResult, Value};

fn prim_list(args: &[Value]) -> LResult<Value> {
    Ok(Value::list(args.to_vec()))
}

fn prim_vector(args: &[Value]) -> LResult<Value> {
    Ok(Value::vector(args.to_vec()))
}

/// (cons x seq): a list with `x` in front
fn prim_cons(args: &[Value]) -> LResult<Value> {
    let rest = args[1].as_seq()?;
    let mut items = Vec::with_capacity(rest.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(rest);
    Ok(Value::list(items))
}

fn prim_first(args: &[Value]) -> LResult<Value> {
    Ok(args[0].as_seq()?.first().cloned().unwrap_or(Value::Nil))
}

/// Everything after the first element, as a list; empty for empty input
fn prim_rest(args: &[Value]) -> LResult<Value> {
    let items = args[0].as_seq()?;
    Ok(Value::list(items.get(1..).unwrap_or(&[]).to_vec()))
}

fn prim_nth(args: &[Value]) -> LResult<Value> {
    let items = args[0].as_seq()?;
    let index = expect_int("nth", &args[1])?;
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| {
            Condition::error(format!(
                "nth: index {} out of bounds for length {}",
                index,
                items.len()
            ))
        })
}

fn prim_count(args: &[Value]) -> LResult<Value> {
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        other => other.as_seq()?.len(),
    };
    Ok(Value::Int(n as i64))
}

fn prim_empty(args: &[Value]) -> LResult<Value> {
    let empty = match &args[0] {
        Value::String(s) => s.is_empty(),
        other => other.as_seq()?.is_empty(),
    };
    Ok(Value::Bool(empty))
}

/// (conj coll x...): vectors grow at the end, lists (and nil) at the front
fn prim_conj(args: &[Value]) -> LResult<Value> {
    let extra = &args[1..];
    match &args[0] {
        Value::Vector(items) => {
            let mut items = (**items).clone();
            items.extend_from_slice(extra);
            Ok(Value::vector(items))
        }
        other => {
            let items = other.as_seq()?;
            let mut out: Vec<Value> = extra.iter().rev().cloned().collect();
            out.extend_from_slice(items);
            Ok(Value::list(out))
        }
    }
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "list",
        func: prim_list,
        arity: Arity::AtLeast(0),
        doc: "A list of the arguments.",
    },
    PrimitiveDef {
        name: "vector",
        func: prim_vector,
        arity: Arity::AtLeast(0),
        doc: "A vector of the arguments.",
    },
    PrimitiveDef {
        name: "cons",
        func: prim_cons,
        arity: Arity::Exact(2),
        doc: "A list of x followed by the elements of seq.",
    },
    PrimitiveDef {
        name: "first",
        func: prim_first,
        arity: Arity::Exact(1),
        doc: "First element, or nil.",
    },
    PrimitiveDef {
        name: "rest",
        func: prim_rest,
        arity: Arity::Exact(1),
        doc: "All but the first element, as a list.",
    },
    PrimitiveDef {
        name: "nth",
        func: prim_nth,
        arity: Arity::Exact(2),
        doc: "Element at a zero-based index.",
    },
    PrimitiveDef {
        name: "count",
        func: prim_count,
        arity: Arity::Exact(1),
        doc: "Number of elements (or characters).",
    },
    PrimitiveDef {
        name: "empty?",
        func: prim_empty,
        arity: Arity::Exact(1),
        doc: "True for an empty collection, string or nil.",
    },
    PrimitiveDef {
        name: "conj",
        func: prim_conj,
        arity: Arity::AtLeast(1),
        doc: "Add elements where the collection grows cheapest.",
    },
];
