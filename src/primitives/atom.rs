use super::{Arity, PrimitiveDef};
use crate::value::{Condition, LResult, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn expect_atom<'a>(name: &str, value: &'a Value) -> LResult<&'a Rc<RefCell<Value>>> {
    match value {
        Value::Atom(cell) => Ok(cell),
        other => Err(Condition::type_error(format!(
            "{}: expected atom, got {}",
            name,
            other.type_name()
        ))),
    }
}

fn prim_atom(args: &[Value]) -> LResult<Value> {
    Ok(Value::Atom(Rc::new(RefCell::new(args[0].clone()))))
}

fn prim_deref(args: &[Value]) -> LResult<Value> {
    Ok(expect_atom("deref", &args[0])?.borrow().clone())
}

fn prim_reset(args: &[Value]) -> LResult<Value> {
    let cell = expect_atom("reset!", &args[0])?;
    *cell.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

/// (swap! a f args...): store and return (f @a args...)
fn prim_swap(args: &[Value]) -> LResult<Value> {
    let cell = expect_atom("swap!", &args[0])?;
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(cell.borrow().clone());
    call_args.extend_from_slice(&args[2..]);
    // The borrow is released before `f` runs; `f` may touch the atom
    let next = args[1].call(&call_args)?;
    *cell.borrow_mut() = next.clone();
    Ok(next)
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "atom",
        func: prim_atom,
        arity: Arity::Exact(1),
        doc: "A mutable reference holding a value.",
    },
    PrimitiveDef {
        name: "deref",
        func: prim_deref,
        arity: Arity::Exact(1),
        doc: "Current value of an atom.",
    },
    PrimitiveDef {
        name: "reset!",
        func: prim_reset,
        arity: Arity::Exact(2),
        doc: "Replace the value of an atom.",
    },
    PrimitiveDef {
        name: "swap!",
        func: prim_swap,
        arity: Arity::AtLeast(2),
        doc: "Replace the value of an atom with f applied to it.",
    },
];
