use super::{Arity, PrimitiveDef};
use crate::value::{LResult, Value};

fn prim_not(args: &[Value]) -> LResult<Value> {
    Ok(Value::Bool(!args[0].is_truthy()))
}

pub const PRIMITIVES: &[PrimitiveDef] = &[PrimitiveDef {
    name: "not",
    func: prim_not,
    arity: Arity::Exact(1),
    doc: "True for nil and false.",
}];
