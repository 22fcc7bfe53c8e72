use super::{Arity, PrimitiveDef};
use crate::value::{LResult, Value};

/// (str a b ...): concatenation of the display forms; strings unquoted
fn prim_str(args: &[Value]) -> LResult<Value> {
    let text: String = args.iter().map(Value::to_display_string).collect();
    Ok(Value::string(&text))
}

fn prim_println(args: &[Value]) -> LResult<Value> {
    let parts: Vec<String> = args.iter().map(Value::to_display_string).collect();
    println!("{}", parts.join(" "));
    Ok(Value::Nil)
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "str",
        func: prim_str,
        arity: Arity::AtLeast(0),
        doc: "Concatenate the display forms of the arguments.",
    },
    PrimitiveDef {
        name: "println",
        func: prim_println,
        arity: Arity::AtLeast(0),
        doc: "Print the arguments separated by spaces, then a newline.",
    },
];
