use super::{expect_int, Arity, PrimitiveDef};
use crate::value::{Condition, LResult, Value};

/// Numeric tower of two: integers, widened to floats when mixed
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(name: &str, value: &Value) -> LResult<Num> {
        match value {
            Value::Int(n) => Ok(Num::Int(*n)),
            Value::Float(x) => Ok(Num::Float(*x)),
            other => Err(Condition::type_error(format!(
                "{}: expected number, got {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Int(n),
            Num::Float(x) => Value::Float(x),
        }
    }
}

fn overflow(name: &str) -> Condition {
    Condition::error(format!("{}: integer overflow", name))
}

fn fold(
    name: &str,
    args: &[Value],
    init: Num,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> LResult<Value> {
    let mut acc = init;
    for arg in args {
        acc = match (acc, Num::of(name, arg)?) {
            (Num::Int(a), Num::Int(b)) => Num::Int(int_op(a, b).ok_or_else(|| overflow(name))?),
            (a, b) => Num::Float(float_op(a.as_f64(), b.as_f64())),
        };
    }
    Ok(acc.into_value())
}

/// Variadic addition: (+ 1 2 3) -> 6, (+) -> 0
fn prim_add(args: &[Value]) -> LResult<Value> {
    fold("+", args, Num::Int(0), i64::checked_add, |a, b| a + b)
}

/// Variadic multiplication: (* 2 3) -> 6, (*) -> 1
fn prim_mul(args: &[Value]) -> LResult<Value> {
    fold("*", args, Num::Int(1), i64::checked_mul, |a, b| a * b)
}

/// (- 10 3 2) -> 5, (- 5) -> -5
fn prim_sub(args: &[Value]) -> LResult<Value> {
    let first = Num::of("-", &args[0])?;
    if args.len() == 1 {
        return fold("-", &args[..1], Num::Int(0), i64::checked_sub, |a, b| a - b);
    }
    fold("-", &args[1..], first, i64::checked_sub, |a, b| a - b)
}

/// (/ 12 3) -> 4; inexact integer quotients become floats
fn prim_div(args: &[Value]) -> LResult<Value> {
    let mut acc = Num::of("/", &args[0])?;
    let rest = if args.len() == 1 {
        acc = Num::Int(1);
        args
    } else {
        &args[1..]
    };
    for arg in rest {
        let divisor = Num::of("/", arg)?;
        if divisor.as_f64() == 0.0 {
            return Err(Condition::division_by_zero("/: division by zero"));
        }
        acc = match (acc, divisor) {
            (Num::Int(a), Num::Int(b)) if a % b == 0 => {
                Num::Int(a.checked_div(b).ok_or_else(|| overflow("/"))?)
            }
            (a, b) => Num::Float(a.as_f64() / b.as_f64()),
        };
    }
    Ok(acc.into_value())
}

/// (mod 7 3) -> 1; the result has the sign of the divisor
fn prim_mod(args: &[Value]) -> LResult<Value> {
    let a = expect_int("mod", &args[0])?;
    let b = expect_int("mod", &args[1])?;
    if b == 0 {
        return Err(Condition::division_by_zero("mod: division by zero"));
    }
    let r = a.checked_rem(b).ok_or_else(|| overflow("mod"))?;
    Ok(Value::Int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
}

fn prim_inc(args: &[Value]) -> LResult<Value> {
    fold("inc", &args[..1], Num::Int(1), i64::checked_add, |a, b| a + b)
}

fn prim_dec(args: &[Value]) -> LResult<Value> {
    match Num::of("dec", &args[0])? {
        Num::Int(n) => n
            .checked_sub(1)
            .map(Value::Int)
            .ok_or_else(|| overflow("dec")),
        Num::Float(x) => Ok(Value::Float(x - 1.0)),
    }
}

pub const PRIMITIVES: &[PrimitiveDef] = &[
    PrimitiveDef {
        name: "+",
        func: prim_add,
        arity: Arity::AtLeast(0),
        doc: "Sum of the arguments.",
    },
    PrimitiveDef {
        name: "-",
        func: prim_sub,
        arity: Arity::AtLeast(1),
        doc: "Subtract the remaining arguments from the first, or negate one.",
    },
    PrimitiveDef {
        name: "*",
        func: prim_mul,
        arity: Arity::AtLeast(0),
        doc: "Product of the arguments.",
    },
    PrimitiveDef {
        name: "/",
        func: prim_div,
        arity: Arity::AtLeast(1),
        doc: "Divide the first argument by the rest, or take a reciprocal.",
    },
    PrimitiveDef {
        name: "mod",
        func: prim_mod,
        arity: Arity::Exact(2),
        doc: "Integer modulus with the sign of the divisor.",
    },
    PrimitiveDef {
        name: "inc",
        func: prim_inc,
        arity: Arity::Exact(1),
        doc: "Add one.",
    },
    PrimitiveDef {
        name: "dec",
        func: prim_dec,
        arity: Arity::Exact(1),
        doc: "Subtract one.",
    },
];
