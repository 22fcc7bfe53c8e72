//! Built-in functions
//!
//! Each module exports a `const PRIMITIVES: &[PrimitiveDef]` table;
//! `register_primitives` walks every table and defines the globals.

pub mod arithmetic;
pub mod atom;
pub mod comparison;
pub mod coroutines;
pub mod display;
pub mod exception;
pub mod list;
pub mod logic;
pub mod type_check;

use crate::value::{Condition, LResult, Value};
use crate::vm::VM;

/// Argument count constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exact number of arguments required
    Exact(usize),
    /// At least this many arguments
    AtLeast(usize),
    /// Between min and max arguments (inclusive)
    Range(usize, usize),
}

impl Arity {
    pub fn matches(&self, n: usize) -> bool {
        match self {
            Arity::Exact(expected) => n == *expected,
            Arity::AtLeast(min) => n >= *min,
            Arity::Range(min, max) => n >= *min && n <= *max,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

/// Declarative definition of a primitive function
pub struct PrimitiveDef {
    pub name: &'static str,
    pub func: fn(&[Value]) -> LResult<Value>,
    /// Checked before `func` runs
    pub arity: Arity,
    /// One-line description
    pub doc: &'static str,
}

pub(crate) const ALL_TABLES: &[&[PrimitiveDef]] = &[
    arithmetic::PRIMITIVES,
    atom::PRIMITIVES,
    comparison::PRIMITIVES,
    coroutines::PRIMITIVES,
    display::PRIMITIVES,
    exception::PRIMITIVES,
    list::PRIMITIVES,
    logic::PRIMITIVES,
    type_check::PRIMITIVES,
];

/// Wrap a definition as a native function value
pub fn native(def: &'static PrimitiveDef) -> Value {
    Value::native(def.name, move |args| {
        if !def.arity.matches(args.len()) {
            return Err(Condition::arity_error(format!(
                "{}: expected {} argument{}, got {}",
                def.name,
                def.arity,
                if def.arity == Arity::Exact(1) { "" } else { "s" },
                args.len()
            )));
        }
        (def.func)(args)
    })
}

/// Define every primitive as a global of `vm`
pub fn register_primitives(vm: &VM) {
    for table in ALL_TABLES {
        for def in *table {
            vm.define(def.name, native(def));
        }
    }
}

/// Numeric argument helper shared by the tables
pub(crate) fn expect_int(name: &str, value: &Value) -> LResult<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(Condition::type_error(format!(
            "{}: expected integer, got {}",
            name,
            other.type_name()
        ))),
    }
}
